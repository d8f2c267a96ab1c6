//! Types stored in the session.

pub mod session;

pub use session::{FarmerIdentity, keys as session_keys};
