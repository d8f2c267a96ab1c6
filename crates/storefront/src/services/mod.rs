//! Business logic services for storefront.
//!
//! Services hold state that outlives a single request. Route handlers reach
//! them through [`crate::state::AppState`].

pub mod scheduled;
pub mod shoppers;

pub use scheduled::ScheduledTask;
pub use shoppers::{SharedShopper, Shopper, ShopperError, ShopperId, ShopperStore};
