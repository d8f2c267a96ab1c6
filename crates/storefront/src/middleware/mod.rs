//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and referrer policy)
//! 5. Session layer (tower-sessions with in-memory store)
//!
//! The extractors in [`shopper`] and [`auth`] read the session the session
//! layer puts in the request extensions.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod shopper;

pub use auth::{OptionalFarmer, clear_current_farmer, set_current_farmer};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use shopper::CurrentShopper;
