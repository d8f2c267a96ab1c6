//! Session-related types.
//!
//! The session only carries identifiers. Cart and checkout state live in
//! [`crate::services::ShopperStore`], keyed by the shopper id stored here.

use serde::{Deserialize, Serialize};

/// The farmer signed in to the dashboard.
///
/// Sign-in is simulated, so this is only what the farmer typed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmerIdentity {
    pub email: String,
}

/// Session keys.
pub mod keys {
    /// Key for the shopper id that owns the cart and checkout.
    pub const SHOPPER_ID: &str = "shopper_id";

    /// Key for the signed-in farmer.
    pub const FARMER: &str = "farmer";
}
