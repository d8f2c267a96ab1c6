//! Extractor for the current shopper's state.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;
use crate::services::{SharedShopper, ShopperId};
use crate::state::AppState;

/// The cart and checkout state of the requesting browser session.
///
/// The first request from a session is assigned a fresh [`ShopperId`],
/// which is stored in the session so later requests find the same state.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentShopper { shopper, .. }: CurrentShopper) -> String {
///     shopper.lock().await.cart().item_count().to_string()
/// }
/// ```
pub struct CurrentShopper {
    pub id: ShopperId,
    pub shopper: SharedShopper,
}

impl FromRequestParts<AppState> for CurrentShopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let id = match session.get::<ShopperId>(session_keys::SHOPPER_ID).await? {
            Some(id) => id,
            None => {
                let id = ShopperId::generate();
                session.insert(session_keys::SHOPPER_ID, id).await?;
                tracing::debug!(shopper_id = %id, "New shopper");
                id
            }
        };

        let shopper = state.shoppers().get(id).await;
        Ok(Self { id, shopper })
    }
}
