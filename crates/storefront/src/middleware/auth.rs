//! Farmer sign-in extractor and session helpers.
//!
//! Sign-in is simulated: there are no accounts or credentials to check, so
//! nothing here rejects a request.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{FarmerIdentity, session_keys};

/// Extractor that optionally gets the signed-in farmer.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalFarmer(farmer): OptionalFarmer) -> String {
///     farmer.map_or_else(|| "Guest".to_string(), |f| f.email)
/// }
/// ```
pub struct OptionalFarmer(pub Option<FarmerIdentity>);

impl<S> FromRequestParts<S> for OptionalFarmer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let farmer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<FarmerIdentity>(session_keys::FARMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(farmer))
    }
}

/// Helper to record the signed-in farmer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_farmer(
    session: &Session,
    farmer: &FarmerIdentity,
) -> Result<(), tower_sessions::session::Error> {
    // New identity, new session id.
    session.cycle_id().await?;
    session.insert(session_keys::FARMER, farmer).await
}

/// Helper to clear the signed-in farmer from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_farmer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<FarmerIdentity>(session_keys::FARMER)
        .await?;
    Ok(())
}
