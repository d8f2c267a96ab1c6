//! Farmer sign-in route handlers.
//!
//! Sign-in is simulated: any email and password is accepted after a short
//! delay. The email is kept in the session to greet the farmer on the
//! dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    CurrentShopper, OptionalFarmer, clear_current_farmer, set_current_farmer,
};
use crate::models::FarmerIdentity;
use crate::state::AppState;

/// Sign-in form data.
#[derive(Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/sign_in.html")]
pub struct SignInTemplate {
    pub email: String,
    pub signed_in_as: Option<String>,
    pub error: Option<String>,
    pub cart_count: u64,
}

/// Display the farmer sign-in page.
pub async fn sign_in_page(
    shopper: CurrentShopper,
    OptionalFarmer(farmer): OptionalFarmer,
) -> SignInTemplate {
    SignInTemplate {
        email: String::new(),
        signed_in_as: farmer.map(|f| f.email),
        error: None,
        cart_count: shopper.shopper.lock().await.cart().item_count(),
    }
}

/// Handle the sign-in form.
///
/// Waits the configured sign-in delay, then always succeeds as long as both
/// fields are filled in.
#[instrument(skip(state, shopper, session, form))]
pub async fn sign_in(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Result<Response> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        let page = SignInTemplate {
            email: email.to_string(),
            signed_in_as: None,
            error: Some("Enter your email and password".to_string()),
            cart_count: shopper.shopper.lock().await.cart().item_count(),
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    tokio::time::sleep(state.config().timing.sign_in_delay).await;

    let farmer = FarmerIdentity {
        email: email.to_string(),
    };
    set_current_farmer(&session, &farmer).await?;
    set_sentry_user(&farmer.email);
    tracing::info!("Farmer signed in");

    Ok(Redirect::to("/dashboard").into_response())
}

/// Sign the farmer out and return to the storefront.
#[instrument(skip(session))]
pub async fn sign_out(session: Session) -> Result<Redirect> {
    clear_current_farmer(&session).await?;
    clear_sentry_user();
    tracing::info!("Farmer signed out");
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_form_debug_redacts_credentials() {
        let form = SignInForm {
            email: "grower@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{form:?}");
        assert!(!debug.contains("grower@example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
