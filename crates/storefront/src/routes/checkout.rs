//! Checkout wizard route handlers.
//!
//! `GET /checkout` renders whichever step the shopper's open checkout is at.
//! Each form posts to its own transition and redirects back on success, so
//! a reload never resubmits. A rejected form is re-rendered with the error
//! and a 422 status; a submission for a step the wizard is not at is a 409.

use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use farmstand_core::cart::CartState;
use farmstand_core::checkout::{
    CheckoutError, CheckoutSession, CheckoutStep, OrderSummary, PaymentDetails, ShippingInfo,
};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CurrentShopper;
use crate::routes::cart::CartView;
use crate::services::{Shopper, ShopperError};
use crate::state::AppState;

/// Order amounts for templates.
#[derive(Clone)]
pub struct SummaryView {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl From<&OrderSummary> for SummaryView {
    fn from(summary: &OrderSummary) -> Self {
        Self {
            subtotal: summary.subtotal.display(),
            shipping: summary.shipping.display(),
            total: summary.total.display(),
        }
    }
}

/// One entry in the step indicator.
#[derive(Clone)]
pub struct StepView {
    pub number: usize,
    pub title: &'static str,
    pub active: bool,
    pub done: bool,
}

fn step_views(current: CheckoutStep) -> Vec<StepView> {
    [
        CheckoutStep::Cart,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Confirmation,
    ]
    .into_iter()
    .enumerate()
    .map(|(index, step)| StepView {
        number: index + 1,
        title: step.title(),
        active: step == current,
        done: step < current,
    })
    .collect()
}

/// Cart review step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/cart.html")]
pub struct CartStepTemplate {
    pub steps: Vec<StepView>,
    pub cart: CartView,
    pub error: Option<String>,
    pub cart_count: u64,
}

/// Shipping form step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/shipping.html")]
pub struct ShippingStepTemplate {
    pub steps: Vec<StepView>,
    pub form: ShippingInfo,
    pub error: Option<String>,
    pub cart_count: u64,
}

/// Payment form step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentStepTemplate {
    pub steps: Vec<StepView>,
    pub summary: SummaryView,
    pub error: Option<String>,
    pub cart_count: u64,
}

/// Order confirmation step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationStepTemplate {
    pub steps: Vec<StepView>,
    pub order_reference: String,
    pub full_name: String,
    pub email: String,
    pub item_count: u64,
    pub summary: SummaryView,
    pub close_after_secs: u64,
    pub cart_count: u64,
}

/// Render the page for the session's current step.
fn render_step(
    state: &AppState,
    session: &CheckoutSession,
    cart: &CartState,
    error: Option<String>,
) -> Response {
    let steps = step_views(session.step());
    let cart_count = cart.item_count();

    match session.step() {
        CheckoutStep::Cart => CartStepTemplate {
            steps,
            cart: CartView::from(cart),
            error,
            cart_count,
        }
        .into_response(),
        CheckoutStep::Shipping => ShippingStepTemplate {
            steps,
            form: ShippingInfo::default(),
            error,
            cart_count,
        }
        .into_response(),
        CheckoutStep::Payment => PaymentStepTemplate {
            steps,
            summary: SummaryView::from(&OrderSummary::for_cart(cart)),
            error,
            cart_count,
        }
        .into_response(),
        CheckoutStep::Confirmation => {
            let shipping = session.shipping();
            let confirmation = session.confirmation();
            ConfirmationStepTemplate {
                steps,
                order_reference: confirmation
                    .map(|c| c.order_reference.to_string())
                    .unwrap_or_default(),
                full_name: shipping.map(ShippingInfo::full_name).unwrap_or_default(),
                email: shipping.map(|s| s.email.trim().to_string()).unwrap_or_default(),
                item_count: confirmation.map_or(0, |c| c.item_count),
                summary: SummaryView::from(
                    &confirmation.map_or_else(|| OrderSummary::for_cart(cart), |c| c.summary),
                ),
                close_after_secs: whole_seconds(state.config().timing.checkout_close_delay),
                cart_count,
            }
            .into_response()
        }
    }
}

/// Round a delay up to whole seconds for the page refresh.
fn whole_seconds(delay: Duration) -> u64 {
    delay.as_secs() + u64::from(delay.subsec_nanos() > 0)
}

/// Split a shopper error into a form error to show or a request error to
/// return.
fn form_error(err: ShopperError) -> Result<String> {
    match err {
        ShopperError::Checkout(
            err @ (CheckoutError::EmptyCart
            | CheckoutError::MissingField(_)
            | CheckoutError::InvalidEmail),
        ) => Ok(err.to_string()),
        other => Err(other.into()),
    }
}

fn open_session(shopper: &Shopper) -> Result<&CheckoutSession> {
    shopper
        .checkout()
        .ok_or(AppError::Checkout(ShopperError::CheckoutNotOpen))
}

/// Open the wizard, or show it at its current step if already open.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn show(State(state): State<AppState>, shopper: CurrentShopper) -> Response {
    let mut guard = shopper.shopper.lock().await;
    let session = guard.open_checkout().clone();
    render_step(&state, &session, guard.cart(), None)
}

/// Cart review to shipping.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn start(State(state): State<AppState>, shopper: CurrentShopper) -> Result<Response> {
    let mut guard = shopper.shopper.lock().await;
    match guard.proceed_to_shipping() {
        Ok(()) => {
            add_breadcrumb("checkout", "Proceeded to shipping", &[]);
            tracing::info!(step = %CheckoutStep::Shipping, "Checkout advanced");
            Ok(Redirect::to("/checkout").into_response())
        }
        Err(err) => {
            let message = form_error(err)?;
            let current = &*guard;
            let page = render_step(&state, open_session(current)?, current.cart(), Some(message));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Shipping form to payment.
#[instrument(skip(shopper, form), fields(shopper_id = %shopper.id))]
pub async fn shipping(
    shopper: CurrentShopper,
    Form(form): Form<ShippingInfo>,
) -> Result<Response> {
    let mut guard = shopper.shopper.lock().await;
    match guard.submit_shipping(form.clone()) {
        Ok(()) => {
            add_breadcrumb("checkout", "Shipping submitted", &[]);
            tracing::info!(step = %CheckoutStep::Payment, "Checkout advanced");
            Ok(Redirect::to("/checkout").into_response())
        }
        Err(err) => {
            let message = form_error(err)?;
            let page = ShippingStepTemplate {
                steps: step_views(CheckoutStep::Shipping),
                form,
                error: Some(message),
                cart_count: guard.cart().item_count(),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Payment form to confirmation. Schedules the cart clear and close.
#[instrument(skip(state, shopper, form), fields(shopper_id = %shopper.id))]
pub async fn payment(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Form(form): Form<PaymentDetails>,
) -> Result<Response> {
    match state.shoppers().confirm(&shopper.shopper, &form).await {
        Ok(confirmation) => {
            let reference = confirmation.order_reference.to_string();
            add_breadcrumb(
                "checkout",
                "Order confirmed",
                &[("order_reference", reference.as_str())],
            );
            Ok(Redirect::to("/checkout").into_response())
        }
        Err(err) => {
            let message = form_error(err)?;
            let guard = shopper.shopper.lock().await;
            let page = PaymentStepTemplate {
                steps: step_views(CheckoutStep::Payment),
                summary: SummaryView::from(&OrderSummary::for_cart(guard.cart())),
                error: Some(message),
                cart_count: guard.cart().item_count(),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Discard the wizard. A pending post-confirmation clear is cancelled.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id))]
pub async fn close(shopper: CurrentShopper) -> Redirect {
    let closed = shopper.shopper.lock().await.close_checkout();
    tracing::info!(closed, "Checkout dismissed");
    Redirect::to("/products")
}
