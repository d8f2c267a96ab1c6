//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every change answers with an `HX-Trigger: cart-updated` header so the
//! badge in the header refreshes itself.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use farmstand_core::cart::{CartAction, CartState};
use farmstand_core::types::ProductId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentShopper;
use crate::state::AppState;

/// HTMX event fired after any cart change.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    pub farm_name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| {
                    let product = line.product();
                    CartItemView {
                        product_id: product.id.as_i32(),
                        name: product.name.clone(),
                        farm_name: product.farm.name.clone(),
                        image: product.image.clone(),
                        quantity: line.quantity(),
                        price: product.price.display(),
                        line_price: line.line_total().display(),
                    }
                })
                .collect(),
            subtotal: cart.subtotal().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update quantity form data. Anything below 1 removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Form data naming a single product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Wishlist heart button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: i32,
    pub wishlisted: bool,
}

/// Get cart count badge (HTMX).
#[instrument(skip(shopper), fields(shopper_id = %shopper.id))]
pub async fn count(shopper: CurrentShopper) -> CartCountTemplate {
    CartCountTemplate {
        count: shopper.shopper.lock().await.cart().item_count(),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// Returns the updated count badge.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn add(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .product(form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut guard = shopper.shopper.lock().await;
    guard.dispatch(CartAction::AddToCart(Arc::clone(product)));
    let count = guard.cart().item_count();
    tracing::info!(product_id = %form.product_id, count, "Added to cart");

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Set the quantity of a cart line (HTMX).
///
/// Returns the re-rendered cart items.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id))]
pub async fn update(shopper: CurrentShopper, Form(form): Form<UpdateCartForm>) -> Response {
    let mut guard = shopper.shopper.lock().await;
    guard.dispatch(CartAction::UpdateQuantity {
        product_id: form.product_id,
        quantity: form.quantity,
    });

    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(guard.cart()),
        },
    )
        .into_response()
}

/// Remove a line from the cart (HTMX).
///
/// Returns the re-rendered cart items.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id))]
pub async fn remove(shopper: CurrentShopper, Form(form): Form<ProductForm>) -> Response {
    let mut guard = shopper.shopper.lock().await;
    guard.dispatch(CartAction::RemoveFromCart(form.product_id));

    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(guard.cart()),
        },
    )
        .into_response()
}

/// Add a product to the wishlist or take it off (HTMX).
///
/// Returns the re-rendered heart button.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id))]
pub async fn toggle_wishlist(
    shopper: CurrentShopper,
    Form(form): Form<ProductForm>,
) -> WishlistButtonTemplate {
    let mut guard = shopper.shopper.lock().await;
    guard.dispatch(CartAction::ToggleWishlist(form.product_id));

    WishlistButtonTemplate {
        product_id: form.product_id.as_i32(),
        wishlisted: guard.cart().is_wishlisted(form.product_id),
    }
}
