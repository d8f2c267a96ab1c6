//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page: featured products and farms
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (?farm=&category=&q=)
//! GET  /farms                  - Farm listing
//! GET  /farms/{id}             - Farm detail with its products
//!
//! # Cart (HTMX fragments)
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add to cart (returns badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /wishlist/toggle        - Toggle wishlist (returns heart button)
//!
//! # Checkout wizard
//! GET  /checkout               - Open the wizard / show its current step
//! POST /checkout/start         - Cart review -> shipping
//! POST /checkout/shipping      - Shipping form -> payment
//! POST /checkout/payment       - Payment form -> confirmation
//! POST /checkout/close         - Discard the wizard
//!
//! # Farmers
//! GET  /farmer/sign-in         - Sign-in page
//! POST /farmer/sign-in         - Simulated sign-in, redirects to dashboard
//! POST /farmer/sign-out        - Sign out
//! GET  /dashboard              - Dashboard shell (?tab=)
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod farms;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the farm routes router.
pub fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(farms::index))
        .route("/{id}", get(farms::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the checkout wizard routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/start", post(checkout::start))
        .route("/shipping", post(checkout::shipping))
        .route("/payment", post(checkout::payment))
        .route("/close", post(checkout::close))
}

/// Create the farmer auth routes router.
pub fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(auth::sign_in_page).post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .nest("/farms", farm_routes())
        .nest("/cart", cart_routes())
        .route("/wishlist/toggle", post(cart::toggle_wishlist))
        .nest("/checkout", checkout_routes())
        .nest("/farmer", farmer_routes())
        .route("/dashboard", get(dashboard::show))
}
