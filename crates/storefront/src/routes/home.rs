//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::filters;
use crate::middleware::CurrentShopper;
use crate::routes::farms::FarmView;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured_products: Vec<ProductView>,
    pub farms: Vec<FarmView>,
    pub cart_count: u64,
}

/// Display the home page: the featured products and every farm.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn home(State(state): State<AppState>, shopper: CurrentShopper) -> HomeTemplate {
    let catalog = state.catalog();
    let guard = shopper.shopper.lock().await;
    let cart = guard.cart();

    HomeTemplate {
        featured_products: catalog
            .featured_products()
            .iter()
            .map(|product| ProductView::new(product, cart))
            .collect(),
        farms: catalog
            .farms()
            .iter()
            .map(|farm| FarmView::new(farm, catalog))
            .collect(),
        cart_count: cart.item_count(),
    }
}
