//! Farm route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use farmstand_core::catalog::{Catalog, Farm};
use farmstand_core::types::FarmId;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CurrentShopper;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Farm display data for templates.
#[derive(Clone)]
pub struct FarmView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image: String,
    pub location: String,
    pub specialty: String,
    pub rating: String,
    pub certifications: Vec<String>,
    pub product_count: usize,
}

impl FarmView {
    #[must_use]
    pub fn new(farm: &Farm, catalog: &Catalog) -> Self {
        Self {
            id: farm.id.as_i32(),
            name: farm.name.clone(),
            description: farm.description.clone(),
            image: farm.image.clone(),
            location: farm.location.clone(),
            specialty: farm.specialty.clone(),
            rating: farm.rating.to_string(),
            certifications: farm
                .certifications
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
            product_count: catalog.products_by_farm(Some(farm.id)).len(),
        }
    }
}

/// Farm listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "farms/index.html")]
pub struct FarmsIndexTemplate {
    pub farms: Vec<FarmView>,
    pub cart_count: u64,
}

/// Farm detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "farms/show.html")]
pub struct FarmShowTemplate {
    pub farm: FarmView,
    pub products: Vec<ProductView>,
    pub cart_count: u64,
}

/// Display every farm.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn index(State(state): State<AppState>, shopper: CurrentShopper) -> FarmsIndexTemplate {
    let catalog = state.catalog();
    let cart_count = shopper.shopper.lock().await.cart().item_count();

    FarmsIndexTemplate {
        farms: catalog
            .farms()
            .iter()
            .map(|farm| FarmView::new(farm, catalog))
            .collect(),
        cart_count,
    }
}

/// Display one farm and the products it sells.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn show(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Path(id): Path<FarmId>,
) -> Result<FarmShowTemplate> {
    let catalog = state.catalog();
    let farm = catalog
        .farm(id)
        .ok_or_else(|| AppError::NotFound(format!("farm {id}")))?;

    let guard = shopper.shopper.lock().await;
    let cart = guard.cart();

    Ok(FarmShowTemplate {
        farm: FarmView::new(farm, catalog),
        products: catalog
            .products_by_farm(Some(id))
            .iter()
            .map(|product| ProductView::new(product, cart))
            .collect(),
        cart_count: cart.item_count(),
    })
}
