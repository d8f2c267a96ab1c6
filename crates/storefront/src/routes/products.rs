//! Product listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use farmstand_core::cart::CartState;
use farmstand_core::catalog::{Catalog, Product, ProductFilter};
use farmstand_core::types::FarmId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CurrentShopper;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub image: String,
    pub description: String,
    pub farm_id: i32,
    pub farm_name: String,
    pub category: String,
    pub organic: bool,
    pub in_stock: bool,
    pub in_cart: u32,
    pub wishlisted: bool,
}

impl ProductView {
    /// Build the view of `product` as seen by a shopper with `cart`.
    #[must_use]
    pub fn new(product: &Product, cart: &CartState) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.display(),
            image: product.image.clone(),
            description: product.description.clone(),
            farm_id: product.farm.id.as_i32(),
            farm_name: product.farm.name.clone(),
            category: product.category.clone(),
            organic: product.organic,
            in_stock: product.in_stock,
            in_cart: cart.line(product.id).map_or(0, |line| line.quantity()),
            wishlisted: cart.is_wishlisted(product.id),
        }
    }
}

/// A selectable option in a filter dropdown.
#[derive(Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Product listing query parameters.
///
/// Empty strings are what an unselected form field sends, so they count as
/// absent.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub farm: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
}

impl ProductsQuery {
    /// Convert to a catalog filter.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if `farm` is present but not a number.
    pub fn to_filter(&self) -> Result<ProductFilter> {
        let farm = non_empty(self.farm.as_deref())
            .map(str::parse::<FarmId>)
            .transpose()
            .map_err(|_| AppError::BadRequest("farm must be a number".to_string()))?;

        Ok(ProductFilter {
            farm,
            category: non_empty(self.category.as_deref()).map(String::from),
            search: non_empty(self.q.as_deref()).map(String::from),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub farms: Vec<FilterOption>,
    pub categories: Vec<FilterOption>,
    pub search: String,
    pub heading: String,
    pub cart_count: u64,
}

fn farm_options(catalog: &Catalog, selected: Option<FarmId>) -> Vec<FilterOption> {
    catalog
        .farms()
        .iter()
        .map(|farm| FilterOption {
            value: farm.id.to_string(),
            label: farm.name.clone(),
            selected: selected == Some(farm.id),
        })
        .collect()
}

fn category_options(catalog: &Catalog, selected: Option<&str>) -> Vec<FilterOption> {
    catalog
        .categories()
        .into_iter()
        .map(|category| FilterOption {
            value: category.to_string(),
            label: category.to_string(),
            selected: selected == Some(category),
        })
        .collect()
}

/// Display the product listing, optionally narrowed to one farm, one
/// category or a search term.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn index(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Query(query): Query<ProductsQuery>,
) -> Result<ProductsIndexTemplate> {
    let filter = query.to_filter()?;
    let catalog = state.catalog();

    let heading = match filter.farm {
        Some(id) => catalog
            .farm(id)
            .map_or_else(|| "Products".to_string(), |farm| format!("Products from {}", farm.name)),
        None => "All Products".to_string(),
    };

    let guard = shopper.shopper.lock().await;
    let cart = guard.cart();
    let products = catalog
        .search(&filter)
        .iter()
        .map(|product| ProductView::new(product, cart))
        .collect::<Vec<_>>();
    tracing::debug!(results = products.len(), "Product search");

    Ok(ProductsIndexTemplate {
        products,
        farms: farm_options(catalog, filter.farm),
        categories: category_options(catalog, filter.category.as_deref()),
        search: filter.search.unwrap_or_default(),
        heading,
        cart_count: cart.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_unfiltered() {
        let query = ProductsQuery {
            farm: Some(String::new()),
            category: Some("  ".to_string()),
            q: None,
        };
        assert_eq!(query.to_filter().unwrap(), ProductFilter::default());
    }

    #[test]
    fn test_query_parses_farm() {
        let query = ProductsQuery {
            farm: Some("2".to_string()),
            category: Some("Dairy".to_string()),
            q: Some(" honey ".to_string()),
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.farm, Some(FarmId::new(2)));
        assert_eq!(filter.category.as_deref(), Some("Dairy"));
        assert_eq!(filter.search.as_deref(), Some("honey"));
    }

    #[test]
    fn test_bad_farm_is_rejected() {
        let query = ProductsQuery {
            farm: Some("sunny".to_string()),
            ..ProductsQuery::default()
        };
        assert!(matches!(query.to_filter(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_product_view_reflects_cart() {
        let catalog = Catalog::embedded().unwrap();
        let product = catalog.products().first().unwrap();
        let cart = CartState::new()
            .add_to_cart(std::sync::Arc::clone(product))
            .toggle_wishlist(product.id);
        let view = ProductView::new(product, &cart);
        assert_eq!(view.in_cart, 1);
        assert!(view.wishlisted);
        assert_eq!(view.price, product.price.display());
    }
}
