//! Static catalog of farms and products.
//!
//! The catalog is embedded in the binary at build time and validated once at
//! startup. It is read-only: there are no mutation operations, and callers
//! hold it behind whatever shared state they already have.

pub mod farm;
pub mod product;

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{CurrencyCode, FarmId, Price, ProductId};

pub use farm::{Certification, Farm};
pub use product::{FarmRef, Product};

/// Number of products shown in the featured strip.
pub const FEATURED_COUNT: usize = 4;

/// Catalog data compiled into the binary.
const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Errors raised while loading catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate farm id {0}")]
    DuplicateFarm(FarmId),

    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),

    #[error("product {product} references unknown farm {farm}")]
    UnknownFarm { product: ProductId, farm: FarmId },

    #[error("product {product} names farm {farm} as '{found}' but the farm is '{expected}'")]
    FarmNameMismatch {
        product: ProductId,
        farm: FarmId,
        expected: String,
        found: String,
    },

    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// On-disk shape of the catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    currency_code: CurrencyCode,
    farms: Vec<Farm>,
    products: Vec<ProductRecord>,
}

/// A product as written in the catalog file; prices carry no currency.
#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    price: Decimal,
    image: String,
    description: String,
    farm: FarmRef,
    category: String,
    organic: bool,
    in_stock: bool,
}

impl ProductRecord {
    fn into_product(self, currency_code: CurrencyCode) -> Product {
        Product {
            id: self.id,
            name: self.name,
            price: Price::new(self.price, currency_code),
            image: self.image,
            description: self.description,
            farm: self.farm,
            category: self.category,
            organic: self.organic,
            in_stock: self.in_stock,
        }
    }
}

/// Selection criteria for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Only products from this farm.
    pub farm: Option<FarmId>,
    /// Only products with exactly this category label.
    pub category: Option<String>,
    /// Case-insensitive substring of the product or farm name.
    pub search: Option<String>,
}

/// The read-only product and farm catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    currency_code: CurrencyCode,
    farms: Vec<Farm>,
    products: Vec<Arc<Product>>,
}

impl Catalog {
    /// Load the catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded data fails to parse or validate.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on malformed JSON, duplicate ids, dangling farm
    /// references or negative prices.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let currency_code = file.currency_code;
        let products = file
            .products
            .into_iter()
            .map(|record| record.into_product(currency_code))
            .collect();
        Self::new(currency_code, file.farms, products)
    }

    /// Build a catalog from already-constructed farms and products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on duplicate ids, dangling farm references or
    /// negative prices.
    pub fn new(
        currency_code: CurrencyCode,
        farms: Vec<Farm>,
        products: Vec<Product>,
    ) -> Result<Self, CatalogError> {
        let mut farm_ids = HashSet::new();
        for farm in &farms {
            if !farm_ids.insert(farm.id) {
                return Err(CatalogError::DuplicateFarm(farm.id));
            }
        }

        let mut product_ids = HashSet::new();
        for product in &products {
            if !product_ids.insert(product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
            if product.price.is_negative() {
                return Err(CatalogError::NegativePrice(product.id));
            }
            let farm = farms
                .iter()
                .find(|farm| farm.id == product.farm.id)
                .ok_or(CatalogError::UnknownFarm {
                    product: product.id,
                    farm: product.farm.id,
                })?;
            if farm.name != product.farm.name {
                return Err(CatalogError::FarmNameMismatch {
                    product: product.id,
                    farm: farm.id,
                    expected: farm.name.clone(),
                    found: product.farm.name.clone(),
                });
            }
        }

        Ok(Self {
            currency_code,
            farms,
            products: products.into_iter().map(Arc::new).collect(),
        })
    }

    /// Currency every price in the catalog is quoted in.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Arc<Product>> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Products from one farm, or every product when no farm is selected.
    ///
    /// An unknown farm id yields an empty list.
    #[must_use]
    pub fn products_by_farm(&self, farm: Option<FarmId>) -> Vec<Arc<Product>> {
        match farm {
            None => self.products.clone(),
            Some(farm_id) => self
                .products
                .iter()
                .filter(|product| product.farm.id == farm_id)
                .cloned()
                .collect(),
        }
    }

    /// The first [`FEATURED_COUNT`] products. Positional, not ranked.
    #[must_use]
    pub fn featured_products(&self) -> &[Arc<Product>] {
        self.products
            .get(..FEATURED_COUNT)
            .unwrap_or(&self.products)
    }

    /// All farms, in catalog order.
    #[must_use]
    pub fn farms(&self) -> &[Farm] {
        &self.farms
    }

    /// Look up a farm by id.
    #[must_use]
    pub fn farm(&self, id: FarmId) -> Option<&Farm> {
        self.farms.iter().find(|farm| farm.id == id)
    }

    /// Distinct category labels in the order they first appear.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .map(|product| product.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    /// Products matching every criterion in the filter.
    #[must_use]
    pub fn search(&self, filter: &ProductFilter) -> Vec<Arc<Product>> {
        let term = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        self.products_by_farm(filter.farm)
            .into_iter()
            .filter(|product| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|category| product.category == category)
            })
            .filter(|product| {
                term.as_deref()
                    .is_none_or(|term| product.matches_term(term))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = catalog();
        assert_eq!(catalog.farms().len(), 4);
        assert_eq!(catalog.products().len(), 6);
        assert_eq!(catalog.currency_code(), CurrencyCode::USD);
    }

    #[test]
    fn test_products_by_farm_none_returns_everything() {
        let catalog = catalog();
        assert_eq!(catalog.products_by_farm(None).len(), catalog.products().len());
    }

    #[test]
    fn test_products_by_farm_filters() {
        let catalog = catalog();
        let millers = catalog.products_by_farm(Some(FarmId::new(1)));
        let names: Vec<_> = millers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Fresh Organic Tomatoes", "Heirloom Carrots"]);
    }

    #[test]
    fn test_products_by_unknown_farm_is_empty() {
        assert!(catalog().products_by_farm(Some(FarmId::new(99))).is_empty());
    }

    #[test]
    fn test_featured_is_first_four() {
        let catalog = catalog();
        let featured: Vec<_> = catalog.featured_products().iter().map(|p| p.id).collect();
        assert_eq!(
            featured,
            vec![
                ProductId::new(1),
                ProductId::new(2),
                ProductId::new(3),
                ProductId::new(4)
            ]
        );
    }

    #[test]
    fn test_featured_on_small_catalog() {
        let small = Catalog::new(CurrencyCode::USD, Vec::new(), Vec::new()).unwrap();
        assert!(small.featured_products().is_empty());
    }

    #[test]
    fn test_farm_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.farm(FarmId::new(3)).unwrap().name, "Sunny Bee Apiaries");
        assert!(catalog.farm(FarmId::new(42)).is_none());
        assert!(
            catalog
                .farm(FarmId::new(4))
                .unwrap()
                .is_certified(Certification::Humane)
        );
    }

    #[test]
    fn test_categories_in_first_appearance_order() {
        assert_eq!(
            catalog().categories(),
            vec!["Vegetables", "Dairy & Eggs", "Honey", "Fruits"]
        );
    }

    #[test]
    fn test_search_matches_farm_name_case_insensitively() {
        let filter = ProductFilter {
            search: Some("  GREEN valley ".to_string()),
            ..ProductFilter::default()
        };
        let ids: Vec<_> = catalog().search(&filter).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId::new(4), ProductId::new(6)]);
    }

    #[test]
    fn test_search_combines_farm_and_category() {
        let filter = ProductFilter {
            farm: Some(FarmId::new(2)),
            category: Some("Fruits".to_string()),
            search: None,
        };
        let ids: Vec<_> = catalog().search(&filter).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId::new(6)]);
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let json = r#"{
            "farms": [{"id": 1, "name": "A", "description": "", "image": "", "location": "",
                       "specialty": "", "rating": "4.0", "certifications": []}],
            "products": [
                {"id": 1, "name": "x", "price": "1.00", "image": "", "description": "",
                 "farm": {"id": 1, "name": "A"}, "category": "c", "organic": false, "in_stock": true},
                {"id": 1, "name": "y", "price": "1.00", "image": "", "description": "",
                 "farm": {"id": 1, "name": "A"}, "category": "c", "organic": false, "in_stock": true}
            ]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateProduct(id) if id == ProductId::new(1)));
    }

    #[test]
    fn test_dangling_farm_rejected() {
        let json = r#"{
            "farms": [],
            "products": [
                {"id": 1, "name": "x", "price": "1.00", "image": "", "description": "",
                 "farm": {"id": 7, "name": "Nowhere"}, "category": "c", "organic": false, "in_stock": true}
            ]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownFarm { .. }));
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = r#"{
            "farms": [{"id": 1, "name": "A", "description": "", "image": "", "location": "",
                       "specialty": "", "rating": "4.0", "certifications": []}],
            "products": [
                {"id": 1, "name": "x", "price": "-1.00", "image": "", "description": "",
                 "farm": {"id": 1, "name": "A"}, "category": "c", "organic": false, "in_stock": true}
            ]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::NegativePrice(_)));
    }
}
