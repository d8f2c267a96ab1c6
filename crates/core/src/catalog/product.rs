//! Products listed in the catalog.

use serde::{Deserialize, Serialize};

use crate::types::{FarmId, Price, ProductId};

/// The farm a product comes from, as shown on the product card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmRef {
    pub id: FarmId,
    pub name: String,
}

/// A product for sale.
///
/// Products are loaded once and shared as `Arc<Product>`; cart lines point
/// at the catalog's copy instead of cloning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
    pub description: String,
    pub farm: FarmRef,
    pub category: String,
    pub organic: bool,
    pub in_stock: bool,
}

impl Product {
    /// Case-insensitive match of an already-lowercased term against the
    /// product name and farm name.
    #[must_use]
    pub fn matches_term(&self, lowercase_term: &str) -> bool {
        self.name.to_lowercase().contains(lowercase_term)
            || self.farm.name.to_lowercase().contains(lowercase_term)
    }
}
