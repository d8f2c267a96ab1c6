//! Shopping cart state and its reducer.
//!
//! Every operation takes the current state by reference and returns a new
//! one; nothing is mutated in place. Operations are total: an unknown
//! product id is simply a no-op.
//!
//! Invariants held by every value of [`CartState`]:
//! - at most one line per product id
//! - every line has a quantity of at least 1

use std::collections::BTreeSet;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::catalog::Product;
use crate::types::{CurrencyCode, Price, ProductId};

/// A product and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    product: Arc<Product>,
    quantity: u32,
}

impl CartLine {
    /// The product this line refers to.
    #[must_use]
    pub fn product(&self) -> &Arc<Product> {
        &self.product
    }

    #[must_use]
    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// An action dispatched against the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    AddToCart(Arc<Product>),
    RemoveFromCart(ProductId),
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    ToggleWishlist(ProductId),
    ClearCart,
}

/// Cart lines in insertion order plus the wishlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    lines: Vec<CartLine>,
    wishlist: BTreeSet<ProductId>,
}

impl CartState {
    /// An empty cart with an empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action and return the resulting state.
    #[must_use]
    pub fn reduce(&self, action: CartAction) -> Self {
        match action {
            CartAction::AddToCart(product) => self.add_to_cart(product),
            CartAction::RemoveFromCart(product_id) => self.remove_from_cart(product_id),
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(product_id, quantity),
            CartAction::ToggleWishlist(product_id) => self.toggle_wishlist(product_id),
            CartAction::ClearCart => self.clear_cart(),
        }
    }

    /// Add one unit of a product, merging into an existing line.
    #[must_use]
    pub fn add_to_cart(&self, product: Arc<Product>) -> Self {
        let mut next = self.clone();
        match next
            .lines
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => next.lines.push(CartLine {
                product,
                quantity: 1,
            }),
        }
        next
    }

    /// Drop the line for a product, if any.
    #[must_use]
    pub fn remove_from_cart(&self, product_id: ProductId) -> Self {
        let mut next = self.clone();
        next.lines.retain(|line| line.product.id != product_id);
        next
    }

    /// Set a line's quantity. Anything below 1 removes the line.
    ///
    /// There is no upper bound and no stock check; quantities past
    /// `u32::MAX` saturate.
    #[must_use]
    pub fn update_quantity(&self, product_id: ProductId, quantity: i64) -> Self {
        if quantity < 1 {
            return self.remove_from_cart(product_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let mut next = self.clone();
        if let Some(line) = next
            .lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
        {
            line.quantity = quantity;
        }
        next
    }

    /// Add the product to the wishlist, or take it off if already there.
    #[must_use]
    pub fn toggle_wishlist(&self, product_id: ProductId) -> Self {
        let mut next = self.clone();
        if !next.wishlist.remove(&product_id) {
            next.wishlist.insert(product_id);
        }
        next
    }

    /// Empty the cart. The wishlist is kept.
    #[must_use]
    pub fn clear_cart(&self) -> Self {
        Self {
            lines: Vec::new(),
            wishlist: self.wishlist.clone(),
        }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if it is in the cart.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn wishlist(&self) -> &BTreeSet<ProductId> {
        &self.wishlist
    }

    #[must_use]
    pub fn is_wishlisted(&self, product_id: ProductId) -> bool {
        self.wishlist.contains(&product_id)
    }

    /// Sum of price times quantity over every line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency_code = self
            .lines
            .first()
            .map_or_else(CurrencyCode::default, |line| line.product.price.currency_code);
        let amount: Decimal = self
            .lines
            .iter()
            .map(|line| line.line_total().amount)
            .sum();
        Price::new(amount, currency_code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use proptest::prelude::*;

    fn product(catalog: &Catalog, id: i32) -> Arc<Product> {
        Arc::clone(catalog.product(ProductId::new(id)).unwrap())
    }

    fn assert_invariants(cart: &CartState) {
        let mut seen = BTreeSet::new();
        for line in cart.lines() {
            assert!(line.quantity() >= 1, "line with zero quantity");
            assert!(seen.insert(line.product_id()), "duplicate line");
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let catalog = Catalog::embedded().unwrap();
        let cart = CartState::new()
            .add_to_cart(product(&catalog, 1))
            .add_to_cart(product(&catalog, 3))
            .add_to_cart(product(&catalog, 1));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity(), 2);
        assert_eq!(cart.item_count(), 3);
        assert_invariants(&cart);
    }

    #[test]
    fn test_operations_do_not_mutate_receiver() {
        let catalog = Catalog::embedded().unwrap();
        let before = CartState::new().add_to_cart(product(&catalog, 1));
        let _after = before.update_quantity(ProductId::new(1), 5);
        assert_eq!(before.line(ProductId::new(1)).unwrap().quantity(), 1);
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let catalog = Catalog::embedded().unwrap();
        let prior = CartState::new()
            .add_to_cart(product(&catalog, 2))
            .toggle_wishlist(ProductId::new(5));
        let round_trip = prior
            .add_to_cart(product(&catalog, 4))
            .remove_from_cart(ProductId::new(4));
        assert_eq!(round_trip, prior);
    }

    #[test]
    fn test_update_to_zero_is_remove() {
        let catalog = Catalog::embedded().unwrap();
        let cart = CartState::new()
            .add_to_cart(product(&catalog, 1))
            .add_to_cart(product(&catalog, 2));
        assert_eq!(
            cart.update_quantity(ProductId::new(1), 0),
            cart.remove_from_cart(ProductId::new(1))
        );
        assert_eq!(
            cart.update_quantity(ProductId::new(1), -3),
            cart.remove_from_cart(ProductId::new(1))
        );
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let catalog = Catalog::embedded().unwrap();
        let cart = CartState::new().add_to_cart(product(&catalog, 1));
        assert_eq!(cart.update_quantity(ProductId::new(6), 4), cart);
    }

    #[test]
    fn test_update_has_no_stock_bound() {
        let catalog = Catalog::embedded().unwrap();
        let cart = CartState::new()
            .add_to_cart(product(&catalog, 1))
            .update_quantity(ProductId::new(1), i64::MAX);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity(), u32::MAX);
    }

    #[test]
    fn test_wishlist_toggle_twice_restores_membership() {
        let cart = CartState::new().toggle_wishlist(ProductId::new(3));
        assert!(cart.is_wishlisted(ProductId::new(3)));
        let cart = cart.toggle_wishlist(ProductId::new(3));
        assert!(!cart.is_wishlisted(ProductId::new(3)));
        assert_eq!(cart, CartState::new());
    }

    #[test]
    fn test_clear_keeps_wishlist() {
        let catalog = Catalog::embedded().unwrap();
        let cart = CartState::new()
            .add_to_cart(product(&catalog, 1))
            .toggle_wishlist(ProductId::new(1))
            .clear_cart();
        assert!(cart.is_empty());
        assert!(cart.is_wishlisted(ProductId::new(1)));
    }

    #[test]
    fn test_subtotal_scenario() {
        let catalog = Catalog::embedded().unwrap();
        let cart = CartState::new()
            .reduce(CartAction::AddToCart(product(&catalog, 1)))
            .reduce(CartAction::AddToCart(product(&catalog, 1)))
            .reduce(CartAction::AddToCart(product(&catalog, 3)));
        assert_eq!(cart.subtotal().amount, Decimal::new(2297, 2));
        assert_eq!(cart.subtotal().display(), "$22.97");
    }

    #[test]
    fn test_empty_subtotal_is_zero() {
        assert_eq!(CartState::new().subtotal().display(), "$0.00");
    }

    #[test]
    fn test_lines_share_catalog_products() {
        let catalog = Catalog::embedded().unwrap();
        let tomatoes = product(&catalog, 1);
        let cart = CartState::new().add_to_cart(Arc::clone(&tomatoes));
        assert!(Arc::ptr_eq(cart.lines().first().unwrap().product(), &tomatoes));
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        let catalog = Catalog::embedded().unwrap();
        let actions = [
            CartAction::AddToCart(product(&catalog, 1)),
            CartAction::AddToCart(product(&catalog, 2)),
            CartAction::UpdateQuantity {
                product_id: ProductId::new(2),
                quantity: 4,
            },
            CartAction::AddToCart(product(&catalog, 1)),
            CartAction::UpdateQuantity {
                product_id: ProductId::new(1),
                quantity: -1,
            },
            CartAction::RemoveFromCart(ProductId::new(5)),
            CartAction::AddToCart(product(&catalog, 1)),
            CartAction::AddToCart(product(&catalog, 6)),
            CartAction::UpdateQuantity {
                product_id: ProductId::new(6),
                quantity: 0,
            },
            CartAction::AddToCart(product(&catalog, 2)),
        ];

        let mut cart = CartState::new();
        for action in actions {
            cart = cart.reduce(action);
            assert_invariants(&cart);
        }

        let summary: Vec<_> = cart
            .lines()
            .iter()
            .map(|line| (line.product_id().as_i32(), line.quantity()))
            .collect();
        assert_eq!(summary, vec![(2, 5), (1, 1)]);
    }

    fn action(catalog: &Catalog, kind: u8, id: i32, quantity: i64) -> CartAction {
        let product_id = ProductId::new(id);
        match kind {
            0 => CartAction::AddToCart(product(catalog, id)),
            1 => CartAction::RemoveFromCart(product_id),
            2 => CartAction::UpdateQuantity {
                product_id,
                quantity,
            },
            _ => CartAction::ToggleWishlist(product_id),
        }
    }

    fn action_specs() -> impl Strategy<Value = Vec<(u8, i32, i64)>> {
        proptest::collection::vec((0u8..4, 1i32..=6, -3i64..=10), 0..40)
    }

    fn replay(catalog: &Catalog, specs: &[(u8, i32, i64)]) -> CartState {
        specs.iter().fold(CartState::new(), |cart, &(kind, id, quantity)| {
            cart.reduce(action(catalog, kind, id, quantity))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_invariants_hold_after_every_action(specs in action_specs()) {
            let catalog = Catalog::embedded().unwrap();
            let mut cart = CartState::new();
            for (kind, id, quantity) in specs {
                cart = cart.reduce(action(&catalog, kind, id, quantity));
                assert_invariants(&cart);
            }
        }

        #[test]
        fn prop_update_to_zero_matches_remove(specs in action_specs(), id in 1i32..=6) {
            let catalog = Catalog::embedded().unwrap();
            let cart = replay(&catalog, &specs);
            prop_assert_eq!(
                cart.update_quantity(ProductId::new(id), 0),
                cart.remove_from_cart(ProductId::new(id))
            );
        }

        #[test]
        fn prop_add_then_remove_of_absent_product_restores_cart(
            specs in action_specs(),
            id in 1i32..=6,
        ) {
            let catalog = Catalog::embedded().unwrap();
            let cart = replay(&catalog, &specs).remove_from_cart(ProductId::new(id));
            let round_trip = cart
                .add_to_cart(product(&catalog, id))
                .remove_from_cart(ProductId::new(id));
            prop_assert_eq!(round_trip, cart);
        }
    }
}
