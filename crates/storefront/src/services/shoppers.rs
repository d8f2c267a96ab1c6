//! Per-shopper cart and checkout state.
//!
//! Every browser session is mapped to a [`ShopperId`]; the shopper's cart and
//! open checkout live in memory behind their own mutex. Nothing is persisted:
//! a restart empties every cart.
//!
//! Confirming a checkout schedules the clear-and-close. The scheduled task is
//! owned by the open checkout, so closing or reopening the checkout cancels
//! it. The task also checks the checkout generation before acting so a stale
//! close can never touch a newer checkout.

use std::sync::{Arc, Weak};
use std::time::Duration;

use farmstand_core::cart::{CartAction, CartState};
use farmstand_core::checkout::{
    CheckoutError, CheckoutSession, Confirmation, PaymentDetails, ShippingInfo,
};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::scheduled::ScheduledTask;

/// Maximum number of shoppers kept in memory at once.
const MAX_SHOPPERS: u64 = 10_000;

/// Identifies one browser session's shopping state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopperId(Uuid);

impl ShopperId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ShopperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors from checkout operations on a shopper.
#[derive(Debug, Error)]
pub enum ShopperError {
    /// No checkout is open for this shopper.
    #[error("checkout is not open")]
    CheckoutNotOpen,

    /// The checkout rejected the submission.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// A shopper's state, shared between requests and the auto-close task.
pub type SharedShopper = Arc<Mutex<Shopper>>;

/// The open checkout and the task that will close it.
#[derive(Debug)]
struct ActiveCheckout {
    generation: u64,
    session: CheckoutSession,
    auto_close: Option<ScheduledTask>,
}

/// One shopper's cart and, while checking out, the wizard session.
#[derive(Debug, Default)]
pub struct Shopper {
    cart: CartState,
    checkout: Option<ActiveCheckout>,
    generations: u64,
}

impl Shopper {
    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Apply a cart action.
    pub fn dispatch(&mut self, action: CartAction) {
        self.cart = self.cart.reduce(action);
    }

    /// The open checkout session, if any.
    #[must_use]
    pub fn checkout(&self) -> Option<&CheckoutSession> {
        self.checkout.as_ref().map(|active| &active.session)
    }

    /// Generation number of the open checkout.
    #[must_use]
    pub fn checkout_generation(&self) -> Option<u64> {
        self.checkout.as_ref().map(|active| active.generation)
    }

    /// Whether a confirmation close is waiting to run.
    #[must_use]
    pub fn has_pending_close(&self) -> bool {
        self.checkout
            .as_ref()
            .and_then(|active| active.auto_close.as_ref())
            .is_some_and(|task| !task.is_finished())
    }

    /// Return the open checkout, starting a new one at the cart step if none
    /// is open.
    pub fn open_checkout(&mut self) -> &CheckoutSession {
        if self.checkout.is_none() {
            self.generations += 1;
            debug!(generation = self.generations, "Opening checkout");
        }
        let generation = self.generations;
        &self
            .checkout
            .get_or_insert_with(|| ActiveCheckout {
                generation,
                session: CheckoutSession::new(),
                auto_close: None,
            })
            .session
    }

    /// Discard the open checkout, cancelling any pending auto-close.
    ///
    /// Returns whether a checkout was open.
    pub fn close_checkout(&mut self) -> bool {
        match self.checkout.take() {
            Some(active) => {
                if let Some(task) = active.auto_close {
                    task.cancel();
                }
                debug!(generation = active.generation, "Checkout closed");
                true
            }
            None => false,
        }
    }

    /// Cart review to shipping form.
    ///
    /// # Errors
    ///
    /// Fails if no checkout is open or the wizard rejects the step.
    pub fn proceed_to_shipping(&mut self) -> Result<(), ShopperError> {
        let active = self
            .checkout
            .as_mut()
            .ok_or(ShopperError::CheckoutNotOpen)?;
        active.session.proceed_to_shipping(&self.cart)?;
        Ok(())
    }

    /// Shipping form to payment.
    ///
    /// # Errors
    ///
    /// Fails if no checkout is open or the wizard rejects the form.
    pub fn submit_shipping(&mut self, info: ShippingInfo) -> Result<(), ShopperError> {
        let active = self
            .checkout
            .as_mut()
            .ok_or(ShopperError::CheckoutNotOpen)?;
        active.session.submit_shipping(info)?;
        Ok(())
    }

    /// Payment to confirmation. Returns the confirmation and the generation
    /// of the checkout it belongs to.
    fn submit_payment(
        &mut self,
        payment: &PaymentDetails,
    ) -> Result<(Confirmation, u64), ShopperError> {
        let active = self
            .checkout
            .as_mut()
            .ok_or(ShopperError::CheckoutNotOpen)?;
        let confirmation = active.session.submit_payment(&self.cart, payment)?.clone();
        Ok((confirmation, active.generation))
    }

    fn arm_auto_close(&mut self, generation: u64, task: ScheduledTask) {
        match self.checkout.as_mut() {
            Some(active) if active.generation == generation => {
                active.auto_close = Some(task);
            }
            _ => task.cancel(),
        }
    }

    /// Clear the cart and close the checkout, if `generation` is still the
    /// open one. Called by the auto-close task.
    fn finish_checkout(&mut self, generation: u64) -> bool {
        if self.checkout_generation() != Some(generation) {
            return false;
        }
        if let Some(task) = self.checkout.take().and_then(|active| active.auto_close) {
            // This is the running task's own handle.
            task.detach();
        }
        self.dispatch(CartAction::ClearCart);
        true
    }
}

/// In-memory map from shopper id to shopper state.
#[derive(Clone)]
pub struct ShopperStore {
    shoppers: Cache<ShopperId, SharedShopper>,
    close_delay: Duration,
}

impl ShopperStore {
    /// Create a store that evicts shoppers idle for longer than `idle`.
    #[must_use]
    pub fn new(idle: Duration, close_delay: Duration) -> Self {
        let shoppers = Cache::builder()
            .max_capacity(MAX_SHOPPERS)
            .time_to_idle(idle)
            .build();
        Self {
            shoppers,
            close_delay,
        }
    }

    /// Get a shopper's state, creating an empty one on first use.
    pub async fn get(&self, id: ShopperId) -> SharedShopper {
        self.shoppers
            .get_with(id, async { Arc::new(Mutex::new(Shopper::default())) })
            .await
    }

    /// Submit payment and schedule the clear-and-close.
    ///
    /// # Errors
    ///
    /// Fails if no checkout is open or the wizard rejects the payment.
    #[instrument(skip(self, shopper, payment))]
    pub async fn confirm(
        &self,
        shopper: &SharedShopper,
        payment: &PaymentDetails,
    ) -> Result<Confirmation, ShopperError> {
        let mut guard = shopper.lock().await;
        let (confirmation, generation) = guard.submit_payment(payment)?;

        let task = schedule_close(Arc::downgrade(shopper), generation, self.close_delay);
        guard.arm_auto_close(generation, task);

        info!(
            order_reference = %confirmation.order_reference,
            total = %confirmation.summary.total,
            items = confirmation.item_count,
            generation,
            "Order confirmed"
        );
        Ok(confirmation)
    }
}

/// Spawn the delayed clear-and-close for one checkout generation.
fn schedule_close(shopper: Weak<Mutex<Shopper>>, generation: u64, delay: Duration) -> ScheduledTask {
    ScheduledTask::after(delay, async move {
        let Some(shopper) = shopper.upgrade() else {
            return;
        };
        let mut shopper = shopper.lock().await;
        if shopper.finish_checkout(generation) {
            info!(generation, "Checkout closed after confirmation");
        } else {
            debug!(generation, "Stale checkout close skipped");
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmstand_core::catalog::Catalog;
    use farmstand_core::checkout::CheckoutStep;
    use farmstand_core::types::ProductId;

    use super::*;

    const DELAY: Duration = Duration::from_millis(30);
    const SETTLE: Duration = Duration::from_millis(150);

    fn store() -> ShopperStore {
        ShopperStore::new(Duration::from_secs(60), DELAY)
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            address: "12 Orchard Lane".to_string(),
            city: "Burlington".to_string(),
            state: "VT".to_string(),
            zip_code: "05401".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    fn payment() -> PaymentDetails {
        PaymentDetails {
            card_number: "4242".to_string(),
            expiry: "12/30".to_string(),
            cvc: "123".to_string(),
        }
    }

    async fn confirmed_shopper(store: &ShopperStore) -> SharedShopper {
        let catalog = Catalog::embedded().unwrap();
        let shopper = store.get(ShopperId::generate()).await;
        {
            let mut guard = shopper.lock().await;
            guard.dispatch(CartAction::AddToCart(Arc::clone(
                catalog.product(ProductId::new(1)).unwrap(),
            )));
            guard.dispatch(CartAction::ToggleWishlist(ProductId::new(2)));
            guard.open_checkout();
            guard.proceed_to_shipping().unwrap();
            guard.submit_shipping(shipping()).unwrap();
        }
        store.confirm(&shopper, &payment()).await.unwrap();
        shopper
    }

    #[tokio::test]
    async fn test_same_id_returns_same_shopper() {
        let store = store();
        let id = ShopperId::generate();
        let a = store.get(id).await;
        let b = store.get(id).await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_checkout_requires_open_session() {
        let store = store();
        let shopper = store.get(ShopperId::generate()).await;
        let err = shopper.lock().await.proceed_to_shipping().unwrap_err();
        assert!(matches!(err, ShopperError::CheckoutNotOpen));
    }

    #[tokio::test]
    async fn test_reopen_resets_to_cart() {
        let catalog = Catalog::embedded().unwrap();
        let store = store();
        let shopper = store.get(ShopperId::generate()).await;
        let mut guard = shopper.lock().await;
        guard.dispatch(CartAction::AddToCart(Arc::clone(
            catalog.product(ProductId::new(3)).unwrap(),
        )));
        guard.open_checkout();
        guard.proceed_to_shipping().unwrap();
        assert_eq!(guard.checkout().unwrap().step(), CheckoutStep::Shipping);

        // Opening again while open keeps the current step.
        assert_eq!(guard.open_checkout().step(), CheckoutStep::Shipping);

        assert!(guard.close_checkout());
        assert_eq!(guard.open_checkout().step(), CheckoutStep::Cart);
        assert_eq!(guard.checkout_generation(), Some(2));
    }

    #[tokio::test]
    async fn test_confirmation_clears_cart_and_closes_after_delay() {
        let store = store();
        let shopper = confirmed_shopper(&store).await;
        {
            let guard = shopper.lock().await;
            assert_eq!(guard.checkout().unwrap().step(), CheckoutStep::Confirmation);
            assert!(guard.has_pending_close());
            assert!(!guard.cart().is_empty());
        }

        tokio::time::sleep(SETTLE).await;

        let guard = shopper.lock().await;
        assert!(guard.checkout().is_none());
        assert!(guard.cart().is_empty());
        assert!(guard.cart().is_wishlisted(ProductId::new(2)));
    }

    #[tokio::test]
    async fn test_closing_during_delay_cancels_clear() {
        let store = store();
        let shopper = confirmed_shopper(&store).await;
        {
            let mut guard = shopper.lock().await;
            assert!(guard.close_checkout());
            guard.open_checkout();
        }

        tokio::time::sleep(SETTLE).await;

        let guard = shopper.lock().await;
        assert!(!guard.cart().is_empty());
        assert_eq!(guard.checkout().unwrap().step(), CheckoutStep::Cart);
    }

    #[tokio::test]
    async fn test_stale_generation_is_ignored() {
        let store = store();
        let shopper = store.get(ShopperId::generate()).await;
        let mut guard = shopper.lock().await;
        guard.open_checkout();
        guard.close_checkout();
        guard.open_checkout();
        assert!(!guard.finish_checkout(1));
        assert!(guard.checkout().is_some());
    }
}
