//! Forward-only checkout wizard.
//!
//! ```text
//! Cart --proceed_to_shipping--> Shipping --submit_shipping--> Payment
//!      --submit_payment--> Confirmation
//! ```
//!
//! A session only ever moves forward. A submission for the wrong step, or
//! one that fails its guard, returns an error and leaves the session as it
//! was. Closing the wizard means dropping the session; a fresh one starts
//! again at [`CheckoutStep::Cart`].

use core::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cart::CartState;
use crate::types::Price;

/// Flat shipping charge added to every order, in cents.
pub const SHIPPING_SURCHARGE_CENTS: i64 = 500;

/// How long the confirmation screen stays up before the cart is cleared and
/// the wizard closes.
pub const CONFIRMATION_CLOSE_DELAY: Duration = Duration::from_secs(3);

/// Errors returned when a checkout submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("checkout is at the {actual} step, not {expected}")]
    WrongStep {
        expected: CheckoutStep,
        actual: CheckoutStep,
    },

    #[error("cart is empty")]
    EmptyCart,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("email address is not valid")]
    InvalidEmail,
}

/// The step the wizard is showing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Cart,
    Shipping,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    /// Heading shown above the step.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Cart => "Shopping Cart",
            Self::Shipping => "Shipping Information",
            Self::Payment => "Payment Details",
            Self::Confirmation => "Order Confirmed",
        }
    }

    /// The step after this one; `None` for confirmation.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Cart => Some(Self::Shipping),
            Self::Shipping => Some(Self::Payment),
            Self::Payment => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipping form fields. All free text; every one is required.
///
/// Absent fields deserialize as empty so [`ShippingInfo::validate`] reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
}

impl ShippingInfo {
    fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("ZIP code", &self.zip_code),
            ("phone", &self.phone),
        ]
    }

    /// Check that every field is filled in and the email has the
    /// `local@domain` shape.
    ///
    /// # Errors
    ///
    /// Returns the first blank field, or [`CheckoutError::InvalidEmail`].
    pub fn validate(&self) -> Result<(), CheckoutError> {
        require_filled(&self.fields())?;
        match self.email.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(CheckoutError::InvalidEmail),
        }
    }

    /// "First Last" for the confirmation screen.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Card details from the payment form.
///
/// Never stored: the session only checks that the fields are present.
/// `Debug` is implemented manually so card data never reaches the logs.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_number", &"[REDACTED]")
            .field("expiry", &"[REDACTED]")
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

impl PaymentDetails {
    /// Check that every field is filled in. No card validation is done.
    ///
    /// # Errors
    ///
    /// Returns the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        require_filled(&[
            ("card number", &self.card_number),
            ("expiry date", &self.expiry),
            ("CVC", &self.cvc),
        ])
    }
}

fn require_filled(fields: &[(&'static str, &str)]) -> Result<(), CheckoutError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(CheckoutError::MissingField(*name)),
        None => Ok(()),
    }
}

/// Amounts shown on the payment step and charged at confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderSummary {
    /// Subtotal of the cart plus the flat shipping charge.
    #[must_use]
    pub fn for_cart(cart: &CartState) -> Self {
        let subtotal = cart.subtotal();
        let shipping = Price::new(shipping_surcharge(), subtotal.currency_code);
        Self {
            subtotal,
            shipping,
            total: subtotal.plus(shipping.amount),
        }
    }
}

/// Record of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub order_reference: Uuid,
    pub confirmed_at: DateTime<Utc>,
    pub item_count: u64,
    pub summary: OrderSummary,
}

/// One open run of the checkout wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSession {
    step: CheckoutStep,
    shipping: Option<ShippingInfo>,
    confirmation: Option<Confirmation>,
}

impl CheckoutSession {
    /// Open a new session at the cart step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Shipping details, once submitted.
    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingInfo> {
        self.shipping.as_ref()
    }

    /// The confirmation, once payment has been submitted.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self.step, CheckoutStep::Confirmation)
    }

    /// Move from the cart review to the shipping form.
    ///
    /// # Errors
    ///
    /// Fails if the session is not at the cart step or the cart is empty.
    pub fn proceed_to_shipping(&mut self, cart: &CartState) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Cart)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.step = CheckoutStep::Shipping;
        Ok(())
    }

    /// Accept the shipping form and move to payment.
    ///
    /// # Errors
    ///
    /// Fails if the session is not at the shipping step or a field is blank.
    pub fn submit_shipping(&mut self, info: ShippingInfo) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Shipping)?;
        info.validate()?;
        self.shipping = Some(info);
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Accept the payment form and confirm the order.
    ///
    /// The payment details are checked for presence and then dropped.
    ///
    /// # Errors
    ///
    /// Fails if the session is not at the payment step, the cart has been
    /// emptied in the meantime, or a field is blank.
    pub fn submit_payment(
        &mut self,
        cart: &CartState,
        payment: &PaymentDetails,
    ) -> Result<&Confirmation, CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        payment.validate()?;

        self.step = CheckoutStep::Confirmation;
        Ok(self.confirmation.insert(Confirmation {
            order_reference: Uuid::new_v4(),
            confirmed_at: Utc::now(),
            item_count: cart.item_count(),
            summary: OrderSummary::for_cart(cart),
        }))
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}

/// The flat shipping charge as a decimal amount.
#[must_use]
pub fn shipping_surcharge() -> Decimal {
    Decimal::new(SHIPPING_SURCHARGE_CENTS, 2)
}
