//! Farmstand Core - catalog, cart and checkout for the farm marketplace.
//!
//! This crate holds the storefront's domain logic:
//! - [`catalog`] - the static farm and product catalog
//! - [`cart`] - the cart reducer and wishlist
//! - [`checkout`] - the forward-only checkout wizard
//! - [`types`] - newtype IDs, prices and ratings
//!
//! # Architecture
//!
//! The core crate does no I/O: no HTTP, no timers, no storage. The
//! storefront owns scheduling (the confirmation auto-close) and per-shopper
//! state, and calls into these types.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod types;

pub use cart::{CartAction, CartLine, CartState};
pub use catalog::{Catalog, CatalogError, Farm, Product, ProductFilter};
pub use checkout::{CheckoutError, CheckoutSession, CheckoutStep};
pub use types::*;
