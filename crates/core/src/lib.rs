//! Bistro Core - Shared types and cart/order logic.
//!
//! This crate provides the domain model used across all Bistro components:
//! - `storefront` - Customer-facing ordering site and minimal admin panel
//! - `cli` - Command-line tools for menu seeding and order management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Everything that touches the network or the visitor's
//! session lives in the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, statuses and menu items
//! - [`cart`] - Cart lines and the reducers that mutate them
//! - [`order`] - Delivery form validation, order ID derivation, totals and the
//!   pending-order snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod types;

pub use cart::{Cart, CartLine};
pub use order::{
    DELIVERY_FEE, DeliveryInfo, ORDER_ID_PREFIX, OrderTotals, PendingOrder, PendingOrderLine,
    ValidationError, item_number,
};
pub use types::*;
