//! Order placement primitives.
//!
//! Everything needed to turn a delivery form and a cart into an order,
//! without touching the network: field validation, the client-side order
//! number, totals, and the pending-order snapshot handed to the confirmation
//! page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::types::{BackendOrderId, ItemId, OrderId, OrderStatus, Price};

/// Flat delivery fee added to every order.
pub const DELIVERY_FEE: Price = Price::from_units(50);

/// Prefix of every client-derived order number.
pub const ORDER_ID_PREFIX: &str = "ORD";

/// Phone suffix used when the phone number has fewer than 4 characters.
const SHORT_PHONE_SUFFIX: &str = "0000";

/// Errors from validating a [`DeliveryInfo`] form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields are blank.
    #[error("Please fill in all delivery information fields ({})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Delivery details entered on the order form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl DeliveryInfo {
    /// Check that every field is non-blank after trimming.
    ///
    /// Email and phone are only checked for presence.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] naming each blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("address", &self.address),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// Copy with every field trimmed.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
        }
    }
}

impl OrderId {
    /// Derive a client-side order number.
    ///
    /// The format is `ORD` + `timestamp_ms` + last 4 characters of the phone
    /// (or `0000` when the phone is shorter) + `random` as 3 zero-padded
    /// digits. Values of `random` above 999 wrap.
    #[must_use]
    pub fn derive(timestamp_ms: i64, phone: &str, random: u16) -> Self {
        let suffix = phone_last4(phone.trim()).unwrap_or(SHORT_PHONE_SUFFIX);
        Self::new(format!(
            "{ORDER_ID_PREFIX}{timestamp_ms}{suffix}{:03}",
            random % 1000
        ))
    }
}

/// Last 4 characters of `phone`, or `None` if it is shorter than that.
fn phone_last4(phone: &str) -> Option<&str> {
    let (start, _) = phone.char_indices().rev().nth(3)?;
    phone.get(start..)
}

/// Display-only item number: `ITEM` + the trailing 4 characters of the ID.
#[must_use]
pub fn item_number(id: &ItemId) -> String {
    let s = id.as_str();
    let start = s.char_indices().rev().nth(3).map_or(0, |(i, _)| i);
    format!("ITEM{}", s.get(start..).unwrap_or(s))
}

/// Subtotal, delivery fee and total for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
}

impl OrderTotals {
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        Self {
            subtotal,
            delivery_fee: DELIVERY_FEE,
            total: subtotal + DELIVERY_FEE,
        }
    }
}

/// A cart line as recorded in the pending-order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrderLine {
    #[serde(flatten)]
    pub line: CartLine,
    pub order_id: OrderId,
    pub item_number: String,
}

/// Local copy of a just-placed order.
///
/// Written to durable storage right after the backend accepts the order so
/// the confirmation page can find the order number; the backend record
/// supersedes it once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub order_id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_order_id: Option<BackendOrderId>,
    pub items: Vec<PendingOrderLine>,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
    #[serde(alias = "userData")]
    pub customer: DeliveryInfo,
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl PendingOrder {
    /// Build the snapshot for `cart` as submitted under `order_id`.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        backend_order_id: Option<BackendOrderId>,
        cart: &Cart,
        customer: DeliveryInfo,
        order_date: DateTime<Utc>,
    ) -> Self {
        let totals = OrderTotals::for_cart(cart);
        let items = cart
            .lines()
            .iter()
            .map(|line| PendingOrderLine {
                line: line.clone(),
                order_id: order_id.clone(),
                item_number: item_number(line.id()),
            })
            .collect();

        Self {
            order_id,
            backend_order_id,
            items,
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            total: totals.total,
            customer,
            order_date,
            status: OrderStatus::Pending,
        }
    }

    /// Sum of quantities across the snapshot's lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.line.quantity))
    }
}
