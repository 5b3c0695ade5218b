//! Wire types for the restaurant backend API.
//!
//! The backend is a document store fronted by a JSON API; field names follow
//! its conventions (`_id`, `itemname`, camelCase order fields) and are mapped
//! onto the domain types from `bistro-core` here.

use bistro_core::{
    BackendOrderId, CartLine, DeliveryInfo, ItemId, MenuItem, OrderId, OrderStatus, OrderTotals,
    Price,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A menu item as returned by `GET /items`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "itemname", default)]
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
}

impl From<BackendItem> for MenuItem {
    fn from(item: BackendItem) -> Self {
        Self {
            id: ItemId::new(item.id),
            name: item.name,
            // Negative prices are a data error upstream; clamp instead of dropping the item.
            price: Price::new(item.price).unwrap_or(Price::ZERO),
            description: item.description,
            category: item.category,
            image_url: item.image,
        }
    }
}

/// Body of `PUT /update-item/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemUpdateRequest {
    #[serde(rename = "itemname")]
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
}

/// Image attached to `POST /add-item`.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields of `POST /add-item` (sent as multipart form data).
#[derive(Debug, Clone)]
pub struct NewItemRequest {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub image: ImageUpload,
}

// =============================================================================
// Authentication
// =============================================================================

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /signup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Body of `POST /admin-login`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of the login endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// One line of `POST /order`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub item_id: ItemId,
    pub item_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

impl From<&CartLine> for OrderItemRequest {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item.id.clone(),
            item_name: line.item.name.clone(),
            price: line.item.price.amount(),
            quantity: line.quantity,
        }
    }
}

/// Body of `POST /order`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub order_id: OrderId,
    pub items: Vec<OrderItemRequest>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl OrderRequest {
    /// Assemble the request body for `lines` under `order_id`.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        customer: &DeliveryInfo,
        lines: &[CartLine],
        totals: OrderTotals,
    ) -> Self {
        Self {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            order_id,
            items: lines.iter().map(OrderItemRequest::from).collect(),
            subtotal: totals.subtotal.amount(),
            delivery_fee: totals.delivery_fee.amount(),
            total: totals.total.amount(),
        }
    }
}

/// `{ success, order, message }` envelope used by the order endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub order: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Minimal order reference returned by `POST /order`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedOrder {
    #[serde(rename = "_id", default)]
    pub id: Option<BackendOrderId>,
}

/// A line of a stored order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendOrderItem {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
}

impl BackendOrderItem {
    /// Saturates at `Decimal::MAX` for amounts too large to represent.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

/// An order record as stored by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendOrder {
    #[serde(rename = "_id", default)]
    pub id: Option<BackendOrderId>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub items: Vec<BackendOrderItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub total: Decimal,
    /// `None` when absent or not a status this client knows.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl BackendOrder {
    /// Contact and address details of the customer.
    #[must_use]
    pub fn customer(&self) -> DeliveryInfo {
        DeliveryInfo {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }

    /// Sum of quantities across the order's lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }
}

/// Read a status case-insensitively; unknown or non-string values become `None`
/// so one odd record does not fail a whole order list.
fn lenient_status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<OrderStatus>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

/// Body of `PATCH /orders/{orderId}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

// =============================================================================
// Forms
// =============================================================================

/// Body of `POST /reservations`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub guests: String,
    pub special_requests: String,
}

/// Body of `POST /contact`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Error payload shape shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorPayload {
    /// Human-readable message, preferring `message` over `error`.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_item_maps_to_menu_item() {
        let raw = serde_json::json!({
            "_id": "665f1c2ab7e4",
            "itemname": "Masala Dosa",
            "price": 120,
            "description": "Crispy",
            "category": "South Indian",
            "image": "https://cdn.example/dosa.jpg",
            "__v": 0
        });
        let item: MenuItem = serde_json::from_value::<BackendItem>(raw).unwrap().into();
        assert_eq!(item.id.as_str(), "665f1c2ab7e4");
        assert_eq!(item.name, "Masala Dosa");
        assert_eq!(item.price, Price::from_units(120));
        assert_eq!(item.image_url, "https://cdn.example/dosa.jpg");
    }

    #[test]
    fn test_backend_item_accepts_string_price() {
        let raw = serde_json::json!({ "_id": "x", "itemname": "Chai", "price": "25.50" });
        let item: MenuItem = serde_json::from_value::<BackendItem>(raw).unwrap().into();
        assert_eq!(item.price, Price::parse("25.50").unwrap());
        assert!(item.category.is_empty());
    }

    #[test]
    fn test_order_status_is_read_leniently() {
        let status = |value: serde_json::Value| {
            serde_json::from_value::<BackendOrder>(
                serde_json::json!({ "orderId": "ORD1", "status": value }),
            )
            .unwrap()
            .status
        };
        assert_eq!(status("Pending".into()), Some(OrderStatus::Pending));
        assert_eq!(status("on-the-way".into()), Some(OrderStatus::OnTheWay));
        assert_eq!(status("cancelled".into()), None);
        assert_eq!(status(serde_json::Value::Null), None);
        assert_eq!(status(3.into()), None);

        let missing: BackendOrder =
            serde_json::from_value(serde_json::json!({ "orderId": "ORD1" })).unwrap();
        assert_eq!(missing.status, None);
    }

    #[test]
    fn test_order_list_survives_unknown_status() {
        let orders: Vec<BackendOrder> = serde_json::from_value(serde_json::json!([
            { "_id": "r1", "status": "confirmed" },
            { "_id": "r2", "status": "Delivered" }
        ]))
        .unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].status.unwrap_or_default(), OrderStatus::Pending);
        assert_eq!(orders[1].status, Some(OrderStatus::Delivered));
    }

    #[test]
    fn test_login_request_uses_pascal_case() {
        let body = serde_json::to_value(LoginRequest {
            email: "a@b.c".to_owned(),
            password: "secret1".to_owned(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "Email": "a@b.c", "Password": "secret1" }));
    }

    #[test]
    fn test_order_request_shape() {
        let item = MenuItem {
            id: ItemId::new("a"),
            name: "Thali".to_owned(),
            price: Price::from_units(100),
            description: String::new(),
            category: String::new(),
            image_url: String::new(),
        };
        let mut cart = bistro_core::Cart::new();
        cart.add(&item);
        cart.add(&item);

        let customer = DeliveryInfo {
            first_name: "Asha".to_owned(),
            last_name: "Rao".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: "9876543210".to_owned(),
            address: "12 MG Road".to_owned(),
        };
        let body = serde_json::to_value(OrderRequest::new(
            OrderId::new("ORD1"),
            &customer,
            cart.lines(),
            OrderTotals::for_cart(&cart),
        ))
        .unwrap();

        assert_eq!(body["firstName"], "Asha");
        assert_eq!(body["orderId"], "ORD1");
        assert_eq!(body["items"][0]["itemId"], "a");
        assert_eq!(body["items"][0]["itemName"], "Thali");
        assert_eq!(body["items"][0]["quantity"], 2);
        assert_eq!(body["subtotal"], 200.0);
        assert_eq!(body["deliveryFee"], 50.0);
        assert_eq!(body["total"], 250.0);
    }

    #[test]
    fn test_backend_order_parses_status_and_date() {
        let raw = serde_json::json!({
            "_id": "mongo-1",
            "orderId": "ORD1",
            "firstName": "Asha",
            "items": [{ "itemId": "a", "itemName": "Thali", "price": 100, "quantity": 2 }],
            "subtotal": 200, "deliveryFee": 50, "total": 250,
            "status": "on-the-way",
            "createdAt": "2026-03-01T12:30:00.000Z"
        });
        let order: BackendOrder = serde_json::from_value(raw).unwrap();
        assert_eq!(order.status, Some(OrderStatus::OnTheWay));
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.items[0].line_total(), Decimal::from(200));
        assert!(order.created_at.is_some());
        assert_eq!(order.customer().first_name, "Asha");
    }

    #[test]
    fn test_line_total_saturates() {
        let line = BackendOrderItem {
            item_id: None,
            item_name: "Thali".to_owned(),
            price: Decimal::MAX,
            quantity: 3,
        };
        assert_eq!(line.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_error_payload_prefers_message() {
        let both = ErrorPayload {
            message: Some("Out of stock".to_owned()),
            error: Some("other".to_owned()),
        };
        assert_eq!(both.into_message().as_deref(), Some("Out of stock"));

        let error_only = ErrorPayload {
            message: None,
            error: Some("Table unavailable".to_owned()),
        };
        assert_eq!(error_only.into_message().as_deref(), Some("Table unavailable"));

        assert_eq!(ErrorPayload::default().into_message(), None);
    }
}
