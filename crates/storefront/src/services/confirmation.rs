//! Order confirmation.
//!
//! Finds which order the visitor just placed and loads the backend's record
//! of it for display.

use bistro_core::{DeliveryInfo, OrderId, OrderStatus, PendingOrder, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::backend::{ApiError, BackendClient, BackendOrder};
use crate::storage::{DurableStorage, keys};

/// Errors from loading a confirmation.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// No order number in the URL and no stored snapshot.
    #[error("No order data found")]
    NoOrderData,

    /// The backend lookup failed or returned `success: false`.
    #[error("Unable to load order details: {0}")]
    Unavailable(#[source] ApiError),
}

/// One line of a confirmed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationLine {
    pub name: String,
    pub quantity: u32,
    pub price: Price,
    pub line_total: Price,
}

/// Display model for the confirmation page.
#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub customer: DeliveryInfo,
    pub items: Vec<ConfirmationLine>,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
}

impl OrderConfirmation {
    /// Map a backend record, falling back to `requested` for the order number.
    #[must_use]
    pub fn from_backend(order: BackendOrder, requested: &OrderId) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| ConfirmationLine {
                name: item.item_name.clone(),
                quantity: item.quantity,
                price: to_price(item.price),
                line_total: to_price(item.line_total()),
            })
            .collect();

        Self {
            order_id: order.order_id.clone().unwrap_or_else(|| requested.clone()),
            order_date: order.created_at,
            status: order.status.unwrap_or_default(),
            customer: order.customer(),
            items,
            subtotal: to_price(order.subtotal),
            delivery_fee: to_price(order.delivery_fee),
            total: to_price(order.total),
        }
    }
}

fn to_price(amount: Decimal) -> Price {
    Price::new(amount).unwrap_or(Price::ZERO)
}

/// Shapes `pendingOrder` may take: one snapshot or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredOrders {
    Many(Vec<PendingOrder>),
    One(Box<PendingOrder>),
}

/// Read every stored order snapshot, oldest first.
///
/// Missing or unreadable data yields an empty list.
pub async fn stored_orders<S: DurableStorage>(storage: &S) -> Vec<PendingOrder> {
    let raw = match storage.get_item(keys::PENDING_ORDER).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read pending order");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(StoredOrders::Many(orders)) => orders,
        Ok(StoredOrders::One(order)) => vec![*order],
        Err(e) => {
            warn!(error = %e, "Discarding unreadable pending order");
            Vec::new()
        }
    }
}

/// Read the most recent stored snapshot, if present and readable.
pub async fn stored_snapshot<S: DurableStorage>(storage: &S) -> Option<PendingOrder> {
    stored_orders(storage).await.pop()
}

/// Pick the order number: navigation state first, then the stored snapshot.
pub async fn resolve_order_id<S: DurableStorage>(
    navigation: Option<&str>,
    storage: &S,
) -> Option<OrderId> {
    if let Some(id) = navigation.map(str::trim).filter(|id| !id.is_empty()) {
        return Some(OrderId::new(id));
    }
    stored_snapshot(storage).await.map(|s| s.order_id)
}

/// Load the confirmation for the visitor's most recent order.
///
/// # Errors
///
/// - [`ConfirmationError::NoOrderData`] if no order number can be found (no
///   backend call is made)
/// - [`ConfirmationError::Unavailable`] if the backend lookup fails
#[instrument(skip(storage, backend))]
pub async fn load_confirmation<S: DurableStorage>(
    navigation: Option<&str>,
    storage: &S,
    backend: &BackendClient,
) -> Result<OrderConfirmation, ConfirmationError> {
    let order_id = resolve_order_id(navigation, storage)
        .await
        .ok_or(ConfirmationError::NoOrderData)?;

    let order = backend.get_order(order_id.as_str()).await.map_err(|e| {
        warn!(order_id = %order_id, error = %e, "Order lookup failed");
        ConfirmationError::Unavailable(e)
    })?;

    Ok(OrderConfirmation::from_backend(order, &order_id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use bistro_core::{Cart, ItemId, MenuItem};

    use super::*;
    use crate::storage::MemoryStorage;

    async fn storage_with_snapshot(order_id: &str) -> MemoryStorage {
        let mut cart = Cart::new();
        cart.add(&MenuItem {
            id: ItemId::new("a"),
            name: "Thali".to_string(),
            price: Price::from_units(100),
            description: String::new(),
            category: String::new(),
            image_url: String::new(),
        });
        let snapshot =
            PendingOrder::new(OrderId::new(order_id), None, &cart, DeliveryInfo::default(), Utc::now());
        let storage = MemoryStorage::new();
        storage
            .set_item(keys::PENDING_ORDER, serde_json::to_string(&snapshot).unwrap())
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_navigation_state_wins() {
        let storage = storage_with_snapshot("ORD-STORED").await;
        let id = resolve_order_id(Some("ORD-NAV"), &storage).await.unwrap();
        assert_eq!(id.as_str(), "ORD-NAV");
    }

    #[tokio::test]
    async fn test_falls_back_to_snapshot() {
        let storage = storage_with_snapshot("ORD-STORED").await;
        assert_eq!(
            resolve_order_id(None, &storage).await.unwrap().as_str(),
            "ORD-STORED"
        );
        assert_eq!(
            resolve_order_id(Some("  "), &storage).await.unwrap().as_str(),
            "ORD-STORED"
        );
    }

    #[tokio::test]
    async fn test_nothing_to_resolve() {
        let storage = MemoryStorage::new();
        assert!(resolve_order_id(None, &storage).await.is_none());

        storage
            .set_item(keys::PENDING_ORDER, "garbage".to_string())
            .await
            .unwrap();
        assert!(resolve_order_id(None, &storage).await.is_none());
    }

    #[tokio::test]
    async fn test_stored_orders_accepts_list() {
        let single = storage_with_snapshot("ORD1").await;
        let one = single.get_item(keys::PENDING_ORDER).await.unwrap().unwrap();
        assert_eq!(stored_orders(&single).await.len(), 1);

        let second = storage_with_snapshot("ORD2").await;
        let two = second.get_item(keys::PENDING_ORDER).await.unwrap().unwrap();
        let storage = MemoryStorage::new();
        storage
            .set_item(keys::PENDING_ORDER, format!("[{one},{two}]"))
            .await
            .unwrap();

        let orders = stored_orders(&storage).await;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id.as_str(), "ORD1");
        assert_eq!(
            stored_snapshot(&storage).await.unwrap().order_id.as_str(),
            "ORD2"
        );
        assert!(stored_orders(&MemoryStorage::new()).await.is_empty());
    }

    #[test]
    fn test_from_backend_maps_record() {
        let order: BackendOrder = serde_json::from_value(serde_json::json!({
            "orderId": "ORD1",
            "firstName": "Asha",
            "lastName": "Rao",
            "address": "12 MG Road",
            "items": [
                { "itemName": "Thali", "price": 100, "quantity": 2 },
                { "itemName": "Lassi", "price": 45.5, "quantity": 1 }
            ],
            "subtotal": 245.5, "deliveryFee": 50, "total": 295.5,
            "createdAt": "2026-03-01T12:30:00Z"
        }))
        .unwrap();

        let view = OrderConfirmation::from_backend(order, &OrderId::new("ignored"));
        assert_eq!(view.order_id.as_str(), "ORD1");
        assert_eq!(view.customer.first_name, "Asha");
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].line_total, Price::from_units(200));
        assert_eq!(view.items[1].price, Price::parse("45.5").unwrap());
        assert_eq!(view.total, Price::parse("295.5").unwrap());
        assert_eq!(view.status, OrderStatus::Pending);
        assert!(view.order_date.is_some());
    }

    #[test]
    fn test_from_backend_uses_requested_id_when_missing() {
        let order: BackendOrder = serde_json::from_value(serde_json::json!({})).unwrap();
        let view = OrderConfirmation::from_backend(order, &OrderId::new("ORD9"));
        assert_eq!(view.order_id.as_str(), "ORD9");
        assert!(view.items.is_empty());
    }
}
