//! Admin panel operations: order overview, status changes, menu editing.

use bistro_core::{ItemId, OrderStatus, Price};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{
    ApiError, BackendClient, BackendOrder, ImageUpload, ItemUpdateRequest, NewItemRequest,
};
use crate::catalog::CatalogCache;

/// Shown when a status change fails without a backend message.
pub const STATUS_UPDATE_FAILED: &str = "Failed to update order status";

/// Shown when the add-item form is incomplete.
pub const ITEM_FIELDS_REQUIRED: &str = "Please fill all fields and upload an image.";

/// Shown when an item update or delete fails without a backend message.
pub const ITEM_SAVE_FAILED: &str = "Failed to save menu item";

#[derive(Debug, Error)]
pub enum AdminError {
    /// A required field or the image is missing.
    #[error("{0}")]
    Incomplete(&'static str),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Admin request failed: {0}")]
    Backend(#[source] ApiError),
}

impl AdminError {
    /// Text to show on the page, with `fallback` for silent backend failures.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Backend(err) => err.user_message(fallback),
            other => other.to_string(),
        }
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub order_count: usize,
    pub total_items: u32,
    pub revenue: Price,
}

impl DashboardStats {
    #[must_use]
    pub fn from_orders(orders: &[BackendOrder]) -> Self {
        let revenue: Decimal = orders.iter().map(|o| o.total).sum();
        Self {
            order_count: orders.len(),
            total_items: orders
                .iter()
                .fold(0u32, |acc, o| acc.saturating_add(o.item_count())),
            revenue: Price::new(revenue).unwrap_or(Price::ZERO),
        }
    }
}

/// Identifier used in status-change URLs: the backend record ID when known,
/// else the client order number.
#[must_use]
pub fn order_ref(order: &BackendOrder) -> Option<String> {
    order
        .id
        .as_ref()
        .map(|id| id.as_str().to_string())
        .or_else(|| order.order_id.as_ref().map(|id| id.as_str().to_string()))
}

/// Add-item form as submitted.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image: Option<ImageUpload>,
}

impl ItemDraft {
    /// Validate and convert into a backend request.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Incomplete`] if any field or the image is missing,
    /// or [`AdminError::InvalidPrice`] if the price does not parse.
    pub fn into_request(self) -> Result<NewItemRequest, AdminError> {
        let image = self
            .image
            .filter(|img| !img.bytes.is_empty())
            .ok_or(AdminError::Incomplete(ITEM_FIELDS_REQUIRED))?;
        if [&self.name, &self.description, &self.price, &self.category]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(AdminError::Incomplete(ITEM_FIELDS_REQUIRED));
        }
        let price = parse_price(&self.price)?;

        Ok(NewItemRequest {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            category: self.category.trim().to_string(),
            image,
        })
    }
}

/// Edit-item form as submitted.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ItemEdit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category: String,
}

impl ItemEdit {
    /// # Errors
    ///
    /// Returns [`AdminError::Incomplete`] for blank fields or
    /// [`AdminError::InvalidPrice`] for an unparseable price.
    pub fn into_request(self) -> Result<ItemUpdateRequest, AdminError> {
        if [&self.name, &self.price, &self.category]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(AdminError::Incomplete("Name, price and category are required."));
        }
        let price = parse_price(&self.price)?;
        Ok(ItemUpdateRequest {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: price.amount(),
            category: self.category.trim().to_string(),
        })
    }
}

fn parse_price(raw: &str) -> Result<Price, AdminError> {
    Price::parse(raw.trim()).map_err(|e| AdminError::InvalidPrice(e.to_string()))
}

/// Change an order's status.
///
/// # Errors
///
/// Returns [`AdminError::Backend`] if the backend refuses the change.
#[instrument(skip(backend, token))]
pub async fn update_status(
    backend: &BackendClient,
    token: &SecretString,
    order_ref: &str,
    status: OrderStatus,
) -> Result<(), AdminError> {
    backend
        .update_order_status(token, order_ref, status)
        .await
        .map_err(AdminError::Backend)?;
    info!(order_ref, status = %status, "Order status updated");
    Ok(())
}

/// Create a menu item and drop the cached menu.
///
/// # Errors
///
/// Returns a validation or backend error.
#[instrument(skip_all, fields(name = %draft.name))]
pub async fn create_item(
    backend: &BackendClient,
    catalog: &CatalogCache,
    token: &SecretString,
    draft: ItemDraft,
) -> Result<(), AdminError> {
    let request = draft.into_request()?;
    backend
        .add_item(token, request)
        .await
        .map_err(AdminError::Backend)?;
    catalog.invalidate().await;
    info!("Menu item created");
    Ok(())
}

/// Update a menu item and drop the cached menu.
///
/// # Errors
///
/// Returns a validation or backend error.
#[instrument(skip(backend, catalog, token, edit))]
pub async fn update_item(
    backend: &BackendClient,
    catalog: &CatalogCache,
    token: &SecretString,
    id: &ItemId,
    edit: ItemEdit,
) -> Result<(), AdminError> {
    let request = edit.into_request()?;
    backend
        .update_item(token, id, &request)
        .await
        .map_err(AdminError::Backend)?;
    catalog.invalidate().await;
    info!(item_id = %id, "Menu item updated");
    Ok(())
}

/// Delete a menu item and drop the cached menu.
///
/// # Errors
///
/// Returns [`AdminError::Backend`] if the backend refuses.
#[instrument(skip(backend, catalog, token))]
pub async fn delete_item(
    backend: &BackendClient,
    catalog: &CatalogCache,
    token: &SecretString,
    id: &ItemId,
) -> Result<(), AdminError> {
    backend
        .delete_item(token, id)
        .await
        .map_err(AdminError::Backend)?;
    catalog.invalidate().await;
    info!(item_id = %id, "Menu item deleted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(total: u32, quantities: &[u32]) -> BackendOrder {
        let items: Vec<_> = quantities
            .iter()
            .map(|q| serde_json::json!({ "itemName": "x", "price": 1, "quantity": q }))
            .collect();
        serde_json::from_value(serde_json::json!({ "total": total, "items": items })).unwrap()
    }

    fn image() -> ImageUpload {
        ImageUpload {
            file_name: "dosa.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = DashboardStats::from_orders(&[order(250, &[2]), order(130, &[1, 3])]);
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.total_items, 6);
        assert_eq!(stats.revenue, Price::from_units(380));

        let empty = DashboardStats::from_orders(&[]);
        assert_eq!(empty.order_count, 0);
        assert_eq!(empty.revenue, Price::ZERO);
    }

    #[test]
    fn test_order_ref_prefers_backend_id() {
        let with_both: BackendOrder =
            serde_json::from_value(serde_json::json!({ "_id": "m1", "orderId": "ORD1" })).unwrap();
        assert_eq!(order_ref(&with_both).as_deref(), Some("m1"));

        let client_only: BackendOrder =
            serde_json::from_value(serde_json::json!({ "orderId": "ORD1" })).unwrap();
        assert_eq!(order_ref(&client_only).as_deref(), Some("ORD1"));
    }

    #[test]
    fn test_item_draft_requires_everything() {
        let complete = ItemDraft {
            name: "Dosa".to_string(),
            description: "Crispy".to_string(),
            price: "120".to_string(),
            category: "South Indian".to_string(),
            image: Some(image()),
        };
        let request = complete.clone().into_request().unwrap();
        assert_eq!(request.price, Price::from_units(120));

        let no_image = ItemDraft {
            image: None,
            ..complete.clone()
        };
        assert_eq!(
            no_image.into_request().unwrap_err().to_string(),
            ITEM_FIELDS_REQUIRED
        );

        let blank = ItemDraft {
            category: " ".to_string(),
            ..complete.clone()
        };
        assert!(matches!(blank.into_request(), Err(AdminError::Incomplete(_))));

        let bad_price = ItemDraft {
            price: "cheap".to_string(),
            ..complete
        };
        assert!(matches!(bad_price.into_request(), Err(AdminError::InvalidPrice(_))));
    }

    #[test]
    fn test_item_edit() {
        let edit = ItemEdit {
            name: "Dosa".to_string(),
            description: String::new(),
            price: "99.50".to_string(),
            category: "South Indian".to_string(),
        };
        let request = edit.into_request().unwrap();
        assert_eq!(request.price, Decimal::new(9950, 2));

        assert!(ItemEdit::default().into_request().is_err());
    }

    #[test]
    fn test_status_fallback() {
        let err = AdminError::Backend(ApiError::Timeout);
        assert_eq!(err.user_message(STATUS_UPDATE_FAILED), STATUS_UPDATE_FAILED);
    }
}
