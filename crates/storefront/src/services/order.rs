//! Order submission.
//!
//! Turns the visitor's cart and delivery form into a backend order, then
//! hands off to the confirmation page through the pending-order snapshot.

use bistro_core::{DeliveryInfo, OrderId, OrderTotals, PendingOrder, ValidationError};
use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::backend::{ApiError, BackendClient, OrderRequest};
use crate::storage::{DurableStorage, keys};
use crate::store::{StoreContext, StoreError};

/// Shown when the backend refuses an order without saying why.
pub const ORDER_FAILED_FALLBACK: &str = "Failed to create order";

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Nothing to order; the visitor belongs on the cart page.
    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend refused or could not be reached. The cart is untouched.
    #[error("Order submission failed: {0}")]
    Backend(#[source] ApiError),
}

impl OrderError {
    /// Text to show on the order form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(err) => err.user_message(ORDER_FAILED_FALLBACK),
            other => other.to_string(),
        }
    }
}

/// Outcome of a successful submission.
#[derive(Debug)]
pub struct PlacedOrder {
    /// What was submitted, as written to `pendingOrder`.
    pub snapshot: PendingOrder,
    /// Set when the backend accepted the order but local bookkeeping failed
    /// (snapshot write or cart clear).
    pub storage_error: Option<StoreError>,
}

/// Derive an order number for `phone` from the current time and a random draw.
#[must_use]
pub fn new_order_id(phone: &str) -> OrderId {
    let random = rand::rng().random_range(0..1000u16);
    OrderId::derive(Utc::now().timestamp_millis(), phone, random)
}

/// Provisional order number shown while the form is being filled in.
///
/// Only offered once the form is complete and the phone has at least 4
/// characters. The number actually submitted is derived again at submission.
#[must_use]
pub fn preview_order_id(form: &DeliveryInfo) -> Option<OrderId> {
    let form = form.trimmed();
    (form.is_complete() && form.phone.chars().count() >= 4).then(|| new_order_id(&form.phone))
}

/// Place an order for the visitor's cart.
///
/// On success the snapshot is stored under `pendingOrder` and the cart is
/// cleared. Local storage failures after the backend accepted the order do not
/// fail the call; they are logged, reported to Sentry and returned in
/// [`PlacedOrder::storage_error`].
///
/// # Errors
///
/// - [`OrderError::EmptyCart`] if the cart is empty (checked first)
/// - [`OrderError::Validation`] if a delivery field is blank (no network call)
/// - [`OrderError::Backend`] if the backend refuses or cannot be reached
#[instrument(skip_all, fields(order_id = tracing::field::Empty))]
pub async fn submit_order<S: DurableStorage>(
    store: &mut StoreContext<S>,
    backend: &BackendClient,
    form: &DeliveryInfo,
) -> Result<PlacedOrder, OrderError> {
    if store.cart().is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let customer = form.trimmed();
    customer.validate()?;

    let order_id = new_order_id(&customer.phone);
    tracing::Span::current().record("order_id", order_id.as_str());

    let totals = OrderTotals::for_cart(store.cart());
    let request = OrderRequest::new(order_id.clone(), &customer, store.cart().lines(), totals);

    let backend_order_id = backend
        .create_order(store.token(), &request)
        .await
        .map_err(OrderError::Backend)?;

    info!(
        order_id = %order_id,
        total = %totals.total,
        items = store.total_cart_items(),
        "Order accepted"
    );

    let snapshot = PendingOrder::new(order_id, backend_order_id, store.cart(), customer, Utc::now());
    let storage_error = record_placed_order(store, &snapshot).await.err();
    if let Some(err) = &storage_error {
        let event_id = sentry::capture_error(err);
        error!(
            error = %err,
            order_id = %snapshot.order_id,
            sentry_event_id = %event_id,
            "Order placed but local state could not be updated"
        );
    }

    Ok(PlacedOrder {
        snapshot,
        storage_error,
    })
}

/// Write the snapshot, then clear the cart.
async fn record_placed_order<S: DurableStorage>(
    store: &mut StoreContext<S>,
    snapshot: &PendingOrder,
) -> Result<(), StoreError> {
    let payload = serde_json::to_string(snapshot)?;
    let saved = store
        .storage()
        .set_item(keys::PENDING_ORDER, payload)
        .await
        .map_err(StoreError::from);
    let cleared = store.clear_cart().await;
    saved.and(cleared)
}
