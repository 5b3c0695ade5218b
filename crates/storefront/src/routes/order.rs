//! Delivery form and order submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use bistro_core::{DeliveryInfo, OrderTotals};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::{CartLineView, Layout, TotalsView};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::services::order::{OrderError, preview_order_id, submit_order};
use crate::state::AppState;
use crate::storage::DurableStorage;
use crate::store::StoreContext;

/// Delivery form fields as posted by the order page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryForm {
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
}

impl From<&DeliveryForm> for DeliveryInfo {
    fn from(form: &DeliveryForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            address: form.address.clone(),
        }
    }
}

/// Order page template.
#[derive(Template, WebTemplate)]
#[template(path = "order/show.html")]
pub struct OrderTemplate {
    pub layout: Layout,
    pub form: DeliveryForm,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    /// Provisional order number; a fresh one is drawn on submission.
    pub preview_order_id: Option<String>,
    pub error: Option<String>,
}

impl OrderTemplate {
    fn new<S: DurableStorage>(
        store: &StoreContext<S>,
        form: DeliveryForm,
        error: Option<String>,
    ) -> Self {
        Self {
            layout: Layout::from_store(store),
            preview_order_id: preview_order_id(&DeliveryInfo::from(&form)).map(|id| id.to_string()),
            form,
            lines: store.cart().lines().iter().map(CartLineView::from).collect(),
            totals: OrderTotals::for_cart(store.cart()).into(),
            error,
        }
    }
}

/// Display the delivery form and order summary.
///
/// The form can be re-submitted with GET to refresh the preview order number.
/// An empty cart redirects to the cart page.
#[instrument(skip(state, session, form))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(form): Query<DeliveryForm>,
) -> Response {
    let store = state.open_store(session).await;
    if store.cart().is_empty() {
        return Redirect::to("/cart").into_response();
    }

    OrderTemplate::new(&store, form, None).into_response()
}

/// Place the order and hand off to the confirmation page.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DeliveryForm>,
) -> Response {
    let mut store = state.open_store(session).await;

    match submit_order(&mut store, state.backend(), &DeliveryInfo::from(&form)).await {
        Ok(placed) => {
            let order_id = placed.snapshot.order_id.to_string();
            add_breadcrumb("order", "Order placed", Some(&[("order_id", order_id.as_str())]));
            Redirect::to(&confirmation_path(&order_id)).into_response()
        }
        Err(OrderError::EmptyCart) => Redirect::to("/cart").into_response(),
        Err(err) => {
            let status = match err {
                OrderError::Backend(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            tracing::warn!(error = %err, "Order not placed");
            let message = err.user_message();
            (status, OrderTemplate::new(&store, form, Some(message))).into_response()
        }
    }
}

/// Confirmation URL carrying the order number as navigation state.
fn confirmation_path(order_id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(order_id.as_bytes()).collect();
    format!("/order/confirmation?order_id={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_path_encodes_id() {
        assert_eq!(
            confirmation_path("ORD17000000000003210042"),
            "/order/confirmation?order_id=ORD17000000000003210042"
        );
        assert_eq!(
            confirmation_path("ORD1+1 23007"),
            "/order/confirmation?order_id=ORD1%2B1+23007"
        );
    }

    #[test]
    fn test_delivery_form_conversion() {
        let form = DeliveryForm {
            first_name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            ..DeliveryForm::default()
        };
        let info = DeliveryInfo::from(&form);
        assert_eq!(info.first_name, "Asha");
        assert!(!info.is_complete());
    }
}
