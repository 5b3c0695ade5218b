//! Order confirmation page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::Layout;
use crate::filters;
use crate::services::confirmation::{
    ConfirmationError, ConfirmationLine, OrderConfirmation, load_confirmation,
};
use crate::state::AppState;

/// Navigation state passed by the order page.
#[derive(Debug, Deserialize)]
pub struct ConfirmationQuery {
    pub order_id: Option<String>,
}

/// Confirmed line display data.
#[derive(Clone, Debug)]
pub struct ConfirmationLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&ConfirmationLine> for ConfirmationLineView {
    fn from(line: &ConfirmationLine) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.price.display(),
            line_total: line.line_total.display(),
        }
    }
}

/// Confirmation display data.
#[derive(Clone, Debug)]
pub struct ConfirmationView {
    pub order_id: String,
    pub order_date: Option<String>,
    pub status: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub items: Vec<ConfirmationLineView>,
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
}

impl From<&OrderConfirmation> for ConfirmationView {
    fn from(order: &OrderConfirmation) -> Self {
        let customer = &order.customer;
        Self {
            order_id: order.order_id.to_string(),
            order_date: order
                .order_date
                .map(|d| d.format("%B %-d, %Y %-I:%M %p").to_string()),
            status: order.status.label().to_string(),
            customer_name: format!("{} {}", customer.first_name, customer.last_name)
                .trim()
                .to_string(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            items: order.items.iter().map(ConfirmationLineView::from).collect(),
            subtotal: order.subtotal.display(),
            delivery_fee: order.delivery_fee.display(),
            total: order.total.display(),
        }
    }
}

/// Confirmation page template.
///
/// Exactly one of `order` and `error` is set.
#[derive(Template, WebTemplate)]
#[template(path = "order/confirmation.html")]
pub struct ConfirmationTemplate {
    pub layout: Layout,
    pub order: Option<ConfirmationView>,
    pub error: Option<String>,
}

/// Display the confirmation for the order number in the URL, or the most
/// recently placed order.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ConfirmationQuery>,
) -> Response {
    let store = state.open_store(session).await;
    let layout = Layout::from_store(&store);

    match load_confirmation(query.order_id.as_deref(), store.storage(), state.backend()).await {
        Ok(order) => ConfirmationTemplate {
            layout,
            order: Some(ConfirmationView::from(&order)),
            error: None,
        }
        .into_response(),
        Err(err) => {
            let status = match err {
                ConfirmationError::NoOrderData => StatusCode::NOT_FOUND,
                ConfirmationError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            };
            let message = match err {
                ConfirmationError::NoOrderData => "No order data found.",
                ConfirmationError::Unavailable(_) => "Unable to load order details.",
            };
            (
                status,
                ConfirmationTemplate {
                    layout,
                    order: None,
                    error: Some(message.to_string()),
                },
            )
                .into_response()
        }
    }
}
