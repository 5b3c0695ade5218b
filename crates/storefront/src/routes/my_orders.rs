//! Orders placed from this session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use bistro_core::PendingOrder;
use tower_sessions::Session;
use tracing::instrument;

use super::view::Layout;
use crate::filters;
use crate::services::confirmation::stored_orders;
use crate::state::AppState;

/// Stored order display data.
#[derive(Clone, Debug)]
pub struct StoredOrderView {
    pub order_id: String,
    pub order_date: String,
    pub status: String,
    pub item_count: u32,
    pub total: String,
}

impl From<&PendingOrder> for StoredOrderView {
    fn from(order: &PendingOrder) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            order_date: order.order_date.format("%B %-d, %Y").to_string(),
            status: order.status.label().to_string(),
            item_count: order.item_count(),
            total: order.total.display(),
        }
    }
}

/// My orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "order/history.html")]
pub struct MyOrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<StoredOrderView>,
}

/// List the orders recorded in this session, newest first.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let store = state.open_store(session).await;
    let orders = stored_orders(store.storage())
        .await
        .iter()
        .rev()
        .map(StoredOrderView::from)
        .collect();

    MyOrdersTemplate {
        layout: Layout::from_store(&store),
        orders,
    }
}
