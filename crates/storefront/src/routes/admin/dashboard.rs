//! Admin dashboard: orders, headline stats and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bistro_core::{OrderStatus, Price};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::with_message;
use crate::backend::BackendOrder;
use crate::filters;
use crate::middleware::{RequireAdmin, auth::ADMIN_LOGIN_PATH};
use crate::routes::view::Layout;
use crate::services::admin::{
    DashboardStats, STATUS_UPDATE_FAILED, order_ref, update_status as change_status,
};
use crate::state::AppState;

/// Query parameters for message display.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub error: Option<String>,
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// One `<option>` of the status selector.
#[derive(Clone, Debug)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Order row display data.
#[derive(Clone, Debug)]
pub struct AdminOrderView {
    /// Identifier for the status form; `None` hides the form.
    pub reference: Option<String>,
    pub order_id: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub items: Vec<String>,
    pub total: String,
    pub created_at: String,
    pub statuses: Vec<StatusOption>,
}

impl From<&BackendOrder> for AdminOrderView {
    fn from(order: &BackendOrder) -> Self {
        let current = order.status.unwrap_or_default();
        Self {
            reference: order_ref(order),
            order_id: order
                .order_id
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            customer_name: format!("{} {}", order.first_name, order.last_name)
                .trim()
                .to_string(),
            phone: order.phone.clone(),
            address: order.address.clone(),
            items: order
                .items
                .iter()
                .map(|i| format!("{} x{}", i.item_name, i.quantity))
                .collect(),
            total: Price::new(order.total).unwrap_or(Price::ZERO).display(),
            created_at: order
                .created_at
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            statuses: OrderStatus::ALL
                .iter()
                .map(|s| StatusOption {
                    value: s.as_str(),
                    label: s.label(),
                    selected: *s == current,
                })
                .collect(),
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub order_count: usize,
    pub total_items: u32,
    pub revenue: String,
    pub orders: Vec<AdminOrderView>,
    pub error: Option<String>,
}

/// Display the dashboard.
#[instrument(skip(state, session, token))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(token): RequireAdmin,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let (orders, load_error) = match state.backend().list_orders(&token).await {
        Ok(orders) => (orders, None),
        Err(e) if e.is_unauthorized() => return Redirect::to(ADMIN_LOGIN_PATH).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load orders");
            (Vec::new(), Some(e.user_message("Failed to load orders")))
        }
    };

    let store = state.open_store(session).await;
    let stats = DashboardStats::from_orders(&orders);

    DashboardTemplate {
        layout: Layout::from_store(&store),
        order_count: stats.order_count,
        total_items: stats.total_items,
        revenue: stats.revenue.display(),
        orders: orders.iter().map(AdminOrderView::from).collect(),
        error: query.error.or(load_error),
    }
    .into_response()
}

/// Change an order's status.
#[instrument(skip(state, token, form), fields(status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(token): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return Redirect::to(&with_message("/admin", "error", STATUS_UPDATE_FAILED));
    };

    match change_status(state.backend(), &token, &id, status).await {
        Ok(()) => Redirect::to("/admin"),
        Err(err) => {
            tracing::warn!(error = %err, order_ref = %id, "Status update failed");
            let message = err.user_message(STATUS_UPDATE_FAILED);
            Redirect::to(&with_message("/admin", "error", &message))
        }
    }
}
