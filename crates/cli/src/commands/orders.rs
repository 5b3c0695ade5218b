//! Order inspection and status changes.

use bistro_core::OrderStatus;
use bistro_storefront::backend::BackendOrder;
use bistro_storefront::services::admin::{DashboardStats, order_ref};
use tracing::info;

use super::{CliError, admin_token, connect};

fn log_summary(order: &BackendOrder) {
    info!(
        "{:<28} {:<24} {:>3} items  {:>10}  {:<10}  ref={}",
        order.order_id.as_ref().map_or("-", |id| id.as_str()),
        format!("{} {}", order.first_name, order.last_name).trim(),
        order.item_count(),
        format!("₹{:.2}", order.total),
        order.status.unwrap_or_default().as_str(),
        order_ref(order).unwrap_or_default(),
    );
}

/// List every order with headline totals (admin).
///
/// # Errors
///
/// Returns an error if the admin login or the listing fails.
pub async fn list() -> Result<(), CliError> {
    let client = connect()?;
    let token = admin_token(&client).await?;
    let orders = client.list_orders(&token).await?;

    for order in &orders {
        log_summary(order);
    }

    let stats = DashboardStats::from_orders(&orders);
    info!(
        "{} orders, {} items, revenue {}",
        stats.order_count,
        stats.total_items,
        stats.revenue.display()
    );
    Ok(())
}

/// Show one order by its client order number.
///
/// # Errors
///
/// Returns an error if the order cannot be found.
pub async fn show(order_id: &str) -> Result<(), CliError> {
    let client = connect()?;
    let order = client.get_order(order_id).await?;

    log_summary(&order);
    info!("  {} / {}", order.email, order.phone);
    info!("  {}", order.address);
    for item in &order.items {
        info!(
            "  {:<32} x{:<3} ₹{:.2}",
            item.item_name,
            item.quantity,
            item.line_total()
        );
    }
    info!(
        "  subtotal ₹{:.2}  delivery ₹{:.2}  total ₹{:.2}",
        order.subtotal, order.delivery_fee, order.total
    );
    Ok(())
}

/// Change an order's status (admin).
///
/// # Errors
///
/// Returns an error if the status is unknown or the backend refuses.
pub async fn set_status(order_ref: &str, status: &str) -> Result<(), CliError> {
    let status: OrderStatus = status.parse().map_err(|e: String| {
        let valid: Vec<&str> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
        CliError::Invalid(format!("{e}. Valid statuses: {}", valid.join(", ")))
    })?;

    let client = connect()?;
    let token = admin_token(&client).await?;
    client.update_order_status(&token, order_ref, status).await?;

    info!(order_ref, status = %status, "Order status updated");
    Ok(())
}
