//! Display types shared by page templates.
//!
//! Prices are pre-formatted so templates only interpolate strings.

use bistro_core::{CartLine, MenuItem, OrderTotals};

use crate::storage::DurableStorage;
use crate::store::StoreContext;

/// Header state rendered by `base.html` on every page.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub cart_count: u32,
    pub is_authenticated: bool,
    pub is_admin: bool,
}

impl Layout {
    #[must_use]
    pub fn from_store<S: DurableStorage>(store: &StoreContext<S>) -> Self {
        Self {
            cart_count: store.total_cart_items(),
            is_authenticated: store.is_authenticated(),
            is_admin: store.is_admin(),
        }
    }
}

/// Menu item display data for templates.
#[derive(Clone, Debug)]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
}

impl From<&MenuItem> for MenuItemView {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            price: item.price.display(),
            description: item.description.clone(),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
        }
    }
}

/// Cart line display data for templates.
#[derive(Clone, Debug)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id().to_string(),
            name: line.item.name.clone(),
            image_url: line.item.image_url.clone(),
            quantity: line.quantity,
            price: line.item.price.display(),
            line_total: line.line_total().display(),
        }
    }
}

/// Subtotal, fee and total display strings.
#[derive(Clone, Debug)]
pub struct TotalsView {
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
}

impl From<OrderTotals> for TotalsView {
    fn from(totals: OrderTotals) -> Self {
        Self {
            subtotal: totals.subtotal.display(),
            delivery_fee: totals.delivery_fee.display(),
            total: totals.total.display(),
        }
    }
}

/// Accept only same-site absolute paths as redirect targets.
#[must_use]
pub fn local_path(candidate: Option<&str>, fallback: &'static str) -> String {
    match candidate {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => fallback.to_string(),
    }
}
