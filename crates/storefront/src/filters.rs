//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use bistro_core::ItemId;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for site.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Short display number for a menu item ID (`ITEM1d09`).
///
/// Usage in templates: `{{ line.id|item_number }}`
#[askama::filter_fn]
pub fn item_number(id: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(bistro_core::item_number(&ItemId::new(id.to_string())))
}

/// Item count with the right noun: `1 item`, `3 items`.
///
/// Usage in templates: `{{ layout.cart_count|items_label }}`
#[askama::filter_fn]
pub fn items_label(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let count = count.to_string();
    let noun = if count == "1" { "item" } else { "items" };
    Ok(format!("{count} {noun}"))
}
