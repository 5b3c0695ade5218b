//! Menu catalog items.

use serde::{Deserialize, Serialize};

use super::{ItemId, Price};

/// Pseudo-category that matches every item.
pub const ALL_CATEGORIES: &str = "All";

/// A dish from the restaurant's catalog.
///
/// Owned by the backend; the storefront only ever holds read-only copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
}

/// Category filter list for the menu page.
///
/// Returns `"All"` followed by each distinct non-empty category in the order
/// it first appears in the catalog.
#[must_use]
pub fn categories(items: &[MenuItem]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_owned()];
    for item in items {
        if !item.category.is_empty() && !out.iter().any(|c| c == &item.category) {
            out.push(item.category.clone());
        }
    }
    out
}

/// Items belonging to `category` (`"All"` keeps everything).
#[must_use]
pub fn filter_by_category<'a>(items: &'a [MenuItem], category: &str) -> Vec<&'a MenuItem> {
    items
        .iter()
        .filter(|item| category == ALL_CATEGORIES || item.category == category)
        .collect()
}
