//! Menu page with category filter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use bistro_core::{ALL_CATEGORIES, categories, filter_by_category};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::{Layout, MenuItemView};
use crate::filters;
use crate::state::AppState;

/// Query parameters for the menu page.
#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

/// Category filter link.
#[derive(Clone, Debug)]
pub struct CategoryChip {
    pub name: String,
    pub href: String,
    pub active: bool,
}

impl CategoryChip {
    fn new(name: String, selected: &str) -> Self {
        let href = if name == ALL_CATEGORIES {
            "/menu".to_string()
        } else {
            let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
            format!("/menu?category={encoded}")
        };
        Self {
            active: name == selected,
            href,
            name,
        }
    }
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/index.html")]
pub struct MenuTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryChip>,
    pub selected: String,
    pub items: Vec<MenuItemView>,
    pub catalog_error: Option<String>,
}

/// Display the menu, optionally filtered to one category.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MenuQuery>,
) -> impl IntoResponse {
    let store = state.open_store(session).await;

    let selected = query
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let items = filter_by_category(store.catalog(), &selected)
        .into_iter()
        .map(MenuItemView::from)
        .collect();

    MenuTemplate {
        layout: Layout::from_store(&store),
        categories: categories(store.catalog())
            .into_iter()
            .map(|name| CategoryChip::new(name, &selected))
            .collect(),
        selected,
        items,
        catalog_error: store.catalog_error().map(str::to_string),
    }
}
