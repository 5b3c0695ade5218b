//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::view::{Layout, MenuItemView};
use crate::filters;
use crate::state::AppState;

/// Number of dishes featured on the home page.
const FEATURED_COUNT: usize = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<MenuItemView>,
    pub catalog_error: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let store = state.open_store(session).await;

    HomeTemplate {
        layout: Layout::from_store(&store),
        featured: store
            .catalog()
            .iter()
            .take(FEATURED_COUNT)
            .map(MenuItemView::from)
            .collect(),
        catalog_error: store.catalog_error().map(str::to_string),
    }
}
