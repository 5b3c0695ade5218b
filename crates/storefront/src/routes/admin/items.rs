//! Admin menu item management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use bistro_core::{ItemId, MenuItem};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::with_message;
use crate::backend::ImageUpload;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::view::Layout;
use crate::services::admin::{
    AdminError, ITEM_SAVE_FAILED, ItemDraft, ItemEdit, create_item, delete_item, update_item,
};
use crate::state::AppState;

/// Query parameters for message display.
#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    pub error: Option<String>,
    pub saved: Option<String>,
}

/// Editable item row display data.
#[derive(Clone, Debug)]
pub struct AdminItemView {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Bare amount for the price input (e.g. `120.00`).
    pub price: String,
    pub category: String,
    pub image_url: String,
}

impl From<&MenuItem> for AdminItemView {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: format!("{:.2}", item.price.amount()),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
        }
    }
}

/// Item list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/items.html")]
pub struct ItemsTemplate {
    pub layout: Layout,
    pub items: Vec<AdminItemView>,
    pub catalog_error: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Add item template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/item_new.html")]
pub struct NewItemTemplate {
    pub layout: Layout,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub error: Option<String>,
}

/// List menu items with inline edit forms.
#[instrument(skip(state, session, _token))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_token): RequireAdmin,
    session: Session,
    Query(query): Query<ItemsQuery>,
) -> impl IntoResponse {
    let store = state.open_store(session).await;

    ItemsTemplate {
        layout: Layout::from_store(&store),
        items: store.catalog().iter().map(AdminItemView::from).collect(),
        catalog_error: store.catalog_error().map(str::to_string),
        error: query.error,
        success: query.saved.map(|_| "Menu item saved.".to_string()),
    }
}

/// Display the add item form.
#[instrument(skip(state, session, _token))]
pub async fn new_item(
    State(state): State<AppState>,
    RequireAdmin(_token): RequireAdmin,
    session: Session,
) -> impl IntoResponse {
    let store = state.open_store(session).await;
    NewItemTemplate {
        layout: Layout::from_store(&store),
        name: String::new(),
        description: String::new(),
        price: String::new(),
        category: String::new(),
        error: None,
    }
}

/// Create a menu item from the multipart add form.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(token): RequireAdmin,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let draft = read_draft(multipart)
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;
    let retained = draft.clone();

    match create_item(state.backend(), state.catalog(), &token, draft).await {
        Ok(()) => Ok(Redirect::to("/admin/items?saved=1").into_response()),
        Err(err) => {
            tracing::warn!(error = %err, "Add item failed");
            let status = match err {
                AdminError::Incomplete(_) | AdminError::InvalidPrice(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AdminError::Backend(_) => StatusCode::BAD_GATEWAY,
            };
            let store = state.open_store(session).await;
            let template = NewItemTemplate {
                layout: Layout::from_store(&store),
                name: retained.name,
                description: retained.description,
                price: retained.price,
                category: retained.category,
                error: Some(err.user_message(ITEM_SAVE_FAILED)),
            };
            Ok((status, template).into_response())
        }
    }
}

/// Update a menu item's fields.
#[instrument(skip(state, token, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(token): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<ItemEdit>,
) -> Redirect {
    let id = ItemId::new(id);
    match update_item(state.backend(), state.catalog(), &token, &id, form).await {
        Ok(()) => Redirect::to("/admin/items?saved=1"),
        Err(err) => {
            tracing::warn!(error = %err, item_id = %id, "Update item failed");
            Redirect::to(&with_message(
                "/admin/items",
                "error",
                &err.user_message(ITEM_SAVE_FAILED),
            ))
        }
    }
}

/// Delete a menu item.
#[instrument(skip(state, token))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(token): RequireAdmin,
    Path(id): Path<String>,
) -> Redirect {
    let id = ItemId::new(id);
    match delete_item(state.backend(), state.catalog(), &token, &id).await {
        Ok(()) => Redirect::to("/admin/items"),
        Err(err) => {
            tracing::warn!(error = %err, item_id = %id, "Delete item failed");
            Redirect::to(&with_message(
                "/admin/items",
                "error",
                &err.user_message(ITEM_SAVE_FAILED),
            ))
        }
    }
}

/// Collect the add-item fields and image from a multipart body.
async fn read_draft(mut multipart: Multipart) -> std::result::Result<ItemDraft, MultipartError> {
    let mut draft = ItemDraft::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    draft.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "name" => draft.name = field.text().await?,
            "description" => draft.description = field.text().await?,
            "price" => draft.price = field.text().await?,
            "category" => draft.category = field.text().await?,
            _ => {}
        }
    }

    Ok(draft)
}
