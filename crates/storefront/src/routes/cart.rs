//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every mutation is committed
//! before the redirect, so a storage failure surfaces as an error page rather
//! than a silently lost change.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use bistro_core::{ItemId, OrderTotals};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::{CartLineView, Layout, TotalsView, local_path};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;
use crate::store::StoreError;

/// Where anonymous visitors are sent when they try to add to the cart.
pub const LOGIN_PATH: &str = "/auth/login";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: String,
    /// Page to return to after adding.
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let store = state.open_store(session).await;

    CartShowTemplate {
        layout: Layout::from_store(&store),
        lines: store.cart().lines().iter().map(CartLineView::from).collect(),
        totals: OrderTotals::for_cart(store.cart()).into(),
    }
}

/// Add one unit of a menu item.
///
/// Anonymous visitors are redirected to the login page and the cart is left
/// untouched.
#[instrument(skip(state, session, form), fields(item_id = %form.item_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let mut store = state.open_store(session).await;
    let item_id = ItemId::new(form.item_id.trim());

    match store.add_item_by_id(&item_id).await {
        Ok(quantity) => {
            let quantity = quantity.to_string();
            add_breadcrumb(
                "cart",
                "Added item",
                Some(&[("item_id", item_id.as_str()), ("quantity", quantity.as_str())]),
            );
            let back = local_path(form.return_to.as_deref(), "/cart");
            Ok(Redirect::to(&back).into_response())
        }
        Err(StoreError::NotAuthenticated) => Ok(Redirect::to(LOGIN_PATH).into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Set a line's quantity. Quantities below 1 remove the line.
#[instrument(skip(state, session, form), fields(item_id = %form.item_id, quantity = form.quantity))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let mut store = state.open_store(session).await;
    store
        .update_quantity(&ItemId::new(form.item_id.trim()), form.quantity)
        .await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, form), fields(item_id = %form.item_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let mut store = state.open_store(session).await;
    store
        .remove_from_cart(&ItemId::new(form.item_id.trim()))
        .await?;
    add_breadcrumb("cart", "Removed item", Some(&[("item_id", form.item_id.as_str())]));
    Ok(Redirect::to("/cart"))
}

/// Cart badge count as plain text.
pub async fn count(State(state): State<AppState>, session: Session) -> String {
    let store = state.open_store(session).await;
    store.total_cart_items().to_string()
}
