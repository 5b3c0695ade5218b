//! Contact form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::Layout;
use crate::filters;
use crate::services::contact::{ContactError, ContactForm, send_message};
use crate::state::AppState;

/// Query parameters for success display.
#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub sent: Option<String>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub form: ContactForm,
    pub error: Option<String>,
    pub success: bool,
}

/// Display the contact page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ContactQuery>,
) -> impl IntoResponse {
    let store = state.open_store(session).await;
    ContactTemplate {
        layout: Layout::from_store(&store),
        form: ContactForm::default(),
        error: None,
        success: query.sent.is_some(),
    }
}

/// Handle contact form submission.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Response {
    match send_message(state.backend(), &form).await {
        Ok(()) => Redirect::to("/contact?sent=1").into_response(),
        Err(err) => {
            let status = match err {
                ContactError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ContactError::Backend(_) => StatusCode::BAD_GATEWAY,
            };
            let store = state.open_store(session).await;
            let template = ContactTemplate {
                layout: Layout::from_store(&store),
                error: Some(err.user_message()),
                form,
                success: false,
            };
            (status, template).into_response()
        }
    }
}
