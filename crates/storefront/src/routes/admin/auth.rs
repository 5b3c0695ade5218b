//! Admin login.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::view::Layout;
use crate::services::auth::{AuthError, LoginForm, admin_login};
use crate::state::AppState;

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
}

/// Display the admin login page. Admins already logged in go to the
/// dashboard.
#[instrument(skip(state, session))]
pub async fn login_page(State(state): State<AppState>, session: Session) -> Response {
    let store = state.open_store(session).await;
    if store.is_admin() {
        return Redirect::to("/admin").into_response();
    }
    AdminLoginTemplate {
        layout: Layout::from_store(&store),
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle admin login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut store = state.open_store(session).await;

    match admin_login(&mut store, state.backend(), &form).await {
        Ok(()) => Redirect::to("/admin").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Admin login failed");
            let status = match &err {
                AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::Backend(_) | AuthError::Store(_) => StatusCode::UNAUTHORIZED,
            };
            let template = AdminLoginTemplate {
                layout: Layout::from_store(&store),
                email: form.email,
                error: Some(err.user_message()),
            };
            (status, template).into_response()
        }
    }
}
