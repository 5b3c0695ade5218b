//! Authentication route handlers.
//!
//! Customer login, signup and logout against the restaurant backend. The
//! issued token is kept in the session.

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
use crate::error::Result;
use crate::filters;
use crate::services::auth::{self as auth_service, AuthError, LoginForm, SignupForm};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Set after a successful signup.
    pub signed_up: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub error: Option<String>,
}

fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::Backend(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
        AuthError::Backend(_) => StatusCode::BAD_GATEWAY,
        AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(state, session))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    let store = state.open_store(session).await;
    LoginTemplate {
        layout: Layout::from_store(&store),
        email: String::new(),
        error: None,
        success: query
            .signed_up
            .map(|_| "Account created. Please log in.".to_string()),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut store = state.open_store(session).await;

    match auth_service::login(&mut store, state.backend(), &form).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => {
            tracing::info!(error = %err, "Login failed");
            let template = LoginTemplate {
                layout: Layout::from_store(&store),
                email: form.email,
                error: Some(err.user_message()),
                success: None,
            };
            (status_for(&err), template).into_response()
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
#[instrument(skip(state, session))]
pub async fn signup_page(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let store = state.open_store(session).await;
    SignupTemplate {
        layout: Layout::from_store(&store),
        full_name: String::new(),
        email: String::new(),
        phone: String::new(),
        error: None,
    }
}

/// Handle signup form submission. Success switches to the login page.
#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    match auth_service::signup(state.backend(), &form).await {
        Ok(()) => Redirect::to("/auth/login?signed_up=1").into_response(),
        Err(err) => {
            tracing::info!(error = %err, "Signup failed");
            let store = state.open_store(session).await;
            let template = SignupTemplate {
                layout: Layout::from_store(&store),
                full_name: form.full_name,
                email: form.email,
                phone: form.phone,
                error: Some(err.user_message()),
            };
            (status_for(&err), template).into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Forget the credential and the cart.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut store = state.open_store(session).await;
    store.logout().await?;
    Ok(Redirect::to("/"))
}
