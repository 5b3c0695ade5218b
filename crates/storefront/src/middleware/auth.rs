//! Authentication extractors.
//!
//! Provides an extractor for requiring an admin login in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use bistro_core::Role;
use secrecy::SecretString;
use tower_sessions::Session;

use crate::storage::keys;

/// Where non-admin visitors are sent.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Extractor that requires an admin login.
///
/// Yields the admin's bearer token. Visitors without a token, or whose role
/// is not `admin`, are redirected to the admin login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(
///     State(state): State<AppState>,
///     RequireAdmin(token): RequireAdmin,
/// ) -> Response {
///     let orders = state.backend().list_orders(&token).await;
///     // ...
/// }
/// ```
pub struct RequireAdmin(pub SecretString);

/// Error returned when an admin login is required.
pub enum AdminRejection {
    /// Redirect to the admin login page.
    RedirectToLogin,
    /// No session layer installed.
    MissingSession,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(ADMIN_LOGIN_PATH).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminRejection::MissingSession)?;

        let role = session
            .get::<String>(keys::ROLE)
            .await
            .ok()
            .flatten()
            .and_then(|r| r.parse::<Role>().ok());
        if role != Some(Role::Admin) {
            return Err(AdminRejection::RedirectToLogin);
        }

        session
            .get::<String>(keys::TOKEN)
            .await
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
            .map(|t| Self(SecretString::from(t)))
            .ok_or(AdminRejection::RedirectToLogin)
    }
}
