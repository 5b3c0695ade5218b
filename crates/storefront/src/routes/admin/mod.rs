//! Admin panel route handlers.
//!
//! Every page except the login page requires the admin role (see
//! [`crate::middleware::RequireAdmin`]).

pub mod auth;
pub mod dashboard;
pub mod items;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Largest accepted add-item upload (image plus fields).
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route("/", get(dashboard::index))
        .route("/orders/{id}/status", post(dashboard::update_status))
        .route("/items", get(items::index))
        .route(
            "/items/new",
            get(items::new_item)
                .post(items::create)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/items/{id}", post(items::update))
        .route("/items/{id}/delete", post(items::delete))
}

/// Redirect target carrying a one-off message in the query string.
fn with_message(path: &str, key: &str, message: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("{path}?{key}={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_message_encodes() {
        assert_eq!(
            with_message("/admin", "error", "Failed to update order status"),
            "/admin?error=Failed+to+update+order+status"
        );
        assert_eq!(
            with_message("/admin/items", "saved", "a&b"),
            "/admin/items?saved=a%26b"
        );
    }
}
