//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page (featured dishes)
//! GET  /health                   - Health check
//!
//! # Menu
//! GET  /menu?category=           - Menu with category filter
//!
//! # Cart
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add one unit (anonymous visitors go to login)
//! POST /cart/update              - Set a line's quantity
//! POST /cart/remove              - Remove a line
//! GET  /cart/count               - Badge count (plain text)
//!
//! # Ordering
//! GET  /order                    - Delivery form and order summary
//! POST /order                    - Place the order
//! GET  /order/confirmation       - Confirmation (?order_id=)
//! GET  /my-orders                - Orders placed from this session
//!
//! # Table booking and contact
//! GET  /reservation              - Reservation form
//! POST /reservation              - Book a table
//! GET  /contact                  - Contact form
//! POST /contact                  - Send a message
//!
//! # Auth
//! GET  /auth/login               - Login page
//! POST /auth/login               - Login action
//! GET  /auth/signup              - Signup page
//! POST /auth/signup              - Signup action
//! POST /auth/logout              - Logout action
//!
//! # Admin (requires role = admin)
//! GET  /admin/login              - Admin login page
//! POST /admin/login              - Admin login action
//! GET  /admin                    - Dashboard
//! POST /admin/orders/{id}/status - Change an order's status
//! GET  /admin/items              - Menu items
//! GET  /admin/items/new          - Add item form
//! POST /admin/items/new          - Add item (multipart)
//! POST /admin/items/{id}         - Update item
//! POST /admin/items/{id}/delete  - Delete item
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod confirmation;
pub mod contact;
pub mod home;
pub mod menu;
pub mod my_orders;
pub mod order;
pub mod reservation;
pub mod view;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    auth_rate_limiter, create_session_layer, request_id_middleware, security_headers_middleware,
    submit_rate_limiter,
};
use crate::state::AppState;

pub use view::{CartLineView, Layout, MenuItemView, TotalsView};

/// Directory served under `/static`, relative to the workspace root.
const STATIC_DIR: &str = "crates/storefront/static";

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/signup",
            get(auth::signup_page).merge(post(auth::signup).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(order::show).merge(post(order::submit).layer(submit_rate_limiter())),
        )
        .route("/confirmation", get(confirmation::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Menu
        .route("/menu", get(menu::index))
        // Cart routes
        .nest("/cart", cart_routes())
        // Ordering
        .nest("/order", order_routes())
        .route("/my-orders", get(my_orders::index))
        // Table booking and contact
        .route(
            "/reservation",
            get(reservation::show).merge(post(reservation::submit).layer(submit_rate_limiter())),
        )
        .route(
            "/contact",
            get(contact::show).merge(post(contact::submit).layer(submit_rate_limiter())),
        )
        // Auth routes
        .nest("/auth", auth_routes())
        // Admin panel
        .nest("/admin", admin::routes())
}

/// Build the complete application: routes, sessions, middleware and static
/// files.
pub fn router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_id_middleware))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn app() -> Router {
        // Nothing listens on the discard port, so backend calls fail fast.
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "BACKEND_API_URL").then(|| "http://127.0.0.1:9".to_string())
        })
        .unwrap();
        router(AppState::new(config).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.10")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_carries_security_headers() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("content-security-policy"));
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_admin_pages_redirect_anonymous_visitors() {
        for uri in ["/admin", "/admin/items", "/admin/items/new"] {
            let response = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(
                response.headers().get(header::LOCATION).unwrap(),
                "/admin/login"
            );
        }
    }

    #[tokio::test]
    async fn test_anonymous_add_to_cart_redirects_to_login() {
        let request = Request::builder()
            .method("POST")
            .uri("/cart/add")
            .header("x-forwarded-for", "203.0.113.11")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("item_id=a"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/auth/login");
    }
}
