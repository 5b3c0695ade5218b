//! Integration tests for the Bistro storefront.
//!
//! Each test starts a [`FakeBackend`] (an in-process stand-in for the
//! restaurant REST API that records every call) and a [`Storefront`] served
//! against it on an ephemeral port. Requests go through a cookie-keeping
//! client, so the session behaves the way it does in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bistro-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use bistro_storefront::config::{ConfigError, StorefrontConfig};
use bistro_storefront::state::AppState;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Token issued by the fake `/login`.
pub const USER_TOKEN: &str = "user-token";
/// Token issued by the fake `/admin-login`.
pub const ADMIN_TOKEN: &str = "admin-token";
/// Password the fake `/login` and `/admin-login` refuse.
pub const WRONG_PASSWORD: &str = "wrong-password";

/// Errors while setting up the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend client error: {0}")]
    Api(#[from] bistro_storefront::backend::ApiError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

// =============================================================================
// Fake backend
// =============================================================================

/// One request received by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    /// JSON body, or the raw text for non-JSON bodies (multipart).
    pub body: Value,
}

#[derive(Debug, Default)]
struct BackendState {
    calls: Vec<RecordedCall>,
    items: Vec<Value>,
    orders: Vec<Value>,
    fail_orders: bool,
}

type Shared = Arc<Mutex<BackendState>>;

/// In-process restaurant backend.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
}

impl FakeBackend {
    /// Start the backend with the given menu.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start(items: Vec<Value>) -> Result<Self, HarnessError> {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            items,
            ..BackendState::default()
        }));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        Ok(Self { addr, state })
    }

    /// Base URL to configure the storefront with.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Make `POST /order` answer 500 (or succeed again).
    pub async fn fail_orders(&self, fail: bool) {
        self.state.lock().await.fail_orders = fail;
    }

    /// Seed a stored order, as if placed earlier.
    pub async fn insert_order(&self, order: Value) {
        self.state.lock().await.orders.push(order);
    }

    /// Every call received so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Calls whose method and path match.
    pub async fn calls_to(&self, method: &Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| c.method == *method && c.path == path)
            .collect()
    }

    /// Calls whose path starts with `prefix`.
    pub async fn calls_under(&self, prefix: &str) -> Vec<RecordedCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| c.path.starts_with(prefix))
            .collect()
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn is_admin(call: &RecordedCall) -> bool {
    call.authorization.as_deref() == Some(format!("Bearer {ADMIN_TOKEN}").as_str())
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let text = String::from_utf8_lossy(&body).into_owned();
    let call = RecordedCall {
        method: method.clone(),
        path: uri.path().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&text).unwrap_or(Value::String(text)),
    };

    let mut state = state.lock().await;
    state.calls.push(call.clone());

    let segments: Vec<&str> = call.path.trim_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        (Method::GET, ["items"]) => Json(Value::Array(state.items.clone())).into_response(),

        (Method::POST, ["login"]) => {
            if call.body["Password"] == WRONG_PASSWORD {
                return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
            }
            Json(json!({
                "token": USER_TOKEN,
                "user": { "email": call.body["Email"] }
            }))
            .into_response()
        }
        (Method::POST, ["signup"]) => {
            if call.body["Email"] == "taken@example.com" {
                return message(StatusCode::CONFLICT, "User already exists");
            }
            (StatusCode::CREATED, Json(json!({ "message": "User created" }))).into_response()
        }
        (Method::POST, ["admin-login"]) => {
            if call.body["password"] == WRONG_PASSWORD {
                return message(StatusCode::UNAUTHORIZED, "Invalid admin credentials");
            }
            Json(json!({ "token": ADMIN_TOKEN })).into_response()
        }

        (Method::POST, ["order"]) => {
            if state.fail_orders {
                return message(StatusCode::INTERNAL_SERVER_ERROR, "Kitchen is closed");
            }
            let record_id = format!("rec-{}", state.orders.len() + 1);
            let mut order = call.body.clone();
            order["_id"] = json!(&record_id);
            order["status"] = json!("pending");
            state.orders.push(order);
            Json(json!({ "success": true, "order": { "_id": record_id } })).into_response()
        }
        (Method::GET, ["order", "id", order_id]) => {
            match state.orders.iter().find(|o| o["orderId"] == *order_id) {
                Some(order) => Json(json!({ "success": true, "order": order })).into_response(),
                None => (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "success": false, "message": "Order not found" })),
                )
                    .into_response(),
            }
        }

        (_, ["orders", ..] | ["add-item"] | ["update-item", _] | ["items", _]) if !is_admin(&call) => {
            message(StatusCode::UNAUTHORIZED, "Admin token required")
        }
        (Method::GET, ["orders"]) => Json(Value::Array(state.orders.clone())).into_response(),
        (Method::PATCH, ["orders", order_ref, "status"]) => {
            let status = call.body["status"].clone();
            match state
                .orders
                .iter_mut()
                .find(|o| o["_id"] == *order_ref || o["orderId"] == *order_ref)
            {
                Some(order) => {
                    order["status"] = status;
                    Json(json!({ "success": true })).into_response()
                }
                None => message(StatusCode::NOT_FOUND, "Order not found"),
            }
        }
        (Method::POST, ["add-item"]) => {
            (StatusCode::CREATED, Json(json!({ "message": "Item added" }))).into_response()
        }
        (Method::PUT, ["update-item", _]) => Json(json!({ "message": "Item updated" })).into_response(),
        (Method::DELETE, ["items", id]) => {
            let before = state.items.len();
            state.items.retain(|item| item["_id"] != *id);
            if state.items.len() == before {
                return message(StatusCode::NOT_FOUND, "Item not found");
            }
            Json(json!({ "message": "Item deleted" })).into_response()
        }

        (Method::POST, ["reservations"]) => {
            (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
        }
        (Method::POST, ["contact"]) => Json(json!({ "success": true })).into_response(),

        _ => message(StatusCode::NOT_FOUND, "No such endpoint"),
    }
}

/// A menu item in the backend's wire shape.
#[must_use]
pub fn menu_item(id: &str, name: &str, price: u32, category: &str) -> Value {
    json!({
        "_id": id,
        "itemname": name,
        "price": price,
        "description": format!("{name} from the kitchen"),
        "category": category,
        "image": format!("/uploads/{id}.jpg"),
    })
}

/// The menu most tests run against.
#[must_use]
pub fn sample_menu() -> Vec<Value> {
    vec![
        menu_item("a", "Veg Thali", 100, "Main Course"),
        menu_item("b", "Masala Dosa", 80, "Breakfast"),
        menu_item("c", "Gulab Jamun", 40, "Desserts"),
    ]
}

// =============================================================================
// Storefront
// =============================================================================

/// A storefront served on an ephemeral port, plus a browser-like client.
pub struct Storefront {
    base_url: String,
    /// Keeps cookies and does not follow redirects.
    pub client: reqwest::Client,
}

impl Storefront {
    /// Serve the storefront against `backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, state or the listener cannot be set up.
    pub async fn start(backend: &FakeBackend) -> Result<Self, HarnessError> {
        let backend_url = backend.url();
        let config = StorefrontConfig::from_lookup(|key| match key {
            "BACKEND_API_URL" => Some(backend_url.clone()),
            "BACKEND_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })?;
        let app = bistro_storefront::routes::router(AppState::new(config)?);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                tracing::error!(error = %e, "Storefront stopped");
            }
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url: format!("http://{addr}"),
            client,
        })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, HarnessError> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// `POST path` with a urlencoded form.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<reqwest::Response, HarnessError> {
        Ok(self.client.post(self.url(path)).form(form).send().await?)
    }

    /// Log in as a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn login(&self) -> Result<reqwest::Response, HarnessError> {
        self.post_form(
            "/auth/login",
            &[("email", "asha@example.com"), ("password", "secret123")],
        )
        .await
    }

    /// Log in through the admin login page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn admin_login(&self) -> Result<reqwest::Response, HarnessError> {
        self.post_form(
            "/admin/login",
            &[("email", "admin@example.com"), ("password", "admin-pass")],
        )
        .await
    }

    /// Current badge count from `/cart/count`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cart_count(&self) -> Result<String, HarnessError> {
        Ok(self.get("/cart/count").await?.text().await?)
    }
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Delivery form fields for a valid order.
#[must_use]
pub fn delivery_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("first_name", "Asha"),
        ("last_name", "Rao"),
        ("email", "asha@example.com"),
        ("phone", "9876543210"),
        ("address", "12 MG Road, Bengaluru"),
    ]
}
