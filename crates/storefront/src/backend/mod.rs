//! Restaurant backend API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for the menu, accounts and orders
//! - Every request goes through [`BackendClient::request`], which attaches
//!   the visitor's bearer token when one is supplied
//! - Error payloads (`{ message }` or `{ error }`) are surfaced verbatim so
//!   pages can show what the backend said
//!
//! Two base URLs are configured: the main API (catalog, auth, reservations,
//! admin) and the orders API (order placement, order lookup, contact). They
//! are usually the same host.

pub mod types;

use std::sync::Arc;

use bistro_core::{BackendOrderId, ItemId, MenuItem, OrderStatus};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

pub use types::*;

/// Errors that can occur when talking to the restaurant backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Backend request timed out")]
    Timeout,

    /// Non-success HTTP status, with the backend's message if it sent one.
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// 2xx response with `success: false`.
    #[error("Backend rejected the request: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response was well-formed but lacked a required field.
    #[error("Missing field in backend response: {0}")]
    MissingField(&'static str),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl ApiError {
    /// Message supplied by the backend, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) => message.as_deref(),
            _ => None,
        }
    }

    /// The backend's message verbatim, or `fallback` when it sent none.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }

    /// HTTP status, for errors that carry one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend refused the credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }
}

/// Which configured base URL an endpoint lives under.
#[derive(Debug, Clone, Copy)]
enum Api {
    Main,
    Orders,
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the restaurant backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    api_url: Url,
    orders_api_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bistro-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                api_url: config.api_url.clone(),
                orders_api_url: config.orders_api_url.clone(),
            }),
        })
    }

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, api: Api, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = match api {
            Api::Main => self.inner.api_url.clone(),
            Api::Orders => self.inner.orders_api_url.clone(),
        };
        let shown = url.to_string();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidRequest(format!("{shown} cannot be a base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request, attaching `Authorization: Bearer` when a token is present.
    fn request(&self, method: Method, url: Url, token: Option<&SecretString>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a 2xx response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorPayload>(&body)
                .ok()
                .and_then(ErrorPayload::into_message);
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status { status, message });
        }

        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full menu.
    ///
    /// A single object in place of the usual array is treated as a one-item menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an item list.
    #[instrument(skip(self))]
    pub async fn fetch_items(&self) -> Result<Vec<MenuItem>, ApiError> {
        let url = self.endpoint(Api::Main, &["items"])?;
        let value: serde_json::Value = self.execute_json(self.request(Method::GET, url, None)).await?;
        let items: Vec<BackendItem> = one_or_many(value, "items")?;
        debug!(count = items.len(), "Fetched menu items");
        Ok(items.into_iter().map(MenuItem::from).collect())
    }

    /// Create a menu item (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the item.
    #[instrument(skip(self, token, item), fields(name = %item.name))]
    pub async fn add_item(
        &self,
        token: &SecretString,
        item: NewItemRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(Api::Main, &["add-item"])?;
        let image = Part::bytes(item.image.bytes)
            .file_name(item.image.file_name)
            .mime_str(&item.image.content_type)?;
        let form = Form::new()
            .text("itemname", item.name)
            .text("description", item.description)
            .text("price", item.price.amount().to_string())
            .text("category", item.category)
            .part("image", image);

        self.execute(self.request(Method::POST, url, Some(token)).multipart(form))
            .await?;
        Ok(())
    }

    /// Update a menu item's fields (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the update.
    #[instrument(skip(self, token, update), fields(id = %id))]
    pub async fn update_item(
        &self,
        token: &SecretString,
        id: &ItemId,
        update: &ItemUpdateRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(Api::Main, &["update-item", id.as_str()])?;
        self.execute(self.request(Method::PUT, url, Some(token)).json(update))
            .await?;
        Ok(())
    }

    /// Delete a menu item (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the item does not exist.
    #[instrument(skip(self, token), fields(id = %id))]
    pub async fn delete_item(&self, token: &SecretString, id: &ItemId) -> Result<(), ApiError> {
        let url = self.endpoint(Api::Main, &["items", id.as_str()])?;
        self.execute(self.request(Method::DELETE, url, Some(token)))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange customer credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are refused or no token comes back.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(Api::Main, &["login"])?;
        let response: AuthResponse = self
            .execute_json(self.request(Method::POST, url, None).json(request))
            .await?;
        require_token(response)
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the registration.
    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        let url = self.endpoint(Api::Main, &["signup"])?;
        self.execute(self.request(Method::POST, url, None).json(request))
            .await?;
        Ok(())
    }

    /// Exchange admin credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are refused or no token comes back.
    #[instrument(skip(self, request))]
    pub async fn admin_login(&self, request: &AdminLoginRequest) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(Api::Main, &["admin-login"])?;
        let response: AuthResponse = self
            .execute_json(self.request(Method::POST, url, None).json(request))
            .await?;
        require_token(response)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order.
    ///
    /// Returns the backend's record ID when it sends one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the backend answers `success: false`,
    /// or any transport/status error.
    #[instrument(skip(self, token, order), fields(order_id = %order.order_id))]
    pub async fn create_order(
        &self,
        token: Option<&SecretString>,
        order: &OrderRequest,
    ) -> Result<Option<BackendOrderId>, ApiError> {
        let url = self.endpoint(Api::Orders, &["order"])?;
        let envelope: OrderEnvelope<CreatedOrder> = self
            .execute_json(self.request(Method::POST, url, token).json(order))
            .await?;
        if !envelope.success {
            return Err(ApiError::Rejected(envelope.message));
        }
        Ok(envelope.order.and_then(|o| o.id))
    }

    /// Fetch a stored order by its client order number.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the backend answers `success: false`
    /// or omits the order, or any transport/status error.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> Result<BackendOrder, ApiError> {
        let url = self.endpoint(Api::Orders, &["order", "id", order_id])?;
        let envelope: OrderEnvelope<BackendOrder> =
            self.execute_json(self.request(Method::GET, url, None)).await?;
        match envelope.order {
            Some(order) if envelope.success => Ok(order),
            _ => Err(ApiError::Rejected(envelope.message)),
        }
    }

    /// List every order (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an order list.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &SecretString) -> Result<Vec<BackendOrder>, ApiError> {
        let url = self.endpoint(Api::Main, &["orders"])?;
        let value: serde_json::Value = self
            .execute_json(self.request(Method::GET, url, Some(token)))
            .await?;
        one_or_many(value, "orders")
    }

    /// Change an order's status (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses the change.
    #[instrument(skip(self, token))]
    pub async fn update_order_status(
        &self,
        token: &SecretString,
        order_ref: &str,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(Api::Main, &["orders", order_ref, "status"])?;
        self.execute(
            self.request(Method::PATCH, url, Some(token))
                .json(&StatusUpdateRequest { status }),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Book a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses the booking.
    #[instrument(skip(self, token, request), fields(date = %request.date, time = %request.time))]
    pub async fn create_reservation(
        &self,
        token: Option<&SecretString>,
        request: &ReservationRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(Api::Main, &["reservations"])?;
        self.execute(self.request(Method::POST, url, token).json(request))
            .await?;
        Ok(())
    }

    /// Send a contact-form message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses the message.
    #[instrument(skip(self, request))]
    pub async fn send_contact(&self, request: &ContactRequest) -> Result<(), ApiError> {
        let url = self.endpoint(Api::Orders, &["contact"])?;
        self.execute(self.request(Method::POST, url, None).json(request))
            .await?;
        Ok(())
    }
}

/// Accept either a bare array, an object wrapping the array under `key`, or
/// a single object standing in for a one-element list.
fn one_or_many<T: DeserializeOwned>(value: serde_json::Value, key: &str) -> Result<Vec<T>, ApiError> {
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(mut map) => match map.remove(key) {
            Some(list @ serde_json::Value::Array(_)) => Ok(serde_json::from_value(list)?),
            Some(other) => {
                map.insert(key.to_string(), other);
                Ok(vec![serde_json::from_value(serde_json::Value::Object(map))?])
            }
            None => Ok(vec![serde_json::from_value(serde_json::Value::Object(map))?]),
        },
        serde_json::Value::Null => Ok(Vec::new()),
        other => Ok(serde_json::from_value(other)?),
    }
}

fn require_token(response: AuthResponse) -> Result<AuthResponse, ApiError> {
    match response.token.as_deref() {
        Some(token) if !token.is_empty() => Ok(response),
        _ => Err(ApiError::Rejected(response.message)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(api: &str, orders: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            api_url: Url::parse(api).unwrap(),
            orders_api_url: Url::parse(orders).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let c = client("https://api.example.com/v1/", "https://orders.example.com");
        assert_eq!(
            c.endpoint(Api::Main, &["items"]).unwrap().as_str(),
            "https://api.example.com/v1/items"
        );
        assert_eq!(
            c.endpoint(Api::Orders, &["order", "id", "ORD1"]).unwrap().as_str(),
            "https://orders.example.com/order/id/ORD1"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let c = client("https://api.example.com", "https://api.example.com");
        let url = c.endpoint(Api::Main, &["items", "a/b?c"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/items/a%2Fb%3Fc");
    }

    #[test]
    fn test_endpoint_rejects_non_base_url() {
        let c = client("mailto:kitchen@example.com", "https://api.example.com");
        let err = c.endpoint(Api::Main, &["items"]).unwrap_err();
        assert!(
            matches!(&err, ApiError::InvalidRequest(m) if m.starts_with("mailto:kitchen@example.com")),
            "{err:?}"
        );
    }

    #[test]
    fn test_request_attaches_bearer_token() {
        let c = client("https://api.example.com", "https://api.example.com");
        let url = c.endpoint(Api::Main, &["orders"]).unwrap();
        let token = SecretString::from("tok-123");

        let with = c.request(Method::GET, url.clone(), Some(&token)).build().unwrap();
        assert_eq!(
            with.headers().get("authorization").unwrap().to_str().unwrap(),
            "Bearer tok-123"
        );

        let without = c.request(Method::GET, url, None).build().unwrap();
        assert!(without.headers().get("authorization").is_none());
    }

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.user_message("fallback"), "Invalid credentials");
        assert!(!err.is_unauthorized());

        assert_eq!(ApiError::Timeout.user_message("fallback"), "fallback");
        assert_eq!(ApiError::Rejected(None).user_message("fallback"), "fallback");
    }

    #[test]
    fn test_one_or_many_shapes() {
        let list: Vec<serde_json::Value> =
            one_or_many(serde_json::json!([{ "a": 1 }, { "a": 2 }]), "items").unwrap();
        assert_eq!(list.len(), 2);

        let single: Vec<serde_json::Value> =
            one_or_many(serde_json::json!({ "a": 1 }), "items").unwrap();
        assert_eq!(single.len(), 1);

        let wrapped: Vec<serde_json::Value> =
            one_or_many(serde_json::json!({ "orders": [{ "a": 1 }] }), "orders").unwrap();
        assert_eq!(wrapped[0]["a"], 1);

        let empty: Vec<serde_json::Value> = one_or_many(serde_json::Value::Null, "items").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_require_token() {
        let ok = AuthResponse {
            token: Some("t".to_string()),
            user: None,
            message: None,
        };
        assert!(require_token(ok).is_ok());

        let missing = AuthResponse {
            token: None,
            user: None,
            message: Some("User not found".to_string()),
        };
        let err = require_token(missing).unwrap_err();
        assert_eq!(err.backend_message(), Some("User not found"));
    }
}
