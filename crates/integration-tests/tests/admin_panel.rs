//! Admin dashboard and menu management.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::Method;
use bistro_integration_tests::{ADMIN_TOKEN, FakeBackend, Storefront, location, sample_menu};
use reqwest::StatusCode;
use serde_json::json;

async fn setup() -> (FakeBackend, Storefront) {
    let backend = FakeBackend::start(sample_menu()).await.unwrap();
    backend
        .insert_order(json!({
            "_id": "rec-1",
            "orderId": "ORD1700000000000321042",
            "firstName": "Ravi",
            "lastName": "Kumar",
            "items": [
                { "itemId": "a", "itemName": "Veg Thali", "price": 100, "quantity": 2 }
            ],
            "subtotal": 200,
            "deliveryFee": 50,
            "total": 250,
            "status": "pending"
        }))
        .await;
    let storefront = Storefront::start(&backend).await.unwrap();
    (backend, storefront)
}

fn admin_bearer() -> String {
    format!("Bearer {ADMIN_TOKEN}")
}

// =============================================================================
// Access
// =============================================================================

#[tokio::test]
async fn test_customer_cannot_open_dashboard() {
    let (backend, storefront) = setup().await;
    storefront.login().await.unwrap();

    let response = storefront.get("/admin").await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
    assert!(backend.calls_to(&Method::GET, "/orders").await.is_empty());
}

#[tokio::test]
async fn test_admin_login_opens_dashboard() {
    let (backend, storefront) = setup().await;

    let login = storefront.admin_login().await.unwrap();
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&login).as_deref(), Some("/admin"));

    let response = storefront.get("/admin").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Ravi Kumar"));
    assert!(html.contains("₹250.00"));

    let calls = backend.calls_to(&Method::GET, "/orders").await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].authorization.as_deref(), Some(admin_bearer().as_str()));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_status_change_is_sent() {
    let (backend, storefront) = setup().await;
    storefront.admin_login().await.unwrap();

    let response = storefront
        .post_form("/admin/orders/rec-1/status", &[("status", "preparing")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/admin"));
    let calls = backend
        .calls_to(&Method::PATCH, "/orders/rec-1/status")
        .await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body, json!({ "status": "preparing" }));
    assert_eq!(calls[0].authorization.as_deref(), Some(admin_bearer().as_str()));
}

#[tokio::test]
async fn test_unknown_status_never_reaches_backend() {
    let (backend, storefront) = setup().await;
    storefront.admin_login().await.unwrap();

    let response = storefront
        .post_form("/admin/orders/rec-1/status", &[("status", "lost")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).unwrap().starts_with("/admin?error="));
    assert!(backend.calls_under("/orders/rec-1").await.is_empty());
}

// =============================================================================
// Menu items
// =============================================================================

#[tokio::test]
async fn test_update_item_is_sent() {
    let (backend, storefront) = setup().await;
    storefront.admin_login().await.unwrap();

    let response = storefront
        .post_form(
            "/admin/items/b",
            &[
                ("name", "Masala Dosa"),
                ("description", "Crisp and golden"),
                ("price", "90"),
                ("category", "Breakfast"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/admin/items?saved=1"));
    let calls = backend.calls_to(&Method::PUT, "/update-item/b").await;
    assert_eq!(calls[0].body["itemname"], "Masala Dosa");
    assert_eq!(calls[0].body["price"].as_f64(), Some(90.0));
}

#[tokio::test]
async fn test_delete_item_refreshes_menu() {
    let (backend, storefront) = setup().await;
    storefront.admin_login().await.unwrap();
    // Warm the menu cache before the delete.
    let before = storefront.get("/menu").await.unwrap().text().await.unwrap();
    assert!(before.contains("Gulab Jamun"));

    let response = storefront
        .post_form("/admin/items/c/delete", &[])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/admin/items"));
    assert_eq!(backend.calls_to(&Method::DELETE, "/items/c").await.len(), 1);

    let after = storefront.get("/menu").await.unwrap().text().await.unwrap();
    assert!(!after.contains("Gulab Jamun"));
}
