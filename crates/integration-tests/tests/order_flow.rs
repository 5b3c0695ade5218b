//! Cart and order placement through the running storefront.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::Method;
use bistro_integration_tests::{
    FakeBackend, Storefront, USER_TOKEN, delivery_form, location, sample_menu,
};
use reqwest::StatusCode;

async fn setup() -> (FakeBackend, Storefront) {
    let backend = FakeBackend::start(sample_menu()).await.unwrap();
    let storefront = Storefront::start(&backend).await.unwrap();
    (backend, storefront)
}

/// Log in and put two of item `a` (100 each) in the cart.
async fn two_thalis(storefront: &Storefront) {
    let login = storefront.login().await.unwrap();
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    for _ in 0..2 {
        let response = storefront
            .post_form("/cart/add", &[("item_id", "a")])
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
    assert_eq!(storefront.cart_count().await.unwrap(), "2");
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_anonymous_add_is_sent_to_login() {
    let (_backend, storefront) = setup().await;

    let response = storefront
        .post_form("/cart/add", &[("item_id", "a")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/auth/login"));
    assert_eq!(storefront.cart_count().await.unwrap(), "0");
}

#[tokio::test]
async fn test_cart_page_shows_totals() {
    let (_backend, storefront) = setup().await;
    two_thalis(&storefront).await;

    let body = storefront.get("/cart").await.unwrap().text().await.unwrap();

    assert!(body.contains("Veg Thali"));
    assert!(body.contains("₹200.00"));
    assert!(body.contains("₹50.00"));
    assert!(body.contains("₹250.00"));
}

#[tokio::test]
async fn test_quantity_zero_removes_line() {
    let (_backend, storefront) = setup().await;
    two_thalis(&storefront).await;

    let response = storefront
        .post_form("/cart/update", &[("item_id", "a"), ("quantity", "0")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(storefront.cart_count().await.unwrap(), "0");
}

#[tokio::test]
async fn test_logout_forgets_cart() {
    let (_backend, storefront) = setup().await;
    two_thalis(&storefront).await;

    let response = storefront.post_form("/auth/logout", &[]).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(storefront.cart_count().await.unwrap(), "0");
}

// =============================================================================
// Placing orders
// =============================================================================

#[tokio::test]
async fn test_order_is_sent_and_cart_cleared() {
    let (backend, storefront) = setup().await;
    two_thalis(&storefront).await;

    let response = storefront
        .post_form("/order", &delivery_form())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).unwrap();
    assert!(target.starts_with("/order/confirmation?order_id=ORD"), "{target}");

    let orders = backend.calls_to(&Method::POST, "/order").await;
    assert_eq!(orders.len(), 1);
    let body = &orders[0].body;
    assert_eq!(body["subtotal"].as_f64(), Some(200.0));
    assert_eq!(body["deliveryFee"].as_f64(), Some(50.0));
    assert_eq!(body["total"].as_f64(), Some(250.0));
    assert_eq!(body["items"][0]["itemId"], "a");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["firstName"], "Asha");
    assert_eq!(
        orders[0].authorization.as_deref(),
        Some(format!("Bearer {USER_TOKEN}").as_str())
    );

    assert_eq!(storefront.cart_count().await.unwrap(), "0");

    let page = storefront.get(&target).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await.unwrap();
    assert!(html.contains(body["orderId"].as_str().unwrap()));
    assert!(html.contains("₹250.00"));
}

#[tokio::test]
async fn test_backend_failure_keeps_cart() {
    let (backend, storefront) = setup().await;
    two_thalis(&storefront).await;
    backend.fail_orders(true).await;

    let response = storefront
        .post_form("/order", &delivery_form())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.text().await.unwrap().contains("Kitchen is closed"));
    assert_eq!(backend.calls_to(&Method::POST, "/order").await.len(), 1);
    assert_eq!(storefront.cart_count().await.unwrap(), "2");

    // Nothing was recorded locally, so there is nothing to confirm.
    let confirmation = storefront.get("/order/confirmation").await.unwrap();
    assert_eq!(confirmation.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_delivery_field_is_rejected_locally() {
    let (backend, storefront) = setup().await;
    two_thalis(&storefront).await;

    let mut form = delivery_form();
    form.retain(|(name, _)| *name != "address");
    let response = storefront.post_form("/order", &form).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(backend.calls_to(&Method::POST, "/order").await.is_empty());
    assert_eq!(storefront.cart_count().await.unwrap(), "2");
}

#[tokio::test]
async fn test_empty_cart_order_redirects_to_cart() {
    let (backend, storefront) = setup().await;
    storefront.login().await.unwrap();

    let response = storefront
        .post_form("/order", &delivery_form())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/cart"));
    assert!(backend.calls_to(&Method::POST, "/order").await.is_empty());
}

#[tokio::test]
async fn test_my_orders_lists_placed_order() {
    let (backend, storefront) = setup().await;
    two_thalis(&storefront).await;
    storefront
        .post_form("/order", &delivery_form())
        .await
        .unwrap();
    let placed = backend.calls_to(&Method::POST, "/order").await;
    let order_id = placed[0].body["orderId"].as_str().unwrap().to_string();

    let html = storefront
        .get("/my-orders")
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains(&order_id));
    assert!(html.contains("₹250.00"));
}
