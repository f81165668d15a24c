//! Cart rejection behavior at the HTTP boundary.
//!
//! Every structurally invalid cart must come back as a 400 with its exact
//! message, and the gateway must never be reached. The mock gateway is
//! configured to fail the test if any call gets through.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{response_json, untouchable_gateway, TestApp};
use serde_json::json;
use storefront_api::entities::user::UserRole;

const PAYMENT_URI: &str = "/api/v1/product/braintree/payment";

async fn buyer_app() -> (TestApp, String) {
    let app = TestApp::with_gateway(Arc::new(untouchable_gateway())).await;
    let (_user, token) = app
        .seed_user("buyer@example.com", "buyer-password", UserRole::Customer)
        .await;
    (app, token)
}

async fn assert_rejected(app: &TestApp, token: &str, payload: serde_json::Value, message: &str) {
    let response = app
        .request(Method::POST, PAYMENT_URI, Some(payload), Some(token))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn missing_nonce_is_rejected() {
    let (app, token) = buyer_app().await;
    assert_rejected(
        &app,
        &token,
        json!({"nonce": "", "cart": [{"price": 10.0}]}),
        "Payment method nonce is required",
    )
    .await;
}

#[tokio::test]
async fn absent_nonce_field_is_rejected() {
    let (app, token) = buyer_app().await;
    assert_rejected(
        &app,
        &token,
        json!({"cart": [{"price": 10.0}]}),
        "Payment method nonce is required",
    )
    .await;
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let (app, token) = buyer_app().await;
    assert_rejected(
        &app,
        &token,
        json!({"nonce": "fake-valid-nonce", "cart": []}),
        "Cart is empty, cannot process payment",
    )
    .await;
}

#[tokio::test]
async fn absent_cart_field_is_rejected_as_empty() {
    let (app, token) = buyer_app().await;
    assert_rejected(
        &app,
        &token,
        json!({"nonce": "fake-valid-nonce"}),
        "Cart is empty, cannot process payment",
    )
    .await;
}

#[tokio::test]
async fn item_without_price_is_rejected() {
    let (app, token) = buyer_app().await;
    assert_rejected(
        &app,
        &token,
        json!({"nonce": "fake-valid-nonce", "cart": [{"price": 10.0}, {"name": "unpriced"}]}),
        "Price is missing in cart",
    )
    .await;
}

#[tokio::test]
async fn string_price_is_rejected() {
    let (app, token) = buyer_app().await;
    assert_rejected(
        &app,
        &token,
        json!({"nonce": "fake-valid-nonce", "cart": [{"price": "100"}]}),
        "Invalid price in cart, prices must be numeric",
    )
    .await;
}

#[tokio::test]
async fn negative_price_is_rejected() {
    // Scenario: {nonce: "valid", cart: [{price: -50}]}
    let (app, token) = buyer_app().await;
    assert_rejected(
        &app,
        &token,
        json!({"nonce": "fake-valid-nonce", "cart": [{"price": -50.0}]}),
        "Invalid price in cart, prices must be non-negative",
    )
    .await;
}

#[tokio::test]
async fn payment_requires_authentication() {
    let app = TestApp::with_gateway(Arc::new(untouchable_gateway())).await;

    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": [{"price": 10.0}]})),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
