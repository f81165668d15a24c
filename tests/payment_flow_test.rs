//! End-to-end payment attempts: charge, decline, and the persistence
//! failure after settlement.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{response_json, MockGateway, TestApp};
use sea_orm::{ConnectionTrait, Statement};
use serde_json::json;
use storefront_api::{
    entities::user::UserRole,
    services::payments::{ClientToken, GatewayError, TransactionResult},
};

const PAYMENT_URI: &str = "/api/v1/product/braintree/payment";
const TOKEN_URI: &str = "/api/v1/product/braintree/token";

#[tokio::test]
async fn successful_checkout_charges_total_and_records_order() {
    // Scenario: cart [{price:100},{price:200}] -> charge 300, order recorded,
    // response {ok:true}.
    let mut gateway = MockGateway::new();
    gateway
        .expect_sale()
        .withf(|request| {
            request.amount == 300.0
                && request.payment_method_nonce == "fake-valid-nonce"
                && request.options.submit_for_settlement
        })
        .times(1)
        .returning(|request| {
            Ok(TransactionResult {
                success: true,
                transaction: Some(
                    serde_json::from_value(json!({
                        "id": "txn_300",
                        "status": "submitted_for_settlement",
                        "amount": request.amount,
                    }))
                    .unwrap(),
                ),
                message: None,
            })
        });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (user, token) = app
        .seed_user("buyer@example.com", "buyer-password", UserRole::Customer)
        .await;

    let cart = json!([
        {"name": "keyboard", "price": 100.0},
        {"name": "monitor", "price": 200.0}
    ]);
    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": cart})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body, json!({"ok": true}));

    // The order is visible in the buyer's history with the cart snapshot and
    // the gateway result embedded verbatim.
    let orders_response = app
        .request(Method::GET, "/api/v1/auth/orders", None, Some(&token))
        .await;
    assert_eq!(orders_response.status(), StatusCode::OK);
    let orders = response_json(orders_response).await;
    let orders = orders.as_array().expect("orders array");
    assert_eq!(orders.len(), 1);

    let order = &orders[0];
    assert_eq!(order["buyer_id"], json!(user.id));
    assert_eq!(order["status"], "not_processed");
    assert_eq!(order["products"], cart);
    assert_eq!(order["payment"]["success"], json!(true));
    assert_eq!(order["payment"]["transaction"]["id"], "txn_300");
}

#[tokio::test]
async fn zero_price_item_is_chargeable() {
    // Boundary: a single item priced 0 passes validation and charges 0.
    let mut gateway = MockGateway::new();
    gateway
        .expect_sale()
        .withf(|request| request.amount == 0.0)
        .times(1)
        .returning(|_| {
            Ok(TransactionResult {
                success: true,
                transaction: Some(
                    serde_json::from_value(json!({"id": "txn_zero"})).unwrap(),
                ),
                message: None,
            })
        });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (_user, token) = app
        .seed_user("zero@example.com", "buyer-password", UserRole::Customer)
        .await;

    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": [{"price": 0}]})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn declined_transaction_surfaces_message_and_records_nothing() {
    // Scenario: gateway answers {success:false, message:"Transaction declined"}.
    let mut gateway = MockGateway::new();
    gateway.expect_sale().times(1).returning(|_| {
        Ok(TransactionResult {
            success: false,
            transaction: None,
            message: Some("Transaction declined".to_string()),
        })
    });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (_user, token) = app
        .seed_user("declined@example.com", "buyer-password", UserRole::Customer)
        .await;

    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": [{"price": 10.0}]})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Transaction declined");

    let orders_response = app
        .request(Method::GET, "/api/v1/auth/orders", None, Some(&token))
        .await;
    let orders = response_json(orders_response).await;
    assert_eq!(orders.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn decline_without_message_falls_back_to_generic_text() {
    let mut gateway = MockGateway::new();
    gateway.expect_sale().times(1).returning(|_| {
        Ok(TransactionResult {
            success: false,
            transaction: None,
            message: None,
        })
    });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (_user, token) = app
        .seed_user("generic@example.com", "buyer-password", UserRole::Customer)
        .await;

    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": [{"price": 10.0}]})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Transaction failed");
}

#[tokio::test]
async fn gateway_transport_error_is_fatal() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_sale()
        .times(1)
        .returning(|_| Err(GatewayError::Transport("connection reset by peer".into())));

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (_user, token) = app
        .seed_user("transport@example.com", "buyer-password", UserRole::Customer)
        .await;

    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": [{"price": 10.0}]})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["message"], "connection reset by peer");
}

#[tokio::test]
async fn store_failure_after_settlement_surfaces_raw_error() {
    // Scenario: the charge settles, then the order write fails. The request
    // fails with the persistence error; the charge is not reversed (the sale
    // has already run exactly once).
    let mut gateway = MockGateway::new();
    gateway.expect_sale().times(1).returning(|_| {
        Ok(TransactionResult {
            success: true,
            transaction: Some(serde_json::from_value(json!({"id": "txn_orphan"})).unwrap()),
            message: None,
        })
    });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (_user, token) = app
        .seed_user("orphan@example.com", "buyer-password", UserRole::Customer)
        .await;

    // Break the order store out from under the handler.
    let backend = app.state.db.get_database_backend();
    app.state
        .db
        .execute(Statement::from_string(backend, "DROP TABLE orders"))
        .await
        .expect("drop orders table");

    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": [{"price": 10.0}]})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    let message = body["message"].as_str().expect("error message");
    assert!(!message.is_empty());
    assert_ne!(message, "Internal server error");
}

#[tokio::test]
async fn identical_attempts_are_not_deduplicated() {
    // There is no idempotency key: a retried request is a second purchase
    // and charges again.
    let mut gateway = MockGateway::new();
    gateway.expect_sale().times(2).returning(|_| {
        Ok(TransactionResult {
            success: true,
            transaction: Some(serde_json::from_value(json!({"id": "txn_dup"})).unwrap()),
            message: None,
        })
    });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (_user, token) = app
        .seed_user("retry@example.com", "buyer-password", UserRole::Customer)
        .await;

    let payload = json!({"nonce": "fake-valid-nonce", "cart": [{"price": 25.0}]});
    for _ in 0..2 {
        let response = app
            .request(Method::POST, PAYMENT_URI, Some(payload.clone()), Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let orders = response_json(
        app.request(Method::GET, "/api/v1/auth/orders", None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(orders.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn admin_moves_order_through_lifecycle() {
    let mut gateway = MockGateway::new();
    gateway.expect_sale().times(1).returning(|_| {
        Ok(TransactionResult {
            success: true,
            transaction: Some(serde_json::from_value(json!({"id": "txn_life"})).unwrap()),
            message: None,
        })
    });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let (_buyer, buyer_token) = app
        .seed_user("lifecycle@example.com", "buyer-password", UserRole::Customer)
        .await;
    let (_admin, admin_token) = app
        .seed_user("admin@example.com", "admin-password", UserRole::Admin)
        .await;

    let response = app
        .request(
            Method::POST,
            PAYMENT_URI,
            Some(json!({"nonce": "fake-valid-nonce", "cart": [{"price": 75.0}]})),
            Some(&buyer_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Buyers cannot reach the admin order surface.
    let forbidden = app
        .request(Method::GET, "/api/v1/auth/all-orders", None, Some(&buyer_token))
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let all_orders = response_json(
        app.request(Method::GET, "/api/v1/auth/all-orders", None, Some(&admin_token))
            .await,
    )
    .await;
    let order_id = all_orders[0]["id"].as_str().expect("order id").to_string();

    let updated = app
        .request(
            Method::PUT,
            &format!("/api/v1/auth/order-status/{}", order_id),
            Some(json!({"status": "shipped"})),
            Some(&admin_token),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);

    let orders = response_json(
        app.request(Method::GET, "/api/v1/auth/orders", None, Some(&buyer_token))
            .await,
    )
    .await;
    assert_eq!(orders[0]["status"], "shipped");
}

#[tokio::test]
async fn client_token_endpoint_relays_gateway_token() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_generate_client_token()
        .times(1)
        .returning(|| {
            Ok(ClientToken {
                client_token: "sandbox-client-token".to_string(),
            })
        });

    let app = TestApp::with_gateway(Arc::new(gateway)).await;

    let response = app.request(Method::POST, TOKEN_URI, None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["client_token"], "sandbox-client-token");
}

#[tokio::test]
async fn client_token_gateway_failure_is_fatal() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_generate_client_token()
        .times(1)
        .returning(|| Err(GatewayError::Transport("dns failure".into())));

    let app = TestApp::with_gateway(Arc::new(gateway)).await;

    let response = app.request(Method::POST, TOKEN_URI, None, None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["message"], "dns failure");
}
