//! The checkout HTTP surface.
//!
//! Token issuance is public (the widget fetches it before sign-in completes);
//! submitting a payment requires an authenticated buyer, whose id becomes the
//! order's buyer reference.

use crate::auth::{AuthRouterExt, AuthenticatedUser};
use crate::handlers::common::{map_service_error, success_response};
use crate::services::payments::PaymentRequest;
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};

/// Creates the router for the payment gateway endpoints
pub fn braintree_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/payment", post(submit_payment))
        .with_auth();

    Router::new()
        .route("/token", post(client_token))
        .merge(protected)
}

/// Issue a gateway client token for the frontend payment widget
#[utoipa::path(
    post,
    path = "/api/v1/product/braintree/token",
    responses(
        (status = 200, description = "Gateway client token", body = crate::services::payments::ClientToken),
        (status = 500, description = "Gateway error", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn client_token(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .services
        .payments
        .client_token()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(token))
}

/// Run a payment attempt: validate the cart, charge the gateway, record the
/// order
#[utoipa::path(
    post,
    path = "/api/v1/product/braintree/payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Charge settled and order recorded", body = Object),
        (status = 400, description = "Cart rejected before charging", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Gateway or persistence failure", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Payments"
)]
pub async fn submit_payment(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<PaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .payments
        .checkout(user.0.id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({ "ok": true })))
}
