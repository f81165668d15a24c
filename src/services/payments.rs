//! Payment gateway adapter and checkout orchestration.
//!
//! The gateway trait is the seam between the storefront and the external
//! processor: the production implementation talks to the Braintree-style
//! sandbox over HTTP, and tests substitute a double without touching the
//! validation logic. One `sale` call produces exactly one awaited outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::GatewayConfig,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{cart, orders::OrderService},
};

/// Client token handed to the frontend payment widget.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ClientToken {
    pub client_token: String,
}

/// The processor's "sale" operation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub amount: f64,
    pub payment_method_nonce: String,
    pub options: SaleOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOptions {
    pub submit_for_settlement: bool,
}

/// Transaction outcome as reported by the processor. Persisted into the
/// order verbatim; never stored on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransactionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Failure reaching or understanding the processor. Declines are NOT errors
/// at this level; they come back as `TransactionResult { success: false }`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),
    #[error("unexpected gateway response: {0}")]
    Protocol(String),
}

/// The seam to the external payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Issue a client token for the frontend widget.
    async fn generate_client_token(&self) -> Result<ClientToken, GatewayError>;

    /// Submit a sale for settlement. Resolves exactly once per call.
    async fn sale(&self, request: SaleRequest) -> Result<TransactionResult, GatewayError>;
}

/// Production gateway over the processor's sandbox REST surface.
pub struct BraintreeGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl BraintreeGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn merchant_url(&self, path: &str) -> String {
        format!(
            "{}/merchants/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.merchant_id,
            path
        )
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .post(self.merchant_url(path))
            .basic_auth(&self.config.public_key, Some(&self.config.private_key))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Transport(format!(
                "gateway returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    async fn generate_client_token(&self) -> Result<ClientToken, GatewayError> {
        self.post_json("client_token", &serde_json::json!({})).await
    }

    async fn sale(&self, request: SaleRequest) -> Result<TransactionResult, GatewayError> {
        self.post_json("transactions", &request).await
    }
}

/// Checkout payload: a payment-method nonce plus the client-asserted cart.
/// Both fields default so that an absent key is reported by cart validation
/// rather than as a deserialization failure.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct PaymentRequest {
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub cart: Vec<Value>,
}

/// Orchestrates a single payment attempt: validate, charge, persist.
///
/// Every failure is terminal for the request; there is no retry loop and no
/// compensation once a charge has settled.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<OrderService>,
    event_sender: EventSender,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<OrderService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            gateway,
            orders,
            event_sender,
        }
    }

    /// Fetch a client token for the frontend payment widget.
    pub async fn client_token(&self) -> Result<ClientToken, ServiceError> {
        self.gateway
            .generate_client_token()
            .await
            .map_err(|e| ServiceError::GatewayError(e.to_string()))
    }

    /// Run one payment attempt to completion.
    ///
    /// The cart is validated before any network call; the gateway is invoked
    /// with the computed total; the order is recorded only after the
    /// processor reports success. A store failure after settlement surfaces
    /// as an error without voiding the charge.
    #[instrument(skip(self, request), fields(buyer_id = %buyer_id))]
    pub async fn checkout(
        &self,
        buyer_id: Uuid,
        request: PaymentRequest,
    ) -> Result<(), ServiceError> {
        let total = cart::validate_and_total(&request.nonce, &request.cart)?;

        let result = self
            .gateway
            .sale(SaleRequest {
                amount: total,
                payment_method_nonce: request.nonce.clone(),
                options: SaleOptions {
                    submit_for_settlement: true,
                },
            })
            .await
            .map_err(|e| {
                warn!("gateway transport failure: {e}");
                ServiceError::GatewayError(e.to_string())
            })?;

        if !result.success {
            let message = result
                .message
                .clone()
                .unwrap_or_else(|| "Transaction failed".to_string());
            warn!(%message, "gateway declined transaction");
            return Err(ServiceError::PaymentFailed(message));
        }

        let order = self
            .orders
            .record_checkout(buyer_id, &request.cart, &result)
            .await?;

        info!(order_id = %order.id, total, "checkout settled and recorded");
        self.event_sender
            .send(Event::PaymentCaptured {
                order_id: order.id,
                amount: total,
            })
            .await;

        Ok(())
    }
}
