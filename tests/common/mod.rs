use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    middleware, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use storefront_api::{
    auth::{password, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::user::{self, UserRole},
    events::{self, EventSender},
    handlers::AppServices,
    services::payments::{ClientToken, GatewayError, PaymentGateway, SaleRequest, TransactionResult},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

// Gateway test double generated against the production trait.
mockall::mock! {
    pub Gateway {}

    #[async_trait::async_trait]
    impl PaymentGateway for Gateway {
        async fn generate_client_token(&self) -> Result<ClientToken, GatewayError>;
        async fn sale(&self, request: SaleRequest) -> Result<TransactionResult, GatewayError>;
    }
}

/// Helper harness running the full router against in-memory SQLite with an
/// injected gateway double.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a test application around the given gateway.
    pub async fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_0123456789_abcdefghijklmnop".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::bootstrap_schema(&pool)
            .await
            .expect("failed to bootstrap schema in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        );
        let auth_service = Arc::new(AuthService::new(auth_cfg));

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), gateway);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth_service: auth_service.clone(),
            services,
        };

        let api_router =
            storefront_api::api_v1_routes().layer(middleware::from_fn_with_state(
                auth_service,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ));

        let router = Router::new()
            .nest("/api/v1", api_router)
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Insert a user with a known password and return it with a bearer token.
    pub async fn seed_user(
        &self,
        email: &str,
        raw_password: &str,
        role: UserRole,
    ) -> (user::Model, String) {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Test User".to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password::hash_password(raw_password).expect("hash password")),
            role: Set(role),
            address: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let user = model
            .insert(&*self.state.db)
            .await
            .expect("seed user for tests");

        let token = self
            .state
            .auth_service
            .generate_token(&user)
            .expect("token for seeded user")
            .access_token;

        (user, token)
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Decode a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// A gateway double that must never be reached.
#[allow(dead_code)]
pub fn untouchable_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_sale().times(0);
    gateway.expect_generate_client_token().times(0);
    gateway
}
