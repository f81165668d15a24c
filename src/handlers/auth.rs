use crate::auth::{AuthRouterExt, AuthenticatedUser, TokenResponse};
use crate::entities::{order, user};
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::services::users::{RegisterInput, UpdateProfileInput};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for auth and account endpoints
pub fn auth_routes() -> Router<AppState> {
    let signed_in = Router::new()
        .route("/auth-check", get(auth_check))
        .route("/profile", put(update_profile))
        .route("/orders", get(my_orders))
        .with_auth();

    let admin = Router::new()
        .route("/admin-check", get(admin_check))
        .route("/all-orders", get(all_orders))
        .route("/order-status/:id", put(update_order_status))
        .with_admin();

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(signed_in)
        .merge(admin)
}

// Request/Response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: order::OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: user::UserRole,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            address: model.address,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: TokenResponse,
}

/// Register a new customer account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .register(RegisterInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            address: payload.address,
        })
        .await
        .map_err(map_service_error)?;

    let token = state
        .auth_service
        .generate_token(&user)
        .map_err(|e| map_service_error(e.into()))?;

    Ok(created_response(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(map_service_error)?;

    let token = state
        .auth_service
        .generate_token(&user)
        .map_err(|e| map_service_error(e.into()))?;

    Ok(success_response(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Probe used by the client to confirm a token is still valid
pub async fn auth_check(_user: AuthenticatedUser) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(serde_json::json!({ "ok": true })))
}

/// Probe used by the client to confirm the token carries the admin role
pub async fn admin_check(_user: AuthenticatedUser) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(serde_json::json!({ "ok": true })))
}

/// Update the signed-in user's profile
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .users
        .update_profile(
            user.0.id,
            UpdateProfileInput {
                name: payload.name,
                password: payload.password,
                address: payload.address,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(UserResponse::from(updated)))
}

/// Purchase history for the signed-in buyer
#[utoipa::path(
    get,
    path = "/api/v1/auth/orders",
    responses(
        (status = 200, description = "Orders for the signed-in buyer", body = Object),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn my_orders(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .list_for_buyer(user.0.id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Every order in the store. Admin only.
pub async fn all_orders(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .list_all()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Move an order through its lifecycle. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/auth/order-status/:id",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = Object),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn update_order_status(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .update_status(id, payload.status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}
