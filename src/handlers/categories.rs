use crate::auth::{AuthRouterExt, AuthenticatedUser};
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for category endpoints
pub fn category_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_category))
        .route("/:id", put(update_category))
        .route("/:id", delete(delete_category))
        .with_admin();

    Router::new()
        .route("/", get(list_categories))
        .route("/slug/:slug", get(get_category))
        .merge(admin)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/category",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Object),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate category", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .create(&payload.name)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(category))
}

/// List all categories
#[utoipa::path(
    get,
    path = "/api/v1/category",
    responses((status = 200, description = "All categories", body = Object)),
    tag = "Categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .categories
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

/// Fetch a single category by its slug
#[utoipa::path(
    get,
    path = "/api/v1/category/slug/:slug",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category", body = Object),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .get_by_slug(&slug)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/api/v1/category/:id",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Object),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .update(id, &payload.name)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

/// Delete a category. Products keep their category reference.
#[utoipa::path(
    delete,
    path = "/api/v1/category/:id",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .categories
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
