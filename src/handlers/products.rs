use crate::auth::{AuthRouterExt, AuthenticatedUser};
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::services::catalog::{
    CreateProductInput, ProductFilter, ProductListQuery, UpdateProductInput,
};
use crate::{errors::ApiError, AppState};
use axum::{
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Custom validator for Decimal minimum value
fn validate_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

/// Creates the router for product endpoints
pub fn product_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
        .route("/photo/:id", put(upload_photo))
        .with_admin();

    Router::new()
        .route("/", get(list_products))
        .route("/slug/:slug", get(get_product))
        .route("/search/:keyword", get(search_products))
        .route("/filters", post(filter_products))
        .route("/related/:id", get(related_products))
        .route("/photo/:id", get(get_photo))
        .merge(admin)
        .nest("/braintree", super::payments::braintree_routes())
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 160))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(custom = "validate_decimal_min_zero")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub category_id: Uuid,
    #[serde(default)]
    pub shipping: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 160))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(custom = "validate_decimal_min_zero")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub category_id: Option<Uuid>,
    pub shipping: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Object),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate product name", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn create_product(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .catalog
        .create_product(CreateProductInput {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            quantity: payload.quantity,
            category_id: payload.category_id,
            shipping: payload.shipping,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(product))
}

/// List products, paginated and sorted
#[utoipa::path(
    get,
    path = "/api/v1/product",
    params(ProductListParams),
    responses(
        (status = 200, description = "Page of products", body = crate::services::catalog::ProductPage)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let per_page = params
        .per_page
        .unwrap_or(state.config.api_default_page_size)
        .min(state.config.api_max_page_size);

    let page = state
        .services
        .catalog
        .list(ProductListQuery {
            page: params.page.unwrap_or(1),
            per_page,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

/// Fetch a single product by its slug
#[utoipa::path(
    get,
    path = "/api/v1/product/slug/:slug",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product", body = crate::services::catalog::ProductSummary),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .get_by_slug(&slug)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Keyword search over product names and descriptions
#[utoipa::path(
    get,
    path = "/api/v1/product/search/:keyword",
    params(("keyword" = String, Path, description = "Search keyword")),
    responses(
        (status = 200, description = "Matching products", body = [crate::services::catalog::ProductSummary])
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .search(&keyword)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Filter products by category and price range
#[utoipa::path(
    post,
    path = "/api/v1/product/filters",
    request_body = ProductFilter,
    responses(
        (status = 200, description = "Matching products", body = [crate::services::catalog::ProductSummary])
    ),
    tag = "Products"
)]
pub async fn filter_products(
    State(state): State<AppState>,
    Json(filter): Json<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .filter(filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Other products from the same category
#[utoipa::path(
    get,
    path = "/api/v1/product/related/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Related products", body = [crate::services::catalog::ProductSummary]),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn related_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .related(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/v1/product/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Object),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn update_product(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .catalog
        .update_product(
            id,
            UpdateProductInput {
                name: payload.name,
                description: payload.description,
                price: payload.price,
                quantity: payload.quantity,
                category_id: payload.category_id,
                shipping: payload.shipping,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/product/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Serve a product's photo bytes
#[utoipa::path(
    get,
    path = "/api/v1/product/photo/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Photo bytes"),
        (status = 404, description = "No photo for product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (bytes, content_type) = state
        .services
        .catalog
        .photo(id)
        .await
        .map_err(map_service_error)?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

/// Upload a product photo as a raw request body
#[utoipa::path(
    put,
    path = "/api/v1/product/photo/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content = Vec<u8>, description = "Raw photo bytes"),
    responses(
        (status = 200, description = "Photo stored", body = Object),
        (status = 400, description = "Photo too large or wrong type", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn upload_photo(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !content_type.starts_with("image/") {
        return Err(ApiError::BadRequest {
            message: "Photo uploads must have an image/* content type".to_string(),
        });
    }

    if body.len() > state.config.max_photo_size {
        return Err(ApiError::BadRequest {
            message: format!(
                "Photo exceeds the maximum upload size of {} bytes",
                state.config.max_photo_size
            ),
        });
    }

    state
        .services
        .catalog
        .set_photo(id, body.to_vec(), content_type)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({ "ok": true })))
}
