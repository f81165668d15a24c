use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
# Storefront API

REST backend for a small storefront: account auth, product and category
management, catalog search and filtering, and a gateway-backed checkout.

## Authentication

Sign in via `/api/v1/auth/login` and pass the issued token as a bearer
credential:

```
Authorization: Bearer <your-jwt-token>
```

Write endpoints on the catalog require the admin role; submitting a payment
requires any signed-in buyer.

## Errors

Failures use a consistent shape with appropriate status codes:

```json
{
  "error": "Bad Request",
  "message": "Cart is empty, cannot process payment",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Accounts, sign-in, and order history"),
        (name = "Categories", description = "Category management"),
        (name = "Products", description = "Catalog management and discovery"),
        (name = "Payments", description = "Gateway checkout endpoints")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::update_profile,
        crate::handlers::auth::my_orders,
        crate::handlers::auth::update_order_status,

        // Categories
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,

        // Products
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::search_products,
        crate::handlers::products::filter_products,
        crate::handlers::products::related_products,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::get_photo,
        crate::handlers::products::upload_photo,

        // Payments
        crate::handlers::payments::client_token,
        crate::handlers::payments::submit_payment,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::auth::TokenResponse,
        crate::handlers::auth::RegisterRequest,
        crate::handlers::auth::LoginRequest,
        crate::handlers::auth::UpdateProfileRequest,
        crate::handlers::auth::UpdateOrderStatusRequest,
        crate::handlers::auth::UserResponse,
        crate::handlers::auth::AuthResponse,
        crate::handlers::categories::CategoryRequest,
        crate::handlers::products::CreateProductRequest,
        crate::handlers::products::UpdateProductRequest,
        crate::services::catalog::ProductSummary,
        crate::services::catalog::ProductPage,
        crate::services::catalog::ProductFilter,
        crate::services::catalog::PriceRange,
        crate::services::payments::ClientToken,
        crate::services::payments::PaymentRequest,
        crate::entities::user::UserRole,
        crate::entities::order::OrderStatus,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI router serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
