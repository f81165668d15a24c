//! Product catalog: CRUD plus the filtered, paginated, sorted read surface.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::product::{self, Entity as Product},
    errors::ServiceError,
    services::slugify,
};

const RELATED_LIMIT: u64 = 6;

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: Uuid,
    pub shipping: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub category_id: Option<Uuid>,
    pub shipping: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ProductListQuery {
    pub page: u64,
    pub per_page: u64,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductFilter {
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}

/// Product row without the photo bytes; what every list endpoint returns.
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub sold: i32,
    pub category_id: Uuid,
    pub shipping: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    pub items: Vec<ProductSummary>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn summary_select() -> sea_orm::Select<Product> {
        Product::find().select_only().columns([
            product::Column::Id,
            product::Column::Name,
            product::Column::Slug,
            product::Column::Description,
            product::Column::Price,
            product::Column::Quantity,
            product::Column::Sold,
            product::Column::CategoryId,
            product::Column::Shipping,
            product::Column::CreatedAt,
            product::Column::UpdatedAt,
        ])
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        if input.price < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Product price cannot be negative".to_string(),
            ));
        }

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Product name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let existing = Product::find()
            .filter(product::Column::Slug.eq(slug.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A product named \"{}\" already exists",
                input.name
            )));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(slug),
            description: Set(input.description),
            price: Set(input.price),
            quantity: Set(input.quantity),
            sold: Set(0),
            category_id: Set(input.category_id),
            shipping: Set(input.shipping),
            photo: Set(None),
            photo_content_type: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&*self.db).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<ProductSummary, ServiceError> {
        Self::summary_select()
            .filter(product::Column::Slug.eq(slug))
            .into_model::<ProductSummary>()
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product \"{}\" not found", slug)))
    }

    async fn get_model(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Paginated, sorted product listing. Photo bytes are never fetched here.
    pub async fn list(&self, query: ProductListQuery) -> Result<ProductPage, ServiceError> {
        let sort_column = match query.sort_by.as_deref() {
            Some("price") => product::Column::Price,
            Some("sold") => product::Column::Sold,
            Some("name") => product::Column::Name,
            _ => product::Column::CreatedAt,
        };
        let sort_order = match query.sort_order.as_deref() {
            Some("asc") => Order::Asc,
            _ => Order::Desc,
        };

        let page = query.page.max(1);
        let per_page = query.per_page.max(1);

        let paginator = Self::summary_select()
            .order_by(sort_column, sort_order)
            .into_model::<ProductSummary>()
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        let total_pages = total.div_ceil(per_page);

        Ok(ProductPage {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Keyword search over name and description.
    pub async fn search(&self, keyword: &str) -> Result<Vec<ProductSummary>, ServiceError> {
        let items = Self::summary_select()
            .filter(
                Condition::any()
                    .add(product::Column::Name.contains(keyword))
                    .add(product::Column::Description.contains(keyword)),
            )
            .order_by_desc(product::Column::CreatedAt)
            .into_model::<ProductSummary>()
            .all(&*self.db)
            .await?;

        Ok(items)
    }

    /// Category and price-range filtering, as submitted by the shop sidebar.
    pub async fn filter(&self, filter: ProductFilter) -> Result<Vec<ProductSummary>, ServiceError> {
        let mut condition = Condition::all();
        if !filter.categories.is_empty() {
            condition = condition.add(product::Column::CategoryId.is_in(filter.categories));
        }
        if let Some(range) = filter.price_range {
            condition = condition.add(product::Column::Price.between(range.min, range.max));
        }

        let items = Self::summary_select()
            .filter(condition)
            .order_by_desc(product::Column::CreatedAt)
            .into_model::<ProductSummary>()
            .all(&*self.db)
            .await?;

        Ok(items)
    }

    /// Other products in the same category.
    pub async fn related(&self, id: Uuid) -> Result<Vec<ProductSummary>, ServiceError> {
        let product = self.get_model(id).await?;

        let items = Self::summary_select()
            .filter(product::Column::CategoryId.eq(product.category_id))
            .filter(product::Column::Id.ne(id))
            .limit(RELATED_LIMIT)
            .into_model::<ProductSummary>()
            .all(&*self.db)
            .await?;

        Ok(items)
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        if let Some(price) = input.price.as_ref() {
            if *price < Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Product price cannot be negative".to_string(),
                ));
            }
        }

        let existing = self.get_model(id).await?;
        let mut update: product::ActiveModel = existing.into();

        if let Some(name) = input.name {
            let slug = slugify(&name);
            if slug.is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Product name must contain at least one alphanumeric character".to_string(),
                ));
            }
            let taken = Product::find()
                .filter(product::Column::Slug.eq(slug.clone()))
                .filter(product::Column::Id.ne(id))
                .one(&*self.db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "A product named \"{}\" already exists",
                    name
                )));
            }
            update.name = Set(name);
            update.slug = Set(slug);
        }
        if let Some(description) = input.description {
            update.description = Set(description);
        }
        if let Some(price) = input.price {
            update.price = Set(price);
        }
        if let Some(quantity) = input.quantity {
            update.quantity = Set(quantity);
        }
        if let Some(category_id) = input.category_id {
            update.category_id = Set(category_id);
        }
        if let Some(shipping) = input.shipping {
            update.shipping = Set(shipping);
        }
        update.updated_at = Set(Utc::now());

        Ok(update.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Product::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    /// Raw photo bytes with their content type.
    pub async fn photo(&self, id: Uuid) -> Result<(Vec<u8>, String), ServiceError> {
        let product = self.get_model(id).await?;
        match (product.photo, product.photo_content_type) {
            (Some(bytes), Some(content_type)) => Ok((bytes, content_type)),
            _ => Err(ServiceError::NotFound(format!(
                "Product {} has no photo",
                id
            ))),
        }
    }

    #[instrument(skip(self, bytes))]
    pub async fn set_photo(
        &self,
        id: Uuid,
        bytes: Vec<u8>,
        content_type: String,
    ) -> Result<(), ServiceError> {
        let existing = self.get_model(id).await?;
        let mut update: product::ActiveModel = existing.into();
        update.photo = Set(Some(bytes));
        update.photo_content_type = Set(Some(content_type));
        update.updated_at = Set(Utc::now());
        update.update(&*self.db).await?;
        Ok(())
    }
}
