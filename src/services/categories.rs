//! Category CRUD.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::category::{self, Entity as Category},
    errors::ServiceError,
    services::slugify,
};

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<category::Model, ServiceError> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Category name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let existing = Category::find()
            .filter(category::Column::Slug.eq(slug.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Category \"{}\" already exists",
                name
            )));
        }

        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(slug),
        };

        Ok(model.insert(&*self.db).await?)
    }

    pub async fn list(&self) -> Result<Vec<category::Model>, ServiceError> {
        let categories = Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(categories)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<category::Model, ServiceError> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category \"{}\" not found", slug)))
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, name: &str) -> Result<category::Model, ServiceError> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Category name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let existing = Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))?;

        let taken = Category::find()
            .filter(category::Column::Slug.eq(slug.clone()))
            .filter(category::Column::Id.ne(id))
            .one(&*self.db)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Category \"{}\" already exists",
                name
            )));
        }

        let mut update: category::ActiveModel = existing.into();
        update.name = Set(name.to_string());
        update.slug = Set(slug);

        Ok(update.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Category::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }
}
