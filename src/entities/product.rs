use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product entity for the catalog.
///
/// `category_id` is a plain column rather than a foreign key: catalog rows
/// reference each other the way the document store they mirror did, and
/// deleting a category leaves its products in place.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub sold: i32,
    pub category_id: Uuid,
    pub shipping: bool,
    // Raw image bytes; excluded from list queries and served by the photo
    // endpoint with `photo_content_type`.
    #[sea_orm(column_type = "Blob", nullable)]
    #[serde(skip_serializing, default)]
    pub photo: Option<Vec<u8>>,
    pub photo_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
