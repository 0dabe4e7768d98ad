use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::localized::LocalizedText;

/// Catalog product. Read-only from the storefront's perspective: rows are
/// authored out of band and this service never mutates them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Localized name, `{"zh": ..., "en": ...}` or a bare legacy string
    #[sea_orm(column_type = "Json")]
    pub name: Json,
    #[sea_orm(column_type = "Json")]
    pub description: Json,
    /// Canonical price in the base currency
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    /// Image URLs as a JSON string array
    #[sea_orm(column_type = "Json")]
    pub images: Json,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn localized_name(&self) -> LocalizedText {
        LocalizedText::from_json(&self.name)
    }

    pub fn localized_description(&self) -> LocalizedText {
        LocalizedText::from_json(&self.description)
    }

    pub fn image_urls(&self) -> Vec<String> {
        serde_json::from_value(self.images.clone()).unwrap_or_default()
    }

    /// A product can go into a cart only while active with stock on hand.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.stock_quantity > 0
    }
}
