//! Product <-> category tags.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (`product_id`, `category_id`) pair
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "product_categories")]
pub struct Model {
    /// Tagged product
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    /// Category the product is tagged with
    #[sea_orm(primary_key, auto_increment = false)]
    pub category_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
