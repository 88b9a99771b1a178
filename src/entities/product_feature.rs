//! Free-text feature tags attached to a product.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (`product_id`, `feature`) pair
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "product_features")]
pub struct Model {
    /// Tagged product
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    /// Free-form feature tag
    #[sea_orm(primary_key, auto_increment = false)]
    pub feature: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
