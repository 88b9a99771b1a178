//! Subcategories a company declares itself part of.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (`company_id`, `subcategory_id`) pair
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "company_subcategories")]
pub struct Model {
    /// Declaring company
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: String,
    /// Declared subcategory
    #[sea_orm(primary_key, auto_increment = false)]
    pub subcategory_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
