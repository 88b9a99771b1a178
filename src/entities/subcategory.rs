//! Subcategory entity - Second level of the catalog tree.
//!
//! A subcategory points at (at most) one parent category. The pointer is a
//! plain column rather than a foreign key, so a deleted parent leaves it dangling.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subcategory database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "subcategories")]
pub struct Model {
    /// Opaque unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Parent category, if any
    pub category_id: Option<String>,
    /// When the subcategory was created
    pub created_at: DateTimeUtc,
    /// When the subcategory was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
