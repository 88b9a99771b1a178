//! Category entity - Top-level grouping of the catalog (e.g. "Electronics").
//!
//! Categories carry an optional logo reference pointing into the asset store.
//! Deleting a category does not cascade: products and companies that still
//! list its id simply resolve it to nothing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Opaque unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name, unique across categories
    #[sea_orm(unique)]
    pub name: String,
    /// Reference returned by the asset store for the category logo
    pub logo_ref: Option<String>,
    /// When the category was created
    pub created_at: DateTimeUtc,
    /// When the category was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
