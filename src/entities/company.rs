//! Company entity - A vendor that lists products.
//!
//! The categories and subcategories a company declares live in the
//! `company_categories` / `company_subcategories` association tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Opaque unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Company name
    pub name: String,
    /// Reference returned by the asset store for the company logo
    pub logo_ref: Option<String>,
    /// When the company was created
    pub created_at: DateTimeUtc,
    /// When the company was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
