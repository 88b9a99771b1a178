//! Product entity - An item listed by a company, with an optional time-bounded discount.
//!
//! The discount columns are never cleared when the expiry passes; whether a
//! discount is in effect is decided on every read by `core::discount`.
//! `discount_percentage` is kept for display only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Opaque unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Product name
    pub name: String,
    /// Lowercased copy of `name`, target of the substring search
    #[serde(default, skip_serializing)]
    pub name_folded: String,
    /// Free-form description
    pub description: Option<String>,
    /// Reference returned by the asset store for the product picture
    pub picture_ref: Option<String>,
    /// The company listing this product
    pub company_id: String,
    /// Regular price, always positive
    pub base_price: f64,
    /// Price while a discount runs
    pub discounted_price: Option<f64>,
    /// Instant after which the discount no longer applies
    pub discount_expiry: Option<DateTimeUtc>,
    /// Percentage the discount was computed from (display hint)
    pub discount_percentage: Option<f64>,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
