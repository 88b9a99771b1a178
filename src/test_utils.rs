//! Shared test utilities for the catalog engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        assets::AssetStore,
        category::{self, CategoryInput},
        company::{self, CompanyInput},
        product::{self, ProductInput},
        subcategory::{self, SubcategoryInput},
    },
    entities,
    errors::Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test company with no logo and no declared categories.
pub async fn create_test_company(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::company::Model> {
    company::create_company(
        db,
        CompanyInput {
            name: name.to_string(),
            ..CompanyInput::default()
        },
    )
    .await
}

/// Creates a test category with no logo.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        CategoryInput {
            name: name.to_string(),
            logo_ref: None,
        },
    )
    .await
}

/// Creates a test subcategory, optionally under `category_id`.
pub async fn create_test_subcategory(
    db: &DatabaseConnection,
    name: &str,
    category_id: Option<&str>,
) -> Result<entities::subcategory::Model> {
    subcategory::create_subcategory(
        db,
        SubcategoryInput {
            name: name.to_string(),
            category_id: category_id.map(str::to_string),
        },
    )
    .await
}

/// Creates an untagged, undiscounted product with a custom price.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    base_price: f64,
    company_id: &str,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        ProductInput {
            name: name.to_string(),
            company_id: company_id.to_string(),
            base_price,
            ..ProductInput::default()
        },
    )
    .await
}

/// Creates a product that carries a stored discount.
///
/// `expiry` may lie in the past, which gives a product whose discount has ended.
pub async fn create_discounted_product(
    db: &DatabaseConnection,
    name: &str,
    base_price: f64,
    discounted_price: f64,
    expiry: DateTime<Utc>,
    company_id: &str,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        ProductInput {
            name: name.to_string(),
            company_id: company_id.to_string(),
            base_price,
            discounted_price: Some(discounted_price),
            discount_expiry: Some(expiry),
            ..ProductInput::default()
        },
    )
    .await
}

/// Creates a product priced at 10.0 with the given tags.
pub async fn create_tagged_product(
    db: &DatabaseConnection,
    name: &str,
    company_id: &str,
    category_ids: &[String],
    subcategory_ids: &[String],
    features: &[String],
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        ProductInput {
            name: name.to_string(),
            company_id: company_id.to_string(),
            base_price: 10.0,
            category_ids: category_ids.to_vec(),
            subcategory_ids: subcategory_ids.to_vec(),
            features: features.to_vec(),
            ..ProductInput::default()
        },
    )
    .await
}

/// Sets up a complete test environment with a company.
/// Returns (db, company) for product-related tests.
pub async fn setup_with_company() -> Result<(DatabaseConnection, entities::company::Model)> {
    let db = setup_test_db().await?;
    let company = create_test_company(&db, "Test Company").await?;
    Ok((db, company))
}

/// An in-memory product model that was never stored, for pure-function tests.
#[must_use]
pub fn sample_product_model(base_price: f64) -> entities::product::Model {
    let now = Utc::now();
    entities::product::Model {
        id: "sample".to_string(),
        name: "Sample".to_string(),
        name_folded: "sample".to_string(),
        description: None,
        picture_ref: None,
        company_id: "company".to_string(),
        base_price,
        discounted_price: None,
        discount_expiry: None,
        discount_percentage: None,
        created_at: now,
        updated_at: now,
    }
}

/// Asset store keeping everything in memory and recording deletions.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: Mutex<HashMap<String, Vec<u8>>>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryAssetStore {
    /// References passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted
            .lock()
            .map(|deleted| deleted.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn store(&self, bytes: &[u8], filename: &str) -> Result<String> {
        let extension = crate::core::assets::image_extension(filename)?;
        let reference = format!("mem://{}.{extension}", uuid::Uuid::new_v4());
        if let Ok(mut assets) = self.assets.lock() {
            assets.insert(reference.clone(), bytes.to_vec());
        }
        Ok(reference)
    }

    async fn load(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .assets
            .lock()
            .ok()
            .and_then(|assets| assets.get(reference).cloned()))
    }

    async fn delete(&self, reference: &str) -> Result<()> {
        if let Ok(mut assets) = self.assets.lock() {
            assets.remove(reference);
        }
        if let Ok(mut deleted) = self.deleted.lock() {
            deleted.push(reference.to_string());
        }
        Ok(())
    }
}
