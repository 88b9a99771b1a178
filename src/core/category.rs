//! Category business logic - create, read, update and delete categories.
//!
//! Category names are unique. Deleting a category does not touch the products,
//! companies or subcategories that reference it; those references dangle and are
//! resolved to nothing on read.

use crate::{
    config::catalog::Config as CatalogConfig,
    core::assets::{self, AssetStore},
    entities::{Category, Subcategory, category, subcategory},
    errors::{EntityKind, Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Payload for creating a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    /// Unique display name
    pub name: String,
    /// Logo reference from the asset store
    pub logo_ref: Option<String>,
}

/// Payload for updating a category. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    /// New display name
    pub name: Option<String>,
    /// New logo reference; the previous logo is deleted from the asset store
    pub logo_ref: Option<String>,
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }
    Ok(name.to_string())
}

async fn ensure_name_free<C>(db: &C, name: &str, except_id: Option<&str>) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await?;
    match existing {
        Some(existing) if Some(existing.id.as_str()) != except_id => Err(Error::Conflict {
            message: format!("A category named '{name}' already exists"),
        }),
        _ => Ok(()),
    }
}

/// Retrieves all categories, ordered alphabetically by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by id.
///
/// # Errors
/// Returns `NotFound` if there is no such category.
pub async fn get_category(db: &DatabaseConnection, category_id: &str) -> Result<category::Model> {
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Category, category_id))
}

/// Finds a category by its exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new category.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only (`Validation`)
/// - Another category already has this name (`Conflict`)
/// - The database insert fails
pub async fn create_category(
    db: &DatabaseConnection,
    input: CategoryInput,
) -> Result<category::Model> {
    let name = validated_name(&input.name)?;
    ensure_name_free(db, &name, None).await?;

    let now = Utc::now();
    let category = category::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name),
        logo_ref: Set(input.logo_ref),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = category.insert(db).await?;
    info!(category_id = %created.id, name = %created.name, "Category created");
    Ok(created)
}

/// Updates a category's name and/or logo.
///
/// # Errors
/// Returns an error if:
/// - The new name is empty (`Validation`) or taken by another category (`Conflict`)
/// - The category does not exist (`NotFound`)
/// - The database update fails
pub async fn update_category(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    category_id: &str,
    update: CategoryUpdate,
) -> Result<category::Model> {
    let name = update.name.as_deref().map(validated_name).transpose()?;

    let existing = get_category(db, category_id).await?;
    if let Some(name) = &name {
        ensure_name_free(db, name, Some(category_id)).await?;
    }

    let replaced_logo = match &update.logo_ref {
        Some(new_logo) if existing.logo_ref.as_ref() != Some(new_logo) => existing.logo_ref.clone(),
        _ => None,
    };

    let mut category: category::ActiveModel = existing.into();
    if let Some(name) = name {
        category.name = Set(name);
    }
    if let Some(logo_ref) = update.logo_ref {
        category.logo_ref = Set(Some(logo_ref));
    }
    category.updated_at = Set(Utc::now());
    let updated = category.update(db).await?;

    assets::discard(assets, replaced_logo.as_deref()).await;
    info!(category_id, "Category updated");
    Ok(updated)
}

/// Deletes a category and its logo. References to it are left dangling.
///
/// # Errors
/// Returns `NotFound` if there is no such category, or a database error.
pub async fn delete_category(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    category_id: &str,
) -> Result<category::Model> {
    let existing = get_category(db, category_id).await?;
    Category::delete_by_id(category_id).exec(db).await?;

    assets::discard(assets, existing.logo_ref.as_deref()).await;
    info!(category_id, "Category deleted");
    Ok(existing)
}

/// Creates the categories and subcategories listed in the seed configuration.
///
/// Categories that already exist (by name) are skipped, together with their subcategories.
/// Returns the number of categories created.
pub async fn seed_categories(db: &DatabaseConnection, config: &CatalogConfig) -> Result<usize> {
    let mut created = 0;
    for seed in &config.categories {
        let name = validated_name(&seed.name)?;
        if get_category_by_name(db, &name).await?.is_some() {
            continue;
        }

        let txn = db.begin().await?;
        let now = Utc::now();
        let category = category::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name),
            logo_ref: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let subcategories: Vec<subcategory::ActiveModel> = seed
            .subcategories
            .iter()
            .map(|sub| sub.trim())
            .filter(|sub| !sub.is_empty())
            .map(|sub| subcategory::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                name: Set(sub.to_string()),
                category_id: Set(Some(category.id.clone())),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .collect();
        if !subcategories.is_empty() {
            Subcategory::insert_many(subcategories)
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;
        created += 1;
    }

    info!(created, "Catalog categories seeded");
    Ok(created)
}
