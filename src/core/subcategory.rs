//! Subcategory business logic.

use crate::{
    core::links,
    entities::{Subcategory, subcategory},
    errors::{EntityKind, Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Payload for creating a subcategory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryInput {
    /// Display name
    pub name: String,
    /// Parent category, must exist when given
    pub category_id: Option<String>,
}

/// Payload for updating a subcategory. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryUpdate {
    /// New display name
    pub name: Option<String>,
    /// New parent category
    pub category_id: Option<String>,
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Subcategory name cannot be empty"));
    }
    Ok(name.to_string())
}

async fn ensure_parent<C>(db: &C, category_id: Option<&String>) -> Result<()>
where
    C: ConnectionTrait,
{
    match category_id {
        Some(id) => links::ensure_exist(db, EntityKind::Category, std::slice::from_ref(id)).await,
        None => Ok(()),
    }
}

/// Lists subcategories ordered by name, optionally only those under `category_id`.
pub async fn list_subcategories(
    db: &DatabaseConnection,
    category_id: Option<&str>,
) -> Result<Vec<subcategory::Model>> {
    let mut query = Subcategory::find().order_by_asc(subcategory::Column::Name);
    if let Some(category_id) = category_id {
        query = query.filter(subcategory::Column::CategoryId.eq(category_id));
    }
    query.all(db).await.map_err(Into::into)
}

/// Retrieves a subcategory by id.
///
/// # Errors
/// Returns `NotFound` if there is no such subcategory.
pub async fn get_subcategory(
    db: &DatabaseConnection,
    subcategory_id: &str,
) -> Result<subcategory::Model> {
    Subcategory::find_by_id(subcategory_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Subcategory, subcategory_id))
}

/// Creates a subcategory, optionally under a parent category.
///
/// # Errors
/// Returns `Validation` for an empty name, `NotFound` for an unknown parent category,
/// or a database error.
pub async fn create_subcategory(
    db: &DatabaseConnection,
    input: SubcategoryInput,
) -> Result<subcategory::Model> {
    let name = validated_name(&input.name)?;
    let category_id = input
        .category_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    ensure_parent(db, category_id.as_ref()).await?;

    let now = Utc::now();
    let subcategory = subcategory::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name),
        category_id: Set(category_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = subcategory.insert(db).await?;
    info!(subcategory_id = %created.id, name = %created.name, "Subcategory created");
    Ok(created)
}

/// Renames a subcategory and/or moves it under another category.
///
/// # Errors
/// Returns `Validation` for an empty name, `NotFound` for an unknown subcategory or
/// parent category, or a database error.
pub async fn update_subcategory(
    db: &DatabaseConnection,
    subcategory_id: &str,
    update: SubcategoryUpdate,
) -> Result<subcategory::Model> {
    let name = update.name.as_deref().map(validated_name).transpose()?;
    let existing = get_subcategory(db, subcategory_id).await?;
    ensure_parent(db, update.category_id.as_ref()).await?;

    let mut subcategory: subcategory::ActiveModel = existing.into();
    if let Some(name) = name {
        subcategory.name = Set(name);
    }
    if let Some(category_id) = update.category_id {
        subcategory.category_id = Set(Some(category_id));
    }
    subcategory.updated_at = Set(Utc::now());
    let updated = subcategory.update(db).await?;
    info!(subcategory_id, "Subcategory updated");
    Ok(updated)
}

/// Deletes a subcategory. Product and company tags pointing at it are left dangling.
///
/// # Errors
/// Returns `NotFound` if there is no such subcategory, or a database error.
pub async fn delete_subcategory(
    db: &DatabaseConnection,
    subcategory_id: &str,
) -> Result<subcategory::Model> {
    let existing = get_subcategory(db, subcategory_id).await?;
    Subcategory::delete_by_id(subcategory_id).exec(db).await?;
    info!(subcategory_id, "Subcategory deleted");
    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_subcategory_with_unknown_parent() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_subcategory(
            &db,
            SubcategoryInput {
                name: "Phones".to_string(),
                category_id: Some("nope".to_string()),
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: EntityKind::Category,
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_subcategories_by_parent() -> Result<()> {
        let db = setup_test_db().await?;
        let electronics = create_test_category(&db, "Electronics").await?;
        let books = create_test_category(&db, "Books").await?;
        create_test_subcategory(&db, "Phones", Some(electronics.id.as_str())).await?;
        create_test_subcategory(&db, "Cameras", Some(electronics.id.as_str())).await?;
        create_test_subcategory(&db, "Novels", Some(books.id.as_str())).await?;
        create_test_subcategory(&db, "Misc", None).await?;

        let names: Vec<String> = list_subcategories(&db, Some(electronics.id.as_str()))
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Cameras", "Phones"]);
        assert_eq!(list_subcategories(&db, None).await?.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_subcategory() -> Result<()> {
        let db = setup_test_db().await?;
        let electronics = create_test_category(&db, "Electronics").await?;
        let sub = create_test_subcategory(&db, "Phone", None).await?;

        let updated = update_subcategory(
            &db,
            &sub.id,
            SubcategoryUpdate {
                name: Some("Phones".to_string()),
                category_id: Some(electronics.id.clone()),
            },
        )
        .await?;
        assert_eq!(updated.name, "Phones");
        assert_eq!(updated.category_id.as_deref(), Some(electronics.id.as_str()));

        delete_subcategory(&db, &sub.id).await?;
        assert!(matches!(
            get_subcategory(&db, &sub.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
