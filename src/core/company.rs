//! Company business logic - companies and the categories/subcategories they declare.
//!
//! What a company declares is independent of how its products are tagged; the
//! category browsing view ([`crate::core::projection::companies_for_category`]) looks at
//! the products, not at these declarations.

use crate::{
    core::{
        assets::{self, AssetStore},
        links,
        projection::{self, ResolvedCompany},
    },
    entities::{Company, company},
    errors::{EntityKind, Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Payload for creating a company.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    /// Company name
    pub name: String,
    /// Logo reference from the asset store
    pub logo_ref: Option<String>,
    /// Declared categories
    #[serde(default)]
    pub category_ids: Vec<String>,
    /// Declared subcategories
    #[serde(default)]
    pub subcategory_ids: Vec<String>,
}

/// Payload for updating a company. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    /// New name
    pub name: Option<String>,
    /// New logo reference; the previous logo is deleted from the asset store
    pub logo_ref: Option<String>,
    /// Replacement category set
    pub category_ids: Option<Vec<String>>,
    /// Replacement subcategory set
    pub subcategory_ids: Option<Vec<String>>,
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Company name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Lists all companies ordered by name, with their declared categories resolved.
pub async fn list_companies(db: &DatabaseConnection) -> Result<Vec<ResolvedCompany>> {
    let companies = Company::find()
        .order_by_asc(company::Column::Name)
        .all(db)
        .await?;
    projection::resolve_companies(db, companies).await
}

async fn find_company<C>(db: &C, company_id: &str) -> Result<company::Model>
where
    C: ConnectionTrait,
{
    Company::find_by_id(company_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Company, company_id))
}

/// Retrieves a company by id, resolved.
///
/// # Errors
/// Returns `NotFound` if there is no such company.
pub async fn get_company(db: &DatabaseConnection, company_id: &str) -> Result<ResolvedCompany> {
    let company = find_company(db, company_id).await?;
    let mut resolved = projection::resolve_companies(db, vec![company]).await?;
    resolved
        .pop()
        .ok_or_else(|| Error::not_found(EntityKind::Company, company_id))
}

/// Creates a company with its declared categories and subcategories.
///
/// # Errors
/// Returns `Validation` for an empty name, `NotFound` for an unknown category or
/// subcategory, or a database error.
pub async fn create_company(db: &DatabaseConnection, input: CompanyInput) -> Result<company::Model> {
    let name = validated_name(&input.name)?;
    let category_ids = links::normalize_set(input.category_ids);
    let subcategory_ids = links::normalize_set(input.subcategory_ids);

    let txn = db.begin().await?;
    links::ensure_exist(&txn, EntityKind::Category, &category_ids).await?;
    links::ensure_exist(&txn, EntityKind::Subcategory, &subcategory_ids).await?;

    let now = Utc::now();
    let company = company::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name),
        logo_ref: Set(input.logo_ref),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = company.insert(&txn).await?;
    links::set_company_categories(&txn, &created.id, &category_ids).await?;
    links::set_company_subcategories(&txn, &created.id, &subcategory_ids).await?;
    txn.commit().await?;

    info!(company_id = %created.id, name = %created.name, "Company created");
    Ok(created)
}

/// Updates a company. Category and subcategory sets that are provided replace the current ones.
///
/// # Errors
/// Returns `Validation` for an empty name, `NotFound` for an unknown company, category
/// or subcategory, or a database error.
pub async fn update_company(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    company_id: &str,
    update: CompanyUpdate,
) -> Result<company::Model> {
    let name = update.name.as_deref().map(validated_name).transpose()?;

    let txn = db.begin().await?;
    let existing = find_company(&txn, company_id).await?;
    let replaced_logo = match &update.logo_ref {
        Some(new_logo) if existing.logo_ref.as_ref() != Some(new_logo) => existing.logo_ref.clone(),
        _ => None,
    };

    let mut company: company::ActiveModel = existing.into();
    if let Some(name) = name {
        company.name = Set(name);
    }
    if let Some(logo_ref) = update.logo_ref {
        company.logo_ref = Set(Some(logo_ref));
    }
    company.updated_at = Set(Utc::now());
    let updated = company.update(&txn).await?;

    if let Some(category_ids) = update.category_ids {
        let category_ids = links::normalize_set(category_ids);
        links::ensure_exist(&txn, EntityKind::Category, &category_ids).await?;
        links::set_company_categories(&txn, company_id, &category_ids).await?;
    }
    if let Some(subcategory_ids) = update.subcategory_ids {
        let subcategory_ids = links::normalize_set(subcategory_ids);
        links::ensure_exist(&txn, EntityKind::Subcategory, &subcategory_ids).await?;
        links::set_company_subcategories(&txn, company_id, &subcategory_ids).await?;
    }
    txn.commit().await?;

    assets::discard(assets, replaced_logo.as_deref()).await;
    info!(company_id, "Company updated");
    Ok(updated)
}

/// Deletes a company, its declarations and its logo. Its products are kept and their
/// company reference resolves to nothing from then on.
///
/// # Errors
/// Returns `NotFound` if there is no such company, or a database error.
pub async fn delete_company(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    company_id: &str,
) -> Result<company::Model> {
    let txn = db.begin().await?;
    let existing = find_company(&txn, company_id).await?;
    links::clear_company_links(&txn, company_id).await?;
    Company::delete_by_id(company_id).exec(&txn).await?;
    txn.commit().await?;

    assets::discard(assets, existing.logo_ref.as_deref()).await;
    info!(company_id, "Company deleted");
    Ok(existing)
}
