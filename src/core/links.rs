//! Association-set plumbing shared by the product and company operations.
//!
//! Links are always written as whole sets: the existing rows for the owner are
//! dropped and the new set is inserted, inside whatever transaction the caller holds.

use crate::{
    entities::{
        Category, CategoryColumn, Company, CompanyCategory, CompanyColumn, CompanySubcategory,
        Product, ProductCategory, ProductColumn, ProductFeature, ProductSubcategory, Subcategory,
        SubcategoryColumn,
        company_category, company_subcategory, product_category, product_feature,
        product_subcategory,
    },
    errors::{EntityKind, Error, Result},
};
use sea_orm::{IntoActiveModel, QuerySelect, Set, prelude::*};
use std::collections::{HashMap, HashSet};

/// Trims every entry, drops empty ones and collapses duplicates (first occurrence wins).
#[must_use]
pub fn normalize_set<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && seen.insert(value.clone()))
        .collect()
}

async fn first_missing<E, C>(db: &C, column: E::Column, ids: &[String]) -> Result<Option<String>>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(None);
    }
    let found: HashSet<String> = E::find()
        .select_only()
        .column(column)
        .filter(column.is_in(ids.iter().cloned()))
        .into_tuple::<String>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    Ok(ids.iter().find(|id| !found.contains(*id)).cloned())
}

/// Fails with `NotFound` on the first id of `ids` that has no record of the given kind.
pub async fn ensure_exist<C>(db: &C, kind: EntityKind, ids: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    let missing = match kind {
        EntityKind::Category => first_missing::<Category, _>(db, CategoryColumn::Id, ids).await?,
        EntityKind::Subcategory => {
            first_missing::<Subcategory, _>(db, SubcategoryColumn::Id, ids).await?
        }
        EntityKind::Company => first_missing::<Company, _>(db, CompanyColumn::Id, ids).await?,
        EntityKind::Product => first_missing::<Product, _>(db, ProductColumn::Id, ids).await?,
    };
    match missing {
        Some(id) => Err(Error::not_found(kind, id)),
        None => Ok(()),
    }
}

/// Replaces every link row of `owner_id` (matched on `owner`) with `rows`.
async fn replace_links<A, C>(
    db: &C,
    owner: <A::Entity as EntityTrait>::Column,
    owner_id: &str,
    rows: Vec<A>,
) -> Result<()>
where
    A: ActiveModelTrait,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    <A::Entity as EntityTrait>::delete_many()
        .filter(owner.eq(owner_id))
        .exec(db)
        .await?;
    if rows.is_empty() {
        return Ok(());
    }
    <A::Entity as EntityTrait>::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn set_product_categories<C>(db: &C, product_id: &str, ids: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    let rows = ids
        .iter()
        .map(|id| product_category::ActiveModel {
            product_id: Set(product_id.to_string()),
            category_id: Set(id.clone()),
        })
        .collect();
    replace_links(db, product_category::Column::ProductId, product_id, rows).await
}

pub async fn set_product_subcategories<C>(db: &C, product_id: &str, ids: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    let rows = ids
        .iter()
        .map(|id| product_subcategory::ActiveModel {
            product_id: Set(product_id.to_string()),
            subcategory_id: Set(id.clone()),
        })
        .collect();
    replace_links(db, product_subcategory::Column::ProductId, product_id, rows).await
}

pub async fn set_product_features<C>(db: &C, product_id: &str, features: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    let rows = features
        .iter()
        .map(|feature| product_feature::ActiveModel {
            product_id: Set(product_id.to_string()),
            feature: Set(feature.clone()),
        })
        .collect();
    replace_links(db, product_feature::Column::ProductId, product_id, rows).await
}

pub async fn set_company_categories<C>(db: &C, company_id: &str, ids: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    let rows = ids
        .iter()
        .map(|id| company_category::ActiveModel {
            company_id: Set(company_id.to_string()),
            category_id: Set(id.clone()),
        })
        .collect();
    replace_links(db, company_category::Column::CompanyId, company_id, rows).await
}

pub async fn set_company_subcategories<C>(db: &C, company_id: &str, ids: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    let rows = ids
        .iter()
        .map(|id| company_subcategory::ActiveModel {
            company_id: Set(company_id.to_string()),
            subcategory_id: Set(id.clone()),
        })
        .collect();
    replace_links(db, company_subcategory::Column::CompanyId, company_id, rows).await
}

/// Drops every link row owned by the product.
pub async fn clear_product_links<C>(db: &C, product_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    set_product_categories(db, product_id, &[]).await?;
    set_product_subcategories(db, product_id, &[]).await?;
    set_product_features(db, product_id, &[]).await
}

/// Drops every link row owned by the company.
pub async fn clear_company_links<C>(db: &C, company_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    set_company_categories(db, company_id, &[]).await?;
    set_company_subcategories(db, company_id, &[]).await
}

fn group_pairs(pairs: Vec<(String, String)>) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (owner, value) in pairs {
        grouped.entry(owner).or_default().push(value);
    }
    grouped
}

/// Association sets of a batch of products, keyed by product id.
#[derive(Debug, Default)]
pub struct ProductLinks {
    /// Category ids per product
    pub categories: HashMap<String, Vec<String>>,
    /// Subcategory ids per product
    pub subcategories: HashMap<String, Vec<String>>,
    /// Feature tags per product
    pub features: HashMap<String, Vec<String>>,
}

pub async fn load_product_links<C>(db: &C, product_ids: &[String]) -> Result<ProductLinks>
where
    C: ConnectionTrait,
{
    if product_ids.is_empty() {
        return Ok(ProductLinks::default());
    }

    let categories = ProductCategory::find()
        .select_only()
        .column(product_category::Column::ProductId)
        .column(product_category::Column::CategoryId)
        .filter(product_category::Column::ProductId.is_in(product_ids.iter().cloned()))
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;
    let subcategories = ProductSubcategory::find()
        .select_only()
        .column(product_subcategory::Column::ProductId)
        .column(product_subcategory::Column::SubcategoryId)
        .filter(product_subcategory::Column::ProductId.is_in(product_ids.iter().cloned()))
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;
    let features = ProductFeature::find()
        .select_only()
        .column(product_feature::Column::ProductId)
        .column(product_feature::Column::Feature)
        .filter(product_feature::Column::ProductId.is_in(product_ids.iter().cloned()))
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;

    Ok(ProductLinks {
        categories: group_pairs(categories),
        subcategories: group_pairs(subcategories),
        features: group_pairs(features),
    })
}

/// Association sets of a batch of companies, keyed by company id.
#[derive(Debug, Default)]
pub struct CompanyLinks {
    /// Category ids per company
    pub categories: HashMap<String, Vec<String>>,
    /// Subcategory ids per company
    pub subcategories: HashMap<String, Vec<String>>,
}

pub async fn load_company_links<C>(db: &C, company_ids: &[String]) -> Result<CompanyLinks>
where
    C: ConnectionTrait,
{
    if company_ids.is_empty() {
        return Ok(CompanyLinks::default());
    }

    let categories = CompanyCategory::find()
        .select_only()
        .column(company_category::Column::CompanyId)
        .column(company_category::Column::CategoryId)
        .filter(company_category::Column::CompanyId.is_in(company_ids.iter().cloned()))
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;
    let subcategories = CompanySubcategory::find()
        .select_only()
        .column(company_subcategory::Column::CompanyId)
        .column(company_subcategory::Column::SubcategoryId)
        .filter(company_subcategory::Column::CompanyId.is_in(company_ids.iter().cloned()))
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;

    Ok(CompanyLinks {
        categories: group_pairs(categories),
        subcategories: group_pairs(subcategories),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_normalize_set_trims_and_dedups() {
        let ids = normalize_set(vec![
            " a ".to_string(),
            String::new(),
            "b".to_string(),
            "a".to_string(),
            "   ".to_string(),
        ]);
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_ensure_exist_reports_first_missing_id() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Electronics").await?;

        ensure_exist(&db, EntityKind::Category, &[category.id.clone()]).await?;

        let result = ensure_exist(
            &db,
            EntityKind::Category,
            &[category.id.clone(), "ghost".to_string()],
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::NotFound { entity: EntityKind::Category, id }) if id == "ghost"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_product_categories_replaces_whole_set() -> Result<()> {
        let db = setup_test_db().await?;

        set_product_categories(&db, "p1", &["c1".to_string(), "c2".to_string()]).await?;
        set_product_categories(&db, "p1", &["c3".to_string()]).await?;

        let links = load_product_links(&db, &["p1".to_string()]).await?;
        assert_eq!(links.categories.get("p1"), Some(&vec!["c3".to_string()]));
        Ok(())
    }

    #[tokio::test]
    async fn test_link_sets_only_touch_their_owner() -> Result<()> {
        let db = setup_test_db().await?;

        set_company_categories(&db, "co1", &["c1".to_string()]).await?;
        set_company_categories(&db, "co2", &["c1".to_string(), "c2".to_string()]).await?;
        set_company_subcategories(&db, "co1", &["s1".to_string()]).await?;
        set_product_features(&db, "p1", &["wifi".to_string()]).await?;

        clear_company_links(&db, "co1").await?;
        set_product_features(&db, "p1", &[]).await?;

        let companies = load_company_links(&db, &["co1".to_string(), "co2".to_string()]).await?;
        assert!(!companies.categories.contains_key("co1"));
        assert!(!companies.subcategories.contains_key("co1"));
        assert_eq!(companies.categories.get("co2").map(Vec::len), Some(2));

        let products = load_product_links(&db, &["p1".to_string()]).await?;
        assert!(products.features.is_empty());
        Ok(())
    }
}
