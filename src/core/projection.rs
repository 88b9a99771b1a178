//! Catalog projection - joins products and companies with the records they reference.
//!
//! References are resolved in batches (one query per referenced collection, not per row).
//! A reference that no longer resolves is left out: a missing company becomes `None`,
//! a missing category or subcategory is dropped from its list.

use crate::{
    core::{discount, filter, links},
    entities::{
        Category, CategoryColumn, Company, CompanyColumn, Subcategory, SubcategoryColumn,
        category, company, product, subcategory,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A product with its company, categories and subcategories joined in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProduct {
    /// The stored product record
    #[serde(flatten)]
    pub product: product::Model,
    /// The listing company, `None` if it no longer exists
    pub company: Option<company::Model>,
    /// Categories the product is tagged with
    pub categories: Vec<category::Model>,
    /// Subcategories the product is tagged with
    pub subcategories: Vec<subcategory::Model>,
    /// Feature tags
    pub features: Vec<String>,
    /// Whether the discount is in effect at resolution time
    pub discount_active: bool,
    /// Price shown to customers at resolution time
    pub effective_price: f64,
}

/// A company with its declared categories and subcategories joined in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCompany {
    /// The stored company record
    #[serde(flatten)]
    pub company: company::Model,
    /// Categories the company declares
    pub categories: Vec<category::Model>,
    /// Subcategories the company declares
    pub subcategories: Vec<subcategory::Model>,
}

fn collect_ids<'a, I>(groups: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Vec<String>>,
{
    let unique: HashSet<&String> = groups.into_iter().flatten().collect();
    unique.into_iter().cloned().collect()
}

async fn categories_by_id<C>(db: &C, ids: Vec<String>) -> Result<HashMap<String, category::Model>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(Category::find()
        .filter(CategoryColumn::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.id.clone(), model))
        .collect())
}

async fn subcategories_by_id<C>(
    db: &C,
    ids: Vec<String>,
) -> Result<HashMap<String, subcategory::Model>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(Subcategory::find()
        .filter(SubcategoryColumn::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.id.clone(), model))
        .collect())
}

fn pick<T: Clone>(ids: Option<&Vec<String>>, records: &HashMap<String, T>) -> Vec<T> {
    ids.map(|ids| ids.iter().filter_map(|id| records.get(id).cloned()).collect())
        .unwrap_or_default()
}

/// Resolves a batch of products, keeping their order.
pub async fn resolve_products<C>(
    db: &C,
    products: Vec<product::Model>,
    now: DateTime<Utc>,
) -> Result<Vec<ResolvedProduct>>
where
    C: ConnectionTrait,
{
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
    let mut links = links::load_product_links(db, &product_ids).await?;

    let company_ids: HashSet<String> = products.iter().map(|p| p.company_id.clone()).collect();
    let companies: HashMap<String, company::Model> = Company::find()
        .filter(CompanyColumn::Id.is_in(company_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.id.clone(), model))
        .collect();
    let categories = categories_by_id(db, collect_ids(links.categories.values())).await?;
    let subcategories = subcategories_by_id(db, collect_ids(links.subcategories.values())).await?;

    Ok(products
        .into_iter()
        .map(|product| ResolvedProduct {
            company: companies.get(&product.company_id).cloned(),
            categories: pick(links.categories.get(&product.id), &categories),
            subcategories: pick(links.subcategories.get(&product.id), &subcategories),
            features: links.features.remove(&product.id).unwrap_or_default(),
            discount_active: discount::is_active(&product, now),
            effective_price: discount::effective_price(&product, now),
            product,
        })
        .collect())
}

/// Resolves a single product.
pub async fn resolve_product<C>(
    db: &C,
    product: product::Model,
    now: DateTime<Utc>,
) -> Result<ResolvedProduct>
where
    C: ConnectionTrait,
{
    let mut resolved = resolve_products(db, vec![product], now).await?;
    Ok(resolved.remove(0))
}

/// Resolves a batch of companies, keeping their order.
pub async fn resolve_companies<C>(
    db: &C,
    companies: Vec<company::Model>,
) -> Result<Vec<ResolvedCompany>>
where
    C: ConnectionTrait,
{
    if companies.is_empty() {
        return Ok(Vec::new());
    }

    let company_ids: Vec<String> = companies.iter().map(|c| c.id.clone()).collect();
    let links = links::load_company_links(db, &company_ids).await?;
    let categories = categories_by_id(db, collect_ids(links.categories.values())).await?;
    let subcategories = subcategories_by_id(db, collect_ids(links.subcategories.values())).await?;

    Ok(companies
        .into_iter()
        .map(|company| ResolvedCompany {
            categories: pick(links.categories.get(&company.id), &categories),
            subcategories: pick(links.subcategories.get(&company.id), &subcategories),
            company,
        })
        .collect())
}

/// Companies that currently have at least one product tagged with `category_id`.
///
/// This goes through the products (product -> company), not through the
/// categories a company declares for itself: a company that lists the category
/// but has no product in it is not returned.
pub async fn companies_for_category<C>(db: &C, category_id: &str) -> Result<Vec<ResolvedCompany>>
where
    C: ConnectionTrait,
{
    let company_ids: Vec<String> = crate::entities::Product::find()
        .select_only()
        .column(product::Column::CompanyId)
        .distinct()
        .filter(filter::tagged_with_category(&[category_id.to_string()]))
        .into_tuple::<String>()
        .all(db)
        .await?;
    if company_ids.is_empty() {
        return Ok(Vec::new());
    }

    let companies = Company::find()
        .filter(CompanyColumn::Id.is_in(company_ids))
        .order_by_asc(CompanyColumn::Name)
        .all(db)
        .await?;
    resolve_companies(db, companies).await
}
