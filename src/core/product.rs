//! Product business logic - catalog CRUD, filtered listings and promotions.
//!
//! Every product belongs to one company and carries optional category, subcategory and
//! feature tags. Reads go through [`FilterConfig`] and come back resolved
//! (see [`crate::core::projection`]); the discount columns are written by
//! [`crate::core::discount`], never by the update path here.

use crate::{
    core::{
        assets::{self, AssetStore},
        filter::{self, FilterConfig},
        links,
        projection::{self, ResolvedProduct},
    },
    entities::{Product, product},
    errors::{EntityKind, Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Payload for creating a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    /// Product name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Picture reference from the asset store
    pub picture_ref: Option<String>,
    /// Listing company, must exist
    pub company_id: String,
    /// Regular price, must be positive
    pub base_price: f64,
    /// Initial discounted price, must be below `base_price`
    pub discounted_price: Option<f64>,
    /// Initial discount expiry
    pub discount_expiry: Option<DateTime<Utc>>,
    /// Percentage shown next to the initial discount
    pub discount_percentage: Option<f64>,
    /// Category tags
    #[serde(default)]
    pub category_ids: Vec<String>,
    /// Subcategory tags
    #[serde(default)]
    pub subcategory_ids: Vec<String>,
    /// Free-form feature tags
    #[serde(default)]
    pub features: Vec<String>,
}

/// Payload for updating a product. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New picture reference; the previous picture is deleted from the asset store
    pub picture_ref: Option<String>,
    /// New listing company
    pub company_id: Option<String>,
    /// New regular price
    pub base_price: Option<f64>,
    /// Replacement category set
    pub category_ids: Option<Vec<String>>,
    /// Replacement subcategory set
    pub subcategory_ids: Option<Vec<String>>,
    /// Replacement feature set
    pub features: Option<Vec<String>>,
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_base_price(base_price: f64) -> Result<()> {
    if !base_price.is_finite() || base_price <= 0.0 {
        return Err(Error::validation(format!(
            "Base price must be a positive number, got {base_price}"
        )));
    }
    Ok(())
}

/// A stored discounted price must stay below the base price it discounts.
fn check_discount_below_base(base_price: f64, discounted_price: Option<f64>) -> Result<()> {
    let Some(discounted) = discounted_price else {
        return Ok(());
    };
    if !discounted.is_finite() || discounted < 0.0 {
        return Err(Error::validation(format!(
            "Discounted price must be a non-negative number, got {discounted}"
        )));
    }
    if discounted >= base_price {
        return Err(Error::Conflict {
            message: format!(
                "Discounted price {discounted} must be below the base price {base_price}"
            ),
        });
    }
    Ok(())
}

/// Products matching `filter` at `now`, ordered by name, without their references resolved.
///
/// # Errors
/// Returns `Validation` for invalid price bounds, or a database error.
pub async fn find_products<C>(
    db: &C,
    filter: &FilterConfig,
    now: DateTime<Utc>,
) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    filter.validate()?;
    Product::find()
        .filter(filter.to_condition(now))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Products matching `filter` at `now`, resolved.
///
/// An empty result is a valid answer, not an error.
pub async fn list_products(
    db: &DatabaseConnection,
    filter: &FilterConfig,
    now: DateTime<Utc>,
) -> Result<Vec<ResolvedProduct>> {
    let products = find_products(db, filter, now).await?;
    projection::resolve_products(db, products, now).await
}

/// Products tagged with `category_id`, optionally narrowed to `subcategory_id`.
pub async fn products_for_category(
    db: &DatabaseConnection,
    category_id: &str,
    subcategory_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<ResolvedProduct>> {
    list_products(db, &FilterConfig::for_category(category_id, subcategory_id), now).await
}

/// Products whose discount is active at `now`.
pub async fn list_promotions(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Vec<ResolvedProduct>> {
    let filter = FilterConfig {
        has_discount: true,
        ..FilterConfig::default()
    };
    list_products(db, &filter, now).await
}

/// Products without an active discount at `now`, i.e. those a bulk discount can target.
pub async fn discount_candidates(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Vec<ResolvedProduct>> {
    let products = Product::find()
        .filter(filter::no_active_discount(now))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await?;
    projection::resolve_products(db, products, now).await
}

/// Retrieves a product by id, resolved.
///
/// # Errors
/// Returns `NotFound` if there is no such product.
pub async fn get_product(
    db: &DatabaseConnection,
    product_id: &str,
    now: DateTime<Utc>,
) -> Result<ResolvedProduct> {
    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Product, product_id))?;
    projection::resolve_product(db, product, now).await
}

/// Creates a product with its tags.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or the base price is not positive (`Validation`)
/// - The discounted price is not below the base price (`Conflict`)
/// - The company, a category or a subcategory does not exist (`NotFound`)
/// - The database insert fails
pub async fn create_product(db: &DatabaseConnection, input: ProductInput) -> Result<product::Model> {
    let name = validated_name(&input.name)?;
    validate_base_price(input.base_price)?;
    check_discount_below_base(input.base_price, input.discounted_price)?;
    let company_id = input.company_id.trim().to_string();
    if company_id.is_empty() {
        return Err(Error::validation("Company is required"));
    }
    let category_ids = links::normalize_set(input.category_ids);
    let subcategory_ids = links::normalize_set(input.subcategory_ids);
    let features = links::normalize_set(input.features);

    let txn = db.begin().await?;
    links::ensure_exist(&txn, EntityKind::Company, std::slice::from_ref(&company_id)).await?;
    links::ensure_exist(&txn, EntityKind::Category, &category_ids).await?;
    links::ensure_exist(&txn, EntityKind::Subcategory, &subcategory_ids).await?;

    let now = Utc::now();
    let product = product::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name_folded: Set(filter::fold_name(&name)),
        name: Set(name),
        description: Set(input.description),
        picture_ref: Set(input.picture_ref),
        company_id: Set(company_id),
        base_price: Set(input.base_price),
        discounted_price: Set(input.discounted_price),
        discount_expiry: Set(input.discount_expiry),
        discount_percentage: Set(input.discount_percentage),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = product.insert(&txn).await?;

    links::set_product_categories(&txn, &created.id, &category_ids).await?;
    links::set_product_subcategories(&txn, &created.id, &subcategory_ids).await?;
    links::set_product_features(&txn, &created.id, &features).await?;
    txn.commit().await?;

    info!(
        product_id = %created.id,
        name = %created.name,
        base_price = created.base_price,
        "Product created"
    );
    Ok(created)
}

/// Updates a product. Tag sets that are provided replace the current ones.
///
/// The price checks run against the merged record, so lowering the base price under a
/// stored discounted price is rejected.
///
/// # Errors
/// Returns an error if:
/// - A provided name or base price is invalid (`Validation`)
/// - The merged discounted price is not below the merged base price (`Conflict`)
/// - The product or a newly referenced record does not exist (`NotFound`)
/// - The database update fails
pub async fn update_product(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    product_id: &str,
    update: ProductUpdate,
) -> Result<product::Model> {
    let name = update.name.as_deref().map(validated_name).transpose()?;
    if let Some(base_price) = update.base_price {
        validate_base_price(base_price)?;
    }

    let txn = db.begin().await?;
    let existing = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Product, product_id))?;

    let base_price = update.base_price.unwrap_or(existing.base_price);
    check_discount_below_base(base_price, existing.discounted_price)?;

    if let Some(company_id) = &update.company_id {
        links::ensure_exist(&txn, EntityKind::Company, std::slice::from_ref(company_id)).await?;
    }
    let replaced_picture = match &update.picture_ref {
        Some(new_picture) if existing.picture_ref.as_ref() != Some(new_picture) => {
            existing.picture_ref.clone()
        }
        _ => None,
    };

    let mut product: product::ActiveModel = existing.into();
    if let Some(name) = name {
        product.name_folded = Set(filter::fold_name(&name));
        product.name = Set(name);
    }
    if let Some(description) = update.description {
        product.description = Set(Some(description));
    }
    if let Some(picture_ref) = update.picture_ref {
        product.picture_ref = Set(Some(picture_ref));
    }
    if let Some(company_id) = update.company_id {
        product.company_id = Set(company_id);
    }
    product.base_price = Set(base_price);
    product.updated_at = Set(Utc::now());
    let updated = product.update(&txn).await?;

    if let Some(category_ids) = update.category_ids {
        let category_ids = links::normalize_set(category_ids);
        links::ensure_exist(&txn, EntityKind::Category, &category_ids).await?;
        links::set_product_categories(&txn, product_id, &category_ids).await?;
    }
    if let Some(subcategory_ids) = update.subcategory_ids {
        let subcategory_ids = links::normalize_set(subcategory_ids);
        links::ensure_exist(&txn, EntityKind::Subcategory, &subcategory_ids).await?;
        links::set_product_subcategories(&txn, product_id, &subcategory_ids).await?;
    }
    if let Some(features) = update.features {
        links::set_product_features(&txn, product_id, &links::normalize_set(features)).await?;
    }
    txn.commit().await?;

    assets::discard(assets, replaced_picture.as_deref()).await;
    info!(product_id, "Product updated");
    Ok(updated)
}

/// Deletes a product, its tags and its picture.
///
/// # Errors
/// Returns `NotFound` if there is no such product, or a database error.
pub async fn delete_product(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    product_id: &str,
) -> Result<product::Model> {
    let txn = db.begin().await?;
    let existing = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Product, product_id))?;
    links::clear_product_links(&txn, product_id).await?;
    Product::delete_by_id(product_id).exec(&txn).await?;
    txn.commit().await?;

    assets::discard(assets, existing.picture_ref.as_deref()).await;
    info!(product_id, "Product deleted");
    Ok(existing)
}
