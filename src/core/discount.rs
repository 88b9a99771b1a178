//! Discount lifecycle - decides whether a product's discount is in effect and applies/removes discounts.
//!
//! Expiry is evaluated lazily: the stored discount columns are never cleared when the
//! expiry passes, every read asks [`is_active`] instead. The stored percentage is a
//! display hint and plays no part in any comparison.

use crate::{
    entities::{Product, product},
    errors::{EntityKind, Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, prelude::*};
use tracing::{info, warn};

/// True when the product has both a discounted price and an expiry, and the expiry is after `now`.
#[must_use]
pub fn is_active(product: &product::Model, now: DateTime<Utc>) -> bool {
    product.discounted_price.is_some() && product.discount_expiry.is_some_and(|expiry| expiry > now)
}

/// The price a customer sees at `now`: the discounted price while the discount runs, else the base price.
#[must_use]
pub fn effective_price(product: &product::Model, now: DateTime<Utc>) -> f64 {
    match product.discounted_price {
        Some(discounted) if is_active(product, now) => discounted,
        _ => product.base_price,
    }
}

/// Rounds to two decimal places (cents).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `base_price` reduced by `percentage` percent, rounded to cents.
#[must_use]
pub fn discounted_price(base_price: f64, percentage: f64) -> f64 {
    round2(base_price * (1.0 - percentage / 100.0))
}

/// Checks a discount request without touching the store.
///
/// # Errors
/// Returns `Validation` if the percentage is missing or outside (0, 100],
/// or if the expiry is missing or not strictly after `now`.
pub fn validate_discount(
    percentage: Option<f64>,
    expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(f64, DateTime<Utc>)> {
    let percentage =
        percentage.ok_or_else(|| Error::validation("Discount percentage is required"))?;
    if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
        return Err(Error::validation(format!(
            "Discount percentage must be in (0, 100], got {percentage}"
        )));
    }

    let expiry = expiry.ok_or_else(|| Error::validation("Discount expiry is required"))?;
    if expiry <= now {
        return Err(Error::validation("Discount expiry must be in the future"));
    }

    Ok((percentage, expiry))
}

/// Puts a percentage discount on a product until `expiry`.
///
/// The discounted price is derived from the current base price; the percentage is stored verbatim.
///
/// # Errors
/// Returns an error if:
/// - The percentage or expiry is missing or invalid (`Validation`, before any store access)
/// - The product does not exist (`NotFound`)
/// - The rounded discounted price would not be below the base price (`Conflict`)
/// - The database update fails
pub async fn apply_discount<C>(
    db: &C,
    product_id: &str,
    percentage: Option<f64>,
    expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let (percentage, expiry) = validate_discount(percentage, expiry, now)?;
    apply_validated(db, product_id, percentage, expiry).await
}

async fn apply_validated<C>(
    db: &C,
    product_id: &str,
    percentage: f64,
    expiry: DateTime<Utc>,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Product, product_id))?;

    let discounted = discounted_price(existing.base_price, percentage);
    if discounted >= existing.base_price {
        return Err(Error::Conflict {
            message: format!(
                "A {percentage}% discount does not lower the price of product {product_id}"
            ),
        });
    }

    let mut product: product::ActiveModel = existing.into();
    product.discounted_price = Set(Some(discounted));
    product.discount_expiry = Set(Some(expiry));
    product.discount_percentage = Set(Some(percentage));
    product.updated_at = Set(Utc::now());

    let updated = product.update(db).await?;
    info!(
        product_id,
        percentage,
        discounted_price = discounted,
        %expiry,
        "Discount applied"
    );
    Ok(updated)
}

/// Clears the discounted price and expiry of a product.
///
/// Removing a discount that is not there is a no-op, not an error.
///
/// # Errors
/// Returns an error if the product does not exist or the database update fails.
pub async fn remove_discount<C>(db: &C, product_id: &str) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Product, product_id))?;

    if existing.discounted_price.is_none() && existing.discount_expiry.is_none() {
        return Ok(existing);
    }

    let mut product: product::ActiveModel = existing.into();
    product.discounted_price = Set(None);
    product.discount_expiry = Set(None);
    product.updated_at = Set(Utc::now());

    let updated = product.update(db).await?;
    info!(product_id, "Discount removed");
    Ok(updated)
}

/// Outcome of one product inside a bulk discount.
#[derive(Debug)]
pub struct BatchItem {
    /// The product the discount was aimed at
    pub product_id: String,
    /// The updated product, or why it could not be updated
    pub outcome: Result<product::Model>,
}

impl BatchItem {
    /// Whether this product was updated.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Applies one shared percentage/expiry to several products.
///
/// Not transactional: each product is updated on its own, a failure on one product
/// does not undo or stop the others. The returned list has one entry per requested
/// product, in request order, so callers can see exactly which ones failed.
///
/// # Errors
/// Fails as a whole only when the request itself is invalid (empty product list,
/// bad percentage or expiry); per-product failures are reported in the items.
pub async fn apply_discount_batch<C>(
    db: &C,
    product_ids: &[String],
    percentage: Option<f64>,
    expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Vec<BatchItem>>
where
    C: ConnectionTrait,
{
    let product_ids = super::links::normalize_set(product_ids.iter().cloned());
    if product_ids.is_empty() {
        return Err(Error::validation("Select at least one product"));
    }
    let (percentage, expiry) = validate_discount(percentage, expiry, now)?;

    let mut items = Vec::with_capacity(product_ids.len());
    for product_id in product_ids {
        let outcome = apply_validated(db, &product_id, percentage, expiry).await;
        if let Err(e) = &outcome {
            warn!(product_id = %product_id, error = %e, "Bulk discount failed for product");
        }
        items.push(BatchItem {
            product_id,
            outcome,
        });
    }

    let failed = items.iter().filter(|item| !item.is_success()).count();
    info!(
        total = items.len(),
        failed, "Bulk discount finished"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_is_active_requires_both_fields_and_future_expiry() {
        let now = Utc::now();
        let mut product = sample_product_model(100.0);
        assert!(!is_active(&product, now));

        product.discounted_price = Some(80.0);
        assert!(!is_active(&product, now), "price without expiry is not a discount");

        product.discounted_price = None;
        product.discount_expiry = Some(now + Duration::days(1));
        assert!(!is_active(&product, now), "expiry without price is not a discount");

        product.discounted_price = Some(80.0);
        assert!(is_active(&product, now));

        product.discount_expiry = Some(now);
        assert!(!is_active(&product, now), "expiry equal to now has ended");

        product.discount_expiry = Some(now - Duration::seconds(1));
        assert!(!is_active(&product, now));
    }

    #[test]
    fn test_effective_price_follows_is_active() {
        let now = Utc::now();
        let mut product = sample_product_model(200.0);
        product.discounted_price = Some(150.0);
        product.discount_expiry = Some(now + Duration::days(1));
        assert_eq!(effective_price(&product, now), 150.0);

        product.discount_expiry = Some(now - Duration::days(1));
        assert_eq!(effective_price(&product, now), 200.0);
    }

    #[test]
    fn test_discounted_price_rounds_to_cents() {
        assert_eq!(discounted_price(100.0, 25.0), 75.0);
        assert_eq!(discounted_price(19.99, 15.0), 16.99);
        assert_eq!(discounted_price(10.0, 100.0), 0.0);
    }

    #[test]
    fn test_validate_discount_rejects_bad_input() {
        let now = Utc::now();
        let tomorrow = Some(now + Duration::days(1));

        assert!(matches!(
            validate_discount(None, tomorrow, now),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            validate_discount(Some(0.0), tomorrow, now),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            validate_discount(Some(100.5), tomorrow, now),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            validate_discount(Some(f64::NAN), tomorrow, now),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            validate_discount(Some(10.0), None, now),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            validate_discount(Some(10.0), Some(now), now),
            Err(Error::Validation { .. })
        ));
        assert!(validate_discount(Some(100.0), tomorrow, now).is_ok());
    }

    #[tokio::test]
    async fn test_apply_discount_validation_never_reaches_store() -> Result<()> {
        // No query results are queued: any store access would error out differently.
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = apply_discount(&db, "p1", None, None, Utc::now()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_discount_integration() -> Result<()> {
        let (db, company) = setup_with_company().await?;
        let product = create_custom_product(&db, "Headphones", 80.0, &company.id).await?;
        let now = Utc::now();
        let expiry = now + Duration::days(7);

        let updated = apply_discount(&db, &product.id, Some(25.0), Some(expiry), now).await?;

        assert_eq!(updated.discounted_price, Some(60.0));
        assert_eq!(updated.discount_percentage, Some(25.0));
        assert!(is_active(&updated, now));
        assert_eq!(effective_price(&updated, now), 60.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_discount_unknown_product() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let result =
            apply_discount(&db, "missing", Some(10.0), Some(now + Duration::days(1)), now).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: EntityKind::Product,
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_then_remove_restores_base_price() -> Result<()> {
        let (db, company) = setup_with_company().await?;
        let product = create_custom_product(&db, "Lamp", 45.5, &company.id).await?;
        let now = Utc::now();

        apply_discount(&db, &product.id, Some(50.0), Some(now + Duration::days(1)), now).await?;
        let restored = remove_discount(&db, &product.id).await?;

        assert!(restored.discounted_price.is_none());
        assert!(restored.discount_expiry.is_none());
        assert_eq!(effective_price(&restored, now), 45.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_discount_is_idempotent() -> Result<()> {
        let (db, company) = setup_with_company().await?;
        let product = create_custom_product(&db, "Mug", 12.0, &company.id).await?;

        let first = remove_discount(&db, &product.id).await?;
        let second = remove_discount(&db, &product.id).await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_reports_partial_failure() -> Result<()> {
        let (db, company) = setup_with_company().await?;
        let first = create_custom_product(&db, "First", 100.0, &company.id).await?;
        let last = create_custom_product(&db, "Last", 40.0, &company.id).await?;
        let now = Utc::now();

        let ids = vec![first.id.clone(), "ghost".to_string(), last.id.clone()];
        let items =
            apply_discount_batch(&db, &ids, Some(10.0), Some(now + Duration::days(2)), now)
                .await?;

        assert_eq!(items.len(), 3);
        assert!(items[0].is_success());
        assert!(matches!(items[1].outcome, Err(Error::NotFound { .. })));
        assert!(items[2].is_success(), "products after a failure are still updated");

        // The product before the failure stays committed.
        let stored = Product::find_by_id(first.id).one(&db).await?.unwrap();
        assert_eq!(stored.discounted_price, Some(90.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_rejects_invalid_request_up_front() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let now = Utc::now();

        let empty = apply_discount_batch(&db, &[], Some(10.0), Some(now + Duration::days(1)), now)
            .await;
        assert!(matches!(empty, Err(Error::Validation { .. })));

        let no_expiry = apply_discount_batch(&db, &["p1".to_string()], Some(10.0), None, now).await;
        assert!(matches!(no_expiry, Err(Error::Validation { .. })));
        Ok(())
    }
}
