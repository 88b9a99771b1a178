//! Product filter - turns a typed filter configuration into one composable `SeaORM` condition.
//!
//! Every option is a wildcard when omitted. The options are AND-combined, except the
//! price/discount part which is OR-structured on its own:
//!
//! * `has_discount`: only products whose discount is active at `now`; price bounds,
//!   if any, apply to the discounted price.
//! * no `has_discount` but price bounds: the *effective* price is bounded, i.e.
//!   (active discount AND discounted price in range) OR (no active discount AND base
//!   price in range). A product on sale is never matched through its base price.
//! * neither: no price constraint.
//!
//! [`FilterParams`] is the raw query-string shape; [`FilterParams::parse`] validates it
//! once so that the rest of the crate only ever sees a [`FilterConfig`].

use crate::{
    entities::{
        Product, ProductCategory, ProductFeature, ProductSubcategory, product, product_category,
        product_feature, product_subcategory,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition,
    sea_query::{Expr, LikeExpr, Query, SimpleExpr},
    prelude::*,
};
use serde::Deserialize;

use super::links::normalize_set;

/// Typed, validated product filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    /// Product must be tagged with this category
    pub category_id: Option<String>,
    /// Product must be tagged with at least one of these categories
    pub category_ids: Vec<String>,
    /// Product must be tagged with at least one of these subcategories
    pub subcategory_ids: Vec<String>,
    /// Product must belong to one of these companies
    pub company_ids: Vec<String>,
    /// Product must carry at least one of these feature tags
    pub features: Vec<String>,
    /// Only products with an active discount
    pub has_discount: bool,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the product name
    pub name_contains: Option<String>,
}

impl FilterConfig {
    /// Filter on a single category, optionally narrowed to one subcategory.
    #[must_use]
    pub fn for_category(category_id: &str, subcategory_id: Option<&str>) -> Self {
        Self {
            category_id: Some(category_id.to_string()),
            subcategory_ids: subcategory_id.map(str::to_string).into_iter().collect(),
            ..Self::default()
        }
    }

    /// Checks the price bounds.
    ///
    /// # Errors
    /// Returns `Validation` when a bound is negative or not a finite number.
    pub fn validate(&self) -> Result<()> {
        for (name, bound) in [("minPrice", self.min_price), ("maxPrice", self.max_price)] {
            if let Some(value) = bound
                && (!value.is_finite() || value < 0.0)
            {
                return Err(Error::validation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    fn has_price_bounds(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Builds the condition that selects matching products at `now`.
    #[must_use]
    pub fn to_condition(&self, now: DateTime<Utc>) -> Condition {
        let mut condition = Condition::all();

        if let Some(category_id) = self.category_id.as_deref().filter(|id| !id.is_empty()) {
            condition = condition.add(tagged_with_category(&[category_id.to_string()]));
        }
        let category_ids = normalize_set(self.category_ids.iter().cloned());
        if !category_ids.is_empty() {
            condition = condition.add(tagged_with_category(&category_ids));
        }
        let subcategory_ids = normalize_set(self.subcategory_ids.iter().cloned());
        if !subcategory_ids.is_empty() {
            condition = condition.add(tagged_with_subcategory(&subcategory_ids));
        }
        let company_ids = normalize_set(self.company_ids.iter().cloned());
        if !company_ids.is_empty() {
            condition = condition.add(product::Column::CompanyId.is_in(company_ids));
        }
        let features = normalize_set(self.features.iter().cloned());
        if !features.is_empty() {
            condition = condition.add(tagged_with_feature(&features));
        }
        if let Some(term) = self.name_contains.as_deref().filter(|t| !t.trim().is_empty()) {
            condition = condition.add(name_contains(term.trim()));
        }
        if let Some(price) = self.price_condition(now) {
            condition = condition.add(price);
        }

        condition
    }

    fn price_condition(&self, now: DateTime<Utc>) -> Option<Condition> {
        if self.has_discount {
            return Some(self.bounded(
                active_discount(now),
                product::Column::DiscountedPrice,
            ));
        }
        if !self.has_price_bounds() {
            return None;
        }
        Some(
            Condition::any()
                .add(self.bounded(active_discount(now), product::Column::DiscountedPrice))
                .add(self.bounded(
                    Condition::all().add(no_active_discount(now)),
                    product::Column::BasePrice,
                )),
        )
    }

    /// Adds the bounds to `condition`, which must be an AND group.
    fn bounded(&self, mut condition: Condition, column: product::Column) -> Condition {
        if let Some(min) = self.min_price {
            condition = condition.add(column.gte(min));
        }
        if let Some(max) = self.max_price {
            condition = condition.add(column.lte(max));
        }
        condition
    }
}

/// Discount set and not yet expired at `now`.
#[must_use]
pub fn active_discount(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(product::Column::DiscountedPrice.is_not_null())
        .add(product::Column::DiscountExpiry.is_not_null())
        .add(product::Column::DiscountExpiry.gt(now))
}

/// Exact complement of [`active_discount`].
#[must_use]
pub fn no_active_discount(now: DateTime<Utc>) -> Condition {
    Condition::any()
        .add(product::Column::DiscountedPrice.is_null())
        .add(product::Column::DiscountExpiry.is_null())
        .add(product::Column::DiscountExpiry.lte(now))
}

pub(crate) fn tagged_with_category(ids: &[String]) -> SimpleExpr {
    product::Column::Id.in_subquery(
        Query::select()
            .column(product_category::Column::ProductId)
            .from(ProductCategory)
            .and_where(product_category::Column::CategoryId.is_in(ids.iter().cloned()))
            .to_owned(),
    )
}

fn tagged_with_subcategory(ids: &[String]) -> SimpleExpr {
    product::Column::Id.in_subquery(
        Query::select()
            .column(product_subcategory::Column::ProductId)
            .from(ProductSubcategory)
            .and_where(product_subcategory::Column::SubcategoryId.is_in(ids.iter().cloned()))
            .to_owned(),
    )
}

fn tagged_with_feature(features: &[String]) -> SimpleExpr {
    product::Column::Id.in_subquery(
        Query::select()
            .column(product_feature::Column::ProductId)
            .from(ProductFeature)
            .and_where(product_feature::Column::Feature.is_in(features.iter().cloned()))
            .to_owned(),
    )
}

const LIKE_ESCAPE: char = '!';

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Case folding shared by the stored `name_folded` column and the search term.
#[must_use]
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Case-insensitive substring match on the product name. `%` and `_` in the term match literally.
fn name_contains(term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&fold_name(term)));
    Expr::col((Product, product::Column::NameFolded))
        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// Raw filter parameters as they arrive on the query string.
///
/// Id lists are comma-separated, prices are numeric strings and flags are
/// only set by the literal `"true"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Single category id
    pub category_id: Option<String>,
    /// Comma-separated category ids
    pub categories: Option<String>,
    /// Comma-separated subcategory ids
    pub subcategories: Option<String>,
    /// Comma-separated company ids
    pub companies: Option<String>,
    /// Comma-separated feature tags
    pub features: Option<String>,
    /// Lower price bound
    pub min_price: Option<String>,
    /// Upper price bound
    pub max_price: Option<String>,
    /// `"true"` to keep only discounted products
    pub has_discount: Option<String>,
    /// Name substring
    pub search_term: Option<String>,
}

impl FilterParams {
    /// Validates the raw parameters into a [`FilterConfig`].
    ///
    /// # Errors
    /// Returns `Validation` when a price bound is not a non-negative number.
    pub fn parse(&self) -> Result<FilterConfig> {
        let config = FilterConfig {
            category_id: self
                .category_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            category_ids: split_list(self.categories.as_deref()),
            subcategory_ids: split_list(self.subcategories.as_deref()),
            company_ids: split_list(self.companies.as_deref()),
            features: split_list(self.features.as_deref()),
            has_discount: parse_flag(self.has_discount.as_deref()),
            min_price: parse_price("minPrice", self.min_price.as_deref())?,
            max_price: parse_price("maxPrice", self.max_price.as_deref())?,
            name_contains: self
                .search_term
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Splits a comma-separated list, dropping blank items and duplicates.
#[must_use]
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |raw| {
        normalize_set(raw.split(',').map(str::to_string))
    })
}

/// Parses an optional price bound; blank means absent.
///
/// # Errors
/// Returns `Validation` when the value is not a number.
pub fn parse_price(name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| Error::validation(format!("{name} must be a number, got '{value}'"))),
    }
}

/// Only the literal `"true"` switches a flag on.
#[must_use]
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}
