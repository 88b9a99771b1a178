//! Product search by name.
//!
//! The term is matched as a case-insensitive substring of the product name; it is not
//! tokenized and there is no fuzzy matching. The price/discount rules are the same
//! as for any other listing (see [`crate::core::filter`]).

use crate::{
    core::{
        filter::{FilterConfig, parse_flag, parse_price},
        product,
        projection::ResolvedProduct,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

/// A validated search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Name substring, required
    pub term: String,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Only products with an active discount
    pub has_discount: bool,
}

/// Raw search parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Search term
    pub q: Option<String>,
    /// Lower price bound
    pub min_price: Option<String>,
    /// Upper price bound
    pub max_price: Option<String>,
    /// `"true"` to keep only discounted products
    pub has_discount: Option<String>,
}

impl SearchParams {
    /// Validates the raw parameters into a [`SearchQuery`].
    ///
    /// # Errors
    /// Returns `Validation` when the term is missing or a price bound is not a number.
    pub fn parse(&self) -> Result<SearchQuery> {
        Ok(SearchQuery {
            term: required_term(self.q.as_deref())?,
            min_price: parse_price("minPrice", self.min_price.as_deref())?,
            max_price: parse_price("maxPrice", self.max_price.as_deref())?,
            has_discount: parse_flag(self.has_discount.as_deref()),
        })
    }
}

fn required_term(term: Option<&str>) -> Result<String> {
    match term.map(str::trim) {
        Some(term) if !term.is_empty() => Ok(term.to_string()),
        _ => Err(Error::validation("Search term is required")),
    }
}

/// Search results and how many there are.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    /// Matching products, resolved
    pub data: Vec<ResolvedProduct>,
    /// `data.len()`
    pub count: usize,
}

/// Searches products by name at `now`.
///
/// # Errors
/// Returns `Validation` when the term is empty or a price bound is invalid; no match
/// is an empty result, not an error.
pub async fn search_products(
    db: &DatabaseConnection,
    query: &SearchQuery,
    now: DateTime<Utc>,
) -> Result<SearchResults> {
    let term = required_term(Some(&query.term))?;
    let filter = FilterConfig {
        name_contains: Some(term),
        min_price: query.min_price,
        max_price: query.max_price,
        has_discount: query.has_discount,
        ..FilterConfig::default()
    };
    let data = product::list_products(db, &filter, now).await?;
    Ok(SearchResults {
        count: data.len(),
        data,
    })
}
