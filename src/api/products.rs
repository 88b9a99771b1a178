//! Product routes: listings, search, promotions, CRUD and discounts.

use super::AppState;
use crate::{
    core::{
        discount,
        filter::FilterParams,
        product::{self, ProductInput, ProductUpdate},
        projection::ResolvedProduct,
        search::{self, SearchParams},
    },
    entities::product::Model as ProductModel,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// `GET /api/products`
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<ResolvedProduct>>> {
    let filter = params.parse()?;
    Ok(Json(product::list_products(state.db.as_ref(), &filter, Utc::now()).await?))
}

/// `GET /api/products/search`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>> {
    let query = params.parse()?;
    let results = search::search_products(state.db.as_ref(), &query, Utc::now()).await?;
    Ok(Json(json!({
        "success": true,
        "data": results.data,
        "count": results.count,
    })))
}

/// `GET /api/products/promotions`
pub async fn promotions(State(state): State<AppState>) -> Result<Json<Vec<ResolvedProduct>>> {
    Ok(Json(product::list_promotions(state.db.as_ref(), Utc::now()).await?))
}

/// Query string of the category listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    /// Narrow the listing to one subcategory
    pub subcategory_id: Option<String>,
}

/// `GET /api/products/category/{category_id}`
pub async fn by_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Query(listing): Query<CategoryListing>,
) -> Result<Json<Vec<ResolvedProduct>>> {
    let subcategory_id = listing
        .subcategory_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    Ok(Json(
        product::products_for_category(state.db.as_ref(), &category_id, subcategory_id, Utc::now())
            .await?,
    ))
}

/// `GET /api/products/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResolvedProduct>> {
    Ok(Json(product::get_product(state.db.as_ref(), &id, Utc::now()).await?))
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductModel>)> {
    let created = product::create_product(state.db.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<ProductModel>> {
    Ok(Json(
        product::update_product(state.db.as_ref(), state.assets.as_ref(), &id, update).await?,
    ))
}

/// `DELETE /api/products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductModel>> {
    Ok(Json(
        product::delete_product(state.db.as_ref(), state.assets.as_ref(), &id).await?,
    ))
}

/// Body of a single-product discount request.
#[derive(Debug, Default, Deserialize)]
pub struct DiscountRequest {
    /// Percentage off, in (0, 100]
    pub percentage: Option<f64>,
    /// When the discount ends
    pub expiry: Option<DateTime<Utc>>,
}

/// `PUT /api/products/{id}/discount`
pub async fn apply_discount(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<DiscountRequest>,
) -> Result<Json<ProductModel>> {
    let updated =
        discount::apply_discount(state.db.as_ref(), &id, request.percentage, request.expiry, Utc::now())
            .await?;
    Ok(Json(updated))
}

/// `DELETE /api/products/{id}/discount`
pub async fn remove_discount(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductModel>> {
    Ok(Json(discount::remove_discount(state.db.as_ref(), &id).await?))
}

/// Body of a bulk discount request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDiscountRequest {
    /// Products to discount
    #[serde(default)]
    pub product_ids: Vec<String>,
    /// Percentage off, in (0, 100]
    pub percentage: Option<f64>,
    /// When the discount ends
    pub expiry: Option<DateTime<Utc>>,
}

/// Per-product outcome of a bulk discount.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDiscountItem {
    /// Target product
    pub product_id: String,
    /// Whether the product was updated
    pub success: bool,
    /// The updated product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductModel>,
    /// Why the product was not updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<discount::BatchItem> for BulkDiscountItem {
    fn from(item: discount::BatchItem) -> Self {
        match item.outcome {
            Ok(product) => Self {
                product_id: item.product_id,
                success: true,
                product: Some(product),
                message: None,
            },
            Err(e) => Self {
                product_id: item.product_id,
                success: false,
                product: None,
                message: Some(e.to_string()),
            },
        }
    }
}

/// `POST /api/products/discounts`
pub async fn apply_bulk_discount(
    State(state): State<AppState>,
    Json(request): Json<BulkDiscountRequest>,
) -> Result<Json<Value>> {
    let items = discount::apply_discount_batch(
        state.db.as_ref(),
        &request.product_ids,
        request.percentage,
        request.expiry,
        Utc::now(),
    )
    .await?;
    let items: Vec<BulkDiscountItem> = items.into_iter().map(Into::into).collect();
    let failed = items.iter().filter(|item| !item.success).count();
    Ok(Json(json!({
        "success": failed == 0,
        "failed": failed,
        "data": items,
    })))
}

/// `GET /api/products/discounts/candidates`
pub async fn discount_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedProduct>>> {
    Ok(Json(product::discount_candidates(state.db.as_ref(), Utc::now()).await?))
}
