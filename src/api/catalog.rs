//! Category and subcategory routes.

use super::AppState;
use crate::{
    core::{
        category::{self, CategoryInput, CategoryUpdate},
        subcategory::{self, SubcategoryInput, SubcategoryUpdate},
    },
    entities::{CategoryModel, SubcategoryModel},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryModel>>> {
    Ok(Json(category::list_categories(state.db.as_ref()).await?))
}

/// `GET /api/categories/{id}`
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryModel>> {
    Ok(Json(category::get_category(state.db.as_ref(), &id).await?))
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryModel>)> {
    let created = category::create_category(state.db.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/categories/{id}`
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<CategoryModel>> {
    Ok(Json(
        category::update_category(state.db.as_ref(), state.assets.as_ref(), &id, update).await?,
    ))
}

/// `DELETE /api/categories/{id}`
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryModel>> {
    Ok(Json(
        category::delete_category(state.db.as_ref(), state.assets.as_ref(), &id).await?,
    ))
}

/// Query string of the subcategory listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryListing {
    /// Only subcategories under this category
    pub category_id: Option<String>,
}

/// `GET /api/subcategories`
pub async fn list_subcategories(
    State(state): State<AppState>,
    Query(listing): Query<SubcategoryListing>,
) -> Result<Json<Vec<SubcategoryModel>>> {
    let category_id = listing
        .category_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    Ok(Json(
        subcategory::list_subcategories(state.db.as_ref(), category_id).await?,
    ))
}

/// `GET /api/subcategories/{id}`
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubcategoryModel>> {
    Ok(Json(subcategory::get_subcategory(state.db.as_ref(), &id).await?))
}

/// `POST /api/subcategories`
pub async fn create_subcategory(
    State(state): State<AppState>,
    Json(input): Json<SubcategoryInput>,
) -> Result<(StatusCode, Json<SubcategoryModel>)> {
    let created = subcategory::create_subcategory(state.db.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/subcategories/{id}`
pub async fn update_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<SubcategoryUpdate>,
) -> Result<Json<SubcategoryModel>> {
    Ok(Json(
        subcategory::update_subcategory(state.db.as_ref(), &id, update).await?,
    ))
}

/// `DELETE /api/subcategories/{id}`
pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubcategoryModel>> {
    Ok(Json(subcategory::delete_subcategory(state.db.as_ref(), &id).await?))
}
