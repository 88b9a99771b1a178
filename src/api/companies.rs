//! Company routes.

use super::AppState;
use crate::{
    core::{
        company::{self, CompanyInput, CompanyUpdate},
        projection::{self, ResolvedCompany},
    },
    entities::CompanyModel,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `GET /api/companies`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ResolvedCompany>>> {
    Ok(Json(company::list_companies(state.db.as_ref()).await?))
}

/// `GET /api/companies/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResolvedCompany>> {
    Ok(Json(company::get_company(state.db.as_ref(), &id).await?))
}

/// `GET /api/companies/by-category/{category_id}`
///
/// Companies with at least one product in the category.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<ResolvedCompany>>> {
    Ok(Json(
        projection::companies_for_category(state.db.as_ref(), &category_id).await?,
    ))
}

/// `POST /api/companies`
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CompanyInput>,
) -> Result<(StatusCode, Json<CompanyModel>)> {
    let created = company::create_company(state.db.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/companies/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CompanyUpdate>,
) -> Result<Json<CompanyModel>> {
    Ok(Json(
        company::update_company(state.db.as_ref(), state.assets.as_ref(), &id, update).await?,
    ))
}

/// `DELETE /api/companies/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompanyModel>> {
    Ok(Json(
        company::delete_company(state.db.as_ref(), state.assets.as_ref(), &id).await?,
    ))
}
