//! Image upload and serving.
//!
//! The upload route returns the reference to put into a `logoRef`/`pictureRef` field.

use super::AppState;
use crate::{
    core::assets::{LOCAL_PREFIX, image_extension},
    errors::{Error, Result},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Query string of an upload.
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Original file name; only its extension is kept
    pub filename: Option<String>,
}

/// `POST /api/uploads?filename=`
pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let filename = params
        .filename
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| Error::validation("filename is required"))?;
    if body.is_empty() {
        return Err(Error::validation("Upload body is empty"));
    }

    let reference = state.assets.store(&body, &filename).await?;
    tracing::info!(reference = %reference, size = body.len(), "Image uploaded");
    Ok((StatusCode::CREATED, Json(json!({ "ref": reference }))))
}

fn content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}

/// `GET /uploads/{filename}`
pub async fn serve(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let extension = image_extension(&filename)?;
    let stored = state
        .assets
        .load(&format!("{LOCAL_PREFIX}{filename}"))
        .await
        .map_err(|e| match e {
            Error::Asset { message } => Error::Validation { message },
            other => other,
        })?;
    let Some(bytes) = stored else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "File not found" })),
        )
            .into_response());
    };
    Ok(([(header::CONTENT_TYPE, content_type(&extension))], bytes).into_response())
}
