//! Bearer-token guard for the admin routes.

use super::AppState;
use crate::errors::{Error, Result};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Compares the presented token with the configured one in constant time.
fn token_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn unauthorized(message: &str) -> Error {
    Error::Unauthorized {
        message: message.to_string(),
    }
}

/// Middleware that lets a request through only when it carries
/// `Authorization: Bearer <ADMIN_TOKEN>`.
///
/// Without a configured token every request is rejected.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let Some(expected) = state.admin_token.as_deref() else {
        tracing::warn!(path = %request.uri().path(), "Admin request rejected: no admin token configured");
        return Err(unauthorized("Admin access is not configured"));
    };

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| unauthorized("Missing bearer token"))?;

    if !token_matches(token, expected) {
        tracing::warn!(path = %request.uri().path(), "Admin request rejected: invalid token");
        return Err(unauthorized("Invalid token"));
    }

    Ok(next.run(request).await)
}
