//! HTTP surface of the catalog engine.
//!
//! Read routes are public. Every mutating route sits behind [`auth::require_admin`].
//! Handlers only parse the request and call into [`crate::core`]; errors are turned
//! into `{ "success": false, "message": ... }` responses by [`error`].

pub mod auth;
pub mod catalog;
pub mod companies;
mod error;
pub mod health;
pub mod products;
pub mod uploads;

use crate::core::assets::AssetStore;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Entity store
    pub db: Arc<DatabaseConnection>,
    /// Image storage
    pub assets: Arc<dyn AssetStore>,
    /// Bearer token accepted on admin routes
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    /// Bundles the collaborators the routes need.
    pub fn new(
        db: DatabaseConnection,
        assets: Arc<dyn AssetStore>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            db: Arc::new(db),
            assets,
            admin_token: admin_token.map(Arc::from),
        }
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::list))
        .route("/api/products/search", get(products::search))
        .route("/api/products/promotions", get(products::promotions))
        .route(
            "/api/products/category/{category_id}",
            get(products::by_category),
        )
        .route("/api/products/{id}", get(products::get_one))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/{id}", get(catalog::get_category))
        .route("/api/subcategories", get(catalog::list_subcategories))
        .route("/api/subcategories/{id}", get(catalog::get_subcategory))
        .route("/api/companies", get(companies::list))
        .route("/api/companies/{id}", get(companies::get_one))
        .route(
            "/api/companies/by-category/{category_id}",
            get(companies::by_category),
        )
        .route("/uploads/{filename}", get(uploads::serve))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/products", post(products::create))
        .route(
            "/api/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route(
            "/api/products/{id}/discount",
            put(products::apply_discount).delete(products::remove_discount),
        )
        .route("/api/products/discounts", post(products::apply_bulk_discount))
        .route(
            "/api/products/discounts/candidates",
            get(products::discount_candidates),
        )
        .route("/api/categories", post(catalog::create_category))
        .route(
            "/api/categories/{id}",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        .route("/api/subcategories", post(catalog::create_subcategory))
        .route(
            "/api/subcategories/{id}",
            put(catalog::update_subcategory).delete(catalog::delete_subcategory),
        )
        .route("/api/companies", post(companies::create))
        .route(
            "/api/companies/{id}",
            put(companies::update).delete(companies::delete),
        )
        .route("/api/uploads", post(uploads::upload))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(public_routes())
        .merge(admin_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const TOKEN: &str = "test-admin-token";

    async fn test_app() -> Result<(Router, AppState)> {
        let db = setup_test_db().await?;
        let state = AppState::new(
            db,
            Arc::new(MemoryAssetStore::default()),
            Some(TOKEN.to_string()),
        );
        Ok((create_router(state.clone()), state))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn admin_json(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_state_clones_share_one_connection() -> Result<()> {
        let (app, state) = test_app().await?;
        let copy = state.clone();
        assert!(Arc::ptr_eq(&state.db, &copy.db));

        create_test_company(copy.db.as_ref(), "Shared Co").await?;
        let (status, body) = send(&app, get_request("/api/companies")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Shared Co");
        Ok(())
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let (app, _) = test_app().await?;
        let (status, body) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_require_token() -> Result<()> {
        let (app, _) = test_app().await?;

        let request = Request::builder()
            .method("POST")
            .uri("/api/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "name": "Books" }).to_string()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let request = Request::builder()
            .method("POST")
            .uri("/api/categories")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "name": "Books" }).to_string()))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            admin_json("POST", "/api/categories", &json!({ "name": "Books" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Books");

        let (status, body) = send(&app, get_request("/api/categories")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_configured_token_rejects_admin_routes() -> Result<()> {
        let db = setup_test_db().await?;
        let app = create_router(AppState::new(
            db,
            Arc::new(MemoryAssetStore::default()),
            None,
        ));
        let (status, _) = send(
            &app,
            admin_json("POST", "/api/categories", &json!({ "name": "Books" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_query_validation_and_not_found() -> Result<()> {
        let (app, _) = test_app().await?;

        let (status, body) = send(&app, get_request("/api/products?minPrice=cheap")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, get_request("/api/products?companies=")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = send(&app, get_request("/api/products/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get_request("/api/products/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_price_filter_over_http() -> Result<()> {
        let (app, state) = test_app().await?;
        let company = create_test_company(state.db.as_ref(), "Acme").await?;
        let now = Utc::now();
        create_custom_product(state.db.as_ref(), "A", 100.0, &company.id).await?;
        create_discounted_product(state.db.as_ref(), "B", 200.0, 150.0, now + Duration::days(1), &company.id)
            .await?;

        let (status, body) =
            send(&app, get_request("/api/products?minPrice=140&maxPrice=160")).await;
        assert_eq!(status, StatusCode::OK);
        let products = body.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "B");
        assert_eq!(products[0]["discountActive"], true);
        assert_eq!(products[0]["company"]["name"], "Acme");

        let (status, body) = send(&app, get_request("/api/products/search?q=b")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_discount_routes() -> Result<()> {
        let (app, state) = test_app().await?;
        let company = create_test_company(state.db.as_ref(), "Acme").await?;
        let product = create_custom_product(state.db.as_ref(), "Lamp", 40.0, &company.id).await?;
        let expiry = (Utc::now() + Duration::days(3)).to_rfc3339();

        let (status, body) = send(
            &app,
            admin_json(
                "PUT",
                &format!("/api/products/{}/discount", product.id),
                &json!({ "percentage": 25, "expiry": expiry }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discountedPrice"], 30.0);

        let (_, promotions) = send(&app, get_request("/api/products/promotions")).await;
        assert_eq!(promotions.as_array().map(Vec::len), Some(1));

        let (status, body) = send(
            &app,
            admin_json(
                "PUT",
                &format!("/api/products/{}/discount", product.id),
                &json!({ "percentage": 25 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(
            &app,
            admin_json(
                "DELETE",
                &format!("/api/products/{}/discount", product.id),
                &json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discountedPrice"], Value::Null);
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_discount_reports_each_product() -> Result<()> {
        let (app, state) = test_app().await?;
        let company = create_test_company(state.db.as_ref(), "Acme").await?;
        let product = create_custom_product(state.db.as_ref(), "Mug", 10.0, &company.id).await?;
        let expiry = (Utc::now() + Duration::days(1)).to_rfc3339();

        let (status, body) = send(
            &app,
            admin_json(
                "POST",
                "/api/products/discounts",
                &json!({
                    "productIds": [product.id, "ghost"],
                    "percentage": 10,
                    "expiry": expiry,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["data"][0]["success"], true);
        assert_eq!(body["data"][1]["productId"], "ghost");
        assert_eq!(body["data"][1]["success"], false);

        let (status, _) = send(
            &app,
            admin_json(
                "POST",
                "/api/products/discounts",
                &json!({ "productIds": [], "percentage": 10, "expiry": expiry }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_companies_by_category_route() -> Result<()> {
        let (app, state) = test_app().await?;
        let company = create_test_company(state.db.as_ref(), "Acme").await?;
        let category = create_test_category(state.db.as_ref(), "Toys").await?;
        create_tagged_product(state.db.as_ref(), "Kite", &company.id, &[category.id.clone()], &[], &[])
            .await?;

        let (status, body) = send(
            &app,
            get_request(&format!("/api/companies/by-category/{}", category.id)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Acme");
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_returns_reference() -> Result<()> {
        let (app, _) = test_app().await?;

        let request = Request::builder()
            .method("POST")
            .uri("/api/uploads?filename=logo.png")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::from(&b"png bytes"[..]))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["ref"].as_str().is_some_and(|r| r.ends_with(".png")));

        let request = Request::builder()
            .method("POST")
            .uri("/api/uploads?filename=run.sh")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::from(&b"#!/bin/sh"[..]))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }
}
