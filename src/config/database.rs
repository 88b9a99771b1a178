//! Database configuration module for the catalog engine.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Association tables carry no foreign keys:
//! the catalog tolerates dangling references after a delete.

use crate::entities::{
    Category, Company, CompanyCategory, CompanySubcategory, Product, ProductCategory,
    ProductFeature, ProductSubcategory, Subcategory,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Default location of the catalog database when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/catalog.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the given database URL.
///
/// # Errors
/// Returns an error if the connection cannot be opened.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every catalog table if it does not exist yet.
///
/// Safe to call on every start-up.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Category).await?;
    create_table(db, &schema, Subcategory).await?;
    create_table(db, &schema, Company).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, ProductCategory).await?;
    create_table(db, &schema, ProductSubcategory).await?;
    create_table(db, &schema, ProductFeature).await?;
    create_table(db, &schema, CompanyCategory).await?;
    create_table(db, &schema, CompanySubcategory).await?;

    info!("Catalog tables ensured");
    Ok(())
}
