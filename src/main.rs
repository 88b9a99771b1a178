use catalog_engine::{
    api::{AppState, create_router},
    config::{catalog, database, settings::Settings},
    core::{assets::LocalAssetStore, category},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{path::Path, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Creates the directory holding a file-backed `SQLite` database.
fn ensure_database_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(file).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal: env vars can be set externally
    dotenv().ok();
    let settings = Settings::from_env();
    if settings.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN is not set, admin routes will reject every request");
    }

    // 3. Open the entity store and make sure the tables exist
    ensure_database_dir(&settings.database_url)?;
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to open database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))?;

    // 4. Seed categories from the catalog config
    let catalog_config = catalog::load_config_or_default(&settings.catalog_config)?;
    category::seed_categories(&db, &catalog_config)
        .await
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;

    // 5. Serve
    let state = AppState::new(
        db,
        Arc::new(LocalAssetStore::new(settings.upload_dir.clone())),
        settings.admin_token.clone(),
    );
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", settings.bind_addr, e))?;
    info!(addr = %settings.bind_addr, "Catalog engine listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
