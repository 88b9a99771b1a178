//! Runtime settings loaded from environment variables.
//!
//! Values are read once at start-up (after `.env` has been loaded by `main`).
//! Every setting has a default except `ADMIN_TOKEN`: without it the admin
//! routes reject every request.

use super::database::get_database_url;
use std::path::PathBuf;

/// Address the HTTP server binds to when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Socket address for the HTTP server
    pub bind_addr: String,
    /// Bearer token accepted on admin routes
    pub admin_token: Option<String>,
    /// Directory the local asset store writes to
    pub upload_dir: PathBuf,
    /// Path of the catalog seed file
    pub catalog_config: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: get_database_url(),
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            admin_token: std::env::var("ADMIN_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            catalog_config: PathBuf::from(env_or("CATALOG_CONFIG", "config.toml")),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
