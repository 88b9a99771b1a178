//! Catalog seed configuration loading from config.toml
//!
//! The categories (and their subcategories) defined in config.toml are created
//! on start-up when no category of the same name exists yet.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategorySeed {
    /// Name of the category
    pub name: String,
    /// Names of the subcategories created under it
    #[serde(default)]
    pub subcategories: Vec<String>,
}

/// Loads catalog seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Like [`load_config`], but a missing file yields an empty configuration.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        tracing::debug!(path = ?path.as_ref(), "No catalog seed file, skipping seeding");
        Ok(Config::default())
    }
}
