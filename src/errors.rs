//! Unified error type for the catalog engine.
//!
//! Every fallible operation in `core`, `config` and `api` returns [`Result`].
//! The API layer maps each variant onto an HTTP status (see `api::error`).

use thiserror::Error;

/// The kind of record a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A category record
    Category,
    /// A subcategory record
    Subcategory,
    /// A company record
    Company,
    /// A product record
    Product,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Category => "Category",
            Self::Subcategory => "Subcategory",
            Self::Company => "Company",
            Self::Product => "Product",
        };
        f.write_str(name)
    }
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input, rejected before any store access
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A referenced id does not resolve to an existing record
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Which collection was searched
        entity: EntityKind,
        /// The id that failed to resolve
        id: String,
    },

    /// The write would break a record invariant (e.g. discounted price >= base price)
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable reason
        message: String,
    },

    /// The caller is not allowed to perform a mutating operation
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable reason
        message: String,
    },

    /// Underlying storage failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Asset store failure
    #[error("Asset error: {message}")]
    Asset {
        /// Human-readable reason
        message: String,
    },

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
