//! Image/asset storage behind an opaque reference.
//!
//! The catalog never looks inside an image: it stores the reference handed back by
//! [`AssetStore::store`] in `logo_ref`/`picture_ref` and asks the store to delete it
//! when the record drops or replaces it.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions accepted for uploaded images.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

/// Storage for binary assets addressed by opaque string references.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Stores `bytes` and returns the reference to record on the owning entity.
    async fn store(&self, bytes: &[u8], filename: &str) -> Result<String>;

    /// Loads the asset behind `reference`, `None` when it does not exist.
    async fn load(&self, reference: &str) -> Result<Option<Vec<u8>>>;

    /// Deletes the asset behind `reference`. Deleting an absent asset succeeds.
    async fn delete(&self, reference: &str) -> Result<()>;
}

/// Deletes a replaced or orphaned asset. Failures are logged, not returned.
pub async fn discard(assets: &dyn AssetStore, reference: Option<&str>) {
    let Some(reference) = reference else {
        return;
    };
    if let Err(e) = assets.delete(reference).await {
        warn!(reference, error = %e, "Failed to delete asset");
    }
}

/// Lower-cased extension of `filename`, if it is one of [`ALLOWED_EXTENSIONS`].
///
/// # Errors
/// Returns `Validation` for any other file type.
pub fn image_extension(filename: &str) -> Result<String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(Error::validation("Only image files are allowed (jpeg, jpg, png, gif)"))
    }
}

/// Asset store writing files into a local directory.
///
/// References look like `/uploads/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

/// URL prefix of references produced by [`LocalAssetStore`].
pub const LOCAL_PREFIX: &str = "/uploads/";

impl LocalAssetStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a reference back to a file path, refusing anything that could escape the root.
    fn path_for(&self, reference: &str) -> Result<PathBuf> {
        let name = reference.strip_prefix(LOCAL_PREFIX).unwrap_or(reference);
        if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(Error::Asset {
                message: format!("Invalid asset reference '{reference}'"),
            });
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, bytes: &[u8], filename: &str) -> Result<String> {
        let extension = image_extension(filename)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let name = format!("{}.{extension}", uuid::Uuid::new_v4());
        tokio::fs::write(self.root.join(&name), bytes).await?;
        debug!(name, size = bytes.len(), "Asset stored");
        Ok(format!("{LOCAL_PREFIX}{name}"))
    }

    async fn load(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(reference)?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, reference: &str) -> Result<()> {
        let path = self.path_for(reference)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(reference, "Asset deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
