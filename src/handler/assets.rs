//! Static asset store
//!
//! The router depends only on [`AssetStore`]: an exact-path lookup into the
//! built frontend bundle. [`DirAssetStore`] serves the bundle from disk.

use async_trait::async_trait;
use hyper::body::Bytes;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::http::{cache, mime};
use crate::logger;

/// A file from the build bundle
#[derive(Debug, Clone)]
pub struct Asset {
    pub body: Bytes,
    pub content_type: &'static str,
    pub etag: String,
}

impl Asset {
    pub fn new(body: Bytes, path: &str) -> Self {
        let content_type = mime::get_content_type(extension(path));
        let etag = cache::generate_etag(&body);
        Self {
            body,
            content_type,
            etag,
        }
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    /// The store itself cannot be read (missing bundle, I/O failure)
    #[error("asset store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Look up an asset by its exact request path (e.g. `/assets/app.js`).
    ///
    /// `Ok(None)` means the store is healthy but has no such file.
    async fn get(&self, path: &str) -> Result<Option<Asset>, AssetError>;
}

/// File extension of the last path segment, if any
pub fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Serves the bundle from a directory on disk
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a request path to a relative file path, rejecting traversal
    fn relative_path(path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| relative.to_path_buf())
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    async fn get(&self, path: &str) -> Result<Option<Asset>, AssetError> {
        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            AssetError::Unavailable(format!("{}: {e}", self.root.display()))
        })?;

        let Some(relative) = Self::relative_path(path) else {
            return Ok(None);
        };

        // File not found is common (404), no need to log
        let file_path = match fs::canonicalize(root.join(&relative)).await {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AssetError::Unavailable(format!("{path}: {e}"))),
        };

        // Symlinks may still point outside the bundle
        if !file_path.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                path,
                file_path.display()
            ));
            return Ok(None);
        }

        match fs::metadata(&file_path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) => return Err(AssetError::Unavailable(format!("{path}: {e}"))),
        }

        match fs::read(&file_path).await {
            Ok(content) => Ok(Some(Asset::new(Bytes::from(content), path))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AssetError::Unavailable(format!("{path}: {e}"))),
        }
    }
}
