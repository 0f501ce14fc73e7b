use std::fmt::Write;
use std::path::{Path, PathBuf};

use infodocs_core::keys;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::StorageError;
use crate::objects;

/// Where images and rendered artifacts are persisted.
pub trait AssetStore: Send + Sync {
    /// Persist an image belonging to `document_id` and return its path
    /// relative to the store root. The path depends only on the document,
    /// the kind and the bytes, so saving the same payload twice yields the
    /// same path and no second file.
    fn save(
        &self,
        bytes: &[u8],
        document_id: Uuid,
        kind: &str,
        ext: &str,
    ) -> Result<String, StorageError>;

    /// Persist a rendered artifact (`certificate_<id>.<ext>`), replacing any
    /// previous render of the same document.
    fn save_artifact(
        &self,
        bytes: &[u8],
        document_id: Uuid,
        ext: &str,
    ) -> Result<String, StorageError>;

    /// Whether `relative_path` exists under `root`.
    fn exists(&self, root: &Path, relative_path: &str) -> bool;
}

/// Asset store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for LocalAssetStore {
    fn save(
        &self,
        bytes: &[u8],
        document_id: Uuid,
        kind: &str,
        ext: &str,
    ) -> Result<String, StorageError> {
        let key = keys::certificate_asset(document_id, kind, &short_digest(bytes), ext);
        if objects::object_exists(&self.root, &key) {
            tracing::debug!(%document_id, key = %key, "asset already stored");
            return Ok(key);
        }
        if objects::put_object_if_absent(&self.root, &key, bytes)? {
            tracing::info!(%document_id, key = %key, bytes = bytes.len(), "asset stored");
        } else {
            tracing::debug!(%document_id, key = %key, "asset stored by a concurrent save");
        }
        Ok(key)
    }

    fn save_artifact(
        &self,
        bytes: &[u8],
        document_id: Uuid,
        ext: &str,
    ) -> Result<String, StorageError> {
        let key = keys::certificate_artifact(document_id, ext);
        objects::put_object(&self.root, &key, bytes)?;
        tracing::info!(%document_id, key = %key, bytes = bytes.len(), "artifact stored");
        Ok(key)
    }

    fn exists(&self, root: &Path, relative_path: &str) -> bool {
        objects::object_exists(root, relative_path)
    }
}

/// First 16 hex digits of the SHA-256 of `bytes`.
fn short_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(16);
    for b in &digest[..8] {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
