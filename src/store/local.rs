// Local-disk object storage.
//
// Writes each object under a root directory and hands back a file:// URL.
// Good enough for a single-machine deployment and for tests.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use super::traits::{ObjectStorage, StoreError};

pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a destination key under the root, rejecting keys that would
    /// escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(StoreError::PermissionDenied(format!(
                "invalid destination key: {key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, bytes: &[u8], key: &str, content_type: &str) -> Result<String, StoreError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(e, &format!("creating {}", parent.display())))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| io_error(e, &format!("writing {}", path.display())))?;

        let absolute = tokio::fs::canonicalize(&path)
            .await
            .with_context(|| format!("Failed to resolve {}", path.display()))?;

        debug!(key = key, content_type = content_type, size = bytes.len(), "Stored object");
        Ok(format!("file://{}", absolute.display()))
    }
}

fn io_error(e: std::io::Error, action: &str) -> StoreError {
    let message = format!("{action}: {e}");
    match e.kind() {
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
            StoreError::PermissionDenied(message)
        }
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded | ErrorKind::FileTooLarge => {
            StoreError::QuotaExceeded(message)
        }
        ErrorKind::NotFound | ErrorKind::TimedOut | ErrorKind::Interrupted => {
            StoreError::Unavailable(message)
        }
        _ => StoreError::Other(anyhow::anyhow!(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_traversal() {
        let storage = LocalObjectStorage::new("/tmp/listing-guard-test");
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("/absolute/path").is_err());
        assert!(storage.resolve("").is_err());
        assert!(storage.resolve("listings/u1/1-0.png").is_ok());
    }
}
