//! Items related to persisting pieces and records as plain files.

use crate::*;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Helper traits for store types - you probably don't need these unless
/// you are implementing a new storage backend.
pub mod traits {
    use super::*;

    /// Defines a raw file storage mechanism.
    pub trait AsRawStore: 'static + Send + Sync {
        /// Read a whole file, `None` if it does not exist.
        fn read(&self, path: &Path) -> std::io::Result<Option<SecretBytes>>;

        /// Write a whole file, creating parent directories as needed.
        fn write(&self, path: &Path, data: &[u8]) -> std::io::Result<()>;

        /// True if a file or directory exists at this path.
        fn exists(&self, path: &Path) -> bool;

        /// Create a directory and all of its parents.
        fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;
    }
}
use traits::*;

/// Handle to a raw file storage mechanism.
#[derive(Clone)]
pub struct RawStore(pub Arc<dyn AsRawStore>);

impl RawStore {
    /// Wrap a storage backend.
    pub fn new(store: impl AsRawStore) -> Self {
        Self(Arc::new(store))
    }

    /// Read a whole file, `None` if it does not exist.
    pub fn read(&self, path: &Path) -> StoreResult<Option<SecretBytes>> {
        self.0.read(path).map_err(|e| StoreError::io(path, e))
    }

    /// Write a whole file, creating parent directories as needed.
    pub fn write(&self, path: &Path, data: &[u8]) -> StoreResult<()> {
        self.0.write(path, data).map_err(|e| StoreError::io(path, e))
    }

    /// True if a file or directory exists at this path.
    pub fn exists(&self, path: &Path) -> bool {
        self.0.exists(path)
    }

    /// Create a directory and all of its parents.
    pub fn create_dir_all(&self, path: &Path) -> StoreResult<()> {
        self.0
            .create_dir_all(path)
            .map_err(|e| StoreError::io(path, e))
    }
}

/// Join a relative path below a root, refusing anything that could
/// resolve outside of it (absolute paths, `..`, drive prefixes).
pub fn confined_join(root: &Path, relative: &str) -> StoreResult<PathBuf> {
    let rel = Path::new(relative);
    let mut out = root.to_path_buf();
    let mut pushed = false;
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                pushed = true;
            }
            Component::CurDir => (),
            _ => return Err(StoreError::UnsafePath(relative.to_string())),
        }
    }
    if !pushed {
        return Err(StoreError::UnsafePath(relative.to_string()));
    }
    tracing::trace!(?out, "resolved");
    Ok(out)
}
