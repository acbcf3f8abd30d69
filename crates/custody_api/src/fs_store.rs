//! Raw store backed by the local filesystem.

use crate::raw_store::traits::*;
use crate::*;
use std::path::Path;

/// Create a [RawStore] that reads and writes real files.
pub fn create_fs_store() -> RawStore {
    RawStore::new(FsStore)
}

/// Filesystem storage backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl AsRawStore for FsStore {
    fn read(&self, path: &Path) -> std::io::Result<Option<SecretBytes>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(SecretBytes::new(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_round_trip() {
        let tmpdir = tempdir::TempDir::new("custody fs store").unwrap();
        let store = create_fs_store();
        let file = tmpdir.path().join("a/b/c.txt");
        assert!(store.read(&file).unwrap().is_none());
        assert!(!store.exists(&file));
        store.write(&file, b"hello").unwrap();
        assert!(store.exists(&file));
        assert!(store.exists(&tmpdir.path().join("a/b")));
        assert_eq!(b"hello".as_slice(), store.read(&file).unwrap().unwrap().as_slice());
    }
}
