//! Raw store kept in memory - usually for testing

use crate::raw_store::traits::*;
use crate::*;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Create an in-memory [RawStore] together with a handle for inspecting
/// and corrupting its content.
pub fn create_mem_store() -> (RawStore, MemStore) {
    let mem = MemStore::default();
    (RawStore::new(mem.clone()), mem)
}

#[derive(Default)]
struct MemStoreInner {
    files: BTreeMap<PathBuf, SecretBytes>,
    dirs: BTreeSet<PathBuf>,
    write_count: usize,
}

impl MemStoreInner {
    fn add_dirs(&mut self, path: &Path) {
        for dir in path.ancestors() {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
        }
    }
}

/// In-memory storage backend. Clones share the same content.
#[derive(Clone, Default)]
pub struct MemStore(Arc<RwLock<MemStoreInner>>);

impl MemStore {
    /// Number of file writes performed so far.
    pub fn write_count(&self) -> usize {
        self.0.read().write_count
    }

    /// Every file path currently stored.
    pub fn files(&self) -> Vec<PathBuf> {
        self.0.read().files.keys().cloned().collect()
    }

    /// Copy of one file's content.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.0.read().files.get(path.as_ref()).map(|b| b.to_vec())
    }

    /// Delete one file, returns true if it existed.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.0.write().files.remove(path.as_ref()).is_some()
    }

    /// Replace one file's content without counting it as a write.
    pub fn overwrite(&self, path: impl AsRef<Path>, data: &[u8]) {
        let mut lock = self.0.write();
        if let Some(parent) = path.as_ref().parent() {
            lock.add_dirs(parent);
        }
        lock.files
            .insert(path.as_ref().to_path_buf(), SecretBytes::new(data.to_vec()));
    }
}

impl AsRawStore for MemStore {
    fn read(&self, path: &Path) -> std::io::Result<Option<SecretBytes>> {
        Ok(self.0.read().files.get(path).cloned())
    }

    fn write(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut lock = self.0.write();
        if lock.dirs.contains(path) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "a directory exists at this path",
            ));
        }
        if let Some(parent) = path.parent() {
            lock.add_dirs(parent);
        }
        lock.files
            .insert(path.to_path_buf(), SecretBytes::new(data.to_vec()));
        lock.write_count += 1;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let lock = self.0.read();
        lock.files.contains_key(path) || lock.dirs.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        self.0.write().add_dirs(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_tracks_dirs_and_writes() {
        let (store, mem) = create_mem_store();
        let file = Path::new("/prod/a/b.txt");
        store.write(file, b"x").unwrap();
        assert!(store.exists(Path::new("/prod/a")));
        assert!(store.exists(file));
        assert_eq!(1, mem.write_count());
        mem.overwrite(file, b"y");
        assert_eq!(Some(b"y".to_vec()), mem.get(file));
        assert_eq!(1, mem.write_count());
        assert!(mem.remove(file));
        assert!(store.read(file).unwrap().is_none());
        assert!(store.write(Path::new("/prod/a"), b"z").is_err());
    }
}
