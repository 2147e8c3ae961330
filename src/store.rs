use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::model::{CommitInfo, PendingEdit, TreeEntry};

mod memory;

pub use self::memory::MemoryStore;

/// A repository tree as a virtual filesystem. Every mutating call lands as
/// exactly one commit.
pub trait ContentStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    // Tolerant of missing entries.
    fn read_many(&self, paths: &[String]) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        let mut out = BTreeMap::new();
        for path in paths {
            match self.read_file(path) {
                Ok(bytes) => {
                    out.insert(path.clone(), bytes);
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }

    fn write_many(&self, files: &[PendingEdit], message: &str) -> Result<CommitInfo, StoreError>;

    fn delete_paths(&self, paths: &[String], message: &str) -> Result<CommitInfo, StoreError>;

    /// Without `overwrite`, an occupied destination that is not itself moving
    /// away is `AlreadyExists`.
    fn rename_paths(
        &self,
        mappings: &[(String, String)],
        overwrite: bool,
        message: &str,
    ) -> Result<CommitInfo, StoreError>;

    /// Scoped recursive flat listing; an empty scope lists the whole tree.
    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>, StoreError>;
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn under_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path == prefix || path.starts_with(&format!("{}/", prefix))
}
