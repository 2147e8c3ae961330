use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use time::format_description::well_known::Rfc3339;

use crate::error::StoreError;
use crate::model::{CommitInfo, EntryKind, PendingEdit, TreeEntry};

use super::{hash_bytes, under_prefix};

/// In-process `ContentStore`: every mutating call is validated fully before
/// any byte changes, and lands as one commit.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    files: BTreeMap<String, Vec<u8>>,
    commits: Vec<CommitInfo>,
    fail_writes: HashSet<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    // Places a file directly into the tree without a commit.
    pub fn seed(&self, path: &str, content: impl Into<Vec<u8>>) {
        let mut inner = self.lock();
        inner.files.insert(path.to_string(), content.into());
    }

    // Any future commit that would write `path` fails before mutating
    // anything.
    pub fn fail_writes_to(&self, path: &str) {
        let mut inner = self.lock();
        inner.fail_writes.insert(path.to_string());
    }

    pub fn commit_count(&self) -> usize {
        self.lock().commits.len()
    }

    pub fn commits(&self) -> Vec<CommitInfo> {
        self.lock().commits.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Inner {
    fn check_injected(&self, paths: impl Iterator<Item = String>) -> Result<(), StoreError> {
        for path in paths {
            if self.fail_writes.contains(&path) {
                return Err(StoreError::Transport(format!(
                    "write rejected for {}",
                    path
                )));
            }
        }
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<CommitInfo, StoreError> {
        let committed_at = time::OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(StoreError::transport)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(message.as_bytes());
        hasher.update(committed_at.as_bytes());
        hasher.update(self.commits.len().to_string().as_bytes());
        for (path, bytes) in &self.files {
            hasher.update(path.as_bytes());
            hasher.update(bytes);
        }
        let info = CommitInfo {
            sha: hasher.finalize().to_hex().to_string(),
            message: message.to_string(),
            committed_at,
        };
        self.commits.push(info.clone());
        Ok(info)
    }
}

impl super::ContentStore for MemoryStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let inner = self.lock();
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn write_many(&self, files: &[PendingEdit], message: &str) -> Result<CommitInfo, StoreError> {
        if files.is_empty() {
            return Err(StoreError::Transport("empty commit".to_string()));
        }
        let mut inner = self.lock();
        inner.check_injected(files.iter().map(|f| f.path.clone()))?;
        for edit in files {
            inner.files.insert(edit.path.clone(), edit.content.clone());
        }
        inner.commit(message)
    }

    fn delete_paths(&self, paths: &[String], message: &str) -> Result<CommitInfo, StoreError> {
        let mut inner = self.lock();
        for path in paths {
            if !inner.files.contains_key(path) {
                return Err(StoreError::NotFound(path.clone()));
            }
        }
        for path in paths {
            inner.files.remove(path);
        }
        inner.commit(message)
    }

    fn rename_paths(
        &self,
        mappings: &[(String, String)],
        overwrite: bool,
        message: &str,
    ) -> Result<CommitInfo, StoreError> {
        let mut inner = self.lock();
        let sources: HashSet<&str> = mappings.iter().map(|(from, _)| from.as_str()).collect();
        for (from, to) in mappings {
            if !inner.files.contains_key(from) {
                return Err(StoreError::NotFound(from.clone()));
            }
            // A destination occupied by something not also moving away is a
            // collision, not a rename.
            if !overwrite && inner.files.contains_key(to) && !sources.contains(to.as_str()) {
                return Err(StoreError::AlreadyExists(to.clone()));
            }
        }
        inner.check_injected(mappings.iter().map(|(_, to)| to.clone()))?;

        let mut moved = Vec::with_capacity(mappings.len());
        for (from, _) in mappings {
            let bytes = inner
                .files
                .remove(from)
                .ok_or_else(|| StoreError::NotFound(from.clone()))?;
            moved.push(bytes);
        }
        for ((_, to), bytes) in mappings.iter().zip(moved) {
            inner.files.insert(to.clone(), bytes);
        }
        inner.commit(message)
    }

    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>, StoreError> {
        let inner = self.lock();
        let mut out = Vec::new();
        let mut seen_dirs: HashSet<String> = HashSet::new();

        // Sha of a directory folds in every descendant blob, so the node
        // identity changes whenever anything under it changes.
        let mut dir_hash: BTreeMap<String, blake3::Hasher> = BTreeMap::new();
        for (path, bytes) in &inner.files {
            if !under_prefix(path, root) {
                continue;
            }
            for dir in ancestors_below(path, root) {
                let hasher = dir_hash.entry(dir).or_default();
                hasher.update(path.as_bytes());
                hasher.update(bytes);
            }
        }

        for (path, bytes) in &inner.files {
            if !under_prefix(path, root) {
                continue;
            }
            for dir in ancestors_below(path, root) {
                if seen_dirs.insert(dir.clone()) {
                    let sha = dir_hash
                        .get(&dir)
                        .map(|h| h.finalize().to_hex().to_string())
                        .unwrap_or_default();
                    out.push(TreeEntry {
                        path: dir,
                        kind: EntryKind::Dir,
                        sha,
                        size: 0,
                    });
                }
            }
            out.push(TreeEntry {
                path: path.clone(),
                kind: EntryKind::File,
                sha: hash_bytes(bytes),
                size: bytes.len() as u64,
            });
        }
        Ok(out)
    }
}

// Directories strictly between `root` and the file at `path`, shallowest
// first, excluding the root itself.
fn ancestors_below(path: &str, root: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut prefix = String::new();
    let Some(parent) = path.rsplit_once('/').map(|(dir, _)| dir) else {
        return out;
    };
    for part in parent.split('/') {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        if !prefix.is_empty() && prefix != root && under_prefix(&prefix, root) {
            out.push(prefix.clone());
        }
    }
    out
}
