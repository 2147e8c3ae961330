use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::model::{CommitInfo, PendingEdit, RepositoryRef, TreeEntry};
use crate::store::ContentStore;

mod commits;
mod contents;
mod http_client;
mod types;

use self::http_client::with_retries;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub-backed `ContentStore`. Every mutating call builds one commit
/// through the blob/tree/commit/ref primitives.
pub struct GitHubStore {
    repo: RepositoryRef,
    token: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl GitHubStore {
    pub fn new(repo: RepositoryRef, token: String) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("siteloom")
            .build()
            .map_err(StoreError::from)?;
        Ok(Self {
            repo,
            token,
            base_url: DEFAULT_API_URL.to_string(),
            client,
        })
    }

    /// Point the adapter at a non-default API host.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn repo(&self) -> &RepositoryRef {
        &self.repo
    }
}

impl ContentStore for GitHubStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.fetch_raw(path)
    }

    fn read_many(&self, paths: &[String]) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        let mut out = BTreeMap::new();
        for path in paths {
            match self.fetch_raw(path) {
                Ok(bytes) => {
                    out.insert(path.clone(), bytes);
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }

    fn write_many(&self, files: &[PendingEdit], message: &str) -> Result<CommitInfo, StoreError> {
        if files.is_empty() {
            return Err(StoreError::Transport("empty commit".to_string()));
        }
        let mut entries = Vec::with_capacity(files.len());
        for edit in files {
            let sha = self.create_blob(&edit.content)?;
            entries.push(types::TreeWriteEntry::blob(&edit.path, Some(sha)));
        }
        self.commit_entries(entries, message)
    }

    fn delete_paths(&self, paths: &[String], message: &str) -> Result<CommitInfo, StoreError> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            // Probing first keeps NotFound semantics instead of a late 422.
            self.fetch_raw(path)?;
            entries.push(types::TreeWriteEntry::blob(path, None));
        }
        self.commit_entries(entries, message)
    }

    fn rename_paths(
        &self,
        mappings: &[(String, String)],
        overwrite: bool,
        message: &str,
    ) -> Result<CommitInfo, StoreError> {
        let listing = self.list_tree("")?;
        let shas: BTreeMap<&str, &str> = listing
            .iter()
            .map(|e| (e.path.as_str(), e.sha.as_str()))
            .collect();
        let sources: Vec<&str> = mappings.iter().map(|(from, _)| from.as_str()).collect();

        let mut entries = Vec::with_capacity(mappings.len() * 2);
        for (from, to) in mappings {
            let sha = shas
                .get(from.as_str())
                .ok_or_else(|| StoreError::NotFound(from.clone()))?;
            if !overwrite && shas.contains_key(to.as_str()) && !sources.contains(&to.as_str()) {
                return Err(StoreError::AlreadyExists(to.clone()));
            }
            // True rename: reuse the existing blob sha at the new path and
            // drop the old path in the same tree.
            entries.push(types::TreeWriteEntry::blob(to, Some(sha.to_string())));
            entries.push(types::TreeWriteEntry::blob(from, None));
        }
        self.commit_entries(entries, message)
    }

    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>, StoreError> {
        self.fetch_tree(root)
    }
}
