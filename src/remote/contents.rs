use crate::model::EntryKind;
use crate::store::under_prefix;

use super::*;

impl GitHubStore {
    pub(super) fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        with_retries(&format!("read {}", path), || {
            let resp = self
                .client
                .get(self.url(&format!("/contents/{}", path)))
                .query(&[("ref", self.repo.branch.as_str())])
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .header(reqwest::header::ACCEPT, "application/vnd.github.raw+json")
                .send()
                .map_err(StoreError::from)?;
            let resp = self.ensure_ok(resp, path)?;
            let bytes = resp.bytes().map_err(StoreError::from)?;
            Ok(bytes.to_vec())
        })
    }

    pub(super) fn fetch_tree(&self, root: &str) -> Result<Vec<TreeEntry>, StoreError> {
        let listing: types::TreeResponse = with_retries("list tree", || {
            let resp = self
                .client
                .get(self.url(&format!("/git/trees/{}", self.repo.branch)))
                .query(&[("recursive", "1")])
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .send()
                .map_err(StoreError::from)?;
            let resp = self.ensure_ok(resp, "list tree")?;
            resp.json().map_err(StoreError::from)
        })?;

        if listing.truncated {
            // A partial listing would silently break rename and discovery.
            return Err(StoreError::Transport(
                "tree listing truncated by the API".to_string(),
            ));
        }

        let mut out = Vec::with_capacity(listing.tree.len());
        for row in listing.tree {
            if !under_prefix(&row.path, root) {
                continue;
            }
            let kind = match row.kind.as_str() {
                "blob" => EntryKind::File,
                "tree" => EntryKind::Dir,
                _ => continue,
            };
            out.push(TreeEntry {
                path: row.path,
                kind,
                sha: row.sha,
                size: row.size,
            });
        }
        Ok(out)
    }
}
