use base64::Engine as _;
use time::format_description::well_known::Rfc3339;

use super::*;

impl GitHubStore {
    pub(super) fn create_blob(&self, content: &[u8]) -> Result<String, StoreError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        let resp: types::ShaResponse = with_retries("create blob", || {
            let resp = self
                .client
                .post(self.url("/git/blobs"))
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .json(&types::CreateBlobRequest {
                    content: encoded.clone(),
                    encoding: "base64",
                })
                .send()
                .map_err(StoreError::from)?;
            let resp = self.ensure_ok(resp, "create blob")?;
            resp.json().map_err(StoreError::from)
        })?;
        Ok(resp.sha)
    }

    fn head_commit(&self) -> Result<types::CommitResponse, StoreError> {
        let head: types::RefResponse = with_retries("read ref", || {
            let resp = self
                .client
                .get(self.url(&format!("/git/ref/heads/{}", self.repo.branch)))
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .send()
                .map_err(StoreError::from)?;
            let resp = self.ensure_ok(resp, &format!("branch {}", self.repo.branch))?;
            resp.json().map_err(StoreError::from)
        })?;

        with_retries("read commit", || {
            let resp = self
                .client
                .get(self.url(&format!("/git/commits/{}", head.object.sha)))
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .send()
                .map_err(StoreError::from)?;
            let resp = self.ensure_ok(resp, "base commit")?;
            resp.json().map_err(StoreError::from)
        })
    }

    pub(super) fn commit_entries(
        &self,
        entries: Vec<types::TreeWriteEntry>,
        message: &str,
    ) -> Result<CommitInfo, StoreError> {
        let base = self.head_commit()?;

        let tree: types::ShaResponse = with_retries("create tree", || {
            let resp = self
                .client
                .post(self.url("/git/trees"))
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .json(&types::CreateTreeRequest {
                    base_tree: base.tree.sha.clone(),
                    tree: entries
                        .iter()
                        .map(|e| types::TreeWriteEntry::blob(&e.path, e.sha.clone()))
                        .collect(),
                })
                .send()
                .map_err(StoreError::from)?;
            let resp = self.ensure_ok(resp, "create tree")?;
            resp.json().map_err(StoreError::from)
        })?;

        let commit: types::ShaResponse = with_retries("create commit", || {
            let resp = self
                .client
                .post(self.url("/git/commits"))
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .json(&types::CreateCommitRequest {
                    message: message.to_string(),
                    tree: tree.sha.clone(),
                    parents: vec![base.sha.clone()],
                })
                .send()
                .map_err(StoreError::from)?;
            let resp = self.ensure_ok(resp, "create commit")?;
            resp.json().map_err(StoreError::from)
        })?;

        match self.update_ref(&commit.sha, false) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                // Remote moved since our base: one retry, forced
                // (last-writer-wins).
                self.update_ref(&commit.sha, true)?;
            }
            Err(err) => return Err(err),
        }

        let committed_at = time::OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(StoreError::transport)?;
        Ok(CommitInfo {
            sha: commit.sha,
            message: message.to_string(),
            committed_at,
        })
    }

    fn update_ref(&self, sha: &str, force: bool) -> Result<(), StoreError> {
        let resp = self
            .client
            .patch(self.url(&format!("/git/refs/heads/{}", self.repo.branch)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&types::UpdateRefRequest {
                sha: sha.to_string(),
                force,
            })
            .send()
            .map_err(StoreError::from)?;
        self.ensure_ok(resp, "update ref")?;
        Ok(())
    }
}
