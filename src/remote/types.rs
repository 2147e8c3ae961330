#[derive(Debug, serde::Deserialize)]
pub(super) struct RefResponse {
    pub(super) object: ObjectRef,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct ObjectRef {
    pub(super) sha: String,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct CommitResponse {
    pub(super) sha: String,
    pub(super) tree: ObjectRef,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct CreateBlobRequest {
    pub(super) content: String,
    pub(super) encoding: &'static str,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct ShaResponse {
    pub(super) sha: String,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct CreateTreeRequest {
    pub(super) base_tree: String,
    pub(super) tree: Vec<TreeWriteEntry>,
}

/// One row of a tree write. `sha: None` serializes as an explicit null,
/// which the API reads as a deletion of that path.
#[derive(Debug, serde::Serialize)]
pub(super) struct TreeWriteEntry {
    pub(super) path: String,
    pub(super) mode: &'static str,
    #[serde(rename = "type")]
    pub(super) kind: &'static str,
    pub(super) sha: Option<String>,
}

impl TreeWriteEntry {
    pub(super) fn blob(path: &str, sha: Option<String>) -> Self {
        Self {
            path: path.to_string(),
            mode: "100644",
            kind: "blob",
            sha,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub(super) struct CreateCommitRequest {
    pub(super) message: String,
    pub(super) tree: String,
    pub(super) parents: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct UpdateRefRequest {
    pub(super) sha: String,
    pub(super) force: bool,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct TreeResponse {
    pub(super) tree: Vec<TreeRow>,

    #[serde(default)]
    pub(super) truncated: bool,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct TreeRow {
    pub(super) path: String,

    #[serde(rename = "type")]
    pub(super) kind: String,

    pub(super) sha: String,

    #[serde(default)]
    pub(super) size: u64,
}
