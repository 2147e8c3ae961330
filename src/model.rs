use serde::{Deserialize, Serialize};

mod config_doc;
mod site;

pub use self::config_doc::{ConfigDocument, ConfigFormat, FlatMap, LoadIssue, SUPPORTED_EXTENSIONS};
pub use self::site::{BuildStatus, SiteRecord};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

impl RepositoryRef {
    pub fn new(owner: &str, name: &str, branch: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
    pub sha: String,
    pub size: u64,
}

/// A directory holding an index file (`_index.*` or `index.*`) is addressable
/// as a page through that index; the index is excluded from `children` and
/// the directory's `sha` is the index blob's sha.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeNode {
    pub path: String,
    pub name: String,
    pub kind: EntryKind,
    pub sha: String,
    pub size: u64,

    /// Path of the index file when this directory is a page bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_page(&self) -> bool {
        self.kind == EntryKind::File || self.index.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct PendingEdit {
    pub path: String,
    pub content: Vec<u8>,
}

impl PendingEdit {
    pub fn new(path: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub committed_at: String,
}

/// A top-level grouping declared by the template's JSON Schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaCategory {
    pub key: String,
    pub title: String,
    pub fields: Vec<String>,
    pub hidden: bool,
}

pub const MISC_CATEGORY: &str = "misc";
