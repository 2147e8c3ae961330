use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &str) -> Option<Self> {
        match path.rsplit('.').next() {
            Some("toml") => Some(Self::Toml),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub path: String,
    pub format: ConfigFormat,
    pub data: serde_json::Value,
}

/// Composite key `<filePath>/<dotted.key.path>` to value.
pub type FlatMap = BTreeMap<String, serde_json::Value>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadIssue {
    pub path: String,
    pub error: String,
}
