use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::model::{ConfigDocument, ConfigFormat, LoadIssue};

pub fn parse_document(path: &str, bytes: &[u8]) -> Result<ConfigDocument> {
    let format = ConfigFormat::from_path(path)
        .with_context(|| format!("unsupported config extension: {}", path))?;
    let text = std::str::from_utf8(bytes).with_context(|| format!("non-utf8 content: {}", path))?;

    let data = match format {
        ConfigFormat::Toml => {
            let value: toml::Value =
                toml::from_str(text).with_context(|| format!("parse toml: {}", path))?;
            serde_json::to_value(value).with_context(|| format!("convert toml: {}", path))?
        }
        ConfigFormat::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(text).with_context(|| format!("parse yaml: {}", path))?;
            if value.is_null() {
                // An empty YAML file is an empty mapping, not null.
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                serde_json::to_value(value).with_context(|| format!("convert yaml: {}", path))?
            }
        }
        ConfigFormat::Json => {
            serde_json::from_str(text).with_context(|| format!("parse json: {}", path))?
        }
    };

    anyhow::ensure!(
        data.is_object(),
        "top-level of {} must be a table/mapping",
        path
    );

    Ok(ConfigDocument {
        path: path.to_string(),
        format,
        data,
    })
}

// A parse failure drops only that file's contribution.
pub fn parse_all(files: &[(String, Vec<u8>)]) -> (BTreeMap<String, ConfigDocument>, Vec<LoadIssue>) {
    let mut docs = BTreeMap::new();
    let mut issues = Vec::new();
    for (path, bytes) in files {
        match parse_document(path, bytes) {
            Ok(doc) => {
                docs.insert(path.clone(), doc);
            }
            Err(err) => issues.push(LoadIssue {
                path: path.clone(),
                error: format!("{:#}", err),
            }),
        }
    }
    (docs, issues)
}
