use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::model::{ConfigFormat, FlatMap, LoadIssue, PendingEdit, SUPPORTED_EXTENSIONS};

use super::flatten::unescape_segment;

/// Split a composite flat key into (file path, dotted key path) by the
/// rightmost segment ending in a recognized config extension.
pub fn split_flat_key(key: &str) -> Option<(&str, &str)> {
    let mut boundary = None;
    for (i, _) in key.match_indices('/') {
        let file = &key[..i];
        if ends_in_supported_extension(file) && i + 1 < key.len() {
            boundary = Some(i);
        }
    }
    boundary.map(|i| (&key[..i], &key[i + 1..]))
}

fn ends_in_supported_extension(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => SUPPORTED_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// The exact reverse of flatten + escape for any document free of the
/// reserved tokens.
pub fn unflatten(flat: &FlatMap) -> Result<BTreeMap<String, Value>> {
    let mut files: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in flat {
        match split_flat_key(key) {
            Some((file, dotted)) => {
                let root = files
                    .entry(file.to_string())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                let segments: Vec<String> = dotted.split('.').map(unescape_segment).collect();
                insert_nested(root, &segments, value.clone())
                    .with_context(|| format!("expand key {}", key))?;
            }
            None if ends_in_supported_extension(key) => {
                // Whole-file entry (empty or scalar document).
                files.entry(key.clone()).or_insert_with(|| value.clone());
            }
            None => anyhow::bail!("cannot recover file path from flat key: {}", key),
        }
    }
    Ok(files)
}

fn insert_nested(root: &mut Value, segments: &[String], value: Value) -> Result<()> {
    let mut cursor = root;
    for segment in &segments[..segments.len() - 1] {
        if !cursor.is_object() {
            *cursor = Value::Object(serde_json::Map::new());
        }
        let map = cursor
            .as_object_mut()
            .context("intermediate node is not an object")?;
        cursor = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if !cursor.is_object() {
        *cursor = Value::Object(serde_json::Map::new());
    }
    let map = cursor
        .as_object_mut()
        .context("leaf parent is not an object")?;
    let last = segments
        .last()
        .context("empty key path")?;
    map.insert(last.clone(), value);
    Ok(())
}

pub fn serialize_document(path: &str, data: &Value, format: ConfigFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ConfigFormat::Toml => toml::to_string_pretty(data)
            .with_context(|| format!("serialize toml: {}", path))?
            .into_bytes(),
        ConfigFormat::Yaml => serde_yaml::to_string(data)
            .with_context(|| format!("serialize yaml: {}", path))?
            .into_bytes(),
        ConfigFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(data)
                .with_context(|| format!("serialize json: {}", path))?;
            bytes.push(b'\n');
            bytes
        }
    };
    Ok(bytes)
}

/// A serialization failure falls back to a generic dump for that file only;
/// the edit is never dropped.
pub fn serialize_all(
    files: &BTreeMap<String, Value>,
    formats: &BTreeMap<String, ConfigFormat>,
) -> (Vec<PendingEdit>, Vec<LoadIssue>) {
    let mut edits = Vec::with_capacity(files.len());
    let mut fallbacks = Vec::new();
    for (path, data) in files {
        let format = formats
            .get(path)
            .copied()
            .or_else(|| ConfigFormat::from_path(path))
            .unwrap_or(ConfigFormat::Toml);
        let bytes = match serialize_document(path, data, format) {
            Ok(bytes) => bytes,
            Err(err) => {
                fallbacks.push(LoadIssue {
                    path: path.clone(),
                    error: format!("{:#}", err),
                });
                match serialize_document(path, data, ConfigFormat::Json) {
                    Ok(bytes) => bytes,
                    Err(_) => continue,
                }
            }
        };
        edits.push(PendingEdit::new(path, bytes));
    }
    (edits, fallbacks)
}
