use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::{ConfigDocument, FlatMap};

use super::serialize::split_flat_key;

// Characters that collide with the `<filePath>/<dotted.key.path>` grammar are
// substituted with placeholder tokens in the key portion only. Known
// limitation: a key whose literal text contains one of the tokens is not
// guarded.
const ESCAPES: [(char, &str); 10] = [
    ('/', "[slash]"),
    ('+', "[plus]"),
    ('"', "[quote]"),
    (':', "[colon]"),
    ('@', "[at]"),
    ('#', "[hash]"),
    ('%', "[percent]"),
    ('&', "[amp]"),
    ('=', "[equals]"),
    ('?', "[question]"),
];

pub fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, token)) => out.push_str(token),
            None => out.push(c),
        }
    }
    out
}

pub fn unescape_segment(segment: &str) -> String {
    let mut out = segment.to_string();
    for (raw, token) in ESCAPES {
        out = out.replace(token, &raw.to_string());
    }
    out
}

/// Arrays stay opaque leaves; an empty document keeps a whole-file entry so
/// the file is not lost on the way back.
pub fn flatten_documents(docs: &BTreeMap<String, ConfigDocument>) -> FlatMap {
    let mut flat = FlatMap::new();
    for (path, doc) in docs {
        match &doc.data {
            Value::Object(map) if !map.is_empty() => {
                for (key, value) in map {
                    flatten_value(&mut flat, path, key, value);
                }
            }
            other => {
                flat.insert(path.clone(), other.clone());
            }
        }
    }
    flat
}

fn flatten_value(flat: &mut FlatMap, file: &str, dotted: &str, value: &Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_value(flat, file, &format!("{}.{}", dotted, key), child);
            }
        }
        other => {
            flat.insert(format!("{}/{}", file, dotted), other.clone());
        }
    }
}

// The file-path portion is never touched.
pub fn escape_flat_keys(flat: &FlatMap) -> FlatMap {
    let mut out = FlatMap::new();
    for (key, value) in flat {
        let escaped = match split_flat_key(key) {
            Some((file, dotted)) => {
                let segments: Vec<String> =
                    dotted.split('.').map(escape_segment).collect();
                format!("{}/{}", file, segments.join("."))
            }
            None => key.clone(),
        };
        out.insert(escaped, value.clone());
    }
    out
}
