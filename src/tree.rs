use std::collections::HashMap;

use crate::model::{EntryKind, TreeEntry, TreeNode};

/// Child ordering follows the listing order; missing directory rows are
/// synthesized; duplicate paths keep the first row.
pub fn build_tree(entries: &[TreeEntry]) -> Vec<TreeNode> {
    let mut seen = HashMap::new();
    let mut unique: Vec<&TreeEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if seen.insert(entry.path.as_str(), ()).is_none() {
            unique.push(entry);
        }
    }
    assemble("", &unique)
}

fn assemble(prefix: &str, entries: &[&TreeEntry]) -> Vec<TreeNode> {
    let mut order: Vec<String> = Vec::new();
    let mut own: HashMap<String, &TreeEntry> = HashMap::new();
    let mut nested: HashMap<String, Vec<&TreeEntry>> = HashMap::new();

    for entry in entries {
        let rel = match strip_prefix(&entry.path, prefix) {
            Some(rel) => rel,
            None => continue,
        };
        let (head, rest) = match rel.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (rel, None),
        };
        if !own.contains_key(head) && !nested.contains_key(head) {
            order.push(head.to_string());
        }
        match rest {
            None => {
                own.insert(head.to_string(), entry);
            }
            Some(_) => nested.entry(head.to_string()).or_default().push(entry),
        }
    }

    let mut out = Vec::with_capacity(order.len());
    for head in order {
        let path = join(prefix, &head);
        let below = nested.remove(&head).unwrap_or_default();
        let node = match own.get(head.as_str()) {
            Some(entry) if entry.kind == EntryKind::File && below.is_empty() => TreeNode {
                path: path.clone(),
                name: head,
                kind: EntryKind::File,
                sha: entry.sha.clone(),
                size: entry.size,
                index: None,
                children: Vec::new(),
            },
            found => {
                let (sha, size) = match found {
                    Some(entry) => (entry.sha.clone(), entry.size),
                    None => (String::new(), 0),
                };
                let children = assemble(&path, &below);
                let mut node = TreeNode {
                    path,
                    name: head,
                    kind: EntryKind::Dir,
                    sha,
                    size,
                    index: None,
                    children,
                };
                adopt_index(&mut node);
                node
            }
        };
        out.push(node);
    }
    out
}

// `_index.*` wins over `index.*` when both exist.
fn adopt_index(node: &mut TreeNode) {
    let pos = ["_index", "index"].iter().find_map(|stem| {
        node.children.iter().position(|c| {
            c.kind == EntryKind::File && c.name.split('.').next() == Some(stem)
        })
    });
    if let Some(pos) = pos {
        let index = node.children.remove(pos);
        node.index = Some(index.path);
        node.sha = index.sha;
        node.size = index.size;
    }
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    path.strip_prefix(prefix)?.strip_prefix('/')
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
