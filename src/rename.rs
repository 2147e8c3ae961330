use crate::error::StoreError;
use crate::model::{CommitInfo, EntryKind, PendingEdit};
use crate::store::ContentStore;

/// One commit: the content appears at `to` and `from` disappears together.
pub fn rename_file(
    store: &dyn ContentStore,
    from: &str,
    to: &str,
    overwrite: bool,
) -> Result<CommitInfo, StoreError> {
    if from == to {
        return Err(StoreError::Conflict(format!(
            "rename source equals destination: {}",
            from
        )));
    }
    match store.read_file(to) {
        Ok(_) if !overwrite => return Err(StoreError::AlreadyExists(to.to_string())),
        Ok(_) => {}
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }
    store.rename_paths(
        &[(from.to_string(), to.to_string())],
        overwrite,
        &format!("Rename {} to {}", from, to),
    )
}

/// Rename a whole subtree by prefix substitution, in one commit.
pub fn rename_folder(
    store: &dyn ContentStore,
    from: &str,
    to: &str,
) -> Result<CommitInfo, StoreError> {
    if from == to {
        return Err(StoreError::Conflict(format!(
            "rename source equals destination: {}",
            from
        )));
    }
    let blobs: Vec<String> = store
        .list_tree(from)?
        .into_iter()
        .filter(|e| e.kind == EntryKind::File)
        .map(|e| e.path)
        .collect();
    if blobs.is_empty() {
        return Err(StoreError::NotFound(from.to_string()));
    }
    let occupied = store
        .list_tree(to)?
        .into_iter()
        .any(|e| e.kind == EntryKind::File);
    if occupied {
        return Err(StoreError::AlreadyExists(to.to_string()));
    }

    let mappings: Vec<(String, String)> = blobs
        .into_iter()
        .map(|path| {
            let dest = format!("{}{}", to, &path[from.len()..]);
            (path, dest)
        })
        .collect();
    store.rename_paths(&mappings, false, &format!("Rename {} to {}", from, to))
}

#[derive(Clone, Debug)]
pub struct BundleConversion {
    pub index_path: String,
    pub child_path: String,
    pub commits: Vec<CommitInfo>,
}

/// Convert a leaf page into a page bundle by giving it a first subpage.
/// Strict order: write `<base>/_index.<ext>` holding the original content,
/// write the new child, then delete the original leaf. An abort before the
/// delete leaves the leaf untouched; a stray index file may remain.
pub fn convert_to_bundle(
    store: &dyn ContentStore,
    leaf: &str,
    child_slug: &str,
    child_content: &[u8],
) -> Result<BundleConversion, StoreError> {
    let original = store.read_file(leaf)?;

    let (base, ext) = match leaf.rsplit_once('.') {
        Some((base, ext)) if !ext.contains('/') => (base.to_string(), ext.to_string()),
        _ => (leaf.to_string(), "md".to_string()),
    };
    let index_path = format!("{}/_index.{}", base, ext);
    let child_path = format!("{}/{}.{}", base, child_slug, ext);

    for dest in [&index_path, &child_path] {
        match store.read_file(dest) {
            Ok(_) => return Err(StoreError::AlreadyExists(dest.clone())),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
    }

    let mut commits = Vec::with_capacity(3);
    commits.push(store.write_many(
        &[PendingEdit::new(&index_path, original.clone())],
        &format!("Convert {} to bundle (index)", leaf),
    )?);
    commits.push(store.write_many(
        &[PendingEdit::new(&child_path, child_content)],
        &format!("Add subpage {} under {}", child_slug, base),
    )?);

    // Never delete the source until the replacement is confirmed in place.
    match store.read_file(&index_path) {
        Ok(written) if written == original => {}
        Ok(_) | Err(_) => {
            return Err(StoreError::DataLossRisk(format!(
                "bundle index {} does not carry the original content of {}",
                index_path, leaf
            )));
        }
    }
    match store.read_file(leaf) {
        Ok(_) => {}
        Err(err) if err.is_not_found() => {
            return Err(StoreError::Conflict(format!(
                "source vanished during conversion: {}",
                leaf
            )));
        }
        Err(err) => return Err(err),
    }

    commits.push(store.delete_paths(
        &[leaf.to_string()],
        &format!("Convert {} to bundle (remove leaf)", leaf),
    )?);

    Ok(BundleConversion {
        index_path,
        child_path,
        commits,
    })
}

/// Occupied destinations are never overwritten.
pub fn create_page(
    store: &dyn ContentStore,
    path: &str,
    content: &[u8],
) -> Result<CommitInfo, StoreError> {
    match store.read_file(path) {
        Ok(_) => return Err(StoreError::AlreadyExists(path.to_string())),
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }
    store.write_many(
        &[PendingEdit::new(path, content)],
        &format!("Create {}", path),
    )
}

/// Delete a leaf file, or a whole subtree when `path` names a directory.
pub fn delete_path(store: &dyn ContentStore, path: &str) -> Result<CommitInfo, StoreError> {
    match store.read_file(path) {
        Ok(_) => {
            return store.delete_paths(&[path.to_string()], &format!("Delete {}", path));
        }
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }
    let blobs: Vec<String> = store
        .list_tree(path)?
        .into_iter()
        .filter(|e| e.kind == EntryKind::File)
        .map(|e| e.path)
        .collect();
    if blobs.is_empty() {
        return Err(StoreError::NotFound(path.to_string()));
    }
    store.delete_paths(&blobs, &format!("Delete {}", path))
}
