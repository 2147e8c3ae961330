use crate::error::StoreError;
use crate::model::{EntryKind, SUPPORTED_EXTENSIONS};
use crate::store::ContentStore;

/// Root config filenames, probed in order; first match wins.
pub const ROOT_CANDIDATES: [&str; 8] = [
    "config.toml",
    "config.yaml",
    "config.yml",
    "config.json",
    "hugo.toml",
    "hugo.yaml",
    "hugo.yml",
    "hugo.json",
];

pub const CONFIG_DIR: &str = "config";

/// The winning root candidate first, then the config directory's files in
/// listing order. Either source may be absent.
pub fn discover_config(store: &dyn ContentStore) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
    let mut out = Vec::new();

    for candidate in ROOT_CANDIDATES {
        match store.read_file(candidate) {
            Ok(bytes) => {
                out.push((candidate.to_string(), bytes));
                break;
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
    }

    let listing = match store.list_tree(CONFIG_DIR) {
        Ok(listing) => listing,
        Err(err) if err.is_not_found() => Vec::new(),
        Err(err) => return Err(err),
    };
    let dir_paths: Vec<String> = listing
        .into_iter()
        .filter(|e| e.kind == EntryKind::File && has_supported_extension(&e.path))
        .map(|e| e.path)
        .collect();

    let mut contents = store.read_many(&dir_paths)?;
    for path in dir_paths {
        if let Some(bytes) = contents.remove(&path) {
            out.push((path, bytes));
        }
    }
    Ok(out)
}

fn has_supported_extension(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => SUPPORTED_EXTENSIONS.contains(&ext),
        None => false,
    }
}
