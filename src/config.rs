mod discover;
mod flatten;
mod parse;
mod schema;
mod serialize;

pub use self::discover::{CONFIG_DIR, ROOT_CANDIDATES, discover_config};
pub use self::flatten::{escape_flat_keys, escape_segment, flatten_documents, unescape_segment};
pub use self::parse::{parse_all, parse_document};
pub use self::schema::{
    FormCategory, FormModel, SchemaPair, apply_defaults, categories, categorize,
};
pub use self::serialize::{serialize_all, serialize_document, split_flat_key, unflatten};
