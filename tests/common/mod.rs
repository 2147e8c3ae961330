#![allow(dead_code)]

use serde_json::json;

use siteloom::config::SchemaPair;
use siteloom::model::{BuildStatus, SiteRecord};
use siteloom::store::MemoryStore;

/// A small site source tree: root config, config directory, and a content
/// section with both leaf pages and a page bundle.
pub fn seed_site() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(
        "config.toml",
        "title = \"Demo site\"\n\n[params]\ntext_color = \"red\"\nfont = \"Inter\"\n",
    );
    store.seed(
        "config/_default/menus.yaml",
        "main:\n  - name: Home\n    url: /\n  - name: Blog\n    url: /blog/\n",
    );
    store.seed("config/production/params.json", "{\n  \"cdn\": true\n}\n");
    store.seed("content/about.md", "# About us\n");
    store.seed("content/blog/_index.md", "# Blog\n");
    store.seed("content/blog/first-post.md", "# First post\n");
    store.seed("content/blog/second-post.md", "# Second post\n");
    store.seed("static/logo.svg", "<svg/>");
    store
}

pub fn ready_record() -> SiteRecord {
    SiteRecord {
        site_id: "acme/demo-site".to_string(),
        template: "hugo-base".to_string(),
        build_status: BuildStatus::Succeeded,
        updated_at: Some("2026-08-01T10:00:00Z".to_string()),
    }
}

pub fn unbuilt_record() -> SiteRecord {
    SiteRecord {
        build_status: BuildStatus::Building,
        ..ready_record()
    }
}

/// Template schema matching the seeded site: two visible categories, one
/// hidden one, and a ui:order override on colors.
pub fn schema_pair() -> SchemaPair {
    SchemaPair {
        schema: json!({
            "type": "object",
            "properties": {
                "general": {
                    "title": "General",
                    "type": "object",
                    "properties": {
                        "config.toml/title": { "type": "string" },
                        "config.toml/params.font": { "type": "string", "default": "system-ui" }
                    }
                },
                "colors": {
                    "title": "Colors",
                    "type": "object",
                    "properties": {
                        "config.toml/params.text_color": { "type": "string" },
                        "config.toml/params.link_color": { "type": "string", "default": "#0000ee" },
                        "config.toml/params.dark_mode": { "type": "boolean" }
                    }
                },
                "internal": {
                    "title": "Internal",
                    "type": "object",
                    "properties": {
                        "config/production/params.json/cdn": { "type": "boolean" }
                    }
                }
            }
        }),
        ui: json!({
            "colors": {
                "ui:order": [
                    "config.toml/params.link_color",
                    "config.toml/params.text_color"
                ]
            },
            "internal": { "ui:hidden": true }
        }),
    }
}
