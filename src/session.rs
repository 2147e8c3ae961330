use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info_span;

use crate::config::{
    FormModel, SchemaPair, apply_defaults, categorize, discover_config, escape_flat_keys,
    flatten_documents, parse_all, serialize_all, unflatten,
};
use crate::model::{CommitInfo, ConfigDocument, ConfigFormat, FlatMap, LoadIssue, SiteRecord};
use crate::store::ContentStore;

#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub form: FormModel,
    pub flat: FlatMap,
    pub raw: BTreeMap<String, ConfigDocument>,
    pub issues: Vec<LoadIssue>,
}

#[derive(Clone, Debug)]
pub struct SaveReport {
    pub commit: CommitInfo,
    pub written: Vec<String>,
    pub fallbacks: Vec<LoadIssue>,
}

/// Session-scoped edit state; there are no ambient globals.
pub struct EditSession<'a> {
    store: &'a dyn ContentStore,
    record: SiteRecord,
    loaded: Option<LoadedConfig>,
}

impl<'a> EditSession<'a> {
    pub fn new(store: &'a dyn ContentStore, record: SiteRecord) -> Self {
        Self {
            store,
            record,
            loaded: None,
        }
    }

    pub fn loaded(&self) -> Option<&LoadedConfig> {
        self.loaded.as_ref()
    }

    /// Read pipeline: discover -> parse -> flatten -> categorize. Gated on
    /// the site's build status; per-file parse failures are collected, not
    /// fatal.
    pub fn load_config_model(&mut self, pair: &SchemaPair) -> Result<&LoadedConfig> {
        anyhow::ensure!(
            self.record.config_ready(),
            "site {} has no successful build yet (status: {:?})",
            self.record.site_id,
            self.record.build_status,
        );

        let files = {
            let _span = info_span!("discover").entered();
            discover_config(self.store)
                .map_err(anyhow::Error::from)
                .context("discover config files")?
        };
        tracing::debug!(files = files.len(), "discovered config sources");

        let (raw, issues) = {
            let _span = info_span!("parse").entered();
            parse_all(&files)
        };
        for issue in &issues {
            tracing::warn!(path = %issue.path, error = %issue.error, "config file dropped");
        }

        let flat = {
            let _span = info_span!("flatten").entered();
            escape_flat_keys(&flatten_documents(&raw))
        };

        let form = {
            let _span = info_span!("categorize").entered();
            categorize(&flat, pair)
        };

        Ok(self.loaded.insert(LoadedConfig {
            form,
            flat,
            raw,
            issues,
        }))
    }

    /// Mutates only the in-memory model; never re-triggers the read pipeline.
    pub fn update_field(&mut self, category: &str, field: &str, value: Value) -> Result<()> {
        let loaded = self
            .loaded
            .as_mut()
            .context("no config model loaded in this session")?;
        anyhow::ensure!(
            loaded.form.set(category, field, value),
            "unknown form field: {}/{}",
            category,
            field,
        );
        Ok(())
    }

    /// Write pipeline: default -> de-categorize -> unflatten -> serialize ->
    /// commit. Exactly one commit per save; a failure preserves the
    /// in-memory edits.
    pub fn save_config_model(&mut self, pair: &SchemaPair) -> Result<SaveReport> {
        let loaded = self
            .loaded
            .as_ref()
            .context("no config model loaded in this session")?;

        let mut form = loaded.form.clone();
        {
            let _span = info_span!("default").entered();
            apply_defaults(&mut form, pair);
        }

        let flat = {
            let _span = info_span!("decategorize").entered();
            form.to_flat()
        };

        let files = {
            let _span = info_span!("unflatten").entered();
            unflatten(&flat).context("rebuild per-file documents")?
        };

        let formats: BTreeMap<String, ConfigFormat> = loaded
            .raw
            .iter()
            .map(|(path, doc)| (path.clone(), doc.format))
            .collect();
        let (edits, fallbacks) = {
            let _span = info_span!("serialize").entered();
            serialize_all(&files, &formats)
        };
        for issue in &fallbacks {
            tracing::warn!(path = %issue.path, error = %issue.error, "serializer fell back to generic dump");
        }
        anyhow::ensure!(!edits.is_empty(), "nothing to save");

        let commit = {
            let _span = info_span!("commit").entered();
            self.store
                .write_many(&edits, "Update site configuration")
                .map_err(anyhow::Error::from)
                .context("commit configuration")?
        };
        tracing::info!(commit = %commit.sha, files = edits.len(), "configuration saved");

        // A successful save discards the form model.
        self.loaded = None;

        Ok(SaveReport {
            commit,
            written: edits.into_iter().map(|e| e.path).collect(),
            fallbacks,
        })
    }
}
