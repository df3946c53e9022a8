//! Project manifest (`.codemint/manifest.json`)
//!
//! Tracks which catalog items are installed in a project, at which version
//! and where. The manifest is a plain value: [`Manifest::upsert`],
//! [`Manifest::remove`] and [`Manifest::patch`] consume it and hand back the
//! updated copy, and only [`store::write`] touches the disk.

pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::catalog::ItemType;

pub use store::{manifest_path, read, write, MANIFEST_FILE};

/// Current manifest schema version
pub const MANIFEST_SCHEMA_VERSION: &str = "1";

/// The manifest file's logical content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Schema version for compatibility
    #[serde(alias = "version", default = "default_schema_version")]
    pub schema_version: String,
    /// Catalog service the entries were installed from
    #[serde(alias = "baseUrl", default)]
    pub catalog_base_url: String,
    /// When the last bulk sync completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Installed items, at most one per catalog id
    pub installed: Vec<ManifestEntry>,
}

/// One installed rule or skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Stable catalog identity, unique within the manifest
    pub catalog_id: String,
    /// `@type/slug`, for display
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(alias = "type")]
    pub item_type: ItemType,
    pub slug: String,
    /// Tool identifier the item was rendered for
    pub tool: String,
    #[serde(alias = "version")]
    pub installed_version: String,
    #[serde(default, alias = "checksum")]
    pub installed_checksum: Option<String>,
    pub installed_at: DateTime<Utc>,
    /// Project-relative, `/`-separated file location
    #[serde(alias = "path")]
    pub relative_path: String,
}

/// Fields that may be changed on an existing entry
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub installed_version: Option<String>,
    /// `Some(None)` clears the checksum
    pub installed_checksum: Option<Option<String>>,
    pub installed_at: Option<DateTime<Utc>>,
    pub relative_path: Option<String>,
    pub tool: Option<String>,
}

impl EntryPatch {
    /// The patch sync applies after rewriting a drifted file
    pub fn version(version: impl Into<String>, checksum: Option<String>) -> Self {
        Self {
            installed_version: Some(version.into()),
            installed_checksum: Some(checksum),
            ..Self::default()
        }
    }

    fn apply(self, entry: &mut ManifestEntry) {
        if let Some(version) = self.installed_version {
            entry.installed_version = version;
        }
        if let Some(checksum) = self.installed_checksum {
            entry.installed_checksum = checksum;
        }
        if let Some(at) = self.installed_at {
            entry.installed_at = at;
        }
        if let Some(path) = self.relative_path {
            entry.relative_path = path;
        }
        if let Some(tool) = self.tool {
            entry.tool = tool;
        }
    }
}

/// Recorded paths must stay inside the project: relative, no `..`, no root
pub fn is_safe_relative_path(relative: &str) -> bool {
    !relative.trim().is_empty()
        && !relative.starts_with('/')
        && !relative.starts_with('\\')
        && Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && relative.split(['/', '\\']).all(|part| part != "..")
}

fn default_schema_version() -> String {
    MANIFEST_SCHEMA_VERSION.to_string()
}

impl Manifest {
    /// An empty manifest for a catalog service
    pub fn new(catalog_base_url: impl Into<String>) -> Self {
        Self {
            schema_version: default_schema_version(),
            catalog_base_url: catalog_base_url.into(),
            last_sync_at: None,
            installed: Vec::new(),
        }
    }

    /// Add an entry, replacing any entry with the same catalog id
    pub fn upsert(mut self, entry: ManifestEntry) -> Self {
        self.installed.retain(|e| e.catalog_id != entry.catalog_id);
        self.installed.push(entry);
        self
    }

    /// Drop the entry for a catalog id; absent ids are a no-op
    pub fn remove(mut self, catalog_id: &str) -> Self {
        self.installed.retain(|e| e.catalog_id != catalog_id);
        self
    }

    /// Merge fields into the entry for a catalog id; absent ids are a no-op
    pub fn patch(mut self, catalog_id: &str, patch: EntryPatch) -> Self {
        if let Some(entry) = self.installed.iter_mut().find(|e| e.catalog_id == catalog_id) {
            patch.apply(entry);
        }
        self
    }

    pub fn with_last_sync_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_sync_at = Some(at);
        self
    }

    pub fn get(&self, catalog_id: &str) -> Option<&ManifestEntry> {
        self.installed.iter().find(|e| e.catalog_id == catalog_id)
    }

    /// Find an entry by catalog id, then by ref, then by slug
    pub fn find(&self, key: &str) -> Option<&ManifestEntry> {
        self.get(key)
            .or_else(|| self.installed.iter().find(|e| e.reference == key))
            .or_else(|| self.installed.iter().find(|e| e.slug == key))
    }

    /// Catalog ids in installation order, as sync sends them
    pub fn catalog_ids(&self) -> Vec<String> {
        self.installed.iter().map(|e| e.catalog_id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }
}
