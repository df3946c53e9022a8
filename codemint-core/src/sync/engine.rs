//! Install, sync and removal against one project root
//!
//! The engine works on an in-memory copy of the manifest for the duration of
//! one operation and persists it once, as the last step. Callers must not run
//! two operations against the same project root at the same time.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::install::{remove_artifact, write_artifact, InstallOutcome};
use super::report::{EntryOutcome, SyncReport, SyncStatus};
use super::suggest::{Suggestions, SUGGESTIONS_PER_TYPE};
use crate::catalog::{
    validate_slug, CatalogApi, CatalogItem, CatalogRef, ItemType, SearchParams, SearchResults,
    MAX_BULK_IDS,
};
use crate::error::{CatalogError, Result};
use crate::manifest::{self, EntryPatch, Manifest, ManifestEntry};
use crate::tools::{profile, render_content, stack_tags, ToolDetector, ToolId};

/// Whether an installed entry has drifted from the catalog's current version
///
/// A checksum only counts when the catalog supplies one; otherwise the version
/// alone decides.
pub fn needs_update(entry: &ManifestEntry, remote: &CatalogItem) -> bool {
    if remote.catalog_version != entry.installed_version {
        return true;
    }
    match remote.checksum.as_deref() {
        Some(checksum) => entry.installed_checksum.as_deref() != Some(checksum),
        None => false,
    }
}

/// Orchestrates the catalog, tool profiles and the manifest
pub struct SyncEngine<C: CatalogApi + 'static> {
    catalog: Arc<C>,
    base_url: String,
    track_usage: bool,
}

impl<C: CatalogApi + 'static> SyncEngine<C> {
    pub fn new(catalog: C, base_url: impl Into<String>) -> Self {
        Self::with_shared(Arc::new(catalog), base_url)
    }

    pub fn with_shared(catalog: Arc<C>, base_url: impl Into<String>) -> Self {
        Self {
            catalog,
            base_url: base_url.into(),
            track_usage: true,
        }
    }

    /// Turn the post-install usage ping on or off
    pub fn with_usage_tracking(mut self, enabled: bool) -> Self {
        self.track_usage = enabled;
        self
    }

    /// Resolve a ref and write it into the project
    ///
    /// `tool` is the caller's explicit choice; without one the project's tool
    /// must be detectable.
    pub async fn install(
        &self,
        root: &Path,
        reference: &str,
        tool: Option<ToolId>,
    ) -> Result<InstallOutcome> {
        let requested = CatalogRef::parse(reference)?;
        let item = self.catalog.resolve(&requested).await?;

        let item_type = item.item_type.unwrap_or(requested.item_type);
        let kind = item_type
            .artifact_kind()
            .ok_or_else(|| CatalogError::NotInstallable {
                reference: requested.to_string(),
                item_type: item_type.to_string(),
            })?;
        validate_slug(&item.slug)
            .map_err(|reason| CatalogError::invalid_reference(&item.slug, reason))?;

        let (tool, scaffolded) = ToolDetector::from_project(root)?.establish(tool)?;
        let tool_profile = profile(tool);
        let relative_path = tool_profile.relative_path(kind, &item.slug);
        let content = tool_profile.render(kind, &item.content, &item.title);
        let path = write_artifact(root, &relative_path, &content)?;

        let entry = ManifestEntry {
            catalog_id: item.catalog_id.clone(),
            reference: format!("@{}/{}", item_type, item.slug),
            item_type,
            slug: item.slug.clone(),
            tool: tool.as_str().to_string(),
            installed_version: item.catalog_version.clone(),
            installed_checksum: item.checksum.clone(),
            installed_at: Utc::now(),
            relative_path,
        };
        let manifest = self.load_or_new(root).upsert(entry.clone());
        manifest::write(root, &manifest)?;

        info!(
            catalog_id = %entry.catalog_id,
            slug = %entry.slug,
            tool = %tool,
            path = %entry.relative_path,
            version = %entry.installed_version,
            "Installed catalog item"
        );

        if self.track_usage {
            self.spawn_usage_tracking(item.id.clone());
        }

        Ok(InstallOutcome::new(entry, tool, path, scaffolded, &item))
    }

    /// Bring every installed entry up to the catalog's current version
    pub async fn sync(&self, root: &Path) -> Result<SyncReport> {
        let manifest = match manifest::read(root) {
            Some(manifest) if !manifest.is_empty() => manifest,
            _ => {
                debug!("Nothing installed; skipping sync");
                return Ok(SyncReport::default());
            }
        };

        let entries = manifest.installed.clone();
        let fetched = self.fetch_current(&manifest.catalog_ids()).await?;

        let mut manifest = manifest;
        let mut report = SyncReport::default();
        for (entry, remote) in entries.iter().zip(fetched) {
            let outcome = match remote {
                Err(message) => EntryOutcome::new(entry, None, SyncStatus::Error(message)),
                Ok(None) => EntryOutcome::new(entry, None, SyncStatus::SkippedNotFound),
                Ok(Some(item)) if item.catalog_id != entry.catalog_id => {
                    warn!(
                        catalog_id = %entry.catalog_id,
                        returned = %item.catalog_id,
                        "Bulk response out of alignment"
                    );
                    EntryOutcome::new(
                        entry,
                        None,
                        SyncStatus::Error(format!(
                            "catalog returned {} in place of {}",
                            item.catalog_id, entry.catalog_id
                        )),
                    )
                }
                Ok(Some(item)) => {
                    let remote_version = Some(item.catalog_version.clone());
                    if !needs_update(entry, &item) {
                        EntryOutcome::new(entry, remote_version, SyncStatus::UpToDate)
                    } else {
                        match refresh_entry(root, entry, &item) {
                            Ok(()) => {
                                manifest = manifest.patch(
                                    &entry.catalog_id,
                                    EntryPatch::version(
                                        item.catalog_version.clone(),
                                        item.checksum.clone(),
                                    ),
                                );
                                EntryOutcome::new(entry, remote_version, SyncStatus::Updated)
                            }
                            Err(e) => {
                                warn!(catalog_id = %entry.catalog_id, "Failed to update entry: {}", e);
                                EntryOutcome::new(entry, remote_version, SyncStatus::Error(e.to_string()))
                            }
                        }
                    }
                }
            };
            debug!(
                catalog_id = %outcome.catalog_id,
                status = outcome.status.label(),
                "Classified entry"
            );
            report.push(outcome);
        }

        let synced_at = Utc::now();
        manifest::write(root, &manifest.with_last_sync_at(synced_at))?;
        report.synced_at = Some(synced_at);

        info!(summary = %report.summary(), "Sync complete");
        Ok(report)
    }

    /// Remove an installed item by catalog id, ref or slug
    pub fn remove(&self, root: &Path, key: &str) -> Result<ManifestEntry> {
        let not_installed = || CatalogError::NotFound {
            what: format!("{key} (not installed in this project)"),
        };
        let manifest = manifest::read(root).ok_or_else(not_installed)?;
        let entry = manifest.find(key).cloned().ok_or_else(not_installed)?;

        let existed = remove_artifact(root, &entry.relative_path)?;
        if !existed {
            debug!(path = %entry.relative_path, "Installed file was already gone");
        }
        manifest::write(root, &manifest.remove(&entry.catalog_id))?;

        info!(catalog_id = %entry.catalog_id, slug = %entry.slug, "Removed catalog item");
        Ok(entry)
    }

    /// Installed entries; an absent manifest lists nothing
    pub fn list(&self, root: &Path) -> Vec<ManifestEntry> {
        manifest::read(root)
            .map(|m| m.installed)
            .unwrap_or_default()
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        self.catalog.search(params).await
    }

    /// Rules and skills tagged for the project's detected stack
    ///
    /// A project with no recognizable stack gets no suggestions and no
    /// catalog call.
    pub async fn suggest(&self, root: &Path) -> Result<Suggestions> {
        let tags = stack_tags(root);
        if tags.is_empty() {
            debug!("No stack markers; skipping suggestions");
            return Ok(Suggestions::default());
        }

        let query = |item_type| SearchParams {
            item_type: Some(item_type),
            tags: tags.clone(),
            limit: Some(SUGGESTIONS_PER_TYPE),
            ..SearchParams::default()
        };
        let (rule_query, skill_query) = (query(ItemType::Rule), query(ItemType::Skill));
        let (rules, skills) = tokio::try_join!(
            self.catalog.search(&rule_query),
            self.catalog.search(&skill_query)
        )?;

        let items: Vec<_> = rules.items.into_iter().chain(skills.items).collect();
        info!(tags = ?tags, count = items.len(), "Found suggestions");
        Ok(Suggestions { tags, items })
    }

    fn load_or_new(&self, root: &Path) -> Manifest {
        let mut manifest = manifest::read(root).unwrap_or_else(|| Manifest::new(&self.base_url));
        if manifest.catalog_base_url.is_empty() {
            manifest.catalog_base_url = self.base_url.clone();
        }
        manifest
    }

    /// Bulk-fetch in batches, aligned with `catalog_ids`
    ///
    /// A rate limit or auth failure aborts; any other batch failure becomes an
    /// error for each entry of that batch.
    async fn fetch_current(
        &self,
        catalog_ids: &[String],
    ) -> Result<Vec<std::result::Result<Option<CatalogItem>, String>>> {
        let mut fetched = Vec::with_capacity(catalog_ids.len());
        for batch in catalog_ids.chunks(MAX_BULK_IDS) {
            match self.catalog.bulk_resolve(batch).await {
                Ok(mut items) => {
                    items.resize(batch.len(), None);
                    fetched.extend(items.into_iter().map(Ok));
                }
                Err(e) if e.is_fatal_for_sync() => return Err(e),
                Err(e) => {
                    warn!(count = batch.len(), "Bulk fetch failed: {}", e);
                    let message = e.to_string();
                    fetched.extend(batch.iter().map(|_| Err(message.clone())));
                }
            }
        }
        Ok(fetched)
    }

    fn spawn_usage_tracking(&self, item_id: String) {
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            if let Err(e) = catalog.track_usage(&item_id).await {
                debug!(item_id = %item_id, "Usage tracking failed: {}", e);
            }
        });
    }
}

/// Rewrite one drifted entry with the tool it was installed for
fn refresh_entry(root: &Path, entry: &ManifestEntry, item: &CatalogItem) -> Result<()> {
    let kind = entry
        .item_type
        .artifact_kind()
        .ok_or_else(|| CatalogError::NotInstallable {
            reference: entry.reference.clone(),
            item_type: entry.item_type.to_string(),
        })?;

    let content = render_content(&entry.tool, kind, &item.content, &item.title)?;
    write_artifact(root, &entry.relative_path, &content)?;
    debug!(
        catalog_id = %entry.catalog_id,
        tool = %entry.tool,
        from = %entry.installed_version,
        to = %item.catalog_version,
        "Rewrote drifted entry"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemType;
    use chrono::TimeZone;

    fn entry(version: &str, checksum: Option<&str>) -> ManifestEntry {
        ManifestEntry {
            catalog_id: "cat_1".to_string(),
            reference: "@rule/a".to_string(),
            item_type: ItemType::Rule,
            slug: "a".to_string(),
            tool: "claude".to_string(),
            installed_version: version.to_string(),
            installed_checksum: checksum.map(str::to_string),
            installed_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            relative_path: ".claude/rules/a.md".to_string(),
        }
    }

    fn remote(version: &str, checksum: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: "itm_1".to_string(),
            title: "A".to_string(),
            content: "body".to_string(),
            item_type: None,
            slug: "a".to_string(),
            catalog_id: "cat_1".to_string(),
            catalog_version: version.to_string(),
            checksum: checksum.map(str::to_string),
            deprecated: false,
            changelog: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_needs_update_on_version_change() {
        assert!(needs_update(&entry("1.0.0", Some("abc")), &remote("1.1.0", Some("abc"))));
        assert!(needs_update(&entry("1.0.0", Some("abc")), &remote("1.1.0", None)));
    }

    #[test]
    fn test_needs_update_on_checksum_change() {
        assert!(needs_update(&entry("1.0.0", Some("abc")), &remote("1.0.0", Some("def"))));
        assert!(needs_update(&entry("1.0.0", None), &remote("1.0.0", Some("def"))));
    }

    #[test]
    fn test_null_remote_checksum_never_forces_update() {
        assert!(!needs_update(&entry("1.0.0", Some("abc")), &remote("1.0.0", None)));
        assert!(!needs_update(&entry("1.0.0", None), &remote("1.0.0", None)));
    }

    #[test]
    fn test_matching_version_and_checksum_is_current() {
        assert!(!needs_update(&entry("1.0.0", Some("abc")), &remote("1.0.0", Some("abc"))));
    }

    #[test]
    fn test_refresh_entry_rejects_unknown_tool() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut bad = entry("1.0.0", None);
        bad.tool = "nano".to_string();
        let err = refresh_entry(temp.path(), &bad, &remote("2.0.0", None)).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
    }
}
