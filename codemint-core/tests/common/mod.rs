//! Shared helpers for integration tests
//!
//! [`InMemoryCatalog`] stands in for the CodeMint service so engine tests run
//! without a network. It records every call for assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use codemint_core::catalog::{
    check_bulk_size, CatalogApi, CatalogItem, CatalogRef, ItemType, SearchHit, SearchParams,
    SearchResults,
};
use codemint_core::error::{CatalogError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A catalog item as the resolve endpoint returns it
pub fn catalog_item(
    slug: &str,
    item_type: ItemType,
    version: &str,
    checksum: Option<&str>,
) -> CatalogItem {
    CatalogItem {
        id: format!("itm_{slug}"),
        title: format!("Title of {slug}"),
        content: format!("# {slug}\n\nVersion {version} guidance.\n"),
        item_type: Some(item_type),
        slug: slug.to_string(),
        catalog_id: format!("cat_{slug}"),
        catalog_version: version.to_string(),
        checksum: checksum.map(str::to_string),
        deprecated: false,
        changelog: None,
        tags: vec!["test".to_string()],
    }
}

/// A catalog item carrying the given tags
pub fn tagged_item(slug: &str, item_type: ItemType, tags: &[&str]) -> CatalogItem {
    CatalogItem {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..catalog_item(slug, item_type, "1.0.0", None)
    }
}

/// In-memory [`CatalogApi`] keyed by catalog id
#[derive(Default)]
pub struct InMemoryCatalog {
    items: Mutex<HashMap<String, CatalogItem>>,
    bulk_failure: Mutex<Option<fn() -> CatalogError>>,
    bulk_response: Mutex<Option<Vec<Option<CatalogItem>>>>,
    fail_tracking: AtomicBool,
    pub resolve_calls: AtomicUsize,
    pub bulk_batches: Mutex<Vec<usize>>,
    pub tracked: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<SearchParams>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, item: CatalogItem) -> Self {
        self.put(item);
        self
    }

    /// Publish an item, replacing the current version for its catalog id
    pub fn put(&self, item: CatalogItem) {
        self.items
            .lock()
            .unwrap()
            .insert(item.catalog_id.clone(), item);
    }

    /// Bump an item to a new version and checksum
    pub fn publish(&self, catalog_id: &str, version: &str, checksum: Option<&str>, content: &str) {
        let mut items = self.items.lock().unwrap();
        let item = items.get_mut(catalog_id).expect("item must exist");
        item.catalog_version = version.to_string();
        item.checksum = checksum.map(str::to_string);
        item.content = content.to_string();
    }

    pub fn unpublish(&self, catalog_id: &str) {
        self.items.lock().unwrap().remove(catalog_id);
    }

    /// Make every following bulk call fail with the given error
    pub fn fail_bulk_with(&self, error: fn() -> CatalogError) {
        *self.bulk_failure.lock().unwrap() = Some(error);
    }

    /// Answer every following bulk call with exactly these slots
    pub fn respond_to_bulk_with(&self, items: Vec<Option<CatalogItem>>) {
        *self.bulk_response.lock().unwrap() = Some(items);
    }

    pub fn fail_tracking(&self) {
        self.fail_tracking.store(true, Ordering::SeqCst);
    }

    pub fn bulk_call_count(&self) -> usize {
        self.bulk_batches.lock().unwrap().len()
    }

    pub fn tracked_ids(&self) -> Vec<String> {
        self.tracked.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn resolve(&self, reference: &CatalogRef) -> Result<CatalogItem> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.items
            .lock()
            .unwrap()
            .values()
            .find(|item| item.item_type == Some(reference.item_type) && item.slug == reference.slug)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                what: reference.to_string(),
            })
    }

    async fn bulk_resolve(&self, catalog_ids: &[String]) -> Result<Vec<Option<CatalogItem>>> {
        check_bulk_size(catalog_ids)?;
        self.bulk_batches.lock().unwrap().push(catalog_ids.len());

        if let Some(error) = *self.bulk_failure.lock().unwrap() {
            return Err(error());
        }
        if let Some(items) = self.bulk_response.lock().unwrap().clone() {
            return Ok(items);
        }

        let items = self.items.lock().unwrap();
        Ok(catalog_ids
            .iter()
            .map(|id| {
                // The bulk endpoint omits type and tags
                items.get(id).cloned().map(|mut item| {
                    item.item_type = None;
                    item.tags.clear();
                    item
                })
            })
            .collect())
    }

    async fn track_usage(&self, item_id: &str) -> Result<()> {
        if self.fail_tracking.load(Ordering::SeqCst) {
            return Err(CatalogError::Remote {
                status: 500,
                message: "tracking unavailable".to_string(),
            });
        }
        self.tracked.lock().unwrap().push(item_id.to_string());
        Ok(())
    }

    /// Items of the requested type carrying any of the requested tags
    async fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        self.searches.lock().unwrap().push(params.clone());
        let limit = params.limit.unwrap_or(25);

        let mut matches: Vec<SearchHit> = self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|item| params.item_type.is_none() || item.item_type == params.item_type)
            .filter(|item| {
                params.tags.is_empty() || item.tags.iter().any(|t| params.tags.contains(t))
            })
            .map(|item| SearchHit {
                id: item.id.clone(),
                name: item.title.clone(),
                item_type: item.item_type.unwrap_or(ItemType::Rule),
                slug: item.slug.clone(),
                catalog_id: Some(item.catalog_id.clone()),
                version: Some(item.catalog_version.clone()),
                tags: item.tags.clone(),
                score: 1.0,
                snippet: None,
            })
            .collect();
        matches.sort_by(|a, b| a.slug.cmp(&b.slug));
        let total = matches.len() as u64;
        matches.truncate(limit as usize);

        Ok(SearchResults {
            items: matches,
            total,
            page: params.page.unwrap_or(1),
            limit,
        })
    }
}

/// Create a tool marker (directory, or file for `CLAUDE.md`/`.clinerules`)
pub fn create_marker(root: &Path, marker: &str) {
    let path = root.join(marker);
    if marker.ends_with(".md") || marker == ".clinerules" {
        std::fs::write(path, "marker").unwrap();
    } else {
        std::fs::create_dir_all(path).unwrap();
    }
}
