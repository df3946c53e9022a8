//! CodeMint Catalog - resolving references and fetching items
//!
//! # Overview
//!
//! The catalog service holds versioned rules, skills and prompts. This module
//! provides:
//! - Parsing of `@type/slug` references
//! - Single-item resolution and bulk lookup by catalog id (100 ids per call)
//! - Search and usage tracking
//!
//! # Architecture
//!
//! ```text
//! CodeMint service
//!     │
//!     ├── GET  /api/catalog/resolve?ref=@rule/slug  ← one item
//!     ├── POST /api/catalog/sync                    ← many items by catalogId
//!     ├── GET  /api/items/search                    ← discovery
//!     └── POST /api/items/:id/track                 ← usage counter
//!            │
//!            ▼
//!     CatalogApi (HttpCatalogClient)
//!            │
//!            ▼
//!     SyncEngine
//! ```

mod client;
mod item;
mod reference;

pub use client::{check_bulk_size, CatalogApi, HttpCatalogClient, MAX_BULK_IDS, REQUEST_TIMEOUT};
pub use item::{CatalogItem, ItemType, SearchHit, SearchParams, SearchResults};
pub use reference::{validate_slug, CatalogRef};
