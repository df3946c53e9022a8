//! CodeMint core: catalog sync for AI coding tool rules and skills

pub mod catalog;
pub mod config;
pub mod error;
pub mod manifest;
pub mod sync;
pub mod tools;

pub use catalog::{CatalogApi, CatalogItem, CatalogRef, HttpCatalogClient, ItemType};
pub use error::{CatalogError, Result};
pub use manifest::{Manifest, ManifestEntry};
pub use sync::{Suggestions, SyncEngine, SyncReport, SyncStatus};
pub use tools::ToolId;
