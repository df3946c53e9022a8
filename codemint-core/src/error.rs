//! Error taxonomy for catalog resolution, installation and sync

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors surfaced by the catalog synchronization engine
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The ref does not have the `@type/slug` shape. Raised before any network call.
    #[error("Invalid reference '{reference}': {reason}\n\nExpected @rule/<slug>, @skill/<slug> or @prompt/<slug>")]
    InvalidReference { reference: String, reason: String },

    /// The item is missing or not visible with the current credential
    #[error("Rule/skill not found: {what}\n\nCheck the ref or its visibility (private and org items require login).")]
    NotFound { what: String },

    /// A bulk request exceeded the per-call cap. Raised before any network call.
    #[error("Too many catalog IDs in one request: {count} (max {max})")]
    TooManyIds { count: usize, max: usize },

    /// Only rules and skills can be written into a project
    #[error("'{reference}' is a {item_type} and cannot be installed. Only rules and skills can be installed.")]
    NotInstallable { reference: String, item_type: String },

    /// Unknown tool identifier, or no tool could be established for the project
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The catalog service rejected the request rate
    #[error("Too many requests to the catalog. Try again later.")]
    RateLimited,

    /// The credential is missing or expired for a call that required one
    #[error("Not logged in or token expired. Log in again and retry.")]
    Unauthorized,

    /// Filesystem error while creating a directory or writing a file
    #[error("Failed to write {path}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sync completed and was persisted but some entries failed
    #[error("Sync finished with {failed} failed {}:\n{}", entries_word(.failed), .messages.join("\n"))]
    SyncPartial { failed: usize, messages: Vec<String> },

    /// Connection failure, timeout, or an undecodable response body
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other non-success response from the catalog service
    #[error("Catalog returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },
}

fn entries_word(count: &usize) -> &'static str {
    if *count == 1 {
        "entry"
    } else {
        "entries"
    }
}

impl CatalogError {
    pub(crate) fn invalid_reference(reference: &str, reason: impl Into<String>) -> Self {
        CatalogError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Whether a failed bulk fetch should abort the whole sync rather than
    /// being recorded against the entries of that batch
    pub fn is_fatal_for_sync(&self) -> bool {
        matches!(self, CatalogError::RateLimited | CatalogError::Unauthorized)
    }
}
