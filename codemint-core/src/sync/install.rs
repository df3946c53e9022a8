//! Writing artifacts into a project

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::CatalogItem;
use crate::error::{CatalogError, Result};
use crate::manifest::{is_safe_relative_path, ManifestEntry};
use crate::tools::ToolId;

/// Result of installing one item
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    /// The entry now recorded in the manifest
    pub entry: ManifestEntry,
    pub tool: ToolId,
    /// Absolute location of the written file
    pub path: PathBuf,
    /// Tool directories created because the project had none
    pub scaffolded: Vec<PathBuf>,
    pub deprecated: bool,
    pub changelog: Option<String>,
}

impl InstallOutcome {
    pub(crate) fn new(
        entry: ManifestEntry,
        tool: ToolId,
        path: PathBuf,
        scaffolded: Vec<PathBuf>,
        item: &CatalogItem,
    ) -> Self {
        Self {
            entry,
            tool,
            path,
            scaffolded,
            deprecated: item.deprecated,
            changelog: item.changelog.clone(),
        }
    }
}

/// Join a recorded path onto the project root, refusing anything that escapes it
pub fn destination(root: &Path, relative: &str) -> Result<PathBuf> {
    if !is_safe_relative_path(relative) {
        return Err(CatalogError::ConfigurationError(format!(
            "Refusing to write outside the project: '{relative}'"
        )));
    }
    Ok(root.join(relative))
}

/// Create parent directories and overwrite the file at `relative`
pub fn write_artifact(root: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let path = destination(root, relative)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CatalogError::write_failure(parent, e))?;
    }
    std::fs::write(&path, content).map_err(|e| CatalogError::write_failure(&path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote artifact");
    Ok(path)
}

/// Delete an installed artifact; a file that is already gone is fine
pub fn remove_artifact(root: &Path, relative: &str) -> Result<bool> {
    let path = destination(root, relative)?;
    match std::fs::remove_file(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed artifact");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CatalogError::write_failure(&path, e)),
    }
}
