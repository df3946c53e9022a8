//! Manifest persistence
//!
//! Reading is soft: a missing file, malformed JSON or a manifest without an
//! `installed` list all read as `None`, so callers start fresh. Writing is a
//! whole-file replace through a temp file in the same directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::Manifest;
use crate::config::CODEMINT_DIR;
use crate::error::{CatalogError, Result};

/// Manifest location, relative to the project root
pub const MANIFEST_FILE: &str = ".codemint/manifest.json";

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Load the manifest for a project, or `None` if there is no usable one
pub fn read(root: &Path) -> Option<Manifest> {
    let path = manifest_path(root);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read manifest {}: {}", path.display(), e);
            }
            return None;
        }
    };

    match serde_json::from_str::<Manifest>(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!("Ignoring unreadable manifest {}: {}", path.display(), e);
            None
        }
    }
}

/// Persist the manifest, replacing the previous file as a whole
pub fn write(root: &Path, manifest: &Manifest) -> Result<()> {
    let dir = root.join(CODEMINT_DIR);
    std::fs::create_dir_all(&dir).map_err(|e| CatalogError::write_failure(&dir, e))?;

    let path = manifest_path(root);
    let mut content = serde_json::to_string_pretty(manifest).map_err(|e| {
        CatalogError::write_failure(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    content.push('\n');

    let mut temp =
        tempfile::NamedTempFile::new_in(&dir).map_err(|e| CatalogError::write_failure(&dir, e))?;
    if let Err(e) = temp.write_all(content.as_bytes()) {
        return Err(CatalogError::write_failure(temp.path(), e));
    }
    temp.persist(&path)
        .map_err(|e| CatalogError::write_failure(&path, e.error))?;

    debug!(
        path = %path.display(),
        entries = manifest.installed.len(),
        "Wrote manifest"
    );
    Ok(())
}
