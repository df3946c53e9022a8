//! Tool detection from project marker files
//!
//! Detection walks [`DETECTION_ORDER`] and returns the first tool whose marker
//! exists. The order is significant: a project may carry markers for more than
//! one tool (for example `CLAUDE.md` next to a `.cursor/` directory), and the
//! earlier entry wins. A `toolOverrides` list in `.codemint/config.yaml`
//! bypasses markers entirely.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{profile, ToolId};
use crate::config::ProjectConfig;
use crate::error::{CatalogError, Result};

/// Marker paths per tool, in priority order
pub const DETECTION_ORDER: &[(ToolId, &[&str])] = &[
    (ToolId::Cursor, &[".cursor"]),
    (ToolId::Cline, &[".cline", ".clinerules"]),
    (ToolId::Windsurf, &[".windsurf"]),
    (ToolId::Continue, &[".continue"]),
    (ToolId::Copilot, &[".github/instructions"]),
    (ToolId::Claude, &["CLAUDE.md", ".claude"]),
    (ToolId::Codex, &[".codex"]),
];

/// Infers which tool a project uses
#[derive(Debug, Clone)]
pub struct ToolDetector {
    root: PathBuf,
    overrides: Vec<String>,
}

impl ToolDetector {
    /// Detector that only looks at markers
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overrides: Vec::new(),
        }
    }

    /// Detector honoring the project's `toolOverrides` setting
    pub fn from_project(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let overrides = ProjectConfig::load(&root)?.tool_overrides;
        Ok(Self::new(root).with_overrides(overrides))
    }

    pub fn with_overrides(mut self, overrides: Vec<String>) -> Self {
        self.overrides = overrides;
        self
    }

    /// First valid override, else the first tool whose marker exists
    pub fn detect(&self) -> Option<ToolId> {
        for candidate in &self.overrides {
            match candidate.parse::<ToolId>() {
                Ok(tool) => {
                    debug!(tool = %tool, "Tool selected by project override");
                    return Some(tool);
                }
                Err(_) => warn!("Ignoring unknown tool override '{}'", candidate),
            }
        }

        for (tool, markers) in DETECTION_ORDER {
            if let Some(marker) = markers.iter().find(|m| self.root.join(m).exists()) {
                debug!(tool = %tool, marker = %marker, "Detected tool from marker");
                return Some(*tool);
            }
        }

        None
    }

    /// Resolve the tool for an install, with any directories scaffolded for it
    ///
    /// An explicit choice wins and has its directories scaffolded. Otherwise
    /// detection must succeed; the caller is expected to ask the user and pass
    /// the answer back as `explicit` when it does not.
    pub fn establish(&self, explicit: Option<ToolId>) -> Result<(ToolId, Vec<PathBuf>)> {
        if let Some(tool) = explicit {
            let created = scaffold(&self.root, tool)?;
            return Ok((tool, created));
        }

        let tool = self.detect().ok_or_else(|| {
            CatalogError::ConfigurationError(
                "No AI tool folder detected in the project. Choose a tool (cursor, cline, windsurf, continue, copilot, claude, codex).".to_string(),
            )
        })?;
        Ok((tool, Vec::new()))
    }
}

/// Detect the tool for a project root, honoring project overrides
pub fn detect(root: &Path) -> Result<Option<ToolId>> {
    Ok(ToolDetector::from_project(root)?.detect())
}

/// Create the base directories for a tool. Existing directories are left alone.
pub fn scaffold(root: &Path, tool: ToolId) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in profile(tool).scaffold_dirs() {
        let path = root.join(&dir);
        if path.is_dir() {
            continue;
        }
        std::fs::create_dir_all(&path).map_err(|e| CatalogError::write_failure(&path, e))?;
        debug!(tool = %tool, path = %path.display(), "Scaffolded tool directory");
        created.push(path);
    }
    Ok(created)
}
