//! Tool and artifact type definitions
//!
//! This module defines the AI coding tools that CodeMint can install into.
//! Each tool has its own directory root and file layout for rules and skills.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;

/// Supported AI coding tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    /// Cursor (cursor.com)
    Cursor,
    /// Cline VS Code extension
    Cline,
    /// Windsurf editor
    Windsurf,
    /// Continue (continue.dev)
    Continue,
    /// GitHub Copilot instructions
    Copilot,
    /// Claude Code
    Claude,
    /// OpenAI Codex CLI
    Codex,
}

impl ToolId {
    /// All tools, in detection priority order
    pub const ALL: [ToolId; 7] = [
        ToolId::Cursor,
        ToolId::Cline,
        ToolId::Windsurf,
        ToolId::Continue,
        ToolId::Copilot,
        ToolId::Claude,
        ToolId::Codex,
    ];

    /// Get the tool identifier as a string (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Cursor => "cursor",
            ToolId::Cline => "cline",
            ToolId::Windsurf => "windsurf",
            ToolId::Continue => "continue",
            ToolId::Copilot => "copilot",
            ToolId::Claude => "claude",
            ToolId::Codex => "codex",
        }
    }

    /// Get the display name (proper casing)
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolId::Cursor => "Cursor",
            ToolId::Cline => "Cline",
            ToolId::Windsurf => "Windsurf",
            ToolId::Continue => "Continue",
            ToolId::Copilot => "Copilot",
            ToolId::Claude => "Claude",
            ToolId::Codex => "Codex",
        }
    }

    /// Project-relative directory owned by this tool
    pub fn base_dir(&self) -> &'static str {
        match self {
            ToolId::Cursor => ".cursor",
            ToolId::Cline => ".cline",
            ToolId::Windsurf => ".windsurf",
            ToolId::Continue => ".continue",
            ToolId::Copilot => ".github/instructions",
            ToolId::Claude => ".claude",
            ToolId::Codex => ".codex",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ToolId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        ToolId::ALL
            .into_iter()
            .find(|tool| tool.as_str() == lowered)
            .ok_or_else(|| {
                CatalogError::ConfigurationError(format!(
                    "Unknown tool '{s}'. Valid options: cursor, cline, windsurf, continue, copilot, claude, codex"
                ))
            })
    }
}

/// The kinds of catalog items that materialize as files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Rule,
    Skill,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Rule => "rule",
            ArtifactKind::Skill => "skill",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_id_parsing() {
        assert_eq!("cursor".parse::<ToolId>().unwrap(), ToolId::Cursor);
        assert_eq!("CLAUDE".parse::<ToolId>().unwrap(), ToolId::Claude);
        assert_eq!(" copilot ".parse::<ToolId>().unwrap(), ToolId::Copilot);
        for tool in ToolId::ALL {
            assert_eq!(tool.as_str().parse::<ToolId>().unwrap(), tool);
        }
    }

    #[test]
    fn test_tool_id_invalid() {
        let err = "vim".parse::<ToolId>().unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
        assert!(err.to_string().contains("vim"));
        assert!("".parse::<ToolId>().is_err());
    }

    #[test]
    fn test_tool_id_serde() {
        let json = serde_json::to_string(&ToolId::Windsurf).unwrap();
        assert_eq!(json, "\"windsurf\"");
        let parsed: ToolId = serde_json::from_str("\"codex\"").unwrap();
        assert_eq!(parsed, ToolId::Codex);
    }

    #[test]
    fn test_tool_id_display() {
        assert_eq!(ToolId::Continue.to_string(), "continue");
        assert_eq!(ToolId::Copilot.display_name(), "Copilot");
        assert_eq!(ToolId::Copilot.base_dir(), ".github/instructions");
    }
}
