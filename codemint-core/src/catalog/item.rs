//! Catalog item types as returned by the catalog service

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;
use crate::tools::ArtifactKind;

/// The kind of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Rule,
    Skill,
    Prompt,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Rule => "rule",
            ItemType::Skill => "skill",
            ItemType::Prompt => "prompt",
        }
    }

    /// The file kind this item materializes as, if it is installable at all
    pub fn artifact_kind(&self) -> Option<ArtifactKind> {
        match self {
            ItemType::Rule => Some(ArtifactKind::Rule),
            ItemType::Skill => Some(ArtifactKind::Skill),
            ItemType::Prompt => None,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rule" => Ok(ItemType::Rule),
            "skill" => Ok(ItemType::Skill),
            "prompt" => Ok(ItemType::Prompt),
            other => Err(CatalogError::ConfigurationError(format!(
                "Unknown item type '{other}'. Valid types: rule, skill, prompt"
            ))),
        }
    }
}

/// One catalog item at its current version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
    /// Absent from bulk sync responses
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    pub slug: String,
    pub catalog_id: String,
    pub catalog_version: String,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogItem {
    /// `@type/slug`, when the type is known
    pub fn reference(&self) -> Option<String> {
        self.item_type.map(|t| format!("@{t}/{}", self.slug))
    }
}

/// Query for the catalog search endpoint
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: Option<String>,
    pub item_type: Option<ItemType>,
    pub tags: Vec<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// A search result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub slug: String,
    #[serde(default)]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl SearchHit {
    pub fn reference(&self) -> String {
        format!("@{}/{}", self.item_type, self.slug)
    }
}

/// A page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub items: Vec<SearchHit>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    25
}
