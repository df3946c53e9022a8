//! Catalog recommendations for a project's stack

use serde::Serialize;

use crate::catalog::SearchHit;

/// Hits requested per item type
pub const SUGGESTIONS_PER_TYPE: u32 = 10;

/// What the catalog recommends for a project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Suggestions {
    /// Stack tags the search was made with
    pub tags: Vec<String>,
    /// Rules first, then skills
    pub items: Vec<SearchHit>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Refs of the suggested items, in order
    pub fn references(&self) -> Vec<String> {
        self.items.iter().map(SearchHit::reference).collect()
    }
}
