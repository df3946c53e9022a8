//! Sync outcome classification

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{CatalogError, Result};
use crate::manifest::ManifestEntry;

/// Exactly one of these per manifest entry after a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    UpToDate,
    Updated,
    /// The catalog no longer returns this id; the entry is left alone
    SkippedNotFound,
    Error(String),
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::UpToDate => "up-to-date",
            SyncStatus::Updated => "updated",
            SyncStatus::SkippedNotFound => "skipped-not-found",
            SyncStatus::Error(_) => "error",
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            SyncStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Error(message) => write!(f, "error: {message}"),
            other => f.write_str(other.label()),
        }
    }
}

/// What happened to one manifest entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOutcome {
    pub catalog_id: String,
    pub reference: String,
    /// Version recorded before the sync
    pub previous_version: String,
    /// Version the catalog reported, when it returned the item
    pub remote_version: Option<String>,
    pub status: SyncStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeRow<'a> {
    catalog_id: &'a str,
    #[serde(rename = "ref")]
    reference: &'a str,
    previous_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_version: Option<&'a str>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl Serialize for EntryOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        OutcomeRow {
            catalog_id: &self.catalog_id,
            reference: &self.reference,
            previous_version: &self.previous_version,
            remote_version: self.remote_version.as_deref(),
            status: self.status.label(),
            message: self.status.message(),
        }
        .serialize(serializer)
    }
}

impl EntryOutcome {
    pub fn new(entry: &ManifestEntry, remote_version: Option<String>, status: SyncStatus) -> Self {
        Self {
            catalog_id: entry.catalog_id.clone(),
            reference: entry.reference.clone(),
            previous_version: entry.installed_version.clone(),
            remote_version,
            status,
        }
    }
}

/// Per-classification counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub updated: usize,
    pub up_to_date: usize,
    pub skipped_not_found: usize,
    pub errors: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} up-to-date, {} skipped, {} failed",
            self.updated, self.up_to_date, self.skipped_not_found, self.errors
        )
    }
}

/// Result of one bulk sync
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub outcomes: Vec<EntryOutcome>,
    /// Set when the manifest was persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl SyncReport {
    pub(crate) fn push(&mut self, outcome: EntryOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                SyncStatus::UpToDate => summary.up_to_date += 1,
                SyncStatus::Updated => summary.updated += 1,
                SyncStatus::SkippedNotFound => summary.skipped_not_found += 1,
                SyncStatus::Error(_) => summary.errors += 1,
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, SyncStatus::Error(_)))
    }

    pub fn status_of(&self, catalog_id: &str) -> Option<&SyncStatus> {
        self.outcomes
            .iter()
            .find(|o| o.catalog_id == catalog_id)
            .map(|o| &o.status)
    }

    /// `Err(SyncPartial)` if any entry failed, otherwise the report itself
    pub fn into_result(self) -> Result<Self> {
        let messages: Vec<String> = self
            .outcomes
            .iter()
            .filter_map(|o| match &o.status {
                SyncStatus::Error(message) => Some(format!("{}: {}", o.reference, message)),
                _ => None,
            })
            .collect();

        if messages.is_empty() {
            Ok(self)
        } else {
            Err(CatalogError::SyncPartial {
                failed: messages.len(),
                messages,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(id: &str, status: SyncStatus) -> EntryOutcome {
        EntryOutcome {
            catalog_id: id.to_string(),
            reference: format!("@rule/{id}"),
            previous_version: "1.0.0".to_string(),
            remote_version: None,
            status,
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = SyncReport {
            outcomes: vec![
                outcome("a", SyncStatus::Updated),
                outcome("b", SyncStatus::UpToDate),
                outcome("c", SyncStatus::UpToDate),
                outcome("d", SyncStatus::SkippedNotFound),
                outcome("e", SyncStatus::Error("disk full".to_string())),
            ],
            synced_at: None,
        };

        assert_eq!(
            report.summary(),
            SyncSummary {
                updated: 1,
                up_to_date: 2,
                skipped_not_found: 1,
                errors: 1,
            }
        );
        assert_eq!(
            report.summary().to_string(),
            "1 updated, 2 up-to-date, 1 skipped, 1 failed"
        );
        assert_eq!(report.status_of("d"), Some(&SyncStatus::SkippedNotFound));
    }

    #[test]
    fn test_into_result_collects_errors() {
        let report = SyncReport {
            outcomes: vec![
                outcome("a", SyncStatus::UpToDate),
                outcome("b", SyncStatus::Error("denied".to_string())),
            ],
            synced_at: None,
        };

        match report.into_result() {
            Err(CatalogError::SyncPartial { failed, messages }) => {
                assert_eq!(failed, 1);
                assert_eq!(messages, vec!["@rule/b: denied".to_string()]);
            }
            other => panic!("expected SyncPartial, got {other:?}"),
        }
    }

    #[test]
    fn test_clean_report_is_ok() {
        let report = SyncReport {
            outcomes: vec![outcome("a", SyncStatus::Updated)],
            synced_at: None,
        };
        assert!(report.clone().into_result().is_ok());
        assert!(!report.has_errors());
    }

    #[test]
    fn test_outcome_json_shape() {
        let value = serde_json::to_value(outcome("a", SyncStatus::Error("boom".to_string()))).unwrap();
        assert_eq!(value["ref"], "@rule/a");
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "boom");

        let value = serde_json::to_value(outcome("a", SyncStatus::SkippedNotFound)).unwrap();
        assert_eq!(value["status"], "skipped-not-found");

        let value = serde_json::to_value(SyncSummary::default()).unwrap();
        assert_eq!(value["upToDate"], 0);
    }
}
