//! Sync Engine - install, bulk sync and removal
//!
//! ```text
//! install:  ref ─► resolve ─► type check ─► tool ─► path ─► render ─► write ─► manifest
//! sync:     manifest ─► bulk fetch (≤100 ids per call) ─► per-entry classify ─► manifest
//! suggest:  stack tags ─► search rules + search skills ─► rules then skills
//! ```
//!
//! Per-entry sync failures are recorded in the [`SyncReport`] instead of
//! stopping the loop.

mod engine;
mod install;
mod report;
mod suggest;

pub use engine::{needs_update, SyncEngine};
pub use install::{destination, remove_artifact, write_artifact, InstallOutcome};
pub use report::{EntryOutcome, SyncReport, SyncStatus, SyncSummary};
pub use suggest::{Suggestions, SUGGESTIONS_PER_TYPE};
