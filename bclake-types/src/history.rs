//! Sync outcomes: one entry per (company, entity) attempt, plus the bounded log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of entries the history log keeps by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Outcome of one sync unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failed,
    /// Accepted when reading stored history. The orchestrator never assigns it.
    Partial,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
            SyncStatus::Partial => "partial",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a single (company, entity) sync attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the attempt started.
    pub timestamp: DateTime<Utc>,
    pub status: SyncStatus,
    pub company_name: String,
    pub entity_name: String,
    /// Records fetched from the API, including those fetched before a failure.
    pub records_processed: u64,
    /// Records handed to the sink in a completed write.
    pub records_written: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: u64,
}

impl HistoryEntry {
    /// Creates an entry for an attempt that has just started.
    ///
    /// The status starts as `Failed` so an attempt that never reaches the end
    /// is never reported as a success.
    pub fn started(
        timestamp: DateTime<Utc>,
        company_name: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            status: SyncStatus::Failed,
            company_name: company_name.into(),
            entity_name: entity_name.into(),
            records_processed: 0,
            records_written: 0,
            error_message: None,
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }
}

/// Newest-first, bounded log of history entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for SyncHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SyncHistory {
    /// Empty history holding at most `DEFAULT_HISTORY_CAPACITY` entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty history bounded to `capacity` entries. Zero keeps nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends a run's entries (keeping their relative order) and drops the
    /// oldest entries beyond capacity.
    pub fn record(&mut self, run: impl IntoIterator<Item = HistoryEntry>) {
        let run: Vec<HistoryEntry> = run.into_iter().collect();
        for entry in run.into_iter().rev() {
            self.entries.push_front(entry);
        }
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Most recently recorded entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Number of entries retained, never above `capacity`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first run is recorded, or when capacity is zero.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Aggregate counts over one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub units: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records_processed: u64,
    pub records_written: u64,
}

impl SyncSummary {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, entry| {
            acc.units += 1;
            match entry.status {
                SyncStatus::Success => acc.succeeded += 1,
                SyncStatus::Failed | SyncStatus::Partial => acc.failed += 1,
            }
            acc.records_processed += entry.records_processed;
            acc.records_written += entry.records_written;
            acc
        })
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
