//! Serializes flattened batches and hands them to a sink.

use crate::error::{SyncError, SyncResult};
use crate::sink::Sink;
use bclake_types::{FlatRecord, SyncTarget};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;

pub(crate) const SINK_NOT_CONFIGURED: &str = "sink identifier is not configured";

/// Where a batch went and how much was in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: String,
    pub records: usize,
    pub bytes: usize,
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Relative path of a batch stamped with `millis` since the Unix epoch.
pub fn batch_path(company: &str, entity: &str, millis: i64) -> String {
    format!("{}_{}/data_{millis}.json", slug(company), slug(entity))
}

/// One JSON object per line, no trailing newline.
pub fn to_ndjson(records: &[FlatRecord]) -> SyncResult<String> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Writes each batch as a new newline-delimited JSON file.
///
/// Files are never merged or replaced; every call produces a new
/// timestamp-named file under the unit's folder. Stamps are strictly
/// increasing across a writer and its clones, so two writes in the same
/// millisecond still get distinct paths.
#[derive(Clone)]
pub struct StorageWriter {
    sink: Arc<dyn Sink>,
    last_millis: Arc<AtomicI64>,
}

impl StorageWriter {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            sink,
            last_millis: Arc::new(AtomicI64::new(i64::MIN)),
        }
    }

    /// Wall-clock millis, bumped past the previous stamp when the clock has
    /// not moved (or moved back).
    fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let bump = |prev: i64| now.max(prev.saturating_add(1));
        match self
            .last_millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| Some(bump(prev)))
        {
            Ok(prev) | Err(prev) => bump(prev),
        }
    }

    pub fn sink(&self) -> &dyn Sink {
        self.sink.as_ref()
    }

    pub async fn write(
        &self,
        target: &SyncTarget,
        records: &[FlatRecord],
        company: &str,
        entity: &str,
    ) -> SyncResult<WriteReceipt> {
        if !target.is_ready() {
            return Err(SyncError::Write(SINK_NOT_CONFIGURED.to_string()));
        }

        let path = batch_path(company, entity, self.next_millis());
        let contents = to_ndjson(records)?;

        self.sink.write_text(target, &path, &contents).await?;

        info!(
            sink = self.sink.name(),
            company,
            entity,
            %path,
            records = records.len(),
            "Batch written"
        );

        Ok(WriteReceipt {
            path,
            records: records.len(),
            bytes: contents.len(),
        })
    }
}
