//! Sync orchestration: fetch, flatten and write, one (company, entity) unit
//! at a time.

use crate::error::{SyncError, SyncResult};
use crate::flatten::RecordFlattener;
use crate::progress::ProgressReporter;
use crate::writer::{SINK_NOT_CONFIGURED, StorageWriter};
use bclake_client::BusinessCentralClient;
use bclake_types::{
    EntityDescriptor, HistoryEntry, SyncConfiguration, SyncStatus, SyncSummary, SyncTarget,
};
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs sync units sequentially and records one `HistoryEntry` per unit.
///
/// Unit failures never escape: they become failed entries, and the run moves
/// on to the next unit.
pub struct SyncOrchestrator {
    client: Arc<BusinessCentralClient>,
    writer: StorageWriter,
}

impl SyncOrchestrator {
    pub fn new(client: Arc<BusinessCentralClient>, writer: StorageWriter) -> Self {
        Self { client, writer }
    }

    pub fn client(&self) -> &BusinessCentralClient {
        &self.client
    }

    pub fn writer(&self) -> &StorageWriter {
        &self.writer
    }

    /// Syncs every enabled entity of every company, companies outermost.
    ///
    /// Entries come back in processing order, failed ones included.
    pub async fn sync_all<S: AsRef<str>>(
        &self,
        companies: &[S],
        config: &SyncConfiguration,
        target: &SyncTarget,
        progress: &ProgressReporter,
    ) -> Vec<HistoryEntry> {
        let entities = config.enabled_entities();
        if entities.is_empty() {
            progress.report("No entities enabled for sync", 100.0);
            return Vec::new();
        }

        let total_units = companies.len() * entities.len();
        let mut entries = Vec::with_capacity(total_units);

        for company in companies {
            let company = company.as_ref();
            for entity in &entities {
                let unit_progress = progress.for_unit(entries.len(), total_units);
                unit_progress.report(
                    format!("Syncing {} for {company}...", entity.display_name),
                    0.0,
                );

                let entry = self
                    .sync_unit(company, entity, config, target, &unit_progress)
                    .await;
                entries.push(entry);
            }
        }

        let summary = SyncSummary::from_entries(&entries);
        info!(
            units = summary.units,
            succeeded = summary.succeeded,
            failed = summary.failed,
            records_processed = summary.records_processed,
            records_written = summary.records_written,
            "Sync run finished"
        );

        entries
    }

    /// Syncs one entity of one company. Never fails; errors land in the entry.
    pub async fn sync_unit(
        &self,
        company: &str,
        entity: &EntityDescriptor,
        config: &SyncConfiguration,
        target: &SyncTarget,
        progress: &ProgressReporter,
    ) -> HistoryEntry {
        let started = Instant::now();
        let mut entry = HistoryEntry::started(Utc::now(), company, &entity.name);

        info!(company, entity = %entity.name, "Sync unit started");

        match self
            .run_unit(company, entity, config, target, progress, &mut entry)
            .await
        {
            Ok(()) => {
                entry.status = SyncStatus::Success;
            }
            Err(e) => {
                entry.status = SyncStatus::Failed;
                entry.error_message = Some(e.to_string());
                warn!(
                    company,
                    entity = %entity.name,
                    records_processed = entry.records_processed,
                    error = %e,
                    "Sync unit failed"
                );
                progress.report(format!("Sync failed for {company}: {e}"), 100.0);
            }
        }

        entry.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            company,
            entity = %entity.name,
            status = %entry.status,
            records_processed = entry.records_processed,
            records_written = entry.records_written,
            duration_ms = entry.duration_ms,
            "Sync unit finished"
        );
        entry
    }

    async fn run_unit(
        &self,
        company: &str,
        entity: &EntityDescriptor,
        config: &SyncConfiguration,
        target: &SyncTarget,
        progress: &ProgressReporter,
        entry: &mut HistoryEntry,
    ) -> SyncResult<()> {
        if !target.is_ready() {
            return Err(SyncError::Write(SINK_NOT_CONFIGURED.to_string()));
        }

        let display = &entity.display_name;
        progress.report(format!("Fetching {display} from {company}..."), 10.0);

        let mut records = Vec::new();
        let mut stream = self.client.fetch_entity(company, entity, config);
        while let Some(record) = stream.next().await {
            records.push(record?);
            entry.records_processed += 1;
        }

        let updated = if config.incremental_sync && entity.last_sync.is_some() {
            "updated "
        } else {
            ""
        };
        progress.report(
            format!("Fetched {} {updated}{display} from {company}", records.len()),
            30.0,
        );

        if records.is_empty() {
            progress.report(format!("No records to sync for {display} in {company}"), 100.0);
            return Ok(());
        }

        progress.report(format!("Flattening {} {display} records...", records.len()), 50.0);
        let flattener = RecordFlattener::new(entry.timestamp);
        let rows = flattener.flatten_all(&records, company, &entity.name);

        progress.report(format!("Writing {display} to {}...", target.sink_name), 70.0);
        let receipt = self.writer.write(target, &rows, company, &entity.name).await?;
        entry.records_written = receipt.records as u64;

        progress.report(format!("Sync completed successfully for {display}"), 100.0);
        Ok(())
    }
}
