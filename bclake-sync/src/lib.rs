//! Sync layer for the Business Central lakehouse loader.
//!
//! A sync run walks every (company, enabled entity) pair in order. Each unit:
//! 1. fetches all pages through `bclake_client`
//! 2. flattens the records into single-level rows (`RecordFlattener`)
//! 3. writes them as one newline-delimited JSON file (`StorageWriter` + `Sink`)
//!
//! and yields a `HistoryEntry`. Progress is published on a channel
//! (`ProgressReporter`) that callers drain at their own pace.

pub mod error;
pub mod flatten;
pub mod orchestrator;
pub mod progress;
pub mod sink;
pub mod writer;

pub use error::{SyncError, SyncResult};
pub use flatten::{RESERVED_KEYS, RecordFlattener};
pub use orchestrator::SyncOrchestrator;
pub use progress::{ProgressEvent, ProgressReporter};
pub use sink::{LocalSink, MemorySink, Sink, SinkWrite};
pub use writer::{StorageWriter, WriteReceipt, batch_path, slug, to_ndjson};
