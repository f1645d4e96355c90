//! Core type definitions for the Business Central lakehouse loader.
//!
//! This crate defines the data model shared by the client and sync layers:
//! - Connection credentials (`ConnectionConfig`)
//! - Entity selection and incremental watermarks (`EntityDescriptor`, `SyncConfiguration`)
//! - The storage destination (`SyncTarget`)
//! - Per-unit sync outcomes and the bounded history log (`HistoryEntry`, `SyncHistory`)
//! - Dynamically shaped OData records and their flattened form (`RecordValue`, `FlatRecord`)
//!
//! Nothing in here performs I/O.

mod connection;
mod discovery;
mod entity;
mod history;
mod naming;
mod record;
mod target;

pub use connection::ConnectionConfig;
pub use discovery::{Company, ConnectionTestDetails, ConnectionTestResult, EntityInfo};
pub use entity::{EntityDescriptor, SyncConfiguration};
pub use history::{
    HistoryEntry, SyncHistory, SyncStatus, SyncSummary, DEFAULT_HISTORY_CAPACITY,
};
pub use naming::display_name_from_identifier;
pub use record::{FlatRecord, RawRecord, RecordValue, Scalar};
pub use target::SyncTarget;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("duplicate entity in sync configuration: {0}")]
    DuplicateEntity(String),
}
