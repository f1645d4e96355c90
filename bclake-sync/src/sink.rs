//! Storage sink abstraction.
//!
//! A sink accepts UTF-8 text at a relative path inside a `SyncTarget`.
//! Table compaction and format conversion happen downstream, not here.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use bclake_types::SyncTarget;
use std::path::{Component, Path, PathBuf};
use std::io::ErrorKind;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Destination for serialized batches.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Writes `contents` to a new file at `path` within `target`.
    ///
    /// Fails if something already exists at `path`; sinks never overwrite.
    async fn write_text(&self, target: &SyncTarget, path: &str, contents: &str) -> SyncResult<()>;
}

fn require_sink_id(target: &SyncTarget) -> SyncResult<&str> {
    target
        .sink_id()
        .ok_or_else(|| SyncError::Write(crate::writer::SINK_NOT_CONFIGURED.to_string()))
}

/// Rejects absolute paths and `..` so writes stay inside the sink.
fn relative_path(path: &str) -> SyncResult<&Path> {
    let candidate = Path::new(path);
    let contained = !path.is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if contained {
        Ok(candidate)
    } else {
        Err(SyncError::Write(format!("invalid sink path: {path}")))
    }
}

/// Sink backed by a local (or mounted) directory.
///
/// Files land at `<root>/<namespace>/<sink id>/<path>`; the namespace level is
/// omitted when the target has none.
pub struct LocalSink {
    root: PathBuf,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that holds everything written for `target`.
    pub fn target_dir(&self, target: &SyncTarget) -> SyncResult<PathBuf> {
        let sink_id = require_sink_id(target)?;
        let mut dir = self.root.clone();
        if !target.namespace.trim().is_empty() {
            dir.push(relative_path(&target.namespace)?);
        }
        dir.push(relative_path(sink_id)?);
        Ok(dir)
    }
}

#[async_trait]
impl Sink for LocalSink {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn write_text(&self, target: &SyncTarget, path: &str, contents: &str) -> SyncResult<()> {
        let file_path = self.target_dir(target)?.join(relative_path(path)?);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::Write(format!("failed to create {}: {e}", parent.display())))?;
        }

        debug!("Writing batch to {:?} ({} bytes)", file_path, contents.len());

        let write_err =
            |e: std::io::Error| SyncError::Write(format!("failed to write {}: {e}", file_path.display()));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    SyncError::Write(format!("batch file already exists: {}", file_path.display()))
                }
                _ => write_err(e),
            })?;
        file.write_all(contents.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        info!("Wrote batch file: {}", path);
        Ok(())
    }
}

/// One write captured by `MemorySink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkWrite {
    pub sink_id: String,
    pub path: String,
    pub contents: String,
}

/// Sink that keeps every write in memory.
#[derive(Default)]
pub struct MemorySink {
    writes: Mutex<Vec<SinkWrite>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes so far, oldest first.
    pub async fn writes(&self) -> Vec<SinkWrite> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn write_text(&self, target: &SyncTarget, path: &str, contents: &str) -> SyncResult<()> {
        let sink_id = require_sink_id(target)?.to_string();
        relative_path(path)?;

        let mut writes = self.writes.lock().await;
        if writes.iter().any(|w| w.sink_id == sink_id && w.path == path) {
            return Err(SyncError::Write(format!("batch file already exists: {path}")));
        }
        writes.push(SinkWrite {
            sink_id,
            path: path.to_string(),
            contents: contents.to_string(),
        });
        Ok(())
    }
}
