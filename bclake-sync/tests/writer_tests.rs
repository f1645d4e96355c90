mod common;

use bclake_sync::{
    LocalSink, MemorySink, RecordFlattener, Sink, StorageWriter, SyncError, batch_path, slug,
    to_ndjson,
};
use bclake_types::{FlatRecord, SyncTarget};
use chrono::{TimeZone, Utc};
use common::{raw, ready_target};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn rows() -> Vec<FlatRecord> {
    let flattener = RecordFlattener::new(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    vec![
        flattener.flatten(&raw(json!({"id": "1", "address": {"city": "Oslo"}})), "Co", "customers"),
        flattener.flatten(&raw(json!({"id": "2", "tags": ["vip"]})), "Co", "customers"),
    ]
}

// ── Paths and encoding ──────────────────────────────────────────

#[test]
fn slug_replaces_everything_but_ascii_alphanumerics() {
    assert_eq!(slug("CRONUS USA, Inc."), "CRONUS_USA__Inc_");
    assert_eq!(slug("salesOrders"), "salesOrders");
    assert_eq!(slug("Café/Ø"), "Caf___");
    assert_eq!(slug(""), "");
}

#[test]
fn batch_path_uses_slugs_and_millis() {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(
        batch_path("CRONUS USA, Inc.", "customers", at.timestamp_millis()),
        "CRONUS_USA__Inc__customers/data_1704164645000.json"
    );
}

#[test]
fn ndjson_has_one_object_per_line() {
    let text = to_ndjson(&rows()).unwrap();
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 2);
    assert!(!text.ends_with('\n'));
    assert!(!text.starts_with('['));

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["address_city"], "Oslo");
    assert_eq!(first["company"], "Co");
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["tags"], "[\"vip\"]");
}

#[test]
fn empty_batch_is_empty_text() {
    assert_eq!(to_ndjson(&[]).unwrap(), "");
}

// ── StorageWriter ───────────────────────────────────────────────

#[tokio::test]
async fn write_sends_one_file_to_the_sink() {
    let sink = Arc::new(MemorySink::new());
    let writer = StorageWriter::new(sink.clone());

    let receipt = writer
        .write(&ready_target(), &rows(), "CRONUS USA, Inc.", "customers")
        .await
        .unwrap();

    assert_eq!(receipt.records, 2);
    assert!(receipt.path.starts_with("CRONUS_USA__Inc__customers/data_"));
    assert!(receipt.path.ends_with(".json"));

    let writes = sink.writes().await;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].sink_id, "lakehouse-1");
    assert_eq!(writes[0].path, receipt.path);
    assert_eq!(writes[0].contents, to_ndjson(&rows()).unwrap());
    assert_eq!(receipt.bytes, writes[0].contents.len());
}

#[tokio::test]
async fn unset_sink_id_fails_before_any_write() {
    let sink = Arc::new(MemorySink::new());
    let writer = StorageWriter::new(sink.clone());

    for target in [
        SyncTarget::default(),
        SyncTarget::new("   ", "workspace-1"),
    ] {
        let err = writer
            .write(&target, &rows(), "Co", "customers")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Write(_)));
        assert!(err.to_string().contains("sink identifier is not configured"));
    }

    assert!(sink.writes().await.is_empty());
}

#[tokio::test]
async fn memory_sink_rejects_escaping_paths() {
    let sink = MemorySink::new();
    for path in ["../outside.json", "/abs/data.json", ""] {
        let err = sink.write_text(&ready_target(), path, "{}").await.unwrap_err();
        assert!(matches!(err, SyncError::Write(_)), "{path} should be rejected");
    }
    assert!(sink.writes().await.is_empty());
}

// ── LocalSink ───────────────────────────────────────────────────

#[tokio::test]
async fn local_sink_writes_under_namespace_and_sink_id() {
    let temp = TempDir::new().unwrap();
    let sink = Arc::new(LocalSink::new(temp.path()));
    let writer = StorageWriter::new(sink.clone());

    let receipt = writer
        .write(&ready_target(), &rows(), "Co", "customers")
        .await
        .unwrap();

    let expected = temp
        .path()
        .join("workspace-1")
        .join("lakehouse-1")
        .join(&receipt.path);
    let contents = tokio::fs::read_to_string(&expected).await.unwrap();
    assert_eq!(contents, to_ndjson(&rows()).unwrap());
    assert_eq!(sink.name(), "local");
}

#[tokio::test]
async fn local_sink_without_namespace_uses_sink_id_only() {
    let temp = TempDir::new().unwrap();
    let sink = LocalSink::new(temp.path());
    let target = SyncTarget::new("lakehouse-1", "");

    assert_eq!(
        sink.target_dir(&target).unwrap(),
        temp.path().join("lakehouse-1")
    );

    sink.write_text(&target, "Co_items/data_1.json", "{\"id\":1}")
        .await
        .unwrap();
    let written = temp.path().join("lakehouse-1/Co_items/data_1.json");
    assert_eq!(tokio::fs::read_to_string(written).await.unwrap(), "{\"id\":1}");
}

#[tokio::test]
async fn back_to_back_writes_never_overwrite() {
    let temp = TempDir::new().unwrap();
    let writer = StorageWriter::new(Arc::new(LocalSink::new(temp.path())));
    let cloned = writer.clone();

    let mut paths = Vec::new();
    for w in [&writer, &cloned, &writer, &cloned, &writer] {
        let receipt = w
            .write(&ready_target(), &rows(), "Co", "customers")
            .await
            .unwrap();
        paths.push(receipt.path);
    }
    let mut unique = paths.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), paths.len());

    let dir = temp.path().join("workspace-1/lakehouse-1/Co_customers");
    let mut entries = tokio::fs::read_dir(dir).await.unwrap();
    let mut count = 0;
    while entries.next_entry().await.unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, paths.len());
}

#[tokio::test]
async fn batch_stamps_strictly_increase() {
    let sink = Arc::new(MemorySink::new());
    let writer = StorageWriter::new(sink.clone());
    for _ in 0..20 {
        writer
            .write(&ready_target(), &rows(), "Co", "items")
            .await
            .unwrap();
    }

    let stamps: Vec<i64> = sink
        .writes()
        .await
        .iter()
        .map(|w| {
            w.path
                .trim_start_matches("Co_items/data_")
                .trim_end_matches(".json")
                .parse()
                .unwrap()
        })
        .collect();
    assert_eq!(stamps.len(), 20);
    assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn existing_file_is_never_replaced() {
    let temp = TempDir::new().unwrap();
    let sink = LocalSink::new(temp.path());

    sink.write_text(&ready_target(), "Co_items/data_1.json", "first")
        .await
        .unwrap();
    let err = sink
        .write_text(&ready_target(), "Co_items/data_1.json", "second")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Write(_)));
    assert!(err.to_string().contains("already exists"));

    let written = temp.path().join("workspace-1/lakehouse-1/Co_items/data_1.json");
    assert_eq!(tokio::fs::read_to_string(written).await.unwrap(), "first");
}

#[tokio::test]
async fn memory_sink_rejects_duplicate_paths() {
    let sink = MemorySink::new();
    sink.write_text(&ready_target(), "Co_items/data_1.json", "first")
        .await
        .unwrap();
    let err = sink
        .write_text(&ready_target(), "Co_items/data_1.json", "second")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Write(_)));

    let writes = sink.writes().await;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].contents, "first");
}

#[tokio::test]
async fn local_sink_reports_io_failure_as_write_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocked");
    std::fs::write(&blocker, "not a directory").unwrap();

    // The root is a file, so the target directory cannot be created.
    let sink = LocalSink::new(&blocker);
    let err = sink
        .write_text(&ready_target(), "Co_items/data_1.json", "{}")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Write(_)));
}
