//! Shared helpers for sync tests.

#![allow(dead_code)]

use bclake_client::{BusinessCentralClient, ClientConfig};
use bclake_sync::{MemorySink, StorageWriter, SyncOrchestrator};
use bclake_types::{ConnectionConfig, RawRecord, SyncTarget};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "tenant-id";
pub const ENVIRONMENT: &str = "Production";
pub const TOKEN_PATH: &str = "/tenant-id/oauth2/v2.0/token";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn mock_client(server: &MockServer) -> Arc<BusinessCentralClient> {
    init_tracing();
    let connection = ConnectionConfig::new(TENANT, "client-id", "client-secret", ENVIRONMENT);
    let config = ClientConfig::default().with_base_url(server.uri());
    Arc::new(BusinessCentralClient::new(connection, config).unwrap())
}

/// An orchestrator over a mock server, writing into a fresh `MemorySink`.
pub fn orchestrator(server: &MockServer) -> (SyncOrchestrator, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let writer = StorageWriter::new(sink.clone());
    (SyncOrchestrator::new(mock_client(server), writer), sink)
}

pub fn ready_target() -> SyncTarget {
    SyncTarget::new("lakehouse-1", "workspace-1")
}

pub fn entity_path(company: &str, entity_set: &str) -> String {
    format!("/v2.0/{TENANT}/{ENVIRONMENT}/ODataV4/Company('{company}')/{entity_set}")
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "tok",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Serves a single page of `records` for an entity set.
pub async fn mount_entity(
    server: &MockServer,
    company: &str,
    entity_set: &str,
    records: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(entity_path(company, entity_set)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@odata.context": "https://example/$metadata#entity",
            "value": records
        })))
        .mount(server)
        .await;
}

/// Builds a raw record from a JSON object literal.
pub fn raw(value: serde_json::Value) -> RawRecord {
    serde_json::from_value(value).unwrap()
}
