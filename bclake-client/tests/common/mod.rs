//! Shared helpers for client tests.

#![allow(dead_code)]

use bclake_client::{BusinessCentralClient, ClientConfig};
use bclake_types::ConnectionConfig;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "tenant-id";
pub const ENVIRONMENT: &str = "Production";
pub const TOKEN_PATH: &str = "/tenant-id/oauth2/v2.0/token";

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn connection() -> ConnectionConfig {
    ConnectionConfig::new(TENANT, "client-id", "client-secret", ENVIRONMENT)
}

pub fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::default().with_base_url(server.uri())
}

pub fn mock_client(server: &MockServer) -> BusinessCentralClient {
    init_tracing();
    BusinessCentralClient::new(connection(), mock_config(server)).unwrap()
}

/// Path of an entity set for a company, as the client requests it.
pub fn entity_path(company: &str, entity_set: &str) -> String {
    format!("/v2.0/{TENANT}/{ENVIRONMENT}/ODataV4/Company('{company}')/{entity_set}")
}

/// Absolute URL for `entity_path`, for use in next links.
pub fn entity_url(server: &MockServer, company: &str, entity_set: &str) -> String {
    format!("{}{}", server.uri(), entity_path(company, entity_set))
}

/// Mounts a token endpoint that hands out `access_token` with `expires_in`.
pub async fn mount_token(server: &MockServer, access_token: &str, expires_in: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": access_token,
            "expires_in": expires_in
        })))
        .mount(server)
        .await;
}

/// An OData page body.
pub fn page(records: serde_json::Value, next_link: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "@odata.context": "https://example/$metadata#customers",
        "value": records
    });
    if let Some(next) = next_link {
        body["@odata.nextLink"] = json!(next);
    }
    body
}
