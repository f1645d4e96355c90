//! Client configuration.

use serde::{Deserialize, Serialize};

/// Page size used for `$top` when a fetch does not override it.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Endpoints and tuning for the Business Central client.
///
/// Base URLs are configurable so tests can point the client at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the Business Central API (e.g. `https://api.businesscentral.dynamics.com`).
    pub api_base_url: String,
    /// Base URL of the identity provider (e.g. `https://login.microsoftonline.com`).
    pub login_base_url: String,
    /// Scope requested in the client-credentials grant.
    pub scope: String,
    /// Default `$top` page size.
    pub page_size: u32,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Entity set fetched by the connection test.
    pub probe_entity: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.businesscentral.dynamics.com".to_string(),
            login_base_url: "https://login.microsoftonline.com".to_string(),
            scope: "https://api.businesscentral.dynamics.com/.default".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 60,
            probe_entity: "customers".to_string(),
        }
    }
}

impl ClientConfig {
    /// Points both the API and the identity provider at one base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.api_base_url = base_url.clone();
        self.login_base_url = base_url;
        self
    }
}
