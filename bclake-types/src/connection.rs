//! Credentials for one Business Central environment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection settings for a Business Central environment.
///
/// The client secret is resolved by the host (typically from a vault) and
/// handed in here. It is never serialized and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Entra ID tenant the app registration lives in.
    pub tenant_id: String,
    /// App registration (client) ID.
    pub client_id: String,
    /// Client secret for the client-credentials grant.
    #[serde(skip_serializing, default)]
    pub client_secret: String,
    /// Environment name, e.g. `Production` or `Sandbox`.
    pub environment: String,
}

impl ConnectionConfig {
    /// Creates a connection config from its four parts.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            environment: environment.into(),
        }
    }

    /// Returns a copy with the secret replaced by a freshly resolved value.
    #[must_use]
    pub fn with_secret(&self, client_secret: impl Into<String>) -> Self {
        Self {
            client_secret: client_secret.into(),
            ..self.clone()
        }
    }

    /// Returns true if a secret has been supplied.
    pub fn has_secret(&self) -> bool {
        !self.client_secret.is_empty()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("environment", &self.environment)
            .finish()
    }
}
