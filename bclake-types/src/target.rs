//! Storage destination for synced batches.

use serde::{Deserialize, Serialize};

/// Where synced batches are written.
///
/// Provisioning of the sink (`auto_create`) happens in the host before a sync
/// runs; the sync core only requires `sink_id` to be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTarget {
    /// Identifier of the sink item. Must be non-empty before any write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_id: Option<String>,
    pub sink_name: String,
    /// Workspace-like namespace that qualifies the sink.
    pub namespace: String,
    #[serde(default)]
    pub namespace_name: String,
    pub auto_create: bool,
    /// Folder for loader-internal data inside the sink.
    pub internal_folder: String,
}

impl Default for SyncTarget {
    fn default() -> Self {
        Self {
            sink_id: None,
            sink_name: "bc2fabric_internal".to_string(),
            namespace: String::new(),
            namespace_name: String::new(),
            auto_create: true,
            internal_folder: "bc2fabric_internal".to_string(),
        }
    }
}

impl SyncTarget {
    /// Creates a target for an already provisioned sink.
    pub fn new(sink_id: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            sink_id: Some(sink_id.into()),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// The sink identifier, if set and non-empty.
    pub fn sink_id(&self) -> Option<&str> {
        self.sink_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// True once the target can accept writes.
    pub fn is_ready(&self) -> bool {
        self.sink_id().is_some()
    }
}
