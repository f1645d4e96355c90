//! OData query-string construction for entity fetches.

use bclake_types::{EntityDescriptor, SyncConfiguration};
use chrono::{DateTime, SecondsFormat, Utc};

/// Field compared against the watermark in incremental fetches.
pub const INCREMENTAL_FIELD: &str = "lastModifiedDateTime";

/// Renders a watermark the way OData `DateTimeOffset` literals expect,
/// e.g. `2024-01-01T00:00:00Z`.
pub fn format_watermark(watermark: &DateTime<Utc>) -> String {
    watermark.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Builds the `$filter` expression for an entity.
///
/// With incremental sync on and a watermark present the result is
/// `lastModifiedDateTime gt <watermark>`, joined to the entity's custom
/// filter with `and` when there is one. Otherwise the custom filter alone,
/// or nothing.
pub fn compose_filter(entity: &EntityDescriptor, config: &SyncConfiguration) -> Option<String> {
    let custom = entity
        .filter_expression
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    let incremental = entity
        .last_sync
        .as_ref()
        .filter(|_| config.incremental_sync)
        .map(|watermark| format!("{INCREMENTAL_FIELD} gt {}", format_watermark(watermark)));

    match (incremental, custom) {
        (Some(incremental), Some(custom)) => Some(format!("{incremental} and {custom}")),
        (Some(incremental), None) => Some(incremental),
        (None, custom) => custom.map(str::to_string),
    }
}

/// `$filter` / `$select` / `$top` options for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityQuery {
    pub filter: Option<String>,
    pub select: Vec<String>,
    pub top: Option<u32>,
}

impl EntityQuery {
    /// Query for a sync fetch of `entity`.
    pub fn for_entity(entity: &EntityDescriptor, config: &SyncConfiguration, top: u32) -> Self {
        Self {
            filter: compose_filter(entity, config),
            select: config.selected_fields.clone(),
            top: Some(top),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Encodes the options as a query string (without the leading `?`).
    ///
    /// The filter is percent-encoded; select fields are joined with commas.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::with_capacity(3);

        if let Some(filter) = &self.filter {
            params.push(format!("$filter={}", urlencoding::encode(filter)));
        }
        if !self.select.is_empty() {
            params.push(format!("$select={}", self.select.join(",")));
        }
        if let Some(top) = self.top {
            params.push(format!("$top={top}"));
        }

        params.join("&")
    }
}
