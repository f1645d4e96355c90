//! Entity selection and incremental-sync watermarks.

use crate::history::{HistoryEntry, SyncStatus};
use crate::naming::display_name_from_identifier;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One OData entity set selected for sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescriptor {
    /// OData entity-set identifier, e.g. `customers`.
    pub name: String,
    /// Label shown to users and used in progress messages.
    pub display_name: String,
    /// Disabled entities stay configured but are skipped by a sync run.
    pub enabled: bool,
    /// Extra OData `$filter` expression applied to every fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// Instant of the last successful sync; scopes incremental fetches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl EntityDescriptor {
    /// Creates an enabled descriptor with a display name derived from `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: display_name_from_identifier(&name),
            name,
            enabled: true,
            filter_expression: None,
            last_sync: None,
        }
    }

    /// Overrides the name derived from the entity-set identifier.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the custom `$filter`, ANDed after the watermark clause.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_expression = Some(filter.into());
        self
    }

    /// Sets the watermark. Only records modified after it are fetched.
    #[must_use]
    pub fn with_last_sync(mut self, last_sync: DateTime<Utc>) -> Self {
        self.last_sync = Some(last_sync);
        self
    }

    /// Keeps the entity in the configuration but skips it during runs.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Which entities to sync and how.
///
/// Entities are an ordered set keyed by name: inserting a descriptor whose
/// name already exists replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SyncConfigurationRepr")]
pub struct SyncConfiguration {
    entities: Vec<EntityDescriptor>,
    /// Fetch only records modified since each entity's watermark.
    pub incremental_sync: bool,
    /// `$select` field list applied to every entity; empty selects all fields.
    #[serde(default)]
    pub selected_fields: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncConfigurationRepr {
    #[serde(default)]
    entities: Vec<EntityDescriptor>,
    #[serde(default)]
    incremental_sync: bool,
    #[serde(default)]
    selected_fields: Vec<String>,
}

impl TryFrom<SyncConfigurationRepr> for SyncConfiguration {
    type Error = Error;

    fn try_from(repr: SyncConfigurationRepr) -> Result<Self> {
        let mut seen = HashSet::new();
        for entity in &repr.entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(Error::DuplicateEntity(entity.name.clone()));
            }
        }

        Ok(Self {
            entities: repr.entities,
            incremental_sync: repr.incremental_sync,
            selected_fields: repr.selected_fields,
        })
    }
}

impl SyncConfiguration {
    /// Creates an empty full-sync configuration.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(mut self, entity: EntityDescriptor) -> Self {
        self.upsert_entity(entity);
        self
    }

    #[must_use]
    pub fn with_incremental_sync(mut self, incremental: bool) -> Self {
        self.incremental_sync = incremental;
        self
    }

    #[must_use]
    pub fn with_selected_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Inserts a descriptor, replacing any existing one with the same name
    /// without changing its position.
    pub fn upsert_entity(&mut self, entity: EntityDescriptor) {
        match self.entities.iter_mut().find(|e| e.name == entity.name) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }

    /// Removes the descriptor with the given name, returning it if present.
    pub fn remove_entity(&mut self, name: &str) -> Option<EntityDescriptor> {
        let index = self.entities.iter().position(|e| e.name == name)?;
        Some(self.entities.remove(index))
    }

    /// All configured entities in configuration order.
    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Enabled entities in configuration order.
    pub fn enabled_entities(&self) -> Vec<&EntityDescriptor> {
        self.entities.iter().filter(|e| e.enabled).collect()
    }

    /// Moves watermarks forward after a sync run.
    ///
    /// An entity's `last_sync` is set to `synced_at` only when the batch holds
    /// at least one entry for it and every such entry succeeded. Returns the
    /// names of the entities that advanced.
    pub fn advance_watermarks(
        &mut self,
        entries: &[HistoryEntry],
        synced_at: DateTime<Utc>,
    ) -> Vec<String> {
        let mut all_succeeded: HashMap<&str, bool> = HashMap::new();
        for entry in entries {
            let ok = all_succeeded.entry(entry.entity_name.as_str()).or_insert(true);
            *ok &= entry.status == SyncStatus::Success;
        }

        let mut advanced = Vec::new();
        for entity in &mut self.entities {
            if all_succeeded.get(entity.name.as_str()) == Some(&true) {
                entity.last_sync = Some(synced_at);
                advanced.push(entity.name.clone());
            }
        }
        advanced
    }
}
