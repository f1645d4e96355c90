//! Nested OData records to single-level, tabular rows.
//!
//! Nested objects are unrolled with `_`-joined keys (`address.city` becomes
//! `address_city`), arrays are kept as JSON text, and every row carries the
//! three columns that identify where and when it was synced.

use bclake_types::{FlatRecord, RawRecord, RecordValue, Scalar};
use chrono::{DateTime, SecondsFormat, Utc};

pub const COMPANY_KEY: &str = "company";
pub const ENTITY_KEY: &str = "entity";
pub const SYNC_TIMESTAMP_KEY: &str = "syncTimestamp";

/// Columns owned by the flattener. Source fields with these names are dropped.
pub const RESERVED_KEYS: [&str; 3] = [COMPANY_KEY, ENTITY_KEY, SYNC_TIMESTAMP_KEY];

/// Flattens records for one sync unit.
///
/// The sync instant is fixed at construction, so `flatten` has no hidden
/// inputs: the same record, company and entity always give the same row.
#[derive(Debug, Clone)]
pub struct RecordFlattener {
    synced_at: String,
}

impl RecordFlattener {
    pub fn new(synced_at: DateTime<Utc>) -> Self {
        Self {
            synced_at: synced_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Value written to the `syncTimestamp` column.
    pub fn synced_at(&self) -> &str {
        &self.synced_at
    }

    /// Columns come out as the three reserved keys, then source fields in
    /// the order the response listed them.
    pub fn flatten(&self, record: &RawRecord, company: &str, entity: &str) -> FlatRecord {
        let mut row = FlatRecord::new();
        row.insert(COMPANY_KEY.to_string(), Scalar::from(company));
        row.insert(ENTITY_KEY.to_string(), Scalar::from(entity));
        row.insert(SYNC_TIMESTAMP_KEY.to_string(), Scalar::from(self.synced_at.as_str()));

        for (field, value) in record {
            if is_reserved(field) {
                continue;
            }
            flatten_into(&mut row, field.clone(), value);
        }
        row
    }

    pub fn flatten_all(&self, records: &[RawRecord], company: &str, entity: &str) -> Vec<FlatRecord> {
        records
            .iter()
            .map(|record| self.flatten(record, company, entity))
            .collect()
    }
}

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Writes `value` under `key`, recursing into nested objects.
///
/// Fields are visited in source order, so a later field overwrites an
/// earlier one that flattened to the same key. Overwritten keys keep their
/// original column position.
fn flatten_into(row: &mut FlatRecord, key: String, value: &RecordValue) {
    match value {
        RecordValue::Null => {
            row.insert(key, Scalar::Null);
        }
        RecordValue::Bool(b) => {
            row.insert(key, Scalar::Bool(*b));
        }
        RecordValue::Number(n) => {
            row.insert(key, Scalar::Number(n.clone()));
        }
        RecordValue::Text(s) => {
            row.insert(key, Scalar::Text(s.clone()));
        }
        RecordValue::List(_) => {
            row.insert(key, Scalar::Text(value.to_json_text()));
        }
        RecordValue::Nested(fields) => flatten_nested(row, &key, fields),
    }
}

fn flatten_nested(row: &mut FlatRecord, prefix: &str, fields: &RawRecord) {
    for (field, value) in fields {
        let key = format!("{prefix}_{field}");
        if is_reserved(&key) {
            continue;
        }
        flatten_into(row, key, value);
    }
}
