//! Entity-set discovery from an OData `$metadata` document.

use crate::error::{ClientError, ClientResult};
use bclake_types::{EntityInfo, display_name_from_identifier};

/// Entity sets under these namespaces are platform internals.
const SYSTEM_PREFIXES: &[&str] = &["Microsoft.", "NAV."];

/// Sets that are never offered for sync.
const EXCLUDED_SETS: &[&str] = &["companies"];

/// Extracts the syncable entity sets from `$metadata` XML, sorted by display name.
pub fn parse_entity_sets(xml: &str) -> ClientResult<Vec<EntityInfo>> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| ClientError::Metadata(e.to_string()))?;

    let mut entities: Vec<EntityInfo> = doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "EntitySet")
        .filter_map(|node| node.attribute("Name"))
        .filter(|name| is_business_entity(name))
        .map(|name| EntityInfo {
            name: name.to_string(),
            display_name: display_name_from_identifier(name),
        })
        .collect();

    entities.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    Ok(entities)
}

fn is_business_entity(name: &str) -> bool {
    !SYSTEM_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
        && !name.contains('$')
        && !EXCLUDED_SETS.contains(&name)
}
