//! Company-scoped entity fetches.

use crate::endpoints::Endpoints;
use crate::error::ClientResult;
use crate::pager::ODataPager;
use crate::query::EntityQuery;
use bclake_types::{EntityDescriptor, RawRecord, SyncConfiguration};
use futures::stream::BoxStream;
use tracing::debug;

/// Builds entity queries and hands them to the pager.
#[derive(Clone)]
pub struct EntityFetcher {
    pager: ODataPager,
    endpoints: Endpoints,
    page_size: u32,
}

impl EntityFetcher {
    pub fn new(pager: ODataPager, endpoints: Endpoints, page_size: u32) -> Self {
        Self {
            pager,
            endpoints,
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// URL of the first page for a sync fetch; `top` overrides the page size.
    pub fn entity_url(
        &self,
        company: &str,
        entity: &EntityDescriptor,
        config: &SyncConfiguration,
        top: Option<u32>,
    ) -> String {
        let query = EntityQuery::for_entity(entity, config, top.unwrap_or(self.page_size));
        self.endpoints
            .entity_set(company, &entity.name, Some(&query.to_query_string()))
    }

    /// All records of `entity` in `company`, following pagination.
    pub fn fetch_entity(
        &self,
        company: &str,
        entity: &EntityDescriptor,
        config: &SyncConfiguration,
        top: Option<u32>,
    ) -> BoxStream<'_, ClientResult<RawRecord>> {
        let url = self.entity_url(company, entity, config, top);
        debug!(company, entity = %entity.name, %url, "Fetching entity");
        self.pager.fetch_all(url)
    }

    /// All records of an entity set with a caller-supplied query string.
    pub fn query_entity(
        &self,
        company: &str,
        entity_set: &str,
        query: Option<&str>,
    ) -> BoxStream<'_, ClientResult<RawRecord>> {
        let url = self.endpoints.entity_set(company, entity_set, query);
        self.pager.fetch_all(url)
    }
}
