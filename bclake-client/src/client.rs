//! Business Central client: entity fetches plus discovery and connection tests.

use crate::config::ClientConfig;
use crate::endpoints::Endpoints;
use crate::error::{ClientError, ClientResult};
use crate::fetcher::EntityFetcher;
use crate::metadata::parse_entity_sets;
use crate::pager::ODataPager;
use crate::query::EntityQuery;
use crate::token::TokenManager;
use bclake_types::{
    Company, ConnectionConfig, ConnectionTestDetails, ConnectionTestResult, EntityDescriptor,
    EntityInfo, RawRecord, SyncConfiguration,
};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Number of records returned by `preview` when the caller has no preference.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Deserialize)]
struct CompanyList {
    #[serde(default)]
    value: Vec<Company>,
}

/// Collapses a discovery result to its value, or to an empty default on error.
///
/// Discovery feeds configuration screens, which should degrade to "nothing
/// found" rather than fail. The error is logged with the operation name.
pub fn best_effort<T: Default>(operation: &str, result: ClientResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(operation, error = %e, "Discovery call failed, returning empty result");
            T::default()
        }
    }
}

/// Client for one Business Central environment.
pub struct BusinessCentralClient {
    connection: ConnectionConfig,
    config: ClientConfig,
    endpoints: Endpoints,
    tokens: Arc<TokenManager>,
    pager: ODataPager,
    fetcher: EntityFetcher,
}

impl BusinessCentralClient {
    /// Creates a client with its own HTTP connection pool.
    pub fn new(connection: ConnectionConfig, config: ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self::with_http_client(http, connection, config))
    }

    /// Creates a client on top of an existing `reqwest::Client`.
    pub fn with_http_client(http: Client, connection: ConnectionConfig, config: ClientConfig) -> Self {
        let endpoints = Endpoints::new(&connection, &config);
        let tokens = Arc::new(TokenManager::new(http.clone(), &connection, &config));
        let pager = ODataPager::new(http, Arc::clone(&tokens));
        let fetcher = EntityFetcher::new(pager.clone(), endpoints.clone(), config.page_size);

        Self {
            connection,
            config,
            endpoints,
            tokens,
            pager,
            fetcher,
        }
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn pager(&self) -> &ODataPager {
        &self.pager
    }

    pub fn fetcher(&self) -> &EntityFetcher {
        &self.fetcher
    }

    /// All records of `entity` in `company` for a sync run.
    pub fn fetch_entity(
        &self,
        company: &str,
        entity: &EntityDescriptor,
        config: &SyncConfiguration,
    ) -> BoxStream<'_, ClientResult<RawRecord>> {
        self.fetcher.fetch_entity(company, entity, config, None)
    }

    /// All records of an entity set with a raw query string.
    pub fn query_entity(
        &self,
        company: &str,
        entity_set: &str,
        query: Option<&str>,
    ) -> BoxStream<'_, ClientResult<RawRecord>> {
        self.fetcher.query_entity(company, entity_set, query)
    }

    /// Reads at most `top` records without writing anything.
    ///
    /// Stops consuming the paginated sequence as soon as `top` records are in.
    pub async fn preview(
        &self,
        company: &str,
        entity_set: &str,
        filter: Option<&str>,
        top: usize,
    ) -> ClientResult<Vec<RawRecord>> {
        let mut query = EntityQuery::default().with_top(u32::try_from(top).unwrap_or(u32::MAX));
        if let Some(filter) = filter {
            query = query.with_filter(filter);
        }
        let query = query.to_query_string();

        self.fetcher
            .query_entity(company, entity_set, Some(&query))
            .take(top)
            .try_collect()
            .await
    }

    /// Checks credentials and, when a company is given, reads one record from it.
    pub async fn test_connection(&self, company: Option<&str>) -> ConnectionTestResult {
        let environment = self.connection.environment.clone();

        if let Err(e) = self.tokens.get_token().await {
            return Self::failed_test(environment, company, &e);
        }

        let Some(company) = company else {
            return ConnectionTestResult::ok("Successfully authenticated with Business Central API")
                .with_details(ConnectionTestDetails {
                    environment,
                    company: None,
                    records_fetched: None,
                    error: None,
                });
        };

        let url = self.endpoints.entity_set(
            company,
            &self.config.probe_entity,
            Some(&EntityQuery::default().with_top(1).to_query_string()),
        );

        match self.pager.fetch_page(&url).await {
            Ok(page) => {
                info!(company, records = page.value.len(), "Connection test succeeded");
                ConnectionTestResult::ok(format!(
                    "Successfully connected to Business Central company: {company}"
                ))
                .with_details(ConnectionTestDetails {
                    environment,
                    company: Some(company.to_string()),
                    records_fetched: Some(page.value.len()),
                    error: None,
                })
            }
            Err(e) => Self::failed_test(environment, Some(company), &e),
        }
    }

    fn failed_test(
        environment: String,
        company: Option<&str>,
        error: &ClientError,
    ) -> ConnectionTestResult {
        warn!(error = %error, "Connection test failed");
        ConnectionTestResult::failed(format!("Connection test failed: {error}")).with_details(
            ConnectionTestDetails {
                environment,
                company: company.map(str::to_string),
                records_fetched: None,
                error: Some(error.to_string()),
            },
        )
    }

    /// Companies in the environment.
    pub async fn try_list_companies(&self) -> ClientResult<Vec<Company>> {
        let response = self
            .pager
            .get(&self.endpoints.companies(), "application/json")
            .await?;
        let list: CompanyList = response.json().await?;
        Ok(list.value)
    }

    /// Companies in the environment; empty when the call fails.
    pub async fn list_companies(&self) -> Vec<Company> {
        best_effort("list companies", self.try_list_companies().await)
    }

    /// Syncable entity sets of a company, from its `$metadata`.
    pub async fn try_list_entities(&self, company: &str) -> ClientResult<Vec<EntityInfo>> {
        let response = self
            .pager
            .get(&self.endpoints.metadata(company), "application/xml")
            .await?;
        let xml = response.text().await?;
        parse_entity_sets(&xml)
    }

    /// Syncable entity sets of a company; empty when the call or parse fails.
    pub async fn list_entities(&self, company: &str) -> Vec<EntityInfo> {
        best_effort("list entities", self.try_list_entities(company).await)
    }
}
