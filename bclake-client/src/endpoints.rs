//! URL construction for the identity provider and the OData API.

use crate::config::ClientConfig;
use bclake_types::ConnectionConfig;

/// Precomputed URL roots for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    odata_root: String,
    token_url: String,
}

impl Endpoints {
    pub fn new(connection: &ConnectionConfig, config: &ClientConfig) -> Self {
        let api = config.api_base_url.trim_end_matches('/');
        let login = config.login_base_url.trim_end_matches('/');

        Self {
            odata_root: format!(
                "{api}/v2.0/{}/{}/ODataV4",
                connection.tenant_id, connection.environment
            ),
            token_url: format!("{login}/{}/oauth2/v2.0/token", connection.tenant_id),
        }
    }

    /// Client-credentials token endpoint.
    pub fn token(&self) -> &str {
        &self.token_url
    }

    /// Root of the environment's OData service.
    pub fn odata_root(&self) -> &str {
        &self.odata_root
    }

    /// `.../ODataV4/Company('<company>')`, with the company name URL-escaped.
    pub fn company_root(&self, company: &str) -> String {
        format!(
            "{}/Company('{}')",
            self.odata_root,
            urlencoding::encode(company)
        )
    }

    /// Entity-set URL for a company, with an optional pre-built query string.
    pub fn entity_set(&self, company: &str, entity_set: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.company_root(company), entity_set);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// CSDL `$metadata` document for a company.
    pub fn metadata(&self, company: &str) -> String {
        format!("{}/$metadata", self.company_root(company))
    }

    /// Company listing, selecting only the fields `Company` carries.
    pub fn companies(&self) -> String {
        format!("{}/companies?$select=id,name,displayName", self.odata_root)
    }
}
