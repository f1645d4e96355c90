//! Business Central OData client.
//!
//! Layers, leaves first:
//! - **TokenManager**: client-credentials grant with an expiry-aware cache
//! - **ODataPager**: authenticated GETs that follow `@odata.nextLink` lazily
//! - **EntityFetcher**: `$filter` / `$select` / `$top` construction per entity
//! - **BusinessCentralClient**: ties the above together and adds discovery
//!   (companies, entity sets from `$metadata`) and a connection test
//!
//! Sync-path calls surface every failure. Discovery calls have a `try_`
//! variant that returns the error and a best-effort variant that logs it and
//! returns an empty list.
//!
//! # Example
//!
//! ```no_run
//! use bclake_client::{BusinessCentralClient, ClientConfig};
//! use bclake_types::ConnectionConfig;
//!
//! # async fn run() -> bclake_client::ClientResult<()> {
//! let connection = ConnectionConfig::new("tenant-id", "client-id", "secret", "Production");
//! let client = BusinessCentralClient::new(connection, ClientConfig::default())?;
//!
//! let result = client.test_connection(Some("CRONUS USA, Inc.")).await;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod endpoints;
mod error;
mod fetcher;
pub mod metadata;
mod pager;
pub mod query;
mod token;

pub use client::{BusinessCentralClient, DEFAULT_PREVIEW_ROWS, best_effort};
pub use config::{ClientConfig, DEFAULT_PAGE_SIZE};
pub use endpoints::Endpoints;
pub use error::{ClientError, ClientResult};
pub use fetcher::EntityFetcher;
pub use metadata::parse_entity_sets;
pub use pager::{ODataPage, ODataPager};
pub use query::{EntityQuery, compose_filter, format_watermark};
pub use token::{AccessToken, TOKEN_SAFETY_MARGIN_SECS, TokenManager};
