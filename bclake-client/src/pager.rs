//! Authenticated OData GETs with transparent `@odata.nextLink` pagination.

use crate::error::{ClientError, ClientResult};
use crate::token::TokenManager;
use bclake_types::RawRecord;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// One page of an OData collection response.
///
/// A body without a `value` array is not a collection page and fails to
/// decode; an empty collection always arrives as `"value": []`.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataPage {
    #[serde(rename = "@odata.context", default)]
    pub context: Option<String>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
    pub value: Vec<RawRecord>,
}

/// Where the next page comes from, plus every URL already requested in this
/// sequence.
struct PageCursor {
    next: Option<String>,
    visited: HashSet<String>,
}

/// Executes authenticated OData requests and follows next links.
///
/// Holds no state between calls apart from the shared token manager.
#[derive(Clone)]
pub struct ODataPager {
    http: Client,
    tokens: Arc<TokenManager>,
}

impl ODataPager {
    pub fn new(http: Client, tokens: Arc<TokenManager>) -> Self {
        Self { http, tokens }
    }

    /// Lazily yields every record of every page starting at `url`.
    ///
    /// Pages are requested one at a time as the stream is polled. A failed
    /// page ends the stream with that error; records yielded before it stay
    /// valid. A next link that repeats a URL already requested in this
    /// sequence fails with `PaginationLoop`.
    pub fn fetch_all(&self, url: String) -> BoxStream<'_, ClientResult<RawRecord>> {
        let start = PageCursor {
            next: Some(url),
            visited: HashSet::new(),
        };

        stream::try_unfold(start, move |mut cursor| async move {
            let Some(url) = cursor.next.take() else {
                return Ok(None);
            };
            if !cursor.visited.insert(url.clone()) {
                return Err(ClientError::PaginationLoop { url });
            }

            let page = self.fetch_page(&url).await?;
            cursor.next = page.next_link;
            Ok(Some((page.value, cursor)))
        })
        .map_ok(|records| stream::iter(records.into_iter().map(Ok::<RawRecord, ClientError>)))
        .try_flatten()
        .boxed()
    }

    /// Collects the whole paginated sequence.
    pub async fn collect_all(&self, url: String) -> ClientResult<Vec<RawRecord>> {
        self.fetch_all(url).try_collect().await
    }

    /// Fetches a single page without following its next link.
    pub async fn fetch_page(&self, url: &str) -> ClientResult<ODataPage> {
        let response = self.get(url, "application/json").await?;
        let page: ODataPage = response.json().await?;

        debug!(
            url,
            records = page.value.len(),
            has_next = page.next_link.is_some(),
            "Fetched OData page"
        );
        Ok(page)
    }

    /// Authenticated GET; non-success statuses become `ClientError::Request`.
    pub(crate) async fn get(&self, url: &str, accept: &str) -> ClientResult<Response> {
        let token = self.tokens.get_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .header(ACCEPT, accept)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Request { status, body });
        }

        Ok(response)
    }
}
