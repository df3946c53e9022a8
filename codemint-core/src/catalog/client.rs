//! Catalog service client
//!
//! [`CatalogApi`] is the seam the sync engine talks to; [`HttpCatalogClient`]
//! implements it against the CodeMint HTTP API. Every call carries the bearer
//! token when one is configured and falls back to anonymous access otherwise,
//! in which case the service only returns public items.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{CatalogItem, CatalogRef, SearchParams, SearchResults};
use crate::config::{normalize_base_url, Settings};
use crate::error::{CatalogError, Result};

/// Maximum number of catalog IDs per bulk request
pub const MAX_BULK_IDS: usize = 100;

/// Request timeout for catalog calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the engine needs from the catalog service
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Resolve one reference to the item's current version
    async fn resolve(&self, reference: &CatalogRef) -> Result<CatalogItem>;

    /// Fetch the current version of many items at once
    ///
    /// The result is positionally aligned with `catalog_ids`; `None` marks an
    /// id that is unknown or not visible. At most [`MAX_BULK_IDS`] ids per call.
    async fn bulk_resolve(&self, catalog_ids: &[String]) -> Result<Vec<Option<CatalogItem>>>;

    /// Record that an item was installed
    async fn track_usage(&self, item_id: &str) -> Result<()>;

    /// Search rules, skills and prompts
    async fn search(&self, params: &SearchParams) -> Result<SearchResults>;
}

/// Reject oversized bulk requests before anything goes over the wire
pub fn check_bulk_size(catalog_ids: &[String]) -> Result<()> {
    if catalog_ids.len() > MAX_BULK_IDS {
        return Err(CatalogError::TooManyIds {
            count: catalog_ids.len(),
            max: MAX_BULK_IDS,
        });
    }
    Ok(())
}

/// HTTP implementation of [`CatalogApi`]
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest<'a> {
    catalog_ids: &'a [String],
}

#[derive(Deserialize)]
struct SyncResponse {
    #[serde(default)]
    items: Vec<Option<CatalogItem>>,
}

#[derive(Serialize)]
struct TrackRequest {
    action: &'static str,
}

/// Which call produced a response, for status mapping
#[derive(Debug, Clone, Copy)]
enum Call<'a> {
    Resolve(&'a CatalogRef),
    Sync,
    Track(&'a str),
    Search,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, REQUEST_TIMEOUT)
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let normalized = normalize_base_url(base_url);
        let base = Url::parse(&normalized).map_err(|e| {
            CatalogError::ConfigurationError(format!("Invalid catalog URL '{base_url}': {e}"))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(CatalogError::ConfigurationError(format!(
                "Catalog URL must start with http:// or https:// (got '{base_url}')"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("codemint/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.base_url, settings.token.clone())
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Parse and resolve a ref string in one step
    pub async fn resolve_str(&self, reference: &str) -> Result<CatalogItem> {
        let parsed = CatalogRef::parse(reference)?;
        self.resolve(&parsed).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, call: Call<'_>) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        check_status(response, call).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, call: Call<'_>) -> Result<T> {
        let response = self.send(request, call).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn resolve(&self, reference: &CatalogRef) -> Result<CatalogItem> {
        let url = self.endpoint(&["api", "catalog", "resolve"]);
        debug!(reference = %reference, "Resolving catalog reference");

        let request = self
            .client
            .get(url)
            .query(&[("ref", reference.to_string())]);
        self.execute(request, Call::Resolve(reference)).await
    }

    async fn bulk_resolve(&self, catalog_ids: &[String]) -> Result<Vec<Option<CatalogItem>>> {
        check_bulk_size(catalog_ids)?;
        if catalog_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint(&["api", "catalog", "sync"]);
        debug!(count = catalog_ids.len(), "Fetching catalog items in bulk");

        let request = self.client.post(url).json(&SyncRequest { catalog_ids });
        let response: SyncResponse = self.execute(request, Call::Sync).await?;

        let mut items = response.items;
        items.resize(catalog_ids.len(), None);
        Ok(items)
    }

    async fn track_usage(&self, item_id: &str) -> Result<()> {
        let url = self.endpoint(&["api", "items", item_id, "track"]);
        let request = self.client.post(url).json(&TrackRequest { action: "copy" });
        // The body is not used
        self.send(request, Call::Track(item_id)).await?;
        Ok(())
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        let url = self.endpoint(&["api", "items", "search"]);

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(q) = params.query.as_deref().filter(|q| !q.is_empty()) {
            query.push(("q", q.to_string()));
        }
        if let Some(item_type) = params.item_type {
            query.push(("type", item_type.to_string()));
        }
        if !params.tags.is_empty() {
            query.push(("tags", params.tags.join(",")));
        }
        if let Some(page) = params.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }

        let request = self.client.get(url).query(&query);
        self.execute(request, Call::Search).await
    }
}

/// Map non-success statuses onto the error taxonomy
async fn check_status(response: Response, call: Call<'_>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), ?call, "Catalog request failed");

    match status {
        StatusCode::UNAUTHORIZED => Err(CatalogError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(CatalogError::RateLimited),
        StatusCode::NOT_FOUND => Err(CatalogError::NotFound {
            what: match call {
                Call::Resolve(reference) => reference.to_string(),
                Call::Track(id) => format!("item {id}"),
                Call::Sync | Call::Search => "catalog endpoint".to_string(),
            },
        }),
        StatusCode::BAD_REQUEST => match call {
            Call::Resolve(reference) => Err(CatalogError::InvalidReference {
                reference: reference.to_string(),
                reason: error_message(&body, status),
            }),
            _ => Err(remote_error(status, &body)),
        },
        _ => Err(remote_error(status, &body)),
    }
}

fn remote_error(status: StatusCode, body: &str) -> CatalogError {
    CatalogError::Remote {
        status: status.as_u16(),
        message: error_message(body, status),
    }
}

/// Pull a readable message out of `{error: {message}}`, `{error: "..."}` or a raw body
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("error") {
            Some(serde_json::Value::String(message)) => return message.clone(),
            Some(error) => {
                if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
                    return message.to_string();
                }
            }
            None => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
