//! Web search for documentation candidates.
//!
//! Wraps the SerpAPI Google engine. The response is handed back untouched:
//! the pipeline embeds it verbatim in a prompt and lets the model pick the
//! documentation link, so nothing here interprets result structure.

use std::time::Duration;

use apiscout_shared::{ApiScoutError, Result, SearchResult, SearchSection};
use reqwest::Client;
use tracing::{debug, info, instrument};

/// Service name used in errors and logs.
const SERVICE: &str = "serpapi";

/// Search engine selector sent with every request.
const ENGINE: &str = "google";

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("apiscout/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Search options
// ---------------------------------------------------------------------------

/// Locale and endpoint parameters for the search client.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Base URL of the search API (no trailing slash).
    pub endpoint: String,
    /// Interface language code (`hl`).
    pub language: String,
    /// Country code (`gl`).
    pub country: String,
    /// Search engine domain.
    pub google_domain: String,
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl From<&SearchSection> for SearchOptions {
    fn from(section: &SearchSection) -> Self {
        Self {
            endpoint: section.endpoint.trim_end_matches('/').to_string(),
            language: section.language.clone(),
            country: section.country.clone(),
            google_domain: section.google_domain.clone(),
            timeout_secs: section.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// SerpAPI client.
pub struct SerpApiClient {
    client: Client,
    opts: SearchOptions,
    api_key: String,
}

impl SerpApiClient {
    /// Create a new client with the given options and API key.
    pub fn new(opts: SearchOptions, api_key: impl Into<String>) -> Result<Self> {
        let client = build_client(&opts)?;
        Ok(Self {
            client,
            opts,
            api_key: api_key.into(),
        })
    }

    /// Run a search for `query` localized to `location`.
    ///
    /// Returns the provider's JSON body unmodified. Transport failures,
    /// non-success statuses and undecodable bodies are returned as errors;
    /// nothing is retried.
    #[instrument(skip_all, fields(query = %query, location = %location))]
    pub async fn search(&self, query: &str, location: &str) -> Result<SearchResult> {
        let url = format!("{}/search.json", self.opts.endpoint);
        info!("searching");

        let params = [
            ("engine", ENGINE),
            ("q", query),
            ("location", location),
            ("hl", self.opts.language.as_str()),
            ("gl", self.opts.country.as_str()),
            ("google_domain", self.opts.google_domain.as_str()),
            ("api_key", self.api_key.as_str()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                ApiScoutError::transport(SERVICE, self.opts.timeout_secs, e.is_timeout(), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiScoutError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiScoutError::parse(format!("{SERVICE}: invalid JSON body: {e}")))?;

        debug!(
            organic_results = body
                .get("organic_results")
                .and_then(|v| v.as_array())
                .map_or(0, |a| a.len()),
            "search complete"
        );

        Ok(SearchResult(body))
    }
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &SearchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| ApiScoutError::Network(format!("failed to build HTTP client: {e}")))
}
