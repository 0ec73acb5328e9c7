//! Firecrawl crawl-job client.
//!
//! A crawl is asynchronous on the provider side: `POST /v0/crawl` returns a
//! job id, and `GET /v0/crawl/status/{id}` is polled until the job reports
//! `completed` (its `data` array is the crawl result) or `failed`.

use std::time::Duration;

use apiscout_shared::{ApiScoutError, CrawlResult, CrawlSection, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Service name used in errors and logs.
const SERVICE: &str = "firecrawl";

/// Timeout for each individual HTTP request (submit or status check).
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Floor for the configured status polling interval.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// User-Agent string for crawl requests.
const USER_AGENT: &str = concat!("apiscout/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the crawl client.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Base URL of the crawl API (no trailing slash).
    pub endpoint: String,
    /// URL include patterns; empty means no filtering.
    pub includes: Vec<String>,
    /// URL exclude patterns; empty means no filtering.
    pub excludes: Vec<String>,
    /// Delay between job status checks.
    pub poll_interval: Duration,
    /// Give up waiting for the job after this long.
    pub max_wait: Duration,
}

impl From<&CrawlSection> for CrawlOptions {
    fn from(section: &CrawlSection) -> Self {
        Self {
            endpoint: section.endpoint.trim_end_matches('/').to_string(),
            includes: section.includes.clone(),
            excludes: section.excludes.clone(),
            poll_interval: Duration::from_secs(section.poll_interval_secs).max(MIN_POLL_INTERVAL),
            max_wait: Duration::from_secs(section.max_wait_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    #[serde(rename = "crawlerOptions")]
    crawler_options: CrawlerOptions<'a>,
}

#[derive(Debug, Serialize)]
struct CrawlerOptions<'a> {
    includes: &'a [String],
    excludes: &'a [String],
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct CrawlSubmitted {
    #[serde(rename = "jobId")]
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct CrawlStatus {
    status: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    current: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Firecrawl API client.
pub struct FirecrawlClient {
    client: Client,
    opts: CrawlOptions,
    api_key: String,
}

impl FirecrawlClient {
    /// Create a new client with the given options and API key.
    pub fn new(opts: CrawlOptions, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            opts,
            api_key: api_key.into(),
        })
    }

    /// Crawl `url`, visiting at most `max_pages` pages, and return the
    /// provider's result payload unmodified.
    #[instrument(skip_all, fields(url = %url, max_pages = max_pages))]
    pub async fn crawl(&self, url: &str, max_pages: u32) -> Result<CrawlResult> {
        let job_id = self.submit(url, max_pages).await?;
        info!(%job_id, "crawl job submitted");
        self.wait_for(&job_id).await
    }

    async fn submit(&self, url: &str, max_pages: u32) -> Result<String> {
        let request = CrawlRequest {
            url,
            crawler_options: CrawlerOptions {
                includes: &self.opts.includes,
                excludes: &self.opts.excludes,
                limit: max_pages,
            },
        };

        let response = self
            .client
            .post(format!("{}/v0/crawl", self.opts.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ApiScoutError::transport(SERVICE, REQUEST_TIMEOUT_SECS, e.is_timeout(), e)
            })?;

        let submitted: CrawlSubmitted = decode(response).await?;
        Ok(submitted.job_id)
    }

    async fn wait_for(&self, job_id: &str) -> Result<CrawlResult> {
        let status_url = format!("{}/v0/crawl/status/{job_id}", self.opts.endpoint);
        // No deadline when max_wait overflows the clock
        let deadline = Instant::now().checked_add(self.opts.max_wait);

        loop {
            let response = self
                .client
                .get(&status_url)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| {
                    ApiScoutError::transport(SERVICE, REQUEST_TIMEOUT_SECS, e.is_timeout(), e)
                })?;

            let status: CrawlStatus = decode(response).await?;

            match status.status.as_str() {
                "completed" => {
                    let data = status.data.unwrap_or(serde_json::Value::Array(Vec::new()));
                    info!(
                        %job_id,
                        pages = data.as_array().map_or(0, |a| a.len()),
                        "crawl complete"
                    );
                    return Ok(CrawlResult(data));
                }
                "failed" => {
                    warn!(%job_id, "crawl job failed");
                    return Err(ApiScoutError::Provider {
                        service: SERVICE,
                        message: format!(
                            "crawl job {job_id} failed: {}",
                            status.error.unwrap_or_else(|| "no detail".into())
                        ),
                    });
                }
                other => {
                    debug!(
                        %job_id,
                        status = other,
                        current = status.current,
                        total = status.total,
                        "crawl in progress"
                    );
                }
            }

            let next_poll = Instant::now().checked_add(self.opts.poll_interval);
            let out_of_time = match (deadline, next_poll) {
                (Some(deadline), Some(next)) => next > deadline,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if out_of_time {
                return Err(ApiScoutError::Timeout {
                    service: SERVICE,
                    secs: self.opts.max_wait.as_secs(),
                });
            }
            tokio::time::sleep(self.opts.poll_interval).await;
        }
    }
}

/// Check the status and decode a JSON body.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiScoutError::Api {
            service: SERVICE,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ApiScoutError::parse(format!("{SERVICE}: unexpected response body: {e}")))
}
