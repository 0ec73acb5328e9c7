//! Application configuration for apiscout.
//!
//! User config lives at `~/.apiscout/apiscout.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file; each provider section names the
//! environment variable that holds its key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ApiScoutError, Result};
use crate::types::IngestOptions;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "apiscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".apiscout";

// ---------------------------------------------------------------------------
// Config structs (matching apiscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Web search provider settings.
    #[serde(default)]
    pub search: SearchSection,

    /// Crawl provider settings.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Knowledge-base service settings.
    #[serde(default)]
    pub knowledge: KnowledgeSection,

    /// Collection created for each run.
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Options sent with each website ingestion.
    #[serde(default)]
    pub ingest: IngestSection,

    /// Pipeline behavior.
    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    /// Base URL of the search API.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Search query text.
    #[serde(default = "default_query")]
    pub query: String,

    /// Location string used to localize results.
    #[serde(default = "default_location")]
    pub location: String,

    /// Interface language code (`hl`).
    #[serde(default = "default_language")]
    pub language: String,

    /// Country code (`gl`).
    #[serde(default = "default_country")]
    pub country: String,

    /// Search engine domain.
    #[serde(default = "default_google_domain")]
    pub google_domain: String,

    /// Timeout for each search request.
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,

    /// Name of the env var holding the API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            query: default_query(),
            location: default_location(),
            language: default_language(),
            country: default_country(),
            google_domain: default_google_domain(),
            timeout_secs: default_request_timeout(),
            api_key_env: default_search_key_env(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://serpapi.com".into()
}
fn default_query() -> String {
    "Snowflake API documentation".into()
}
fn default_location() -> String {
    "Austin, Texas, United States".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_country() -> String {
    "us".into()
}
fn default_google_domain() -> String {
    "google.com".into()
}
fn default_search_key_env() -> String {
    "SERPAPI_API_KEY".into()
}
fn default_request_timeout() -> u64 {
    30
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Base URL of the crawl API.
    #[serde(default = "default_crawl_endpoint")]
    pub endpoint: String,

    /// Maximum pages per crawl.
    #[serde(default = "default_crawl_limit")]
    pub limit: u32,

    /// URL include patterns (empty means no filtering).
    #[serde(default)]
    pub includes: Vec<String>,

    /// URL exclude patterns (empty means no filtering).
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Seconds between crawl job status checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Give up on a crawl job after this many seconds.
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,

    /// Name of the env var holding the API key.
    #[serde(default = "default_crawl_key_env")]
    pub api_key_env: String,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            endpoint: default_crawl_endpoint(),
            limit: default_crawl_limit(),
            includes: Vec::new(),
            excludes: Vec::new(),
            poll_interval_secs: default_poll_interval(),
            max_wait_secs: default_max_wait(),
            api_key_env: default_crawl_key_env(),
        }
    }
}

fn default_crawl_endpoint() -> String {
    "https://api.firecrawl.dev".into()
}
fn default_crawl_limit() -> u32 {
    20
}
fn default_poll_interval() -> u64 {
    2
}
fn default_max_wait() -> u64 {
    600
}
fn default_crawl_key_env() -> String {
    "FIRECRAWL_API_KEY".into()
}

/// `[knowledge]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSection {
    /// Base address of the knowledge-base service.
    #[serde(default = "default_knowledge_address")]
    pub address: String,

    /// Timeout for session and collection management calls.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for the best-link and sub-link queries.
    #[serde(default = "default_decision_timeout")]
    pub decision_timeout_secs: u64,

    /// Timeout for the final collection query.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Name of the env var holding the API key.
    #[serde(default = "default_knowledge_key_env")]
    pub api_key_env: String,
}

impl Default for KnowledgeSection {
    fn default() -> Self {
        Self {
            address: default_knowledge_address(),
            request_timeout_secs: default_request_timeout(),
            decision_timeout_secs: default_decision_timeout(),
            query_timeout_secs: default_query_timeout(),
            api_key_env: default_knowledge_key_env(),
        }
    }
}

fn default_knowledge_address() -> String {
    "https://h2ogpte.dev.h2o.ai".into()
}
fn default_decision_timeout() -> u64 {
    60
}
fn default_query_timeout() -> u64 {
    180
}
fn default_knowledge_key_env() -> String {
    "H2OGPTE_API_KEY".into()
}

/// `[collection]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_collection_name")]
    pub name: String,

    #[serde(default = "default_collection_description")]
    pub description: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: default_collection_name(),
            description: default_collection_description(),
        }
    }
}

fn default_collection_name() -> String {
    "Snowflake API docs".into()
}
fn default_collection_description() -> String {
    "Content ingested from Snowflake API + embedded links".into()
}

/// `[ingest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSection {
    #[serde(default = "default_true")]
    pub gen_doc_summaries: bool,

    #[serde(default = "default_true")]
    pub gen_doc_questions: bool,

    #[serde(default = "default_true")]
    pub follow_links: bool,

    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default = "default_auto")]
    pub audio_input_language: String,

    #[serde(default = "default_auto")]
    pub ocr_model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_lang: Option<String>,

    /// Per-URL ingestion timeout.
    #[serde(default = "default_query_timeout")]
    pub timeout_secs: u64,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            gen_doc_summaries: true,
            gen_doc_questions: true,
            follow_links: true,
            max_depth: default_max_depth(),
            audio_input_language: default_auto(),
            ocr_model: default_auto(),
            tesseract_lang: None,
            timeout_secs: default_query_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_max_depth() -> u32 {
    1
}
fn default_auto() -> String {
    "auto".into()
}

impl From<&IngestSection> for IngestOptions {
    fn from(section: &IngestSection) -> Self {
        Self {
            gen_doc_summaries: section.gen_doc_summaries,
            gen_doc_questions: section.gen_doc_questions,
            follow_links: section.follow_links,
            max_depth: section.max_depth,
            audio_input_language: section.audio_input_language.clone(),
            ocr_model: section.ocr_model.clone(),
            tesseract_lang: section.tesseract_lang.clone(),
            timeout_secs: section.timeout_secs,
        }
    }
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Name of the API whose documentation is being collected.
    #[serde(default = "default_target")]
    pub target: String,

    /// Question asked of the populated collection.
    #[serde(default = "default_final_query")]
    pub final_query: String,

    /// Drop repeated sub-links before ingestion.
    #[serde(default)]
    pub dedupe_links: bool,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            target: default_target(),
            final_query: default_final_query(),
            dedupe_links: false,
        }
    }
}

fn default_target() -> String {
    "Snowflake".into()
}
fn default_final_query() -> String {
    "What are all the api endpoints and their expected inputs? Try to list as many as you can \
     and for each API, list out as many endpoints (at least 7) and give examples of how to \
     call each end point with expected parameters"
        .into()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API keys for the three providers, resolved from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub search_api_key: String,
    pub crawl_api_key: String,
    pub knowledge_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &"<redacted>")
            .field("crawl_api_key", &"<redacted>")
            .field("knowledge_api_key", &"<redacted>")
            .finish()
    }
}

/// Read every provider API key from the env vars named in `config`.
///
/// Reports all missing variables at once rather than the first one.
pub fn resolve_credentials(config: &AppConfig) -> Result<Credentials> {
    let mut missing = Vec::new();
    let search = read_key(&config.search.api_key_env, &mut missing);
    let crawl = read_key(&config.crawl.api_key_env, &mut missing);
    let knowledge = read_key(&config.knowledge.api_key_env, &mut missing);

    match (search, crawl, knowledge) {
        (Some(search_api_key), Some(crawl_api_key), Some(knowledge_api_key)) => Ok(Credentials {
            search_api_key,
            crawl_api_key,
            knowledge_api_key,
        }),
        _ => Err(ApiScoutError::config(format!(
            "API key not found. Set the following environment variable(s): {}",
            missing.join(", ")
        ))),
    }
}

/// A blank value counts as missing.
fn read_key<'a>(var: &'a str, missing: &mut Vec<&'a str>) -> Option<String> {
    match std::env::var(var) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => {
            missing.push(var);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.apiscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ApiScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.apiscout/apiscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ApiScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ApiScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ApiScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ApiScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ApiScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
