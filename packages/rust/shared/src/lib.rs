//! Shared types, error model, and configuration for apiscout.
//!
//! This crate is the foundation depended on by all other apiscout crates.
//! It provides:
//! - [`ApiScoutError`] — the unified error type
//! - Domain types ([`SearchResult`], [`CrawlResult`], [`CollectionId`], [`SessionId`], [`IngestOptions`])
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CollectionConfig, CrawlSection, Credentials, IngestSection, KnowledgeSection,
    PipelineSection, SearchSection, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_credentials,
};
pub use error::{ApiScoutError, Result};
pub use types::{CollectionId, CrawlResult, IngestOptions, SearchResult, SessionId};
