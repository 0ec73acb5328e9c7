//! Narrow interfaces over the three external services.
//!
//! The pipeline only sees these traits, so tests can substitute
//! deterministic doubles for the network clients.

use async_trait::async_trait;

use apiscout_crawler::FirecrawlClient;
use apiscout_discovery::SerpApiClient;
use apiscout_knowledge::H2oGpteClient;
use apiscout_shared::{
    CollectionId, CrawlResult, IngestOptions, Result, SearchResult, SessionId,
};

/// Web search: query + location in, raw results out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, location: &str) -> Result<SearchResult>;
}

/// Site crawl bounded by a page count.
#[async_trait]
pub trait CrawlProvider: Send + Sync {
    async fn crawl(&self, url: &str, max_pages: u32) -> Result<CrawlResult>;
}

/// Managed retrieval/chat service.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Open a chat session, optionally scoped to a collection.
    async fn create_session(&self, collection_id: Option<&CollectionId>) -> Result<SessionId>;

    /// One synchronous question/answer exchange within a session.
    async fn query(
        &self,
        session_id: &SessionId,
        message: &str,
        system_prompt: Option<&str>,
        timeout_secs: u64,
    ) -> Result<String>;

    async fn create_collection(&self, name: &str, description: &str) -> Result<CollectionId>;

    async fn ingest_website(
        &self,
        collection_id: &CollectionId,
        url: &str,
        opts: &IngestOptions,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Network-backed implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str, location: &str) -> Result<SearchResult> {
        SerpApiClient::search(self, query, location).await
    }
}

#[async_trait]
impl CrawlProvider for FirecrawlClient {
    async fn crawl(&self, url: &str, max_pages: u32) -> Result<CrawlResult> {
        FirecrawlClient::crawl(self, url, max_pages).await
    }
}

#[async_trait]
impl KnowledgeBase for H2oGpteClient {
    async fn create_session(&self, collection_id: Option<&CollectionId>) -> Result<SessionId> {
        H2oGpteClient::create_session(self, collection_id).await
    }

    async fn query(
        &self,
        session_id: &SessionId,
        message: &str,
        system_prompt: Option<&str>,
        timeout_secs: u64,
    ) -> Result<String> {
        H2oGpteClient::query(self, session_id, message, system_prompt, timeout_secs).await
    }

    async fn create_collection(&self, name: &str, description: &str) -> Result<CollectionId> {
        H2oGpteClient::create_collection(self, name, description).await
    }

    async fn ingest_website(
        &self,
        collection_id: &CollectionId,
        url: &str,
        opts: &IngestOptions,
    ) -> Result<()> {
        H2oGpteClient::ingest_website(self, collection_id, url, opts).await
    }
}
