//! End-to-end pipeline: search → best link → crawl → sub-links → collection → ingest → query.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use apiscout_crawler::{CrawlOptions, FirecrawlClient};
use apiscout_discovery::{SearchOptions, SerpApiClient};
use apiscout_knowledge::{H2oGpteClient, KnowledgeOptions};
use apiscout_shared::{
    ApiScoutError, AppConfig, CollectionId, CrawlResult, Credentials, IngestOptions, Result,
    SearchResult,
};

use crate::prompts;
use crate::providers::{CrawlProvider, KnowledgeBase, SearchProvider};
use crate::replies::{parse_url_list, strip_matching_quotes};
use crate::urls::sanitize_and_validate;

/// Run parameters for one pipeline execution.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the API whose documentation is collected.
    pub target: String,
    /// Web search query.
    pub query: String,
    /// Location used to localize search results.
    pub location: String,
    /// Page ceiling for the crawl of the best link.
    pub max_pages: u32,
    /// Name of the collection created for this run.
    pub collection_name: String,
    /// Description of the collection created for this run.
    pub collection_description: String,
    /// Question asked of the populated collection.
    pub final_query: String,
    /// Timeout for the best-link and sub-link questions.
    pub decision_timeout_secs: u64,
    /// Timeout for the final collection question.
    pub query_timeout_secs: u64,
    /// Options sent with every website ingestion.
    pub ingest: IngestOptions,
    /// Drop repeated sub-links before ingestion.
    pub dedupe_links: bool,
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            target: config.pipeline.target.clone(),
            query: config.search.query.clone(),
            location: config.search.location.clone(),
            max_pages: config.crawl.limit,
            collection_name: config.collection.name.clone(),
            collection_description: config.collection.description.clone(),
            final_query: config.pipeline.final_query.clone(),
            decision_timeout_secs: config.knowledge.decision_timeout_secs,
            query_timeout_secs: config.knowledge.query_timeout_secs,
            ingest: IngestOptions::from(&config.ingest),
            dedupe_links: config.pipeline.dedupe_links,
        }
    }
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct RunReport {
    /// Documentation entry point chosen by the model (cleaned).
    pub best_link: String,
    /// Links parsed from the sub-link reply, before validation.
    pub candidate_links: Vec<String>,
    /// Links that passed validation and were submitted for ingestion.
    pub valid_links: Vec<String>,
    /// Collection created for this run.
    pub collection_id: CollectionId,
    /// Links ingested successfully.
    pub ingested: Vec<String>,
    /// Links whose ingestion failed (URL, error message).
    pub failed: Vec<(String, String)>,
    /// Reply to the final collection question.
    pub answer: String,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each ingestion attempt; `error` is set when it failed.
    fn url_ingested(&self, url: &str, error: Option<&str>, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn url_ingested(&self, _url: &str, _error: Option<&str>, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Sequences the search, crawl, and knowledge-base providers.
pub struct Pipeline {
    config: RunConfig,
    search: Box<dyn SearchProvider>,
    crawler: Box<dyn CrawlProvider>,
    kb: Box<dyn KnowledgeBase>,
}

impl Pipeline {
    /// Create a pipeline over the given providers.
    pub fn new(
        config: RunConfig,
        search: Box<dyn SearchProvider>,
        crawler: Box<dyn CrawlProvider>,
        kb: Box<dyn KnowledgeBase>,
    ) -> Self {
        Self {
            config,
            search,
            crawler,
            kb,
        }
    }

    /// Create a pipeline backed by the network clients described in `app`.
    pub fn from_config(app: &AppConfig, creds: &Credentials) -> Result<Self> {
        let search = SerpApiClient::new(SearchOptions::from(&app.search), &creds.search_api_key)?;
        let crawler = FirecrawlClient::new(CrawlOptions::from(&app.crawl), &creds.crawl_api_key)?;
        let kb = H2oGpteClient::new(
            KnowledgeOptions::from(&app.knowledge),
            &creds.knowledge_api_key,
        )?;

        Ok(Self::new(
            RunConfig::from(app),
            Box::new(search),
            Box::new(crawler),
            Box::new(kb),
        ))
    }

    /// Run configuration in effect.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every step in order.
    ///
    /// Ingestion failures are recorded per URL and never abort the run;
    /// any other failure ends it.
    #[instrument(skip_all, fields(api = %self.config.target))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunReport> {
        let start = Instant::now();
        info!(query = %self.config.query, "starting pipeline");

        // --- Phase 1: Search ---
        progress.phase("Searching the web");
        let results = self
            .search
            .search(&self.config.query, &self.config.location)
            .await?;

        // --- Phase 2: Best link ---
        progress.phase("Choosing documentation entry point");
        let best_link = self.find_best_link(&results).await?;
        info!(%best_link, "best link");

        // --- Phase 3: Crawl ---
        progress.phase(&format!("Crawling {best_link}"));
        let crawl = self
            .crawler
            .crawl(&best_link, self.config.max_pages)
            .await?;

        // --- Phase 4: Sub-links ---
        progress.phase("Selecting documentation links");
        let candidate_links = self.find_doc_links(&crawl).await?;

        // --- Phase 5: Validate ---
        let valid_links = self.select_valid_links(&candidate_links);
        info!(
            candidates = candidate_links.len(),
            valid = valid_links.len(),
            "links validated"
        );

        // --- Phase 6: Collection ---
        progress.phase("Creating collection");
        let collection_id = self
            .kb
            .create_collection(
                &self.config.collection_name,
                &self.config.collection_description,
            )
            .await?;

        // --- Phase 7: Ingest ---
        progress.phase("Ingesting documentation");
        let (ingested, failed) = self
            .ingest_all(&collection_id, &valid_links, progress)
            .await;

        // --- Phase 8: Final query ---
        progress.phase("Querying collection");
        let answer = self
            .query_collection(&collection_id, &self.config.final_query)
            .await?;

        let report = RunReport {
            best_link,
            candidate_links,
            valid_links,
            collection_id,
            ingested,
            failed,
            answer,
            elapsed: start.elapsed(),
        };

        progress.done(&report);

        info!(
            collection_id = %report.collection_id,
            ingested = report.ingested.len(),
            failed = report.failed.len(),
            elapsed_ms = report.elapsed.as_millis(),
            "pipeline complete"
        );

        Ok(report)
    }

    /// Ask the model for the single best documentation link in `results`.
    ///
    /// The reply is unquoted and run through the same validation as the
    /// sub-links; an unusable reply is a [`ApiScoutError::Validation`].
    pub async fn find_best_link(&self, results: &SearchResult) -> Result<String> {
        let system_prompt = prompts::best_link_system_prompt(&self.config.target, results);
        let session = self.kb.create_session(None).await?;
        let reply = self
            .kb
            .query(
                &session,
                prompts::BEST_LINK_QUESTION,
                Some(&system_prompt),
                self.config.decision_timeout_secs,
            )
            .await?;

        let link = strip_matching_quotes(&reply);
        let sanitized = sanitize_and_validate(link);
        if !sanitized.valid {
            return Err(ApiScoutError::validation(format!(
                "best-link reply is not a usable URL: {reply:?}"
            )));
        }

        Ok(sanitized.cleaned)
    }

    /// Ask the model which links in `crawl` belong to the API documentation.
    ///
    /// Returns the parsed reply, unvalidated.
    pub async fn find_doc_links(&self, crawl: &CrawlResult) -> Result<Vec<String>> {
        let system_prompt = prompts::sub_links_system_prompt(&self.config.target, crawl);
        let question = prompts::sub_links_question(&self.config.target);
        let session = self.kb.create_session(None).await?;
        let reply = self
            .kb
            .query(
                &session,
                &question,
                Some(&system_prompt),
                self.config.decision_timeout_secs,
            )
            .await?;

        Ok(parse_url_list(&reply))
    }

    /// Keep the cleaned form of every valid candidate, in order.
    pub fn select_valid_links(&self, candidates: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        candidates
            .iter()
            .filter_map(|raw| {
                let sanitized = sanitize_and_validate(raw);
                if !sanitized.valid {
                    warn!(url = %raw, "discarding invalid link");
                    return None;
                }
                Some(sanitized.cleaned)
            })
            .filter(|url| !self.config.dedupe_links || seen.insert(url.clone()))
            .collect()
    }

    /// Ingest each URL; a failure is logged and recorded, then the loop moves on.
    ///
    /// Returns the succeeded URLs and the `(url, error)` failures.
    pub async fn ingest_all(
        &self,
        collection_id: &CollectionId,
        urls: &[String],
        progress: &dyn ProgressReporter,
    ) -> (Vec<String>, Vec<(String, String)>) {
        let mut ingested = Vec::new();
        let mut failed = Vec::new();
        let total = urls.len();

        for (i, url) in urls.iter().enumerate() {
            match self
                .kb
                .ingest_website(collection_id, url, &self.config.ingest)
                .await
            {
                Ok(()) => {
                    info!(%url, "successfully ingested website");
                    progress.url_ingested(url, None, i + 1, total);
                    ingested.push(url.clone());
                }
                Err(e) => {
                    warn!(%url, error = %e, "failed to ingest website");
                    let message = e.to_string();
                    progress.url_ingested(url, Some(&message), i + 1, total);
                    failed.push((url.clone(), message));
                }
            }
        }

        info!(
            succeeded = ingested.len(),
            failed = failed.len(),
            "ingestion process completed"
        );
        (ingested, failed)
    }

    /// Ask `query` of a fresh session bound to `collection_id`.
    pub async fn query_collection(
        &self,
        collection_id: &CollectionId,
        query: &str,
    ) -> Result<String> {
        let session = self.kb.create_session(Some(collection_id)).await?;
        self.kb
            .query(&session, query, None, self.config.query_timeout_secs)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use apiscout_shared::SessionId;

    use super::*;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    struct StubSearch;

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str, _location: &str) -> Result<SearchResult> {
            Ok(SearchResult(serde_json::json!({
                "organic_results": [{"link": "https://docs.example.com"}]
            })))
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str, _location: &str) -> Result<SearchResult> {
            Err(ApiScoutError::Api {
                service: "serpapi",
                status: 401,
                body: "invalid key".into(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct StubCrawler {
        calls: Arc<Mutex<Vec<(String, u32)>>>,
        times_out: bool,
    }

    impl StubCrawler {
        fn timing_out() -> Self {
            Self {
                times_out: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl CrawlProvider for StubCrawler {
        async fn crawl(&self, url: &str, max_pages: u32) -> Result<CrawlResult> {
            self.calls.lock().unwrap().push((url.to_string(), max_pages));
            if self.times_out {
                return Err(ApiScoutError::Timeout {
                    service: "firecrawl",
                    secs: 600,
                });
            }
            Ok(CrawlResult(serde_json::json!([{"markdown": "# Docs"}])))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct QueryCall {
        session: SessionId,
        message: String,
        has_system_prompt: bool,
        timeout_secs: u64,
    }

    #[derive(Default)]
    struct KbState {
        replies: VecDeque<String>,
        sessions: Vec<Option<CollectionId>>,
        queries: Vec<QueryCall>,
        ingests: Vec<String>,
        failing: HashSet<String>,
        collections: usize,
        collection_fails: bool,
        /// 1-based index of the query that times out.
        query_times_out_at: Option<usize>,
    }

    /// Records every call and answers queries from a scripted reply queue.
    #[derive(Clone, Default)]
    struct StubKnowledgeBase {
        state: Arc<Mutex<KbState>>,
    }

    impl StubKnowledgeBase {
        fn with_replies(replies: &[&str]) -> Self {
            let kb = Self::default();
            kb.state.lock().unwrap().replies = replies.iter().map(|r| r.to_string()).collect();
            kb
        }

        fn failing_on(self, url: &str) -> Self {
            self.state.lock().unwrap().failing.insert(url.to_string());
            self
        }

        fn failing_collection(self) -> Self {
            self.state.lock().unwrap().collection_fails = true;
            self
        }

        fn timing_out_on_query(self, n: usize) -> Self {
            self.state.lock().unwrap().query_times_out_at = Some(n);
            self
        }

        fn collections(&self) -> usize {
            self.state.lock().unwrap().collections
        }

        fn ingests(&self) -> Vec<String> {
            self.state.lock().unwrap().ingests.clone()
        }

        fn queries(&self) -> Vec<QueryCall> {
            self.state.lock().unwrap().queries.clone()
        }

        fn sessions(&self) -> Vec<Option<CollectionId>> {
            self.state.lock().unwrap().sessions.clone()
        }
    }

    #[async_trait]
    impl KnowledgeBase for StubKnowledgeBase {
        async fn create_session(&self, collection_id: Option<&CollectionId>) -> Result<SessionId> {
            let mut state = self.state.lock().unwrap();
            state.sessions.push(collection_id.cloned());
            Ok(SessionId(format!("session-{}", state.sessions.len())))
        }

        async fn query(
            &self,
            session_id: &SessionId,
            message: &str,
            system_prompt: Option<&str>,
            timeout_secs: u64,
        ) -> Result<String> {
            let mut state = self.state.lock().unwrap();
            state.queries.push(QueryCall {
                session: session_id.clone(),
                message: message.to_string(),
                has_system_prompt: system_prompt.is_some(),
                timeout_secs,
            });
            if state.query_times_out_at == Some(state.queries.len()) {
                return Err(ApiScoutError::Timeout {
                    service: "h2ogpte",
                    secs: timeout_secs,
                });
            }
            Ok(state
                .replies
                .pop_front()
                .unwrap_or_else(|| "final answer".to_string()))
        }

        async fn create_collection(&self, _name: &str, _description: &str) -> Result<CollectionId> {
            let mut state = self.state.lock().unwrap();
            state.collections += 1;
            if state.collection_fails {
                return Err(ApiScoutError::Api {
                    service: "h2ogpte",
                    status: 403,
                    body: "collection quota exceeded".into(),
                });
            }
            Ok(CollectionId::from("col-42"))
        }

        async fn ingest_website(
            &self,
            _collection_id: &CollectionId,
            url: &str,
            _opts: &IngestOptions,
        ) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.ingests.push(url.to_string());
            if state.failing.contains(url) {
                return Err(ApiScoutError::Api {
                    service: "h2ogpte",
                    status: 500,
                    body: "ingest failed".into(),
                });
            }
            Ok(())
        }
    }

    /// Captures per-URL progress callbacks.
    #[derive(Default)]
    struct RecordingProgress {
        ingested: Mutex<Vec<(String, bool)>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn url_ingested(&self, url: &str, error: Option<&str>, _current: usize, _total: usize) {
            self.ingested
                .lock()
                .unwrap()
                .push((url.to_string(), error.is_none()));
        }
        fn done(&self, _report: &RunReport) {}
    }

    fn run_config() -> RunConfig {
        RunConfig::from(&AppConfig::default())
    }

    fn pipeline(kb: StubKnowledgeBase, crawler: StubCrawler) -> Pipeline {
        Pipeline::new(
            run_config(),
            Box::new(StubSearch),
            Box::new(crawler),
            Box::new(kb),
        )
    }

    // -----------------------------------------------------------------------
    // End-to-end
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn end_to_end_ingests_sub_links_and_queries_collection() {
        let kb = StubKnowledgeBase::with_replies(&[
            "https://docs.example.com",
            "https://docs.example.com/a,https://docs.example.com/b",
            "GET /v1/items",
        ]);
        let crawler = StubCrawler::default();
        let pipeline = pipeline(kb.clone(), crawler.clone());

        let report = pipeline.run(&SilentProgress).await.unwrap();

        assert_eq!(
            kb.ingests(),
            vec!["https://docs.example.com/a", "https://docs.example.com/b"]
        );
        assert_eq!(
            crawler.calls.lock().unwrap().as_slice(),
            &[("https://docs.example.com".to_string(), 20)]
        );

        // Two decision sessions without a collection, then one bound to it
        assert_eq!(
            kb.sessions(),
            vec![None, None, Some(CollectionId::from("col-42"))]
        );

        let queries = kb.queries();
        assert_eq!(queries.len(), 3);
        assert!(queries[0].has_system_prompt);
        assert_eq!(queries[0].timeout_secs, 60);
        assert!(queries[1].has_system_prompt);
        assert_eq!(queries[1].timeout_secs, 60);

        let final_queries: Vec<_> = queries
            .iter()
            .filter(|q| q.session == SessionId::from("session-3"))
            .collect();
        assert_eq!(final_queries.len(), 1);
        assert!(!final_queries[0].has_system_prompt);
        assert_eq!(final_queries[0].timeout_secs, 180);
        assert_eq!(final_queries[0].message, run_config().final_query);

        assert_eq!(report.collection_id, CollectionId::from("col-42"));
        assert_eq!(report.best_link, "https://docs.example.com");
        assert_eq!(report.answer, "GET /v1/items");
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn quoted_best_link_is_unquoted_before_crawl() {
        let kb = StubKnowledgeBase::with_replies(&["\"https://x.com\"", "https://x.com/a"]);
        let crawler = StubCrawler::default();
        let pipeline = pipeline(kb, crawler.clone());

        let report = pipeline.run(&SilentProgress).await.unwrap();

        assert_eq!(report.best_link, "https://x.com");
        assert_eq!(crawler.calls.lock().unwrap()[0].0, "https://x.com");
    }

    #[tokio::test]
    async fn unusable_best_link_stops_before_crawl() {
        let kb = StubKnowledgeBase::with_replies(&["I could not find any documentation."]);
        let crawler = StubCrawler::default();
        let pipeline = pipeline(kb.clone(), crawler.clone());

        let err = pipeline.run(&SilentProgress).await.unwrap_err();

        assert!(matches!(err, ApiScoutError::Validation { .. }));
        assert!(crawler.calls.lock().unwrap().is_empty());
        assert!(kb.ingests().is_empty());
    }

    // -----------------------------------------------------------------------
    // Failures outside ingestion end the run
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn search_failure_aborts_before_any_query() {
        let kb = StubKnowledgeBase::default();
        let crawler = StubCrawler::default();
        let pipeline = Pipeline::new(
            run_config(),
            Box::new(FailingSearch),
            Box::new(crawler.clone()),
            Box::new(kb.clone()),
        );

        let err = pipeline.run(&SilentProgress).await.unwrap_err();

        assert!(matches!(err, ApiScoutError::Api { service: "serpapi", .. }));
        assert!(kb.queries().is_empty());
        assert!(crawler.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn crawl_timeout_aborts_before_ingestion() {
        let kb = StubKnowledgeBase::with_replies(&["https://docs.example.com"]);
        let crawler = StubCrawler::timing_out();
        let pipeline = pipeline(kb.clone(), crawler.clone());

        let err = pipeline.run(&SilentProgress).await.unwrap_err();

        assert!(matches!(err, ApiScoutError::Timeout { service: "firecrawl", .. }));
        assert_eq!(crawler.calls.lock().unwrap().len(), 1);
        // Only the best-link query ran
        assert_eq!(kb.queries().len(), 1);
        assert_eq!(kb.collections(), 0);
        assert!(kb.ingests().is_empty());
    }

    #[tokio::test]
    async fn sub_link_query_timeout_aborts_before_collection() {
        let kb = StubKnowledgeBase::with_replies(&["https://docs.example.com"])
            .timing_out_on_query(2);
        let pipeline = pipeline(kb.clone(), StubCrawler::default());

        let err = pipeline.run(&SilentProgress).await.unwrap_err();

        assert!(matches!(err, ApiScoutError::Timeout { secs: 60, .. }));
        assert_eq!(kb.queries().len(), 2);
        assert_eq!(kb.collections(), 0);
        assert!(kb.ingests().is_empty());
    }

    #[tokio::test]
    async fn collection_failure_skips_ingestion_and_final_query() {
        let kb = StubKnowledgeBase::with_replies(&[
            "https://docs.example.com",
            "https://docs.example.com/a",
        ])
        .failing_collection();
        let pipeline = pipeline(kb.clone(), StubCrawler::default());

        let err = pipeline.run(&SilentProgress).await.unwrap_err();

        assert!(err.to_string().contains("collection quota exceeded"));
        assert_eq!(kb.collections(), 1);
        assert!(kb.ingests().is_empty());
        assert_eq!(kb.queries().len(), 2);
        assert_eq!(kb.sessions(), vec![None, None]);
    }

    #[tokio::test]
    async fn final_query_failure_fails_run_after_ingestion() {
        let kb = StubKnowledgeBase::with_replies(&[
            "https://docs.example.com",
            "https://docs.example.com/a",
        ])
        .timing_out_on_query(3);
        let pipeline = pipeline(kb.clone(), StubCrawler::default());

        let err = pipeline.run(&SilentProgress).await.unwrap_err();

        assert!(matches!(err, ApiScoutError::Timeout { secs: 180, .. }));
        assert_eq!(kb.ingests(), vec!["https://docs.example.com/a"]);
        assert_eq!(
            kb.sessions().last(),
            Some(&Some(CollectionId::from("col-42")))
        );
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn ingestion_continues_after_a_failure() {
        let kb = StubKnowledgeBase::default().failing_on("https://d.io/2");
        let pipeline = pipeline(kb.clone(), StubCrawler::default());
        let progress = RecordingProgress::default();
        let urls: Vec<String> = ["https://d.io/1", "https://d.io/2", "https://d.io/3"]
            .iter()
            .map(|u| u.to_string())
            .collect();

        let (ingested, failed) = pipeline
            .ingest_all(&CollectionId::from("col-1"), &urls, &progress)
            .await;

        assert_eq!(kb.ingests(), urls);
        assert_eq!(ingested, vec!["https://d.io/1", "https://d.io/3"]);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "https://d.io/2");
        assert!(failed[0].1.contains("ingest failed"));
        assert_eq!(
            *progress.ingested.lock().unwrap(),
            vec![
                ("https://d.io/1".to_string(), true),
                ("https://d.io/2".to_string(), false),
                ("https://d.io/3".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn all_ingestions_failing_still_queries_collection() {
        let kb = StubKnowledgeBase::with_replies(&[
            "https://docs.example.com",
            "https://docs.example.com/a",
            "nothing ingested",
        ])
        .failing_on("https://docs.example.com/a");
        let pipeline = pipeline(kb.clone(), StubCrawler::default());

        let report = pipeline.run(&SilentProgress).await.unwrap();

        assert!(report.ingested.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.answer, "nothing ingested");
        assert_eq!(kb.queries().len(), 3);
    }

    // -----------------------------------------------------------------------
    // Link selection
    // -----------------------------------------------------------------------

    #[test]
    fn invalid_links_are_dropped_in_order() {
        let pipeline = pipeline(StubKnowledgeBase::default(), StubCrawler::default());
        let candidates: Vec<String> = [
            "https://a.io/x",
            "not a url",
            "b.io/y",
            "https://a.io/x",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            pipeline.select_valid_links(&candidates),
            vec!["https://a.io/x", "http://b.io/y", "https://a.io/x"]
        );
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut config = run_config();
        config.dedupe_links = true;
        let pipeline = Pipeline::new(
            config,
            Box::new(StubSearch),
            Box::new(StubCrawler::default()),
            Box::new(StubKnowledgeBase::default()),
        );
        let candidates: Vec<String> = ["https://a.io/2", "https://a.io/1", "https://a.io/2"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            pipeline.select_valid_links(&candidates),
            vec!["https://a.io/2", "https://a.io/1"]
        );
    }

    #[test]
    fn run_config_from_defaults() {
        let config = run_config();
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.decision_timeout_secs, 60);
        assert_eq!(config.query_timeout_secs, 180);
        assert_eq!(config.ingest.max_depth, 1);
        assert!(!config.dedupe_links);
    }
}
