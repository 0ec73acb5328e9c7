//! Core domain types passed between the provider adapters and the pipeline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Provider payloads
// ---------------------------------------------------------------------------

/// Raw search provider response, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResult(pub serde_json::Value);

/// Raw crawl provider response (page content + discovered links).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlResult(pub serde_json::Value);

impl SearchResult {
    /// Pretty-printed JSON for embedding in a prompt.
    pub fn to_prompt_text(&self) -> String {
        pretty(&self.0)
    }
}

impl CrawlResult {
    /// Pretty-printed JSON for embedding in a prompt.
    pub fn to_prompt_text(&self) -> String {
        pretty(&self.0)
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// ---------------------------------------------------------------------------
// Knowledge-base identifiers
// ---------------------------------------------------------------------------

/// Opaque collection identifier issued by the knowledge-base service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub String);

/// Opaque chat session identifier issued by the knowledge-base service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// IngestOptions
// ---------------------------------------------------------------------------

/// Option set sent with every website ingestion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Ask the service to summarize each ingested document.
    pub gen_doc_summaries: bool,
    /// Ask the service to generate sample questions per document.
    pub gen_doc_questions: bool,
    /// Follow links discovered on the ingested page.
    pub follow_links: bool,
    /// Maximum link-follow depth.
    pub max_depth: u32,
    /// Audio transcription language ("auto" to detect).
    pub audio_input_language: String,
    /// OCR model selection ("auto" to detect).
    pub ocr_model: String,
    /// Tesseract language hint, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_lang: Option<String>,
    /// Overall timeout for a single ingestion, in seconds.
    pub timeout_secs: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            gen_doc_summaries: true,
            gen_doc_questions: true,
            follow_links: true,
            max_depth: 1,
            audio_input_language: "auto".into(),
            ocr_model: "auto".into(),
            tesseract_lang: None,
            timeout_secs: 180,
        }
    }
}
