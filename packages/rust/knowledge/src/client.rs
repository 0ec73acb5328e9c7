use std::time::Duration;

use apiscout_shared::{
    ApiScoutError, CollectionId, IngestOptions, KnowledgeSection, Result, SessionId,
};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Service name used in errors and logs.
const SERVICE: &str = "h2ogpte";

/// User-Agent string for knowledge-base requests.
const USER_AGENT: &str = concat!("apiscout/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the knowledge-base service.
#[derive(Debug, Clone)]
pub struct KnowledgeOptions {
    /// Service address (no trailing slash).
    pub address: String,
    /// Timeout for session and collection management calls, in seconds.
    pub timeout_secs: u64,
}

impl From<&KnowledgeSection> for KnowledgeOptions {
    fn from(section: &KnowledgeSection) -> Self {
        Self {
            address: section.address.trim_end_matches('/').to_string(),
            timeout_secs: section.request_timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    collection_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<&'a str>,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    body: String,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct IngestWebsiteRequest<'a> {
    url: &'a str,
    gen_doc_summaries: bool,
    gen_doc_questions: bool,
    follow_links: bool,
    max_depth: u32,
    audio_input_language: &'a str,
    ocr_model: &'a str,
    tesseract_lang: Option<&'a str>,
}

/// Any create call answers with the new object's id.
#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// h2oGPTe REST client.
pub struct H2oGpteClient {
    client: Client,
    opts: KnowledgeOptions,
    api_key: String,
}

impl H2oGpteClient {
    /// Create a new client for the service at `opts.address`.
    pub fn new(opts: KnowledgeOptions, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            opts,
            api_key: api_key.into(),
        })
    }

    /// Open a chat session, optionally scoped to a collection.
    #[instrument(skip_all, fields(collection_id = ?collection_id.map(|c| c.0.as_str())))]
    pub async fn create_session(&self, collection_id: Option<&CollectionId>) -> Result<SessionId> {
        let body = CreateChatRequest {
            collection_id: collection_id.map(|c| c.0.as_str()),
        };
        let created: Created = self
            .send(self.post("chats").json(&body), self.opts.timeout_secs)
            .await?;

        debug!(session_id = %created.id, "chat session created");
        Ok(SessionId(created.id))
    }

    /// Send one message in `session_id` and wait up to `timeout_secs` for the reply.
    #[instrument(skip_all, fields(session_id = %session_id, timeout_secs = timeout_secs))]
    pub async fn query(
        &self,
        session_id: &SessionId,
        message: &str,
        system_prompt: Option<&str>,
        timeout_secs: u64,
    ) -> Result<String> {
        let body = CompletionRequest {
            message,
            system_prompt,
            timeout: timeout_secs,
        };
        let request = self
            .post(&format!("chats/{session_id}/completions"))
            .json(&body);

        let reply: CompletionResponse = self.send(request, timeout_secs).await?;
        debug!(reply_len = reply.body.len(), "query answered");
        Ok(reply.body)
    }

    /// Create a document collection.
    #[instrument(skip_all, fields(name = %name))]
    pub async fn create_collection(&self, name: &str, description: &str) -> Result<CollectionId> {
        let body = CreateCollectionRequest { name, description };
        let created: Created = self
            .send(self.post("collections").json(&body), self.opts.timeout_secs)
            .await?;

        info!(collection_id = %created.id, "collection created");
        Ok(CollectionId(created.id))
    }

    /// Ingest a website into a collection, waiting up to `opts.timeout_secs`.
    #[instrument(skip_all, fields(collection_id = %collection_id, url = %url))]
    pub async fn ingest_website(
        &self,
        collection_id: &CollectionId,
        url: &str,
        opts: &IngestOptions,
    ) -> Result<()> {
        let body = IngestWebsiteRequest {
            url,
            gen_doc_summaries: opts.gen_doc_summaries,
            gen_doc_questions: opts.gen_doc_questions,
            follow_links: opts.follow_links,
            max_depth: opts.max_depth,
            audio_input_language: &opts.audio_input_language,
            ocr_model: &opts.ocr_model,
            tesseract_lang: opts.tesseract_lang.as_deref(),
        };
        let request = self
            .post(&format!("collections/{collection_id}/ingest/website"))
            .query(&[("timeout", opts.timeout_secs)])
            .json(&body);

        let _: serde_json::Value = self.send(request, opts.timeout_secs).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn post(&self, route: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/api/v1/{route}", self.opts.address))
            .bearer_auth(&self.api_key)
    }

    /// Send a request bounded by `timeout_secs` and decode its JSON reply.
    ///
    /// An empty success body decodes as `null`.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        timeout_secs: u64,
    ) -> Result<T> {
        let response = request
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .map_err(|e| ApiScoutError::transport(SERVICE, timeout_secs, e.is_timeout(), e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiScoutError::transport(SERVICE, timeout_secs, e.is_timeout(), e))?;

        if !status.is_success() {
            return Err(ApiScoutError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body: text,
            });
        }

        let raw = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };
        serde_json::from_str(raw)
            .map_err(|e| ApiScoutError::parse(format!("{SERVICE}: unexpected response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> H2oGpteClient {
        let opts = KnowledgeOptions {
            address: server.uri(),
            timeout_secs: 5,
        };
        H2oGpteClient::new(opts, "sk-test").unwrap()
    }

    #[test]
    fn options_from_section() {
        let mut section = KnowledgeSection::default();
        section.address = "https://kb.example.com/".into();
        section.request_timeout_secs = 45;
        let opts = KnowledgeOptions::from(&section);
        assert_eq!(opts.address, "https://kb.example.com");
        assert_eq!(opts.timeout_secs, 45);
    }

    #[tokio::test]
    async fn test_create_session_without_collection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/chats"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "chat-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server).create_session(None).await.unwrap();
        assert_eq!(session, SessionId::from("chat-1"));
    }

    #[tokio::test]
    async fn test_create_session_scoped_to_collection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/chats"))
            .and(body_json(serde_json::json!({"collection_id": "col-7"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "chat-2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let collection = CollectionId::from("col-7");
        let session = client_for(&server)
            .create_session(Some(&collection))
            .await
            .unwrap();
        assert_eq!(session.0, "chat-2");
    }

    #[tokio::test]
    async fn test_query_sends_system_prompt_and_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/chats/chat-1/completions"))
            .and(body_json(serde_json::json!({
                "message": "What is the best link?",
                "system_prompt": "You are an expert.",
                "timeout": 60
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "body": "\"https://docs.example.com\"",
                "id": "msg-1"
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .query(
                &SessionId::from("chat-1"),
                "What is the best link?",
                Some("You are an expert."),
                60,
            )
            .await
            .unwrap();
        assert_eq!(reply, "\"https://docs.example.com\"");
    }

    #[tokio::test]
    async fn test_query_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/chats/slow/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"body": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .query(&SessionId::from("slow"), "hello", None, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiScoutError::Timeout { service: "h2ogpte", secs: 1 }));
    }

    #[tokio::test]
    async fn test_create_collection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/collections"))
            .and(body_json(serde_json::json!({
                "name": "Snowflake API docs",
                "description": "Content ingested from Snowflake API + embedded links"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "col-1"})),
            )
            .mount(&server)
            .await;

        let id = client_for(&server)
            .create_collection(
                "Snowflake API docs",
                "Content ingested from Snowflake API + embedded links",
            )
            .await
            .unwrap();
        assert_eq!(id, CollectionId::from("col-1"));
    }

    #[tokio::test]
    async fn test_ingest_website_sends_options() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/collections/col-1/ingest/website"))
            .and(query_param("timeout", "180"))
            .and(body_partial_json(serde_json::json!({
                "url": "https://docs.example.com/a",
                "gen_doc_summaries": true,
                "gen_doc_questions": true,
                "follow_links": true,
                "max_depth": 1,
                "audio_input_language": "auto",
                "ocr_model": "auto"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .ingest_website(
                &CollectionId::from("col-1"),
                "https://docs.example.com/a",
                &IngestOptions::default(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ingest_website_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/collections/col-1/ingest/website"))
            .respond_with(ResponseTemplate::new(500).set_body_string("crawler exploded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .ingest_website(
                &CollectionId::from("col-1"),
                "https://docs.example.com/a",
                &IngestOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "h2ogpte API error 500: crawler exploded");
    }
}
