//! Knowledge-base client: chat sessions, collections, and website ingestion.
//!
//! Talks to an h2oGPTe-compatible REST API under `{address}/api/v1`. Every
//! call is a single request/response; sessions are never closed explicitly.

mod client;

pub use client::{H2oGpteClient, KnowledgeOptions};
