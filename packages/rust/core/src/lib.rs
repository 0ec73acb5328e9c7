//! Core pipeline orchestration and domain logic for apiscout.
//!
//! This crate ties together web search, crawling, and knowledge-base
//! ingestion into the end-to-end documentation pipeline ([`pipeline::Pipeline`]).

pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod replies;
pub mod urls;
