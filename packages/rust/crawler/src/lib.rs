//! Crawl client for collecting a documentation site's pages and links.
//!
//! This crate provides:
//! - [`FirecrawlClient`] — submits a crawl job and waits for its result
//! - [`CrawlOptions`] — endpoint, URL filters, and polling limits

pub mod firecrawl;

pub use firecrawl::{CrawlOptions, FirecrawlClient};
