//! Prompt text for the two link-selection questions.

use apiscout_shared::{CrawlResult, SearchResult};

/// Question asked alongside [`best_link_system_prompt`].
pub const BEST_LINK_QUESTION: &str = "Make sure you only put a valid url no other text....\
What is the best link from the search results? (Only Output the URL)";

/// System prompt asking for the single best documentation entry point.
pub fn best_link_system_prompt(target: &str, results: &SearchResult) -> String {
    format!(
        "You are an expert developer who specializes in writing integration code between \
open source software. Take a look at the following web search results and pick the link \
you think is the main page of the {target} API documentation. Only output the URL. \
The search results:

{}

Analyze these results and select the best link. The link will be crawled and every embedded \
link put into a document collection, so the main page of the API documentation is the best one.",
        results.to_prompt_text()
    )
}

/// System prompt asking which crawled links belong to the API docs.
pub fn sub_links_system_prompt(target: &str, crawl: &CrawlResult) -> String {
    format!(
        "You are an expert developer who specializes in writing integration code between \
open source software. Take a look at the following crawl of a documentation site and find \
every link that is part of the {target} API documentation. The crawl results:

{}

Each of the links you select will be ingested into a document collection that is later \
queried for API endpoints and their parameters.",
        crawl.to_prompt_text()
    )
}

/// Question asked alongside [`sub_links_system_prompt`].
pub fn sub_links_question(target: &str) -> String {
    format!(
        "What are all the links that contain anything to do with the {target} API documentation \
from the crawl results? (Only output a comma-separated list of valid URLs with no whitespace \
or quotes)"
    )
}
