pub mod spotify;
pub mod youtube;

use anyhow::Result;
use async_trait::async_trait;

/// Text shown in place of a URL when a provider has no usable result.
pub const NOT_FOUND: &str = "No content found";

/// Best match returned by a single provider search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(String),
    NotFound,
}

impl LookupResult {
    pub fn as_text(&self) -> &str {
        match self {
            LookupResult::Found(url) => url,
            LookupResult::NotFound => NOT_FOUND,
        }
    }
}

/// A media-search provider behind a query-in, URL-out contract.
#[async_trait]
pub trait MediaLookup: Send + Sync {
    /// Label used in replies and logs (e.g. "Youtube").
    fn provider(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<LookupResult>;
}
