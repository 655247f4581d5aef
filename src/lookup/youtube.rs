use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::lookup::{LookupResult, MediaLookup};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
}

#[derive(Debug, Deserialize)]
pub struct ResourceId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

/// YouTube Data API v3 search client, authenticated with a static API key.
pub struct YoutubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl YoutubeClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        max_results: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build YouTube HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_results,
        })
    }

    async fn list_videos(&self, query: &str) -> Result<SearchListResponse> {
        let url = format!("{}/search", self.base_url);
        let max_results = self.max_results.to_string();

        debug!("Sending YouTube search request: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "id,snippet"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to YouTube")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("YouTube API error ({}): {}", status, error_body);
        }

        response
            .json()
            .await
            .context("Failed to parse YouTube response")
    }
}

/// Watch URL of the first result, or `NotFound` when there is none.
pub fn extract_url(response: &SearchListResponse) -> LookupResult {
    match response
        .items
        .first()
        .and_then(|item| item.id.video_id.as_deref())
    {
        Some(video_id) if !video_id.is_empty() => {
            LookupResult::Found(format!("{}{}", WATCH_URL, video_id))
        }
        _ => LookupResult::NotFound,
    }
}

#[async_trait]
impl MediaLookup for YoutubeClient {
    fn provider(&self) -> &'static str {
        "Youtube"
    }

    async fn search(&self, query: &str) -> Result<LookupResult> {
        let response = self.list_videos(query).await?;
        Ok(extract_url(&response))
    }
}
