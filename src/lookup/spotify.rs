use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::lookup::{LookupResult, MediaLookup};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
pub struct TrackPage {
    pub items: Option<Vec<Track>>,
}

#[derive(Debug, Deserialize)]
pub struct Track {
    pub external_urls: Option<HashMap<String, String>>,
}

/// Spotify Web API track search. Every search first exchanges the client
/// credentials for a fresh bearer token.
pub struct SpotifyClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    auth_url: String,
    api_base_url: String,
}

impl SpotifyClient {
    pub fn new(
        client_id: &str,
        client_secret: &str,
        auth_url: &str,
        api_base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Spotify HTTP client")?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_url: auth_url.to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client-credentials exchange against the accounts service.
    pub async fn fetch_token(&self) -> Result<String> {
        debug!("Requesting Spotify access token: {}", self.auth_url);

        let response = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Failed to send token request to Spotify")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Spotify token error ({}): {}", status, error_body);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Spotify token response")?;
        Ok(token.access_token)
    }

    /// Token exchange plus search, surfacing every failure to the caller.
    pub async fn try_search(&self, query: &str) -> Result<LookupResult> {
        let token = self.fetch_token().await?;
        let url = format!("{}/search", self.api_base_url);

        debug!("Sending Spotify search request: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await
            .context("Failed to send search request to Spotify")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Spotify API error ({}): {}", status, error_body);
        }

        let search: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Spotify search response")?;
        Ok(extract_url(&search))
    }
}

/// Spotify URL of the first track. Any missing piece of the response shape
/// yields `NotFound`.
pub fn extract_url(response: &SearchResponse) -> LookupResult {
    response
        .tracks
        .as_ref()
        .and_then(|page| page.items.as_ref())
        .and_then(|items| items.first())
        .and_then(|track| track.external_urls.as_ref())
        .and_then(|urls| urls.get("spotify"))
        .filter(|url| !url.is_empty())
        .map(|url| LookupResult::Found(url.clone()))
        .unwrap_or(LookupResult::NotFound)
}

#[async_trait]
impl MediaLookup for SpotifyClient {
    fn provider(&self) -> &'static str {
        "Spotify"
    }

    /// Never fails: errors are logged and reported as `NotFound`.
    async fn search(&self, query: &str) -> Result<LookupResult> {
        match self.try_search(query).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!("Spotify lookup failed, replying without a track: {:#}", e);
                Ok(LookupResult::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{
        body_string_contains, header, header_exists, method, path, query_param,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SpotifyClient {
        SpotifyClient::new(
            "sp-id",
            "sp-secret",
            &format!("{}/api/token", server.uri()),
            &format!("{}/v1", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn parse(value: serde_json::Value) -> SearchResponse {
        serde_json::from_value(value).unwrap()
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "bearer-xyz",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_extract_url_well_formed() {
        let response = parse(json!({
            "tracks": { "items": [
                { "external_urls": { "spotify": "https://open.spotify.com/track/abc" } }
            ] }
        }));
        assert_eq!(
            extract_url(&response),
            LookupResult::Found("https://open.spotify.com/track/abc".to_string())
        );
    }

    #[test]
    fn test_extract_url_malformed_shapes() {
        let cases = [
            json!({}),
            json!({ "tracks": {} }),
            json!({ "tracks": { "items": [] } }),
            json!({ "tracks": { "items": [ {} ] } }),
            json!({ "tracks": { "items": [ { "external_urls": {} } ] } }),
            json!({ "tracks": { "items": [ { "external_urls": { "spotify": "" } } ] } }),
        ];
        for case in cases {
            assert_eq!(extract_url(&parse(case.clone())), LookupResult::NotFound, "{}", case);
        }
    }

    #[tokio::test]
    async fn test_search_found() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(header("authorization", "Bearer bearer-xyz"))
            .and(query_param("q", "around the world"))
            .and(query_param("type", "track"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tracks": { "items": [
                    { "external_urls": { "spotify": "https://open.spotify.com/track/1pKY" } }
                ] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).search("around the world").await.unwrap();
        assert_eq!(
            result,
            LookupResult::Found("https://open.spotify.com/track/1pKY".to_string())
        );
    }

    #[tokio::test]
    async fn test_search_empty_track_list() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "tracks": { "items": [] } })),
            )
            .mount(&server)
            .await;

        let result = client(&server).search("zzzz").await.unwrap();
        assert_eq!(result, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_token_failure_falls_back_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client.try_search("song").await.unwrap_err();
        assert!(err.to_string().contains("invalid_client"));

        let result = client.search("song").await.unwrap();
        assert_eq!(result, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_search_failure_falls_back_to_not_found() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let result = client(&server).search("song").await.unwrap();
        assert_eq!(result, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_slow_token_exchange_falls_back_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "late" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = SpotifyClient::new(
            "sp-id",
            "sp-secret",
            &format!("{}/api/token", server.uri()),
            &format!("{}/v1", server.uri()),
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(client.try_search("song").await.is_err());
        assert_eq!(client.search("song").await.unwrap(), LookupResult::NotFound);
    }
}
