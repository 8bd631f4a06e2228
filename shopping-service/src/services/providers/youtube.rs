//! YouTube Data API v3 video search provider.

use super::{CaptionLookup, ProviderError, VideoSearchProvider};
use crate::models::VideoRecommendation;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

/// The API caps `maxResults` at 50.
const MAX_RESULTS_LIMIT: u32 = 50;

/// YouTube provider configuration.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub timeout: Duration,
}

/// YouTube search client.
pub struct YoutubeSearchProvider {
    config: YoutubeConfig,
    client: Client,
}

impl YoutubeSearchProvider {
    pub fn new(config: YoutubeConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self, resource: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base.trim_end_matches('/'),
            resource
        )
    }

    async fn get_checked(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", self.config.api_key.expose_secret().as_str())])
            .send()
            .await?;

        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        Ok(response)
    }
}

#[async_trait]
impl VideoSearchProvider for YoutubeSearchProvider {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoRecommendation>, ProviderError> {
        if query.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "Empty search query".to_string(),
            ));
        }
        let max_results = max_results.clamp(1, MAX_RESULTS_LIMIT).to_string();

        tracing::debug!(query = %query, max_results = %max_results, "Searching YouTube");

        let response = self
            .get_checked(
                self.api_url("search"),
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("maxResults", max_results.as_str()),
                    ("order", "relevance"),
                ],
            )
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "YouTube search error {}: {}",
                status, error_text
            )));
        }

        let body: SearchListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(body.into_videos())
    }

    async fn captions(&self, video_id: &str) -> Result<CaptionLookup, ProviderError> {
        if video_id.trim().is_empty() {
            return Err(ProviderError::InvalidRequest("Empty video id".to_string()));
        }

        let response = self
            .get_checked(
                self.api_url("captions"),
                &[("part", "snippet"), ("videoId", video_id)],
            )
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "YouTube captions error {}: {}",
                status, error_text
            )));
        }

        let tracks: CaptionListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let Some(track) = tracks.items.into_iter().next() else {
            return Ok(CaptionLookup::Unavailable);
        };

        let download = self
            .get_checked(self.api_url(&format!("captions/{}", track.id)), &[])
            .await?;

        if download.status().is_success() {
            Ok(CaptionLookup::Text(download.text().await?))
        } else {
            tracing::info!(
                video_id = %video_id,
                status = %download.status(),
                "Caption download refused"
            );
            Ok(CaptionLookup::DownloadRefused)
        }
    }
}

// ============================================================================
// YouTube API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

impl SearchListResponse {
    /// Convert items to recommendations, preserving provider order.
    fn into_videos(self) -> Vec<VideoRecommendation> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let snippet = item.snippet.unwrap_or_default();
                let thumbnail = snippet
                    .thumbnails
                    .medium
                    .or(snippet.thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();

                Some(VideoRecommendation::new(
                    video_id,
                    snippet.title,
                    snippet.description,
                    snippet.channel_title,
                    snippet.published_at,
                    thumbnail,
                ))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResourceId,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CaptionListResponse {
    #[serde(default)]
    items: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    id: String,
}
