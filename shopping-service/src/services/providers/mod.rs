//! Upstream provider abstractions and implementations.
//!
//! The assistant talks to two external services: a generative-language model
//! (Gemini) and a video search API (YouTube Data API). Both sit behind traits
//! so the HTTP clients can be swapped for mocks in tests.

pub mod gemini;
pub mod mock;
pub mod youtube;

use crate::models::VideoRecommendation;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider returned no content")]
    EmptyResponse,
}

impl ProviderError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::EmptyResponse => "empty_response",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry the API key.
        ProviderError::NetworkError(err.without_url().to_string())
    }
}

/// Outcome of a caption lookup for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionLookup {
    /// Caption text of the first available track.
    Text(String),
    /// The video has no caption tracks.
    Unavailable,
    /// A track exists but the provider refused the download.
    DownloadRefused,
}

impl CaptionLookup {
    /// Human-readable form returned to API callers.
    pub fn into_message(self) -> String {
        match self {
            CaptionLookup::Text(text) => text,
            CaptionLookup::Unavailable => "No captions available for this video".to_string(),
            CaptionLookup::DownloadRefused => {
                "Captions available but could not be downloaded".to_string()
            }
        }
    }
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send a single prompt and return the raw reply text.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Model identifier, for logs and metrics.
    fn model(&self) -> &str;
}

/// Trait for keyword video search providers (e.g., YouTube).
#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Search videos ordered by relevance, at most `max_results` items.
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoRecommendation>, ProviderError>;

    /// Fetch the first caption track of a video.
    async fn captions(&self, video_id: &str) -> Result<CaptionLookup, ProviderError>;
}
