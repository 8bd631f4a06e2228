//! Mock provider implementations for testing.

use super::{CaptionLookup, ProviderError, TextProvider, VideoSearchProvider};
use crate::models::VideoRecommendation;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock text provider replaying scripted replies in order.
///
/// Once the script is exhausted every call fails with `NotConfigured`, which
/// exercises the fallback paths.
pub struct MockTextProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Provider whose every call fails.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    /// Replies for one full session: questions, summary, search phrase.
    pub fn for_full_session(questions: &[&str], summary: &str, search_phrase: &str) -> Self {
        let questions_json = serde_json::to_string(questions).unwrap_or_default();
        Self::new(vec![
            Ok(questions_json),
            Ok(summary.to_string()),
            Ok(search_phrase.to_string()),
        ])
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        lock(&self.prompts).push(prompt.to_string());

        lock(&self.replies).pop_front().unwrap_or_else(|| {
            Err(ProviderError::NotConfigured(
                "Mock text provider has no scripted reply".to_string(),
            ))
        })
    }

    fn model(&self) -> &str {
        "mock-text"
    }
}

/// Mock video search provider returning a fixed result list.
pub struct MockVideoProvider {
    videos: Vec<VideoRecommendation>,
    captions: CaptionLookup,
    enabled: bool,
    queries: Mutex<Vec<String>>,
}

impl MockVideoProvider {
    pub fn new(videos: Vec<VideoRecommendation>) -> Self {
        Self {
            videos,
            captions: CaptionLookup::Unavailable,
            enabled: true,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Provider returning `count` sample videos.
    pub fn with_sample_videos(count: usize) -> Self {
        Self::new((1..=count).map(sample_video).collect())
    }

    /// Provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            enabled: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_captions(mut self, captions: CaptionLookup) -> Self {
        self.captions = captions;
        self
    }

    /// Search queries received so far.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl VideoSearchProvider for MockVideoProvider {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoRecommendation>, ProviderError> {
        lock(&self.queries).push(query.to_string());

        if !self.enabled {
            return Err(ProviderError::NetworkError(
                "Mock video provider not enabled".to_string(),
            ));
        }

        Ok(self
            .videos
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn captions(&self, _video_id: &str) -> Result<CaptionLookup, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NetworkError(
                "Mock video provider not enabled".to_string(),
            ));
        }

        Ok(self.captions.clone())
    }
}

/// Deterministic sample video number `n`.
pub fn sample_video(n: usize) -> VideoRecommendation {
    VideoRecommendation::new(
        format!("video{}", n),
        format!("Sample video {}", n),
        format!("Description of sample video {}", n),
        format!("Channel {}", n),
        format!("2024-01-{:02}T12:00:00Z", (n % 28) + 1),
        format!("https://i.ytimg.com/vi/video{}/mqdefault.jpg", n),
    )
}

// A poisoned lock only means another test thread panicked mid-push.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
