//! Video metadata returned by the video search provider.

use serde::{Deserialize, Serialize};

/// Canonical watch URL prefix.
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// A single video search hit. Constructed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecommendation {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnail: String,
    pub url: String,
}

impl VideoRecommendation {
    pub fn new(
        video_id: String,
        title: String,
        description: String,
        channel_title: String,
        published_at: String,
        thumbnail: String,
    ) -> Self {
        let url = format!("{}{}", WATCH_URL_BASE, video_id);
        Self {
            video_id,
            title,
            description,
            channel_title,
            published_at,
            thumbnail,
            url,
        }
    }

    /// Publish date (`YYYY-MM-DD`) taken from the RFC 3339 timestamp.
    pub fn published_date(&self) -> &str {
        self.published_at
            .get(..10)
            .unwrap_or(self.published_at.as_str())
    }
}
