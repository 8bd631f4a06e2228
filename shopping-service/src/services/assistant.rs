//! The four upstream steps of a shopping session.
//!
//! Every step returns an [`Outcome`]: provider failures are logged, counted
//! and replaced by fallback content so the session flow never stalls.

use crate::models::{SessionAnswer, VideoRecommendation};
use crate::services::metrics;
use crate::services::outcome::Outcome;
use crate::services::prompts;
use crate::services::providers::{ProviderError, TextProvider, VideoSearchProvider};
use crate::services::question_parser::{normalize_count, parse_questions, CountAdjustment};
use std::sync::Arc;

/// Report text when the search returns nothing.
pub const NO_RESULTS_MESSAGE: &str = "No videos found for your search query.";

/// Video search results and their rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    /// The phrase sent to the video search provider.
    pub search_query: String,
    pub videos: Vec<VideoRecommendation>,
    /// Human-readable report of `videos`.
    pub report: String,
}

#[derive(Clone)]
pub struct ShoppingAssistant {
    text_provider: Arc<dyn TextProvider>,
    video_provider: Arc<dyn VideoSearchProvider>,
    max_results: u32,
}

impl ShoppingAssistant {
    pub fn new(
        text_provider: Arc<dyn TextProvider>,
        video_provider: Arc<dyn VideoSearchProvider>,
        max_results: u32,
    ) -> Self {
        Self {
            text_provider,
            video_provider,
            max_results,
        }
    }

    /// Exactly five follow-up questions for `user_query`.
    #[tracing::instrument(skip(self))]
    pub async fn follow_up_questions(&self, user_query: &str) -> Outcome<Vec<String>> {
        let prompt = prompts::follow_up_questions(user_query);

        let outcome = match self.text_provider.generate(&prompt).await {
            Ok(reply) => match parse_questions(&reply) {
                Ok(parsed) => {
                    tracing::debug!(
                        strategy = parsed.strategy.name(),
                        count = parsed.questions.len(),
                        "Parsed follow-up questions"
                    );
                    match normalize_count(parsed.questions) {
                        (questions, CountAdjustment::Exact) => Outcome::Generated(questions),
                        (questions, CountAdjustment::Truncated { .. }) => {
                            // Extra questions are dropped; the kept ones are still genuine.
                            Outcome::Generated(questions)
                        }
                        (questions, adjustment @ CountAdjustment::Padded { .. }) => {
                            Outcome::degraded(questions, adjustment.to_string())
                        }
                    }
                }
                Err(e) => Outcome::degraded(prompts::fallback_questions(), e.to_string()),
            },
            Err(e) => Outcome::degraded(prompts::fallback_questions(), provider_reason(&e)),
        };

        self.observe("questions", &outcome);
        outcome
    }

    /// Requirements summary built from the query and collected answers.
    #[tracing::instrument(skip(self, answers), fields(answers = answers.len()))]
    pub async fn summarize(&self, user_query: &str, answers: &[SessionAnswer]) -> Outcome<String> {
        let prompt = prompts::summary(user_query, answers);

        let outcome = match self.text_provider.generate(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => Outcome::Generated(reply),
            Ok(_) => Outcome::degraded(
                prompts::fallback_summary(user_query, answers),
                "model returned an empty summary",
            ),
            Err(e) => Outcome::degraded(
                prompts::fallback_summary(user_query, answers),
                provider_reason(&e),
            ),
        };

        self.observe("summary", &outcome);
        outcome
    }

    /// One-line video search phrase derived from the summary.
    #[tracing::instrument(skip(self, summary))]
    pub async fn search_phrase(&self, user_query: &str, summary: &str) -> Outcome<String> {
        let prompt = prompts::search_phrase(user_query, summary);

        let outcome = match self.text_provider.generate(&prompt).await {
            Ok(reply) => match first_line(&reply) {
                Some(phrase) => Outcome::Generated(phrase),
                None => Outcome::degraded(
                    prompts::fallback_search_phrase(user_query),
                    "model returned an empty search phrase",
                ),
            },
            Err(e) => Outcome::degraded(
                prompts::fallback_search_phrase(user_query),
                provider_reason(&e),
            ),
        };

        self.observe("search_phrase", &outcome);
        outcome
    }

    /// Derive a search phrase, run one video search and render the report.
    pub async fn recommend(&self, user_query: &str, summary: &str) -> Outcome<Recommendations> {
        let phrase = self.search_phrase(user_query, summary).await;
        let phrase_reason = phrase.reason().map(str::to_string);
        let search_query = phrase.into_value();

        tracing::info!(search_query = %search_query, "Searching videos");

        let search = match self
            .video_provider
            .search(&search_query, self.max_results)
            .await
        {
            Ok(videos) => Outcome::Generated(videos),
            Err(e) => Outcome::degraded(Vec::new(), provider_reason(&e)),
        };
        self.observe("video_search", &search);

        let search_reason = search.reason().map(str::to_string);
        let videos = search.into_value();
        let recommendations = Recommendations {
            report: format_report(&videos),
            search_query,
            videos,
        };

        let reasons: Vec<String> = phrase_reason.into_iter().chain(search_reason).collect();
        if reasons.is_empty() {
            Outcome::Generated(recommendations)
        } else {
            Outcome::degraded(recommendations, reasons.join("; "))
        }
    }

    /// Caption text (or a notice) for one video.
    pub async fn captions(&self, video_id: &str) -> Result<String, ProviderError> {
        self.video_provider
            .captions(video_id)
            .await
            .map(|lookup| lookup.into_message())
    }

    fn observe<T>(&self, step: &'static str, outcome: &Outcome<T>) {
        if let Some(reason) = outcome.reason() {
            tracing::warn!(
                step,
                model = self.text_provider.model(),
                reason = %reason,
                "Upstream step degraded; using fallback content"
            );
        }
        metrics::record_upstream(step, outcome.label());
    }
}

fn provider_reason(error: &ProviderError) -> String {
    format!("{} ({})", error, error.kind())
}

/// First non-empty line with surrounding quotes removed.
fn first_line(reply: &str) -> Option<String> {
    reply
        .lines()
        .map(|line| {
            line.trim()
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
                .trim()
        })
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Render videos as a numbered plain-text report.
pub fn format_report(videos: &[VideoRecommendation]) -> String {
    if videos.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let mut report = String::from("🎥 YouTube Video Recommendations:\n");
    report.push_str(&"=".repeat(50));
    report.push_str("\n\n");

    for (i, video) in videos.iter().enumerate() {
        report.push_str(&format!("{}. 📺 {}\n", i + 1, video.title));
        report.push_str(&format!("   👤 Channel: {}\n", video.channel_title));
        report.push_str(&format!("   📅 Published: {}\n", video.published_date()));
        report.push_str(&format!("   🔗 URL: {}\n", video.url));
        report.push_str(&format!("   📝 Description: {}\n", video.description));
        report.push('\n');
        report.push_str(&"-".repeat(40));
        report.push_str("\n\n");
    }

    report
}
