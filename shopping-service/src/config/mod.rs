use secrecy::Secret;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::time::Duration;

/// Default Gemini model used for every language-model step.
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default number of videos requested per search.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Default outbound HTTP timeout in seconds.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ShoppingConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub youtube: YoutubeSettings,
    pub upstream: UpstreamSettings,
    /// OTLP collector endpoint; span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct YoutubeSettings {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub max_results: u32,
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub timeout: Duration,
}

impl ShoppingConfig {
    /// Load configuration from `.env`, the optional `configuration` file and
    /// the process environment.
    ///
    /// Fails when `GEMINI_API_KEY` is absent: there is no built-in credential.
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        let gemini_key = get_env("GEMINI_API_KEY", None, is_prod)?;
        if gemini_key.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GEMINI_API_KEY is set but empty"
            )));
        }
        // The video search shares the language-model credential unless overridden.
        let youtube_key = get_env("YOUTUBE_API_KEY", Some(&gemini_key), is_prod)?;

        let max_results = parse_number(
            "VIDEO_MAX_RESULTS",
            &get_env(
                "VIDEO_MAX_RESULTS",
                Some(&DEFAULT_MAX_RESULTS.to_string()),
                is_prod,
            )?,
        )?;
        let timeout_secs = parse_number(
            "UPSTREAM_TIMEOUT_SECS",
            &get_env(
                "UPSTREAM_TIMEOUT_SECS",
                Some(&DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string()),
                is_prod,
            )?,
        )?;

        Ok(ShoppingConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: Secret::new(gemini_key),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
                api_base: get_env(
                    "GEMINI_API_BASE",
                    Some("https://generativelanguage.googleapis.com/v1beta"),
                    is_prod,
                )?,
            },
            youtube: YoutubeSettings {
                api_key: Secret::new(youtube_key),
                api_base: get_env(
                    "YOUTUBE_API_BASE",
                    Some("https://www.googleapis.com/youtube/v3"),
                    is_prod,
                )?,
                max_results,
            },
            upstream: UpstreamSettings {
                timeout: Duration::from_secs(timeout_secs),
            },
            otlp_endpoint: std::env::var("OTLP_ENDPOINT")
                .ok()
                .filter(|s| !s.is_empty()),
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a number ({}): {}", key, raw, e))
    })
}
