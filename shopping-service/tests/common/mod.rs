#![allow(dead_code)]

use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use shopping_service::config::{
    GeminiSettings, ShoppingConfig, UpstreamSettings, YoutubeSettings, DEFAULT_MAX_RESULTS,
};
use shopping_service::services::providers::mock::{MockTextProvider, MockVideoProvider};
use shopping_service::startup::Application;
use std::sync::Arc;
use std::time::Duration;

pub const LAPTOP_QUESTIONS: [&str; 5] = [
    "What's your budget range?",
    "What screen size do you prefer?",
    "What will you mainly use it for?",
    "Do you have any brand preferences?",
    "How much RAM do you need?",
];

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

/// Configuration pointing at unroutable upstreams; tests inject mocks.
pub fn test_config() -> ShoppingConfig {
    ShoppingConfig {
        common: CoreConfig { port: 0 },
        gemini: GeminiSettings {
            api_key: Secret::new("test-gemini-key".to_string()),
            model: "gemini-test".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        },
        youtube: YoutubeSettings {
            api_key: Secret::new("test-youtube-key".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        },
        upstream: UpstreamSettings {
            timeout: Duration::from_secs(5),
        },
        otlp_endpoint: None,
    }
}

impl TestApp {
    /// App whose providers answer one full laptop session.
    pub async fn spawn() -> Self {
        Self::spawn_with(
            MockTextProvider::for_full_session(
                &LAPTOP_QUESTIONS,
                "Laptop for work, budget 1 lakh, 15.6 inch screen.",
                "laptop under 1 lakh",
            ),
            MockVideoProvider::with_sample_videos(12),
        )
        .await
    }

    pub async fn spawn_with(text: MockTextProvider, videos: MockVideoProvider) -> Self {
        let app = Application::build_with_providers(test_config(), Arc::new(text), Arc::new(videos))
            .await
            .expect("Failed to build test application");

        let port = app.http_port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();

        // Wait for the server by polling the health endpoint
        let health_url = format!("{}/api/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn start(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/start", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send start request")
    }

    pub async fn answer(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/answer", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send answer request")
    }

    pub async fn status(&self, session_id: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/api/status/{}", self.address, session_id))
            .send()
            .await
            .expect("Failed to send status request")
    }

    pub async fn delete(&self, session_id: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/api/session/{}", self.address, session_id))
            .send()
            .await
            .expect("Failed to send delete request")
    }
}
