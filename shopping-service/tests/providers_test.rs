//! Gemini and YouTube clients against a local fake upstream.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use secrecy::Secret;
use serde_json::{json, Value};
use shopping_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use shopping_service::services::providers::youtube::{YoutubeConfig, YoutubeSearchProvider};
use shopping_service::services::providers::{
    CaptionLookup, ProviderError, TextProvider, VideoSearchProvider,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Upstream {
    gemini_status: Arc<Mutex<Option<StatusCode>>>,
    gemini_keys: Arc<Mutex<Vec<String>>>,
    search_params: Arc<Mutex<Vec<HashMap<String, String>>>>,
    caption_tracks: Arc<Mutex<Vec<&'static str>>>,
}

async fn generate_content(
    State(upstream): State<Upstream>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    upstream.gemini_keys.lock().unwrap().push(key);

    if let Some(status) = *upstream.gemini_status.lock().unwrap() {
        return Err(status);
    }
    assert_eq!(call, "gemini-test:generateContent");

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    Ok(Json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": format!("echo: {}", prompt)}]},
            "finishReason": "STOP"
        }]
    })))
}

async fn search(
    State(upstream): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    upstream.search_params.lock().unwrap().push(params);
    Json(json!({
        "items": [
            {
                "id": {"kind": "youtube#video", "videoId": "abc123"},
                "snippet": {
                    "title": "Laptop buying guide",
                    "description": "What to look for",
                    "channelTitle": "Tech Reviews",
                    "publishedAt": "2024-05-06T07:08:09Z",
                    "thumbnails": {"medium": {"url": "https://img/abc123.jpg"}}
                }
            },
            {"id": {"kind": "youtube#playlist", "playlistId": "pl1"}}
        ]
    }))
}

async fn list_captions(State(upstream): State<Upstream>) -> Json<Value> {
    let items: Vec<Value> = upstream
        .caption_tracks
        .lock()
        .unwrap()
        .iter()
        .map(|id| json!({"id": id}))
        .collect();
    Json(json!({ "items": items }))
}

async fn download_caption(Path(track_id): Path<String>) -> Result<String, StatusCode> {
    match track_id.as_str() {
        "open" => Ok("hello from captions".to_string()),
        _ => Err(StatusCode::FORBIDDEN),
    }
}

async fn spawn_upstream(upstream: Upstream) -> String {
    let app = Router::new()
        .route("/models/:call", post(generate_content))
        .route("/search", get(search))
        .route("/captions", get(list_captions))
        .route("/captions/:track_id", get(download_caption))
        .with_state(upstream);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}", addr)
}

fn gemini(base: &str) -> GeminiTextProvider {
    GeminiTextProvider::new(GeminiConfig {
        api_key: Secret::new("gemini-secret".to_string()),
        model: "gemini-test".to_string(),
        api_base: format!("{}/", base),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn youtube(base: &str) -> YoutubeSearchProvider {
    YoutubeSearchProvider::new(YoutubeConfig {
        api_key: Secret::new("youtube-secret".to_string()),
        api_base: base.to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn gemini_sends_key_in_header_and_returns_text() {
    let upstream = Upstream::default();
    let base = spawn_upstream(upstream.clone()).await;

    let reply = gemini(&base).generate("list five questions").await.unwrap();

    assert_eq!(reply, "echo: list five questions");
    assert_eq!(*upstream.gemini_keys.lock().unwrap(), vec!["gemini-secret"]);
}

#[tokio::test]
async fn gemini_maps_throttling_and_errors() {
    let upstream = Upstream::default();
    let base = spawn_upstream(upstream.clone()).await;
    let provider = gemini(&base);

    *upstream.gemini_status.lock().unwrap() = Some(StatusCode::TOO_MANY_REQUESTS);
    assert!(matches!(
        provider.generate("hi").await,
        Err(ProviderError::RateLimited)
    ));

    *upstream.gemini_status.lock().unwrap() = Some(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(matches!(
        provider.generate("hi").await,
        Err(ProviderError::ApiError(_))
    ));
}

#[tokio::test]
async fn youtube_search_sends_expected_query() {
    let upstream = Upstream::default();
    let base = spawn_upstream(upstream.clone()).await;

    let videos = youtube(&base).search("laptop under 1 lakh", 10).await.unwrap();

    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].video_id, "abc123");
    assert_eq!(videos[0].channel_title, "Tech Reviews");
    assert_eq!(videos[0].published_date(), "2024-05-06");
    assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=abc123");

    let params = upstream.search_params.lock().unwrap()[0].clone();
    assert_eq!(params["q"], "laptop under 1 lakh");
    assert_eq!(params["part"], "snippet");
    assert_eq!(params["type"], "video");
    assert_eq!(params["order"], "relevance");
    assert_eq!(params["maxResults"], "10");
    assert_eq!(params["key"], "youtube-secret");
}

#[tokio::test]
async fn youtube_caption_lookup_outcomes() {
    let upstream = Upstream::default();
    let base = spawn_upstream(upstream.clone()).await;
    let provider = youtube(&base);

    assert_eq!(
        provider.captions("abc123").await.unwrap(),
        CaptionLookup::Unavailable
    );

    *upstream.caption_tracks.lock().unwrap() = vec!["locked"];
    assert_eq!(
        provider.captions("abc123").await.unwrap(),
        CaptionLookup::DownloadRefused
    );

    *upstream.caption_tracks.lock().unwrap() = vec!["open", "locked"];
    assert_eq!(
        provider.captions("abc123").await.unwrap(),
        CaptionLookup::Text("hello from captions".to_string())
    );
}

#[tokio::test]
async fn unreachable_upstream_error_hides_key() {
    // Nothing listens on the discard port.
    let provider = youtube("http://127.0.0.1:9");

    let err = provider.search("laptop", 5).await.unwrap_err();

    assert!(matches!(err, ProviderError::NetworkError(_)));
    assert!(!err.to_string().contains("youtube-secret"));
}
