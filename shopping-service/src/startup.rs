//! Application startup and lifecycle management.

use crate::config::ShoppingConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::youtube::{YoutubeConfig, YoutubeSearchProvider};
use crate::services::providers::{TextProvider, VideoSearchProvider};
use crate::services::{InMemorySessionStore, SessionFlowController, ShoppingAssistant};
use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub flow: SessionFlowController,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the Gemini and YouTube clients.
    pub async fn build(config: ShoppingConfig) -> Result<Self, AppError> {
        let text_provider: Arc<dyn TextProvider> = Arc::new(
            GeminiTextProvider::new(GeminiConfig {
                api_key: config.gemini.api_key.clone(),
                model: config.gemini.model.clone(),
                api_base: config.gemini.api_base.clone(),
                timeout: config.upstream.timeout,
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
        );

        let video_provider: Arc<dyn VideoSearchProvider> = Arc::new(
            YoutubeSearchProvider::new(YoutubeConfig {
                api_key: config.youtube.api_key.clone(),
                api_base: config.youtube.api_base.clone(),
                timeout: config.upstream.timeout,
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
        );

        tracing::info!(
            model = %config.gemini.model,
            max_results = config.youtube.max_results,
            timeout_secs = config.upstream.timeout.as_secs(),
            "Initialized upstream providers"
        );

        Self::build_with_providers(config, text_provider, video_provider).await
    }

    /// Build the application around the given providers.
    pub async fn build_with_providers(
        config: ShoppingConfig,
        text_provider: Arc<dyn TextProvider>,
        video_provider: Arc<dyn VideoSearchProvider>,
    ) -> Result<Self, AppError> {
        let assistant =
            ShoppingAssistant::new(text_provider, video_provider, config.youtube.max_results);
        let flow = SessionFlowController::new(Arc::new(InMemorySessionStore::new()), assistant);

        let state = AppState { flow };

        let router = build_router(state);

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Shopping service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn http_port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/api/start", post(handlers::start_session))
        .route("/api/answer", post(handlers::submit_answer))
        .route("/api/status/:session_id", get(handlers::get_status))
        .route("/api/session/:session_id", delete(handlers::delete_session))
        .route("/api/captions/:video_id", get(handlers::get_captions))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
