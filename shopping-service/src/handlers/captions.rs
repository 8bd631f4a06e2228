use crate::dtos::CaptionsResponse;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

/// Caption text for a video, or a notice when none can be fetched.
#[tracing::instrument(skip(state))]
pub async fn get_captions(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<CaptionsResponse>, AppError> {
    let captions = state
        .flow
        .assistant()
        .captions(&video_id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, kind = e.kind(), "Caption lookup failed");
            AppError::BadGateway(e.to_string())
        })?;

    Ok(Json(CaptionsResponse { video_id, captions }))
}
