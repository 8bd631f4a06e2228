use crate::dtos::{
    AnswerRequest, AnswerResponse, CompletionResponse, ProgressResponse, SessionStatusResponse,
    StartRequest, StartResponse,
};
use crate::services::AnswerOutcome;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

#[tracing::instrument(skip(state, request), fields(session_id = %request.session_id))]
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>, AppError> {
    request.validate()?;

    let started = state.flow.start(&request.session_id, &request.query).await?;

    Ok(Json(StartResponse::new(started.session, started.degraded)))
}

#[tracing::instrument(
    skip(state, request),
    fields(session_id = %request.session_id, question_index = ?request.question_index)
)]
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    request.validate()?;

    let outcome = state
        .flow
        .answer(&request.session_id, request.question_index, &request.answer)
        .await?;

    let response = match outcome {
        AnswerOutcome::Progress {
            session,
            next_index,
            next_question,
        } => AnswerResponse::Progress(ProgressResponse::new(&session, next_index, next_question)),
        AnswerOutcome::Complete(completion) => {
            AnswerResponse::Complete(Box::new(CompletionResponse::from(*completion)))
        }
    };

    Ok(Json(response))
}

#[tracing::instrument(skip(state))]
pub async fn get_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let session = state.flow.status(&session_id).await?;
    Ok(Json(SessionStatusResponse::from(session)))
}

#[tracing::instrument(skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.flow.delete(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
