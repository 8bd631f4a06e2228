//! Per-session state machine: `initial` → `questions` → `complete`.

use crate::models::{AnswerError, Session};
use crate::services::assistant::{Recommendations, ShoppingAssistant};
use crate::services::metrics;
use crate::services::session_store::SessionStore;
use anyhow::anyhow;
use service_core::error::AppError;
use std::sync::Arc;

/// Key used when the client does not name its session.
pub const DEFAULT_SESSION_ID: &str = "default";

/// A freshly started session.
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub session: Session,
    /// The questions are the generic fallback set (fully or partly).
    pub degraded: bool,
}

/// Result of a completed session.
#[derive(Debug, Clone)]
pub struct Completion {
    pub session: Session,
    pub recommendations: Recommendations,
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub enum AnswerOutcome {
    /// More questions remain.
    Progress {
        session: Session,
        next_index: usize,
        next_question: String,
    },
    /// The last answer arrived; summary and recommendations are ready.
    Complete(Box<Completion>),
}

/// Drives sessions through their lifecycle.
///
/// Every operation on a key runs under that key's store lock, upstream calls
/// included, so requests against one session never interleave.
#[derive(Clone)]
pub struct SessionFlowController {
    store: Arc<dyn SessionStore>,
    assistant: ShoppingAssistant,
}

impl SessionFlowController {
    pub fn new(store: Arc<dyn SessionStore>, assistant: ShoppingAssistant) -> Self {
        Self { store, assistant }
    }

    pub fn assistant(&self) -> &ShoppingAssistant {
        &self.assistant
    }

    /// Start (or restart) the session under `session_id`.
    pub async fn start(&self, session_id: &str, user_query: &str) -> Result<StartOutcome, AppError> {
        let user_query = user_query.trim();
        if user_query.is_empty() {
            return Err(AppError::BadRequest(anyhow!("Query is required")));
        }
        let session_id = normalize_session_id(session_id);

        let _guard = self.store.lock(&session_id).await;

        let questions = self.assistant.follow_up_questions(user_query).await;
        let degraded = questions.is_degraded();

        let mut session = Session::new(session_id.clone(), user_query.to_string());
        session
            .begin_collecting(questions.into_value())
            .map_err(answer_error)?;
        self.store.create(session.clone()).await;

        metrics::record_session_started();
        tracing::info!(
            session_id = %session_id,
            questions = session.total_questions(),
            degraded,
            "Session started"
        );

        Ok(StartOutcome { session, degraded })
    }

    /// Record the answer to question `question_index`.
    ///
    /// The final answer triggers summary, search phrase and video search.
    pub async fn answer(
        &self,
        session_id: &str,
        question_index: Option<i64>,
        answer: &str,
    ) -> Result<AnswerOutcome, AppError> {
        let session_id = normalize_session_id(session_id);
        let _guard = self.store.lock(&session_id).await;

        let mut session = self.load(&session_id).await?;
        let question_index =
            question_index.ok_or_else(|| AppError::BadRequest(anyhow!("Question index is required")))?;
        let index = usize::try_from(question_index).map_err(|_| {
            AppError::BadRequest(anyhow!(
                "Invalid question index {}: must not be negative",
                question_index
            ))
        })?;

        session
            .record_answer(index, answer.trim().to_string())
            .map_err(answer_error)?;

        if let Some((next_index, next_question)) = session.next_question() {
            let next_question = next_question.to_string();
            self.save(session.clone()).await?;

            tracing::debug!(
                session_id = %session_id,
                answered = session.questions_answered(),
                "Answer recorded"
            );
            return Ok(AnswerOutcome::Progress {
                session,
                next_index,
                next_question,
            });
        }

        let summary = self
            .assistant
            .summarize(&session.user_query, session.answers())
            .await;
        let summary_degraded = summary.is_degraded();
        let summary = summary.into_value();

        let recommendations = self
            .assistant
            .recommend(&session.user_query, &summary)
            .await;
        let degraded = summary_degraded || recommendations.is_degraded();

        session.complete(summary).map_err(answer_error)?;
        self.save(session.clone()).await?;

        metrics::record_session_completed();
        tracing::info!(
            session_id = %session_id,
            videos = recommendations.value().videos.len(),
            degraded,
            "Session complete"
        );

        Ok(AnswerOutcome::Complete(Box::new(Completion {
            session,
            recommendations: recommendations.into_value(),
            degraded,
        })))
    }

    /// Snapshot of a session.
    pub async fn status(&self, session_id: &str) -> Result<Session, AppError> {
        self.load(session_id).await
    }

    pub async fn delete(&self, session_id: &str) -> Result<(), AppError> {
        let _guard = self.store.lock(session_id).await;
        self.store
            .delete(session_id)
            .await
            .map_err(|e| AppError::NotFound(anyhow!(e)))?;

        tracing::info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Session, AppError> {
        self.store
            .get(session_id)
            .await
            .ok_or_else(|| AppError::NotFound(anyhow!("Session not found")))
    }

    async fn save(&self, session: Session) -> Result<(), AppError> {
        // The key is locked, so a missing session here means it was never stored.
        self.store
            .update(session)
            .await
            .map_err(|e| AppError::InternalError(anyhow!(e)))
    }
}

fn normalize_session_id(session_id: &str) -> String {
    let trimmed = session_id.trim();
    if trimmed.is_empty() {
        DEFAULT_SESSION_ID.to_string()
    } else {
        trimmed.to_string()
    }
}

fn answer_error(err: AnswerError) -> AppError {
    match err {
        AnswerError::AlreadyComplete => AppError::Conflict(anyhow!(err)),
        AnswerError::OutOfRange { .. } => AppError::BadRequest(anyhow!("Invalid question index")),
        AnswerError::OutOfOrder { .. } | AnswerError::NotCollecting(_) => {
            AppError::BadRequest(anyhow!(err))
        }
        AnswerError::AlreadyCollecting | AnswerError::Incomplete { .. } | AnswerError::NoQuestions => {
            AppError::InternalError(anyhow!(err))
        }
    }
}
