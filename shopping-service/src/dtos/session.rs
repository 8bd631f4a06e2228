use crate::models::{Session, Stage, VideoRecommendation};
use crate::services::flow::{Completion, DEFAULT_SESSION_ID};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartRequest {
    #[serde(default)]
    #[validate(length(max = 1000, message = "Query is too long"))]
    pub query: String,
    #[serde(default = "default_session_id")]
    #[validate(length(max = 128, message = "Session id is too long"))]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    pub user_query: String,
    pub follow_up_questions: Vec<String>,
    pub message: String,
    /// Questions came from the generic fallback set.
    pub degraded: bool,
}

impl StartResponse {
    pub fn new(session: Session, degraded: bool) -> Self {
        Self {
            follow_up_questions: session.follow_up_questions().to_vec(),
            session_id: session.session_id,
            user_query: session.user_query,
            message: "Session started successfully".to_string(),
            degraded,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[serde(default = "default_session_id")]
    #[validate(length(max = 128, message = "Session id is too long"))]
    pub session_id: String,
    /// Zero-based; must equal the number of answers already recorded.
    pub question_index: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Answer is too long"))]
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub session_id: String,
    pub step: Stage,
    pub next_question_index: usize,
    pub next_question: String,
    pub questions_answered: usize,
    pub total_questions: usize,
    pub message: String,
}

impl ProgressResponse {
    pub fn new(session: &Session, next_question_index: usize, next_question: String) -> Self {
        let total_questions = session.total_questions();
        Self {
            session_id: session.session_id.clone(),
            step: session.stage(),
            next_question_index,
            next_question,
            questions_answered: session.questions_answered(),
            total_questions,
            message: format!("Question {} of {}", next_question_index + 1, total_questions),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub session_id: String,
    pub step: Stage,
    pub summary: String,
    /// Plain-text report of `videos`.
    pub recommendations: String,
    pub search_query: String,
    pub videos: Vec<VideoRecommendation>,
    pub message: String,
    /// Some content came from fallbacks.
    pub degraded: bool,
}

impl From<Completion> for CompletionResponse {
    fn from(completion: Completion) -> Self {
        let Completion {
            session,
            recommendations,
            degraded,
        } = completion;

        Self {
            session_id: session.session_id.clone(),
            step: session.stage(),
            summary: session.summary,
            recommendations: recommendations.report,
            search_query: recommendations.search_query,
            videos: recommendations.videos,
            message: "All questions answered. Here are your results!".to_string(),
            degraded,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerResponse {
    Complete(Box<CompletionResponse>),
    Progress(ProgressResponse),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub step: Stage,
    pub user_query: String,
    pub questions_answered: usize,
    pub total_questions: usize,
    pub summary: String,
    pub follow_up_questions: Vec<String>,
}

impl From<Session> for SessionStatusResponse {
    fn from(session: Session) -> Self {
        Self {
            step: session.stage(),
            questions_answered: session.questions_answered(),
            total_questions: session.total_questions(),
            follow_up_questions: session.follow_up_questions().to_vec(),
            session_id: session.session_id,
            user_query: session.user_query,
            summary: session.summary,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptionsResponse {
    pub video_id: String,
    pub captions: String,
}
