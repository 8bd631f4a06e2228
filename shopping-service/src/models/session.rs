//! Session model for the question/answer flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle stage of a session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Initial,
    /// Follow-up questions issued, answers being collected.
    #[serde(rename = "questions")]
    Collecting,
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Collecting => "questions",
            Stage::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected session mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("Session has not started collecting answers (stage: {0})")]
    NotCollecting(Stage),

    #[error("Session is already collecting answers")]
    AlreadyCollecting,

    #[error("Session is already complete")]
    AlreadyComplete,

    #[error("Invalid question index {index}: session has {total} questions")]
    OutOfRange { index: usize, total: usize },

    #[error("Question {index} answered out of order; next expected index is {expected}")]
    OutOfOrder { index: usize, expected: usize },

    #[error("Session cannot complete: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("A session needs at least one follow-up question")]
    NoQuestions,
}

/// One recorded answer, kept in answer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAnswer {
    pub question: String,
    pub answer: String,
}

/// A single user's shopping conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque key chosen by the client.
    pub session_id: String,

    /// The original free-text product query.
    pub user_query: String,

    /// Follow-up questions; fixed once collecting starts.
    follow_up_questions: Vec<String>,

    /// Answers in the order they were submitted.
    answers: Vec<SessionAnswer>,

    /// Requirements summary, empty until complete.
    pub summary: String,

    stage: Stage,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a session in the `initial` stage.
    pub fn new(session_id: String, user_query: String) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            user_query,
            follow_up_questions: Vec::new(),
            answers: Vec::new(),
            summary: String::new(),
            stage: Stage::Initial,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn follow_up_questions(&self) -> &[String] {
        &self.follow_up_questions
    }

    pub fn answers(&self) -> &[SessionAnswer] {
        &self.answers
    }

    pub fn questions_answered(&self) -> usize {
        self.answers.len()
    }

    pub fn total_questions(&self) -> usize {
        self.follow_up_questions.len()
    }

    pub fn is_fully_answered(&self) -> bool {
        !self.follow_up_questions.is_empty()
            && self.answers.len() == self.follow_up_questions.len()
    }

    /// Index and text of the next unanswered question.
    pub fn next_question(&self) -> Option<(usize, &str)> {
        let index = self.answers.len();
        self.follow_up_questions
            .get(index)
            .map(|q| (index, q.as_str()))
    }

    /// Install the follow-up questions and move to `questions`.
    pub fn begin_collecting(&mut self, questions: Vec<String>) -> Result<(), AnswerError> {
        match self.stage {
            Stage::Initial => {}
            Stage::Collecting => return Err(AnswerError::AlreadyCollecting),
            Stage::Complete => return Err(AnswerError::AlreadyComplete),
        }
        if questions.is_empty() {
            return Err(AnswerError::NoQuestions);
        }

        self.follow_up_questions = questions;
        self.stage = Stage::Collecting;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record the answer for the question at `index`.
    ///
    /// Only the next unanswered question is accepted.
    pub fn record_answer(&mut self, index: usize, answer: String) -> Result<(), AnswerError> {
        match self.stage {
            Stage::Collecting => {}
            Stage::Complete => return Err(AnswerError::AlreadyComplete),
            Stage::Initial => return Err(AnswerError::NotCollecting(self.stage)),
        }

        let total = self.follow_up_questions.len();
        if index >= total {
            return Err(AnswerError::OutOfRange { index, total });
        }
        let expected = self.answers.len();
        if index != expected {
            return Err(AnswerError::OutOfOrder { index, expected });
        }

        self.answers.push(SessionAnswer {
            question: self.follow_up_questions[index].clone(),
            answer,
        });
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store the summary and move to `complete`.
    pub fn complete(&mut self, summary: String) -> Result<(), AnswerError> {
        match self.stage {
            Stage::Collecting => {}
            Stage::Complete => return Err(AnswerError::AlreadyComplete),
            Stage::Initial => return Err(AnswerError::NotCollecting(self.stage)),
        }
        if !self.is_fully_answered() {
            return Err(AnswerError::Incomplete {
                answered: self.answers.len(),
                total: self.follow_up_questions.len(),
            });
        }

        self.summary = summary;
        self.stage = Stage::Complete;
        self.updated_at = Utc::now();
        Ok(())
    }
}
