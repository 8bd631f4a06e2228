//! Extraction of follow-up questions from free-form model output.
//!
//! Strategies run in a fixed order. A strategy that does not recognise the
//! reply passes it on; the first one that does recognise it decides the
//! result, so a malformed JSON array is never re-read as plain lines. The
//! resulting list is then normalised to exactly [`QUESTION_COUNT`] entries.

use crate::services::prompts::{FALLBACK_QUESTIONS, QUESTION_COUNT};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static EMBEDDED_ARRAY: OnceLock<Regex> = OnceLock::new();
static ENUMERATION_PREFIX: OnceLock<Regex> = OnceLock::new();

fn embedded_array() -> &'static Regex {
    // Greedy and dot-matches-newline: first `[` to last `]`.
    EMBEDDED_ARRAY.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"))
}

fn enumeration_prefix() -> &'static Regex {
    ENUMERATION_PREFIX.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("valid regex"))
}

/// One way of reading questions out of the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStrategy {
    /// The whole trimmed reply is a JSON array.
    WholeJson,
    /// The first `[...]` span inside the reply is a JSON array.
    EmbeddedJson,
    /// One question per line, skipping headings, bullets and numbering.
    Lines,
}

impl QuestionStrategy {
    /// Strategies in the order they are attempted.
    pub const CHAIN: [QuestionStrategy; 3] = [
        QuestionStrategy::WholeJson,
        QuestionStrategy::EmbeddedJson,
        QuestionStrategy::Lines,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QuestionStrategy::WholeJson => "whole_json",
            QuestionStrategy::EmbeddedJson => "embedded_json",
            QuestionStrategy::Lines => "lines",
        }
    }

    /// Run this strategy, returning a non-empty list or why it failed.
    pub fn apply(&self, text: &str) -> Result<Vec<String>, StrategyFailure> {
        let text = text.trim();
        let questions = match self {
            QuestionStrategy::WholeJson => {
                if !(text.starts_with('[') && text.ends_with(']')) {
                    return Err(StrategyFailure::NotApplicable(
                        "reply is not bracket-delimited".to_string(),
                    ));
                }
                json_strings(text).map_err(StrategyFailure::Rejected)?
            }
            QuestionStrategy::EmbeddedJson => {
                let found = embedded_array().find(text).ok_or_else(|| {
                    StrategyFailure::NotApplicable("no bracketed span found".to_string())
                })?;
                json_strings(found.as_str()).map_err(StrategyFailure::Rejected)?
            }
            QuestionStrategy::Lines => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
                .map(|line| enumeration_prefix().replace(line, "").trim().to_string())
                .filter(|line| !line.is_empty())
                .collect(),
        };

        if questions.is_empty() {
            Err(StrategyFailure::Rejected("no questions found".to_string()))
        } else {
            Ok(questions)
        }
    }
}

/// Why a strategy produced no questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyFailure {
    /// The reply is not in this strategy's shape; the next one may try.
    NotApplicable(String),
    /// The reply is in this strategy's shape but unusable; the chain stops.
    Rejected(String),
}

impl StrategyFailure {
    pub fn reason(&self) -> &str {
        match self {
            StrategyFailure::NotApplicable(reason) | StrategyFailure::Rejected(reason) => reason,
        }
    }
}

/// String elements of a JSON array, trimmed, empties dropped.
fn json_strings(text: &str) -> Result<Vec<String>, String> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(text).map_err(|e| format!("invalid JSON array: {}", e))?;

    Ok(values
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// No strategy produced questions.
#[derive(Debug)]
pub struct ParseError {
    /// Strategies tried, in order; the last one ended the chain.
    pub attempts: Vec<(QuestionStrategy, StrategyFailure)>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons = self
            .attempts
            .iter()
            .map(|(strategy, failure)| format!("{}: {}", strategy.name(), failure.reason()))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "could not parse questions from reply ({})", reasons)
    }
}

impl std::error::Error for ParseError {}

/// Questions read from a reply and the strategy that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestions {
    pub questions: Vec<String>,
    pub strategy: QuestionStrategy,
}

/// Apply [`QuestionStrategy::CHAIN`] until a strategy recognises the reply.
pub fn parse_questions(raw: &str) -> Result<ParsedQuestions, ParseError> {
    let mut attempts = Vec::new();

    for strategy in QuestionStrategy::CHAIN {
        match strategy.apply(raw) {
            Ok(questions) => return Ok(ParsedQuestions { questions, strategy }),
            Err(failure @ StrategyFailure::Rejected(_)) => {
                attempts.push((strategy, failure));
                break;
            }
            Err(failure) => attempts.push((strategy, failure)),
        }
    }

    Err(ParseError { attempts })
}

/// How a question list was brought to the required length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountAdjustment {
    Exact,
    Truncated { from: usize },
    Padded { from: usize },
}

impl fmt::Display for CountAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountAdjustment::Exact => write!(f, "exact"),
            CountAdjustment::Truncated { from } => {
                write!(f, "truncated from {} to {}", from, QUESTION_COUNT)
            }
            CountAdjustment::Padded { from } => {
                write!(f, "padded from {} to {} with generic questions", from, QUESTION_COUNT)
            }
        }
    }
}

/// Truncate to [`QUESTION_COUNT`], or pad with fallback questions not
/// already present.
pub fn normalize_count(mut questions: Vec<String>) -> (Vec<String>, CountAdjustment) {
    let original = questions.len();

    if original > QUESTION_COUNT {
        questions.truncate(QUESTION_COUNT);
        return (questions, CountAdjustment::Truncated { from: original });
    }
    if original == QUESTION_COUNT {
        return (questions, CountAdjustment::Exact);
    }

    for fallback in FALLBACK_QUESTIONS {
        if questions.len() == QUESTION_COUNT {
            break;
        }
        if !questions.iter().any(|q| q.eq_ignore_ascii_case(fallback)) {
            questions.push(fallback.to_string());
        }
    }

    (questions, CountAdjustment::Padded { from: original })
}
