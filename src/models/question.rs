// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'quiz_questions' table in the database.
///
/// `correct_answer` is the authoritative text of the correct option, not an
/// index: stored indices would go stale the moment options are shuffled for
/// presentation. It is expected to match exactly one entry of `options`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub course_id: String,
    pub module_id: i64,

    /// Question type, currently always 'multiple_choice'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub question_type: String,

    pub question: String,

    /// List of answer options, stored as a JSON array in the database.
    /// Authoring order; not meaningful at query time.
    pub options: Json<Vec<String>>,

    pub correct_answer: String,
    pub explanation: String,
    pub points: i64,
}

/// A per-request, randomly ordered rendering of a stored question.
///
/// Ephemeral: recomputed on every request and never persisted. The invariant
/// `options[correct_answer_index] == correct_answer` holds for every value
/// this crate produces.
#[derive(Debug, Serialize)]
pub struct PresentedQuestion {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub correct_answer_index: usize,
    pub explanation: String,
    pub points: i64,
    pub course_id: String,
    pub module_id: i64,
}

/// DTO for submitting an answer to a single question.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub course_id: Option<String>,
    #[validate(length(min = 1))]
    pub question_id: String,
    #[validate(length(min = 1))]
    pub answer: String,
}

/// Grading result. `explanation` is returned whether or not the answer
/// was correct.
#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub correct: bool,
    pub points: i64,
    pub explanation: String,
}
