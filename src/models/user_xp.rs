// src/models/user_xp.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'user_xp' table in the database.
/// Invariant after every mutation: `total_xp == quiz_xp + glossary_xp`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserXpRecord {
    pub user_id: String,
    pub total_xp: i64,
    pub quiz_xp: i64,
    pub glossary_xp: i64,
    pub last_updated: DateTime<Utc>,
}

/// API shape of an XP record: the counters plus the set of glossary terms
/// this user has already been awarded XP for (held in 'user_viewed_terms').
#[derive(Debug, Serialize)]
pub struct UserXpResponse {
    #[serde(flatten)]
    pub record: UserXpRecord,
    pub viewed_glossary_terms: Vec<String>,
}

/// Outcome of an award operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardStatus {
    Success,
    AlreadyViewed,
}

/// DTO for awarding glossary-view XP. `term_id` is required; a missing user
/// id falls back to the configured default user at the endpoint layer.
#[derive(Debug, Deserialize)]
pub struct GlossaryXpRequest {
    pub user_id: Option<String>,
    pub term_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GlossaryXpResponse {
    pub status: AwardStatus,
    pub xp_earned: i64,
    pub total_xp: i64,
    pub first_view: bool,
}

/// DTO for awarding quiz-completion XP. Awards are cumulative; there is
/// deliberately no per-quiz de-duplication.
#[derive(Debug, Deserialize, Validate)]
pub struct QuizXpRequest {
    pub user_id: Option<String>,
    #[serde(default = "default_quiz_points")]
    #[validate(range(min = 0))]
    pub points: i64,
}

fn default_quiz_points() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct QuizXpResponse {
    pub status: AwardStatus,
    pub xp_earned: i64,
    pub total_xp: i64,
}
