// src/handlers/xp.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user_xp::{
        AwardStatus, GlossaryXpRequest, GlossaryXpResponse, QuizXpRequest, QuizXpResponse,
        UserXpRecord, UserXpResponse,
    },
};

/// XP granted for the first view of a glossary term.
const GLOSSARY_TERM_XP: i64 = 10;

/// Loads a user's XP record, creating a zeroed one if none exists yet.
///
/// Record creation is a side effect of any read or award, so callers never
/// see an "unknown user" error from the ledger.
pub(crate) async fn load_or_create(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<UserXpResponse, AppError> {
    sqlx::query(
        "INSERT INTO user_xp (user_id, total_xp, quiz_xp, glossary_xp, last_updated) \
         VALUES (?1, 0, 0, 0, ?2) \
         ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let record = sqlx::query_as::<_, UserXpRecord>(
        "SELECT user_id, total_xp, quiz_xp, glossary_xp, last_updated \
         FROM user_xp WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let viewed_glossary_terms: Vec<String> = sqlx::query_scalar(
        "SELECT term_id FROM user_viewed_terms WHERE user_id = ?1 ORDER BY viewed_at, term_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(UserXpResponse {
        record,
        viewed_glossary_terms,
    })
}

/// Returns the XP record for a user, creating it lazily.
pub async fn get_user_xp(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_or_create(&pool, &user_id).await?))
}

/// Convenience alias returning the XP record of the configured default user.
pub async fn get_default_user_xp(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_or_create(&pool, &config.default_user_id).await?))
}

/// Awards glossary-view XP, at most once per (user, term) pair.
///
/// The whole award runs in one transaction. The viewed-set insert hits the
/// composite primary key of 'user_viewed_terms', so of two racing first
/// views exactly one observes "not previously viewed" and increments the
/// counters; the other lands on the conflict and awards nothing. The
/// counters and the set entry commit together or not at all.
pub async fn award_glossary_xp(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(req): Json<GlossaryXpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let term_id = req
        .term_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("term_id is required".to_string()))?
        .to_string();
    let user_id = req.user_id.unwrap_or(config.default_user_id);

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO user_xp (user_id, total_xp, quiz_xp, glossary_xp, last_updated) \
         VALUES (?1, 0, 0, 0, ?2) \
         ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(&user_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let first_view = sqlx::query(
        "INSERT INTO user_viewed_terms (user_id, term_id, viewed_at) \
         VALUES (?1, ?2, ?3) \
         ON CONFLICT(user_id, term_id) DO NOTHING",
    )
    .bind(&user_id)
    .bind(&term_id)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        == 1;

    if first_view {
        sqlx::query(
            "UPDATE user_xp \
             SET glossary_xp = glossary_xp + ?2, total_xp = total_xp + ?2, last_updated = ?3 \
             WHERE user_id = ?1",
        )
        .bind(&user_id)
        .bind(GLOSSARY_TERM_XP)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    let total_xp: i64 = sqlx::query_scalar("SELECT total_xp FROM user_xp WHERE user_id = ?1")
        .bind(&user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    if first_view {
        tracing::info!(user_id = %user_id, term_id = %term_id, "glossary XP awarded");
    }

    Ok(Json(GlossaryXpResponse {
        status: if first_view {
            AwardStatus::Success
        } else {
            AwardStatus::AlreadyViewed
        },
        xp_earned: if first_view { GLOSSARY_TERM_XP } else { 0 },
        total_xp,
        first_view,
    }))
}

/// Awards quiz-completion XP. Cumulative by design: every call adds
/// `points` (default 10), with no de-duplication across retries.
pub async fn award_quiz_xp(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(req): Json<QuizXpRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let user_id = req.user_id.unwrap_or(config.default_user_id);

    // Single conditional upsert; no uniqueness invariant, so no transaction
    // or viewed-set check is needed here.
    let total_xp: i64 = sqlx::query_scalar(
        "INSERT INTO user_xp (user_id, total_xp, quiz_xp, glossary_xp, last_updated) \
         VALUES (?1, ?2, ?2, 0, ?3) \
         ON CONFLICT(user_id) DO UPDATE SET \
             quiz_xp = quiz_xp + excluded.quiz_xp, \
             total_xp = total_xp + excluded.total_xp, \
             last_updated = excluded.last_updated \
         RETURNING total_xp",
    )
    .bind(&user_id)
    .bind(req.points)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    Ok(Json(QuizXpResponse {
        status: AwardStatus::Success,
        xp_earned: req.points,
        total_xp,
    }))
}
