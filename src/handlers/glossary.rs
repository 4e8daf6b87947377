// src/handlers/glossary.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{error::AppError, models::glossary::GlossaryTerm};

const TERM_COLUMNS: &str = "id, term, definition, category, plain_english, case_study, \
                            key_benefit, related_terms, tags";

/// Query parameters for glossary search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// Lists all glossary terms alphabetically.
pub async fn list_terms(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let terms = sqlx::query_as::<_, GlossaryTerm>(&format!(
        "SELECT {TERM_COLUMNS} FROM glossary_terms ORDER BY term"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(terms))
}

/// Substring search over term names and definitions. An empty result is a
/// valid answer, not an error.
pub async fn search_terms(
    State(pool): State<SqlitePool>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let pattern = format!("%{}%", params.q);

    let terms = sqlx::query_as::<_, GlossaryTerm>(&format!(
        "SELECT {TERM_COLUMNS} FROM glossary_terms \
         WHERE term LIKE ?1 OR definition LIKE ?1 \
         ORDER BY term"
    ))
    .bind(&pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(terms))
}

/// Retrieves a single glossary term by id.
pub async fn get_term(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let term = sqlx::query_as::<_, GlossaryTerm>(&format!(
        "SELECT {TERM_COLUMNS} FROM glossary_terms WHERE id = ?1"
    ))
    .bind(&id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Glossary term not found".to_string()))?;

    Ok(Json(term))
}
