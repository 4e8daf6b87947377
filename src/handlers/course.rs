// src/handlers/course.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::course::{Course, Lesson},
};

const COURSE_COLUMNS: &str =
    "id, type, title, description, total_lessons, estimated_hours, is_free";

/// Lists every course in the catalog.
pub async fn list_courses(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let courses = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY rowid"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(courses))
}

/// Retrieves a single course by id.
pub async fn get_course(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let course = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"
    ))
    .bind(&id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

/// Lists a course's lessons in track order. 404 when the course is unknown.
pub async fn list_lessons(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?1")
        .bind(&id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let lessons = sqlx::query_as::<_, Lesson>(
        "SELECT id, course_id, title, description, content, order_index, duration_minutes, \
                xp_available \
         FROM lessons WHERE course_id = ?1 ORDER BY order_index",
    )
    .bind(&id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(lessons))
}
