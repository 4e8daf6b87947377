// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: String,

    /// Course track: 'primer', 'w2' or 'business'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub course_type: String,

    pub title: String,
    pub description: String,
    pub total_lessons: i64,
    pub estimated_hours: i64,
    pub is_free: bool,
}

/// Represents the 'lessons' table in the database.
/// A lesson is one module of a course; `order_index` is its position in the track.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub order_index: i64,
    pub duration_minutes: i64,
    pub xp_available: i64,
}
