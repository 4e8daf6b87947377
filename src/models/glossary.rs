// src/models/glossary.rs

use serde::Serialize;
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'glossary_terms' table in the database.
///
/// Beyond the bare definition, every term carries the enhanced teaching
/// fields (`plain_english`, `case_study`, `key_benefit`) surfaced by the
/// assistant and the glossary UI.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GlossaryTerm {
    pub id: String,
    pub term: String,
    pub definition: String,
    pub category: String,
    pub plain_english: String,
    pub case_study: String,
    pub key_benefit: String,

    /// Stored as JSON arrays in the database.
    pub related_terms: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
}
