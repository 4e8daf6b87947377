// src/models/assistant.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::course::Course;

/// DTO for a message sent to the assistant.
#[derive(Debug, Deserialize, Validate)]
pub struct AssistantRequest {
    pub user_id: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    /// Explicit module override: 'strategy', 'glossary', 'course' or 'progress'.
    /// Detected from the message when absent.
    pub module_type: Option<String>,
    /// Page the user was on when asking, used as a detection hint.
    pub current_page: Option<String>,
}

/// A clickable follow-up the frontend can render under a reply.
#[derive(Debug, Serialize)]
pub struct SuggestedAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub action: String,
}

impl SuggestedAction {
    pub fn new(kind: &str, text: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseLink {
    pub title: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CourseLink {
    pub fn for_course(course: &Course) -> Self {
        Self {
            title: course.title.clone(),
            id: course.id.clone(),
            kind: "course".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub response: String,
    pub module_used: String,
    pub related_terms: Vec<String>,
    pub suggested_actions: Vec<SuggestedAction>,
    pub course_links: Vec<CourseLink>,
}

impl AssistantResponse {
    /// Text-only reply with no follow-ups.
    pub fn plain(module_used: &str, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            module_used: module_used.to_string(),
            related_terms: Vec::new(),
            suggested_actions: Vec::new(),
            course_links: Vec::new(),
        }
    }
}
