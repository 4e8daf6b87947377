// src/routes.rs

use axum::{
    Router, http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{assistant, course, glossary, quiz, xp},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (courses, quiz, glossary, users/xp, assistant).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let course_routes = Router::new()
        .route("/", get(course::list_courses))
        .route("/{id}", get(course::get_course))
        .route("/{id}/lessons", get(course::list_lessons))
        .route("/{id}/quiz", get(quiz::get_course_quiz));

    let quiz_routes = Router::new().route("/submit", post(quiz::submit_answer));

    let glossary_routes = Router::new()
        .route("/", get(glossary::list_terms))
        .route("/search", get(glossary::search_terms))
        .route("/{id}", get(glossary::get_term));

    let xp_routes = Router::new()
        .route("/xp", get(xp::get_default_user_xp))
        .route("/xp/glossary", post(xp::award_glossary_xp))
        .route("/xp/quiz", post(xp::award_quiz_xp))
        .route("/xp/{user_id}", get(xp::get_user_xp));

    Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/glossary", glossary_routes)
        .nest("/api/users", xp_routes)
        .route("/api/assistant", post(assistant::ask))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
