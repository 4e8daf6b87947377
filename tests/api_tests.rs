// tests/api_tests.rs

use escape_plan_backend::{config::Config, routes, state::AppState};
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// Each test gets its own in-memory database with migrations and seed data
/// applied, so tests are independent and need no external services.
async fn spawn_app() -> String {
    // 1. Create a pool. A single connection keeps the in-memory database
    //    alive and shared across all requests.
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory sqlite");

    // 2. Run migrations (schema + seed content)
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        default_user_id: "default_user".to_string(),
    };

    let state = AppState { pool, config };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn course_catalog_is_seeded() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let courses: Vec<serde_json::Value> = client
        .get(format!("{}/api/courses", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse courses");

    assert_eq!(courses.len(), 3);
    let types: Vec<&str> = courses.iter().map(|c| c["type"].as_str().unwrap()).collect();
    for expected in ["primer", "w2", "business"] {
        assert!(types.contains(&expected), "missing course type {expected}");
    }
}

#[tokio::test]
async fn course_lessons_are_ordered_and_unknown_course_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let lessons: Vec<serde_json::Value> = client
        .get(format!("{}/api/courses/primer/lessons", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!lessons.is_empty());
    let indices: Vec<i64> = lessons
        .iter()
        .map(|l| l["order_index"].as_i64().unwrap())
        .collect();
    let mut sorted = indices.clone();
    sorted.sort();
    assert_eq!(indices, sorted);

    let missing = client
        .get(format!("{}/api/courses/no-such-course/lessons", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn quiz_presentation_keeps_correct_index_consistent() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Repeated fetches: the invariant must hold in every presentation.
    for _ in 0..10 {
        let questions: Vec<serde_json::Value> = client
            .get(format!("{}/api/courses/w2-escape-plan/quiz", address))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert!(!questions.is_empty());
        for q in &questions {
            let options: Vec<&str> = q["options"]
                .as_array()
                .unwrap()
                .iter()
                .map(|o| o.as_str().unwrap())
                .collect();
            let idx = q["correct_answer_index"].as_u64().unwrap() as usize;
            assert_eq!(options[idx], q["correct_answer"].as_str().unwrap());
        }
    }
}

#[tokio::test]
async fn quiz_shuffle_preserves_option_set() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let questions: Vec<serde_json::Value> = client
        .get(format!("{}/api/courses/w2-escape-plan/quiz?module_id=2", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(questions.len(), 1);
    let q = &questions[0];
    assert_eq!(q["id"], "w2-m2-q1");
    assert_eq!(q["module_id"], 2);

    let mut options: Vec<&str> = q["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_str().unwrap())
        .collect();
    options.sort();
    assert_eq!(options, vec!["180 days", "365 days", "45 days", "90 days"]);
}

#[tokio::test]
async fn quiz_for_unknown_course_is_an_empty_list() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/courses/no-such-course/quiz", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let questions: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(questions.is_empty());
}

#[tokio::test]
async fn grading_is_case_insensitive() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let result: serde_json::Value = client
        .post(format!("{}/api/quiz/submit", address))
        .json(&serde_json::json!({
            "course_id": "w2-escape-plan",
            "question_id": "w2-m2-q1",
            "answer": "180 DAYS"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["correct"], true);
    assert_eq!(result["points"], 25);
    assert!(!result["explanation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn grading_returns_explanation_for_wrong_answers() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let result: serde_json::Value = client
        .post(format!("{}/api/quiz/submit", address))
        .json(&serde_json::json!({
            "question_id": "w2-m2-q1",
            "answer": "45 days"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["correct"], false);
    assert_eq!(result["points"], 0);
    assert!(!result["explanation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn grading_unknown_question_returns_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/quiz/submit", address))
        .json(&serde_json::json!({
            "question_id": "no-such-question",
            "answer": "A"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn glossary_list_search_and_fetch() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let terms: Vec<serde_json::Value> = client
        .get(format!("{}/api/glossary", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(terms.len() >= 12, "expected seeded glossary, got {}", terms.len());

    let results: Vec<serde_json::Value> = client
        .get(format!("{}/api/glossary/search?q=REPS", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!results.is_empty());

    let term: serde_json::Value = client
        .get(format!("{}/api/glossary/reps", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(term["term"].as_str().unwrap().contains("REPS"));
    assert!(!term["plain_english"].as_str().unwrap().is_empty());

    let missing = client
        .get(format!("{}/api/glossary/invalid-id", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn assistant_answers_glossary_questions() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let reply: serde_json::Value = client
        .post(format!("{}/api/assistant", address))
        .json(&serde_json::json!({ "message": "What is REPS?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply["module_used"], "glossary");
    assert!(reply["response"].as_str().unwrap().contains("REPS"));
}

#[tokio::test]
async fn assistant_recommends_a_starting_course() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let reply: serde_json::Value = client
        .post(format!("{}/api/assistant", address))
        .json(&serde_json::json!({ "message": "Where do I start learning?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply["module_used"], "course");
    assert!(!reply["course_links"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn assistant_greets_on_general_messages() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let reply: serde_json::Value = client
        .post(format!("{}/api/assistant", address))
        .json(&serde_json::json!({ "message": "hello" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply["module_used"], "general");
    assert!(!reply["suggested_actions"].as_array().unwrap().is_empty());
}
