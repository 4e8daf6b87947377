// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        PresentedQuestion, QuizQuestion, SubmitAnswerRequest, SubmitAnswerResponse,
    },
};

const QUESTION_COLUMNS: &str =
    "id, course_id, module_id, type, question, options, correct_answer, explanation, points";

/// Query parameters for fetching a course quiz.
#[derive(Debug, Deserialize)]
pub struct QuizParams {
    pub module_id: Option<i64>,
}

/// Returns the quiz for a course, optionally filtered to one module.
///
/// Every question's options are shuffled independently per request, with
/// `correct_answer` and `correct_answer_index` rewritten to stay consistent
/// with the shuffled order. A course or module with no questions yields an
/// empty list, not an error.
pub async fn get_course_quiz(
    State(pool): State<SqlitePool>,
    Path(course_id): Path<String>,
    Query(params): Query<QuizParams>,
) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions \
         WHERE course_id = ?1 AND (?2 IS NULL OR module_id = ?2)"
    ))
    .bind(&course_id)
    .bind(params.module_id)
    .fetch_all(&pool)
    .await?;

    let mut rng = rand::thread_rng();
    let presented: Vec<PresentedQuestion> = questions
        .iter()
        .map(|q| randomize_question(q, &mut rng))
        .collect();

    Ok(Json(presented))
}

/// Grades a submitted answer against the canonical stored question.
///
/// Grading compares the submitted text to the stored `correct_answer`
/// case-insensitively. It never looks at a randomized presentation, which is
/// what lets the shuffle stay a pure display concern.
pub async fn submit_answer(
    State(pool): State<SqlitePool>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let question = sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE id = ?1"
    ))
    .bind(&req.question_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if let Some(course_id) = &req.course_id {
        tracing::debug!(course_id = %course_id, question_id = %question.id, "grading quiz answer");
    }

    let correct = question.correct_answer.eq_ignore_ascii_case(&req.answer);

    Ok(Json(SubmitAnswerResponse {
        correct,
        points: if correct { question.points } else { 0 },
        explanation: question.explanation,
    }))
}

/// Builds an ephemeral randomized presentation of a stored question.
///
/// Each option is paired with a flag marking whether it is the stored correct
/// answer (exact string match), the pairs are uniformly shuffled, and the
/// index of the flagged pair becomes `correct_answer_index`. The stored
/// question is never mutated.
pub fn randomize_question(question: &QuizQuestion, rng: &mut impl Rng) -> PresentedQuestion {
    let mut paired: Vec<(&String, bool)> = question
        .options
        .iter()
        .map(|opt| (opt, opt == &question.correct_answer))
        .collect();
    paired.shuffle(rng);

    let options: Vec<String> = paired.iter().map(|(opt, _)| (*opt).clone()).collect();

    // Exactly one pair carries the flag when the stored data is consistent.
    // A correct_answer matching no option is an authoring error this engine
    // assumes away rather than validates.
    let correct_answer_index = paired
        .iter()
        .position(|(_, correct)| *correct)
        .unwrap_or(0);
    let correct_answer = options
        .get(correct_answer_index)
        .cloned()
        .unwrap_or_else(|| question.correct_answer.clone());

    PresentedQuestion {
        id: question.id.clone(),
        question: question.question.clone(),
        question_type: question.question_type.clone(),
        options,
        correct_answer,
        correct_answer_index,
        explanation: question.explanation.clone(),
        points: question.points,
        course_id: question.course_id.clone(),
        module_id: question.module_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn sample_question(options: &[&str], correct: &str) -> QuizQuestion {
        QuizQuestion {
            id: "q1".to_string(),
            course_id: "primer".to_string(),
            module_id: 1,
            question_type: "multiple_choice".to_string(),
            question: "Pick the right one".to_string(),
            options: Json(options.iter().map(|s| s.to_string()).collect()),
            correct_answer: correct.to_string(),
            explanation: "Because it is".to_string(),
            points: 50,
        }
    }

    #[test]
    fn shuffled_index_always_points_at_correct_answer() {
        let question = sample_question(&["A", "B", "C"], "B");
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let presented = randomize_question(&question, &mut rng);
            assert_eq!(presented.options[presented.correct_answer_index], "B");
            assert_eq!(presented.correct_answer, "B");
        }
    }

    #[test]
    fn shuffle_preserves_the_option_multiset() {
        let question = sample_question(&["A", "B", "C", "D"], "D");
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let presented = randomize_question(&question, &mut rng);
            let mut got = presented.options.clone();
            got.sort();
            assert_eq!(got, vec!["A", "B", "C", "D"]);
        }
    }

    #[test]
    fn correct_answer_position_varies_across_presentations() {
        let question = sample_question(&["A", "B", "C", "D"], "A");
        let mut rng = rand::thread_rng();

        let seen: std::collections::HashSet<usize> = (0..200)
            .map(|_| randomize_question(&question, &mut rng).correct_answer_index)
            .collect();

        // 200 shuffles of 4 options landing on one index every time would be
        // a broken RNG, not bad luck.
        assert!(seen.len() > 1, "correct answer never moved: {:?}", seen);
    }

    #[test]
    fn empty_option_list_does_not_panic() {
        let question = sample_question(&[], "B");
        let mut rng = rand::thread_rng();

        let presented = randomize_question(&question, &mut rng);
        assert!(presented.options.is_empty());
        assert_eq!(presented.correct_answer, "B");
    }
}
