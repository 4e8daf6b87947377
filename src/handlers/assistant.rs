// src/handlers/assistant.rs
//
// The "Quinn" assistant: a deterministic keyword-to-template responder.
// It routes a message to one of five modules (strategy, glossary, course,
// progress, general), looks content up in the database, and formats a
// markdown reply. There is no model inference anywhere in here.

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::xp,
    models::{
        assistant::{AssistantRequest, AssistantResponse, CourseLink, SuggestedAction},
        course::Course,
        glossary::GlossaryTerm,
    },
};

const STRATEGY_KEYWORDS: &[&str] = &[
    "tax strategy",
    "reduce taxes",
    "save money",
    "business structure",
    "reps",
    "depreciation",
    "real estate",
    "c-corp",
    "s-corp",
    "mso",
    "qsbs",
    "capital gains",
    "deductions",
    "entity planning",
];

const GLOSSARY_KEYWORDS: &[&str] = &[
    "what is",
    "define",
    "explain",
    "meaning",
    "definition",
    "how does",
    "what does",
    "tell me about",
];

const COURSE_KEYWORDS: &[&str] = &[
    "course",
    "module",
    "lesson",
    "learn",
    "study",
    "next step",
    "where do i start",
    "what should i read",
    "recommend",
];

/// Handles an assistant message: detect the module, answer from it.
pub async fn ask(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(req): Json<AssistantRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user_id = req.user_id.clone().unwrap_or(config.default_user_id);
    let module = req.module_type.clone().unwrap_or_else(|| {
        detect_module_type(&req.message, req.current_page.as_deref()).to_string()
    });

    let response = match module.as_str() {
        "glossary" => answer_glossary(&pool, &req.message).await?,
        "course" => answer_course(&pool, &req.message).await?,
        "strategy" => answer_strategy(&req.message),
        "progress" => answer_progress(&pool, &user_id).await?,
        _ => answer_general(&req.message),
    };

    Ok(Json(response))
}

/// Picks the module that should answer a message. Page context wins over
/// message keywords; glossary phrasing wins over course and strategy terms.
pub fn detect_module_type(message: &str, current_page: Option<&str>) -> &'static str {
    if let Some(page) = current_page {
        if page.contains("glossary") {
            return "glossary";
        }
        if page.contains("course") || page.contains("module") {
            return "course";
        }
    }

    let message = message.to_lowercase();
    if GLOSSARY_KEYWORDS.iter().any(|k| message.contains(k)) {
        "glossary"
    } else if COURSE_KEYWORDS.iter().any(|k| message.contains(k)) {
        "course"
    } else if STRATEGY_KEYWORDS.iter().any(|k| message.contains(k)) {
        "strategy"
    } else {
        "general"
    }
}

/// Strips question filler ("what is", "explain", ...) from a message to get
/// the term the user is asking about.
pub fn extract_term(message: &str) -> String {
    const QUESTION_WORDS: &[&str] = &[
        "what", "is", "define", "explain", "tell", "me", "about", "the", "a", "an", "does",
        "mean", "how",
    ];

    let cleaned: Vec<&str> = message
        .split_whitespace()
        .map(|w| w.trim_matches(|c| c == '?' || c == '.' || c == ',' || c == '!'))
        .filter(|w| !w.is_empty() && !QUESTION_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();

    let term = cleaned.join(" ");
    if term.len() > 1 { term } else { String::new() }
}

async fn answer_glossary(pool: &SqlitePool, message: &str) -> Result<AssistantResponse, AppError> {
    let search_term = extract_term(&message.to_lowercase());

    if search_term.is_empty() {
        return Ok(AssistantResponse {
            response: "I can help explain any tax or business term! Try asking something like \
                       'What is REPS?' or 'Explain QSBS' and I'll provide the definition, plain \
                       English explanation, and real-world examples."
                .to_string(),
            module_used: "glossary".to_string(),
            related_terms: Vec::new(),
            suggested_actions: vec![SuggestedAction::new(
                "browse_glossary",
                "Browse all terms",
                "glossary",
            )],
            course_links: Vec::new(),
        });
    }

    let pattern = format!("%{}%", search_term);
    let matches = sqlx::query_as::<_, GlossaryTerm>(
        "SELECT id, term, definition, category, plain_english, case_study, key_benefit, \
                related_terms, tags \
         FROM glossary_terms \
         WHERE term LIKE ?1 OR definition LIKE ?1 OR tags LIKE ?1 \
         ORDER BY term LIMIT 5",
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    let Some(best) = matches.first() else {
        return Ok(AssistantResponse {
            response: format!(
                "I couldn't find a specific definition for '{}'. Try asking about terms like \
                 REPS, QSBS, QOF, C-Corp, or MSO for comprehensive explanations.",
                search_term
            ),
            module_used: "glossary".to_string(),
            related_terms: Vec::new(),
            suggested_actions: vec![SuggestedAction::new(
                "browse_glossary",
                "Browse all glossary terms",
                "glossary",
            )],
            course_links: Vec::new(),
        });
    };

    let mut text = format!("**{}**\n\n**Definition:** {}\n\n", best.term, best.definition);
    if !best.plain_english.is_empty() {
        text.push_str(&format!("**In Plain English:** {}\n\n", best.plain_english));
    }
    if !best.case_study.is_empty() {
        text.push_str(&format!("**Real-World Example:** {}\n\n", best.case_study));
    }
    if !best.key_benefit.is_empty() {
        text.push_str(&format!("**Key Benefit:** {}\n\n", best.key_benefit));
    }
    let related: Vec<String> = best.related_terms.0.clone();
    if !related.is_empty() {
        let preview: Vec<&str> = related.iter().take(3).map(String::as_str).collect();
        text.push_str(&format!("**Related Terms:** {}", preview.join(", ")));
    }

    let course_links = find_courses_mentioning(pool, &best.term).await?;

    Ok(AssistantResponse {
        response: text,
        module_used: "glossary".to_string(),
        related_terms: related.into_iter().take(5).collect(),
        suggested_actions: vec![
            SuggestedAction::new(
                "learn_more",
                format!("Learn more about {}", best.term),
                format!("glossary/{}", best.id),
            ),
            SuggestedAction::new(
                "award_xp",
                "View term for XP",
                format!("xp/glossary/{}", best.id),
            ),
        ],
        course_links,
    })
}

/// Finds courses whose description or lesson content mentions a term.
async fn find_courses_mentioning(
    pool: &SqlitePool,
    term: &str,
) -> Result<Vec<CourseLink>, AppError> {
    let pattern = format!("%{}%", term);
    let courses = sqlx::query_as::<_, Course>(
        "SELECT DISTINCT c.id, c.type, c.title, c.description, c.total_lessons, \
                c.estimated_hours, c.is_free \
         FROM courses c \
         LEFT JOIN lessons l ON l.course_id = c.id \
         WHERE c.description LIKE ?1 OR l.content LIKE ?1 \
         LIMIT 5",
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    Ok(courses.iter().map(CourseLink::for_course).collect())
}

async fn answer_course(pool: &SqlitePool, message: &str) -> Result<AssistantResponse, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT id, type, title, description, total_lessons, estimated_hours, is_free \
         FROM courses ORDER BY rowid",
    )
    .fetch_all(pool)
    .await?;

    let message = message.to_lowercase();

    let pick = |course_type: &str| courses.iter().find(|c| c.course_type == course_type);

    if message.contains("start") || message.contains("begin") || message.contains("first") {
        if let Some(primer) = pick("primer") {
            let text = format!(
                "**Perfect place to start!**\n\nI recommend beginning with **{}** - it covers \
                 the essential fundamentals you need to understand your tax situation.\n\nThis \
                 course has {} lessons and takes about {} hours to complete. After the Primer, \
                 we can discuss whether the W-2 or Business Owner track fits your situation.",
                primer.title, primer.total_lessons, primer.estimated_hours
            );
            return Ok(AssistantResponse {
                response: text,
                module_used: "course".to_string(),
                related_terms: Vec::new(),
                suggested_actions: vec![SuggestedAction::new(
                    "start_course",
                    "Start the Primer",
                    format!("course/{}", primer.id),
                )],
                course_links: vec![CourseLink::for_course(primer)],
            });
        }
    }

    if message.contains("w-2") || message.contains("employee") || message.contains("salary") {
        if let Some(w2) = pick("w2") {
            let text = format!(
                "**{}**\n\nPerfect for high-income employees who want to minimize taxes while \
                 keeping their job. Its {} modules cover REPS, strategic depreciation, entity \
                 planning for W-2 earners, and capital gains repositioning.\n\nComplete the \
                 Primer first if you haven't already!",
                w2.title, w2.total_lessons
            );
            return Ok(AssistantResponse {
                response: text,
                module_used: "course".to_string(),
                related_terms: vec![
                    "REPS".to_string(),
                    "Depreciation Offset".to_string(),
                    "QOF".to_string(),
                    "W-2 Income".to_string(),
                ],
                suggested_actions: vec![SuggestedAction::new(
                    "start_course",
                    format!("Take {}", w2.title),
                    format!("course/{}", w2.id),
                )],
                course_links: vec![CourseLink::for_course(w2)],
            });
        }
    }

    if message.contains("business")
        || message.contains("owner")
        || message.contains("entrepreneur")
    {
        if let Some(business) = pick("business") {
            let text = format!(
                "**{}**\n\nDesigned for business owners who want to optimize their entity \
                 structure and build wealth: C-Corp vs S-Corp optimization, MSO strategies, \
                 QSBS qualification for tax-free exits, and advanced deduction stacking.",
                business.title
            );
            return Ok(AssistantResponse {
                response: text,
                module_used: "course".to_string(),
                related_terms: vec![
                    "C-Corp".to_string(),
                    "MSO".to_string(),
                    "QSBS".to_string(),
                    "Entity Planning".to_string(),
                ],
                suggested_actions: vec![SuggestedAction::new(
                    "start_course",
                    format!("Take {}", business.title),
                    format!("course/{}", business.id),
                )],
                course_links: vec![CourseLink::for_course(business)],
            });
        }
    }

    let mut text = String::from(
        "**Course Recommendations**\n\nI can help you find the perfect course! Here are your \
         options:\n\n",
    );
    for course in &courses {
        text.push_str(&format!(
            "**{}**\n{}\n- {} lessons - {} hours\n\n",
            course.title, course.description, course.total_lessons, course.estimated_hours
        ));
    }
    text.push_str(
        "Ask me 'Where should I start?' or tell me about your situation (W-2 employee vs \
         business owner) for personalized recommendations!",
    );

    Ok(AssistantResponse {
        response: text,
        module_used: "course".to_string(),
        related_terms: Vec::new(),
        suggested_actions: vec![SuggestedAction::new(
            "recommendation",
            "Where should I start?",
            "recommend_course",
        )],
        course_links: courses.iter().map(CourseLink::for_course).collect(),
    })
}

fn answer_strategy(message: &str) -> AssistantResponse {
    let message = message.to_lowercase();

    let (text, terms, actions, links) = if message.contains("w-2") || message.contains("salary") {
        (
            "**W-2 Tax Reduction Strategies**\n\nAs a W-2 employee, your most powerful options \
             are:\n\n- **Real Estate Professional Status (REPS):** use rental depreciation \
             against W-2 income\n- **Capital Gains Repositioning:** defer RSU and stock gains \
             through QOF investments\n- **Entity Planning:** side entities for consulting or \
             business activities\n- **Strategic Deductions:** retirement and HSA \
             maximization\n\nWhich area interests you most?",
            vec!["REPS", "QOF", "W-2 Income", "Capital Gains"],
            vec![
                SuggestedAction::new("learn_reps", "Learn about REPS", "glossary/reps"),
                SuggestedAction::new("w2_course", "Take the W-2 course", "course/w2-escape-plan"),
            ],
            vec![CourseLink {
                title: "W-2 Escape Plan".to_string(),
                id: "w2-escape-plan".to_string(),
                kind: "course".to_string(),
            }],
        )
    } else if message.contains("business") || message.contains("owner") {
        (
            "**Business Owner Tax Strategies**\n\nBusiness owners hold the strongest levers:\n\n\
             - **Entity Optimization:** C-Corp vs S-Corp election and MSO structures\n\
             - **QSBS Planning:** up to $10M in tax-free exit gains\n\
             - **Strategic Deductions:** bonus depreciation and cost segregation\n\
             - **Exit Planning:** installment sales and succession structures\n\n\
             What's your current business structure and primary goal?",
            vec!["C-Corp", "QSBS", "MSO", "Entity Planning"],
            vec![SuggestedAction::new(
                "business_course",
                "Take the Business course",
                "course/business-owner-escape-plan",
            )],
            vec![CourseLink {
                title: "Business Owner Escape Plan".to_string(),
                id: "business-owner-escape-plan".to_string(),
                kind: "course".to_string(),
            }],
        )
    } else if message.contains("real estate") || message.contains("reps") {
        (
            "**Real Estate Tax Strategies**\n\nReal estate offers some of the most powerful \
             benefits in the code:\n\n- **REPS Qualification:** the 750-hour test unlocks \
             unlimited depreciation offsets\n- **Cost Segregation:** accelerate depreciation \
             into the early years\n- **1031 Exchanges:** defer gains by swapping like-kind \
             properties\n- **Short-Term Rentals:** business treatment without full REPS\n\n\
             Are you currently an investor or considering getting started?",
            vec!["REPS", "Cost Segregation", "1031 Exchange", "STR"],
            vec![SuggestedAction::new(
                "learn_reps",
                "Learn REPS qualification",
                "glossary/reps",
            )],
            Vec::new(),
        )
    } else if message.contains("entity") || message.contains("structure") {
        (
            "**Entity Structure Planning**\n\nChoosing the right structure is the highest-\
             leverage tax decision a business makes:\n\n- **C-Corporation:** 21% rate and QSBS \
             qualification\n- **S-Corporation:** payroll tax savings on distributions\n\
             - **MSO Structures:** income shifting between entities\n- **Multi-Entity \
             Strategies:** coordinated structures for maximum effect\n\nWhat's your current \
             annual income and business type?",
            vec!["C-Corp", "S-Corp", "MSO", "Entity Planning"],
            vec![SuggestedAction::new(
                "entity_course",
                "Learn entity planning",
                "course/business-owner-escape-plan",
            )],
            Vec::new(),
        )
    } else {
        (
            "**Tax Strategy Overview**\n\nEffective tax planning uses six core levers: entity \
             type, income type, timing, asset location, deduction strategy, and exit \
             planning.\n\nTo give you specific recommendations, tell me:\n- Are you primarily \
             a W-2 employee or a business owner?\n- Do you have real estate investments?\n\
             - What are your main planning goals?",
            vec!["Tax Planning", "Entity Planning", "Strategic Deductions"],
            vec![SuggestedAction::new("courses", "Browse courses", "courses")],
            vec![CourseLink {
                title: "The Escape Blueprint".to_string(),
                id: "primer".to_string(),
                kind: "course".to_string(),
            }],
        )
    };

    AssistantResponse {
        response: text.to_string(),
        module_used: "strategy".to_string(),
        related_terms: terms.into_iter().map(str::to_string).collect(),
        suggested_actions: actions,
        course_links: links,
    }
}

async fn answer_progress(pool: &SqlitePool, user_id: &str) -> Result<AssistantResponse, AppError> {
    let xp = xp::load_or_create(pool, user_id).await?;

    let mut text = format!(
        "**Your Progress Summary**\n\n**XP Earned:** {} total points\n- Course/Quiz XP: {}\n\
         - Glossary XP: {}\n- Unique terms viewed: {}\n\n",
        xp.record.total_xp,
        xp.record.quiz_xp,
        xp.record.glossary_xp,
        xp.viewed_glossary_terms.len()
    );

    if xp.record.total_xp == 0 {
        text.push_str(
            "**Ready to start your journey?** I recommend beginning with 'The Escape Blueprint' \
             primer course to build your foundation!",
        );
    } else {
        text.push_str(
            "**Keep going!** You're making progress. Complete your current courses to unlock \
             advanced strategies.",
        );
    }

    Ok(AssistantResponse {
        response: text,
        module_used: "progress".to_string(),
        related_terms: Vec::new(),
        suggested_actions: vec![
            SuggestedAction::new("continue_course", "Continue learning", "courses"),
            SuggestedAction::new("glossary", "Learn terms", "glossary"),
        ],
        course_links: Vec::new(),
    })
}

fn answer_general(message: &str) -> AssistantResponse {
    let message = message.to_lowercase();

    if ["hello", "hi", "hey", "start"]
        .iter()
        .any(|g| message.contains(g))
    {
        let mut response = AssistantResponse::plain(
            "general",
            "**Hi there! I'm Quinn, your IRS Escape Plan assistant!**\n\nHere's what I can do:\n\n\
             - **Strategy Advice:** recommendations based on your income and goals\n\
             - **Glossary Help:** explain any tax term with real-world examples\n\
             - **Course Guidance:** find the right modules for your situation\n\
             - **Progress Tracking:** monitor your learning and XP\n\n\
             Try asking 'What is REPS?' or 'Where should I start?'",
        );
        response.suggested_actions = vec![
            SuggestedAction::new("strategy", "Get strategy advice", "strategy_help"),
            SuggestedAction::new("courses", "Find courses", "course_recommendations"),
            SuggestedAction::new("glossary", "Learn terms", "glossary"),
        ];
        return response;
    }

    if message.contains("help") || message.contains("what can you do") {
        return AssistantResponse::plain(
            "general",
            "**I'm Quinn - here's how I can help:**\n\n**Strategy Assistant:** ask about tax \
             strategies for your income type.\n**Glossary Explainer:** clear definitions with \
             plain English and real-world examples.\n**Course Navigator:** find the right \
             courses and track your path.\n**Progress Support:** track your XP and next \
             steps.\n\nJust ask me anything!",
        );
    }

    let mut response = AssistantResponse::plain(
        "general",
        "I'm not sure how to help with that specific question, but I can assist with tax \
         strategies, glossary terms, course recommendations, and progress tracking.\n\nTry \
         asking something like 'What is REPS?' or 'Where should I start learning?'",
    );
    response.suggested_actions = vec![
        SuggestedAction::new("help", "See what I can do", "help"),
        SuggestedAction::new("start", "Get started", "getting_started"),
    ];
    response
}
