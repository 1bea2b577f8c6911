use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db::{Question, TriviaRepo},
    quiz::{pick_next_question, QuizScope},
    server::{
        app::AppState,
        deserializers::Stri64,
        error_handlers::{ApiError, ApiResponse},
    },
    telemetry::QUIZ_QUESTIONS_CNTR,
};

#[derive(Deserialize)]
struct QuizRequest {
    previous_questions: Vec<Stri64>,
    #[serde(default)]
    quiz_category: Option<QuizCategory>,
}

// clients also send the category label as `type`, it is not needed here
#[derive(Deserialize)]
struct QuizCategory {
    #[serde(default)]
    id: Option<Stri64>,
}

#[derive(Serialize)]
struct NextQuestion {
    success: bool,
    question: Option<Question>,
}

async fn play_quiz(
    State(repo): State<Arc<dyn TriviaRepo>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResponse<Json<NextQuestion>> {
    let Json(body) = body?;
    if body.get("previous_questions").is_none() {
        return Err(ApiError::MissingField("previous_questions"));
    }
    let request: QuizRequest = serde_json::from_value(body).map_err(|_| ApiError::Unprocessable)?;

    let scope = QuizScope::from_category_id(
        request
            .quiz_category
            .and_then(|category| category.id)
            .map(|id| id.0),
    );
    let previous: HashSet<i64> = request.previous_questions.iter().map(|id| id.0).collect();

    let in_scope = match scope {
        QuizScope::All => repo.all_questions().await?,
        QuizScope::Category(id) => repo.questions_by_category(id).await?,
    };
    let question = pick_next_question(in_scope, &previous, &mut rand::thread_rng());

    match &question {
        Some(question) => {
            QUIZ_QUESTIONS_CNTR
                .with_label_values(&[scope.label().as_str()])
                .inc();
            tracing::debug!("Quiz in scope {:?} asks question {}", scope, question.id);
        }
        None => tracing::debug!("Quiz in scope {:?} is exhausted", scope),
    }
    Ok(Json(NextQuestion {
        success: true,
        question,
    }))
}

pub fn quiz_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
