use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db::{NewQuestion, Question, TriviaRepo},
    server::{
        app::AppState,
        deserializers::{is_falsy, path_id},
        error_handlers::{ApiError, ApiResponse},
    },
    telemetry::QUESTION_CHANGES_CNTR,
};

use super::{format_categories, CategoryMap};

pub const QUESTIONS_PER_PAGE: i64 = 10;

const REQUIRED_FIELDS: [&str; 4] = ["question", "answer", "category", "difficulty"];

#[derive(Deserialize)]
struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    // anything that is not an integer counts as the first page
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse().ok())
            .unwrap_or(1)
    }
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: CategoryMap,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted_question: i64,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created_question: Question,
}

async fn questions_page(
    State(repo): State<Arc<dyn TriviaRepo>>,
    Query(query): Query<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = query.page();
    if page < 1 {
        return Err(ApiError::NotFound);
    }
    let offset = (page - 1)
        .checked_mul(QUESTIONS_PER_PAGE)
        .ok_or(ApiError::NotFound)?;

    let questions = repo.list_questions(QUESTIONS_PER_PAGE, offset).await?;
    if questions.is_empty() && page != 1 {
        tracing::info!("Page {page} is out of range");
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsPage {
        success: true,
        questions,
        total_questions: repo.count_questions().await?,
        categories: format_categories(repo.categories().await?),
    }))
}

async fn delete_question(
    State(repo): State<Arc<dyn TriviaRepo>>,
    Path(id): Path<String>,
) -> ApiResponse<Json<Deleted>> {
    let id = path_id(&id)?;
    let question = repo
        .find_question(id)
        .await?
        .ok_or(ApiError::Unprocessable)?;
    repo.delete_question(question.id).await?;

    tracing::info!("Deleted question {id}");
    QUESTION_CHANGES_CNTR.with_label_values(&["deleted"]).inc();
    Ok(Json(Deleted {
        success: true,
        deleted_question: question.id,
    }))
}

async fn create_question(
    State(repo): State<Arc<dyn TriviaRepo>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResponse<Json<Created>> {
    let Json(body) = body?;
    // only the presence of the keys is checked, empty texts are fine
    if let Some(missing) = REQUIRED_FIELDS
        .into_iter()
        .find(|field| body.get(field).is_none())
    {
        return Err(ApiError::MissingField(missing));
    }
    let new_question: NewQuestion =
        serde_json::from_value(body).map_err(|_| ApiError::Unprocessable)?;

    let created = repo.insert_question(&new_question).await?;
    tracing::info!("Created question {}", created.id);
    QUESTION_CHANGES_CNTR.with_label_values(&["created"]).inc();
    Ok(Json(Created {
        success: true,
        created_question: created,
    }))
}

async fn search_questions(
    State(repo): State<Arc<dyn TriviaRepo>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResponse<Json<SearchResults>> {
    let Json(body) = body?;
    let term = match body.get("searchTerm") {
        None => return Err(ApiError::NotFound),
        Some(term) if is_falsy(term) => return Err(ApiError::NotFound),
        Some(Value::String(term)) => term,
        Some(_) => return Err(ApiError::Unprocessable),
    };

    let questions = repo.search_questions(term).await?;
    Ok(Json(SearchResults {
        success: true,
        total_questions: questions.len(),
        questions,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_page).post(create_question))
        .route("/questions/search", post(search_questions))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
