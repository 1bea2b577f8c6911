use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    db::{Question, TriviaRepo},
    server::{
        app::AppState,
        deserializers::path_id,
        error_handlers::ApiResponse,
    },
};

use super::{format_categories, CategoryMap};

#[derive(Serialize)]
struct CategoriesList {
    success: bool,
    categories: CategoryMap,
}

#[derive(Serialize)]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories(
    State(repo): State<Arc<dyn TriviaRepo>>,
) -> ApiResponse<Json<CategoriesList>> {
    let categories = repo.categories().await?;
    Ok(Json(CategoriesList {
        success: true,
        categories: format_categories(categories),
    }))
}

async fn questions_for_category(
    State(repo): State<Arc<dyn TriviaRepo>>,
    Path(id): Path<String>,
) -> ApiResponse<Json<CategoryQuestions>> {
    let category = path_id(&id)?;
    let questions = repo.questions_by_category(category).await?;
    Ok(Json(CategoryQuestions {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: category,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
