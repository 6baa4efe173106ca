use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question, QuestionFilter,
    },
    pagination::Page,
    server::app::AppState,
};

use super::{ApiError, ApiResponse};

#[derive(Serialize)]
struct CategoriesList {
    success: bool,
    categories: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct QuestionsList {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: i64,
    pub categories: Vec<String>,
    pub current_category: Option<String>,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesList>> {
    Ok(Json(CategoriesList {
        success: true,
        categories: categories::get_category_types(&pool).await?,
    }))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    page: Result<Query<Page>, QueryRejection>,
) -> ApiResponse<Json<QuestionsList>> {
    let Path(id) = id?;
    let Query(page) = page?;
    let category = categories::get_category(&pool, id).await?;

    let filter = QuestionFilter::Category(category.id);
    let questions = questions::get_questions_page(&pool, &filter, page).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsList {
        success: true,
        questions,
        total_questions: questions::count_questions(&pool, &filter).await?,
        categories: categories::get_category_types(&pool).await?,
        current_category: Some(category.kind),
    }))
}

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
}
