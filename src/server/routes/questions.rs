use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question, QuestionFilter,
    },
    pagination::Page,
    server::{app::AppState, deserializers::empty_string_as_none},
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories::QuestionsList, ApiError, ApiResponse};

const DIFFICULTIES: std::ops::RangeInclusive<i64> = 1..=5;

/// Body of `POST /questions`: a search when `searchTerm` is set, otherwise a new question.
#[derive(Debug, Deserialize)]
struct QuestionsBody {
    #[serde(default, rename = "searchTerm", deserialize_with = "empty_string_as_none")]
    search_term: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
}

#[derive(Debug, PartialEq, Eq)]
struct NewQuestion {
    question: String,
    answer: String,
    difficulty: i64,
    category: i64,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::Unprocessable(format!("{field} must not be empty"))),
    }
}

impl TryFrom<QuestionsBody> for NewQuestion {
    type Error = ApiError;

    fn try_from(body: QuestionsBody) -> Result<Self, Self::Error> {
        let question = required_text(body.question, "question")?;
        let answer = required_text(body.answer, "answer")?;
        let difficulty = body
            .difficulty
            .filter(|d| DIFFICULTIES.contains(d))
            .ok_or_else(|| {
                ApiError::Unprocessable(format!(
                    "difficulty must be between {} and {}",
                    DIFFICULTIES.start(),
                    DIFFICULTIES.end()
                ))
            })?;
        let category = body
            .category
            .ok_or_else(|| ApiError::Unprocessable("category is required".to_owned()))?;
        Ok(NewQuestion {
            question,
            answer,
            difficulty,
            category,
        })
    }
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    page: Result<Query<Page>, QueryRejection>,
) -> ApiResponse<Json<QuestionsList>> {
    let Query(page) = page?;
    let questions = questions::get_questions_page(&pool, &QuestionFilter::All, page).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsList {
        success: true,
        questions,
        total_questions: questions::count_questions(&pool, &QuestionFilter::All).await?,
        categories: categories::get_category_types(&pool).await?,
        current_category: None,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    page: Result<Query<Page>, QueryRejection>,
) -> ApiResponse<Json<Deleted>> {
    let Path(id) = id?;
    let Query(page) = page?;
    questions::get_question(&pool, id).await?;

    let deleted = questions::delete_question(&pool, id)
        .await
        .map_err(|e| ApiError::Unprocessable(format!("failed to delete question {id}: {e}")))?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    QUESTIONS_DELETED.inc();
    tracing::info!("Deleted question {id}");

    Ok(Json(Deleted {
        success: true,
        deleted: id,
        questions: questions::get_questions_page(&pool, &QuestionFilter::All, page).await?,
        total_questions: questions::count_questions(&pool, &QuestionFilter::All).await?,
    }))
}

async fn create_or_search_questions(
    State(pool): State<SqlitePool>,
    page: Result<Query<Page>, QueryRejection>,
    body: Result<Json<QuestionsBody>, JsonRejection>,
) -> ApiResponse<Response> {
    let Query(page) = page?;
    let Json(mut body) = body?;
    match body.search_term.take() {
        Some(term) => Ok(search_questions(&pool, term, page).await?.into_response()),
        None => Ok(create_question(&pool, body.try_into()?, page).await?.into_response()),
    }
}

async fn search_questions(
    pool: &SqlitePool,
    term: String,
    page: Page,
) -> ApiResponse<Json<SearchResults>> {
    let filter = QuestionFilter::Search(term);
    Ok(Json(SearchResults {
        success: true,
        questions: questions::get_questions_page(pool, &filter, page).await?,
        total_questions: questions::count_questions(pool, &filter).await?,
        current_category: None,
    }))
}

async fn create_question(
    pool: &SqlitePool,
    new_question: NewQuestion,
    page: Page,
) -> ApiResponse<Json<Created>> {
    categories::get_category(pool, new_question.category)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ApiError::Unprocessable(format!(
                "category {} does not exist",
                new_question.category
            )),
            e => e.into(),
        })?;

    let id = questions::create_question(
        pool,
        &new_question.question,
        &new_question.answer,
        new_question.category,
        new_question.difficulty,
    )
    .await?;
    QUESTIONS_CREATED.inc();
    tracing::info!("Created question {id}");

    Ok(Json(Created {
        success: true,
        created: id,
        questions: questions::get_questions_page(pool, &QuestionFilter::All, page).await?,
        total_questions: questions::count_questions(pool, &QuestionFilter::All).await?,
    }))
}

pub fn questions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/questions",
            get(get_questions).post(create_or_search_questions),
        )
        .route("/questions/{id}", delete(delete_question))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> QuestionsBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let new: NewQuestion = body(
            r#"{"question": "Q?", "answer": "A", "difficulty": "3", "category": "2"}"#,
        )
        .try_into()
        .unwrap();
        assert_eq!(
            new,
            NewQuestion {
                question: "Q?".to_owned(),
                answer: "A".to_owned(),
                difficulty: 3,
                category: 2,
            }
        );
    }

    #[test]
    fn empty_search_term_selects_create() {
        let parsed = body(r#"{"searchTerm": "", "question": "Q?"}"#);
        assert_eq!(parsed.search_term, None);
        let parsed = body(r#"{"searchTerm": "title"}"#);
        assert_eq!(parsed.search_term.as_deref(), Some("title"));
    }

    #[test]
    fn blank_text_is_rejected() {
        let result = NewQuestion::try_from(body(
            r#"{"question": "  ", "answer": "A", "difficulty": 1, "category": 1}"#,
        ));
        assert!(matches!(result, Err(ApiError::Unprocessable(_))));
    }

    #[test]
    fn difficulty_out_of_range_is_rejected() {
        let result = NewQuestion::try_from(body(
            r#"{"question": "Q?", "answer": "A", "difficulty": 6, "category": 1}"#,
        ));
        assert!(matches!(result, Err(ApiError::Unprocessable(_))));
    }

    #[test]
    fn missing_category_is_rejected() {
        let result =
            NewQuestion::try_from(body(r#"{"question": "Q?", "answer": "A", "difficulty": 2}"#));
        assert!(matches!(result, Err(ApiError::Unprocessable(_))));
    }
}
