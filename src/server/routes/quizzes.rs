use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question, QuestionFilter,
    },
    quiz::{select_question, QuizRng, ANY_CATEGORY},
    server::app::AppState,
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::ApiResponse;

#[derive(Debug, Deserialize)]
struct QuizBody {
    #[serde(default)]
    previous_questions: Vec<i64>,
    #[serde(default)]
    quiz_category: QuizCategory,
}

// the web client also sends the category label as `type`, it is ignored
#[derive(Debug, Default, Deserialize)]
struct QuizCategory {
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    /// `None` once every candidate has been played.
    question: Option<Question>,
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    State(rng): State<QuizRng>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<Json<QuizQuestion>> {
    let Json(body) = body?;
    let filter = match body.quiz_category.id {
        ANY_CATEGORY => QuestionFilter::All,
        id => QuestionFilter::Category(categories::get_category(&pool, id).await?.id),
    };

    let candidates = questions::get_questions(&pool, &filter).await?;
    let question = rng.with(|rng| select_question(candidates, &body.previous_questions, rng));
    match &question {
        Some(q) => QUIZ_QUESTIONS_SERVED
            .with_label_values(&[q.category.to_string().as_str()])
            .inc(),
        None => tracing::info!(
            "No questions left for category {} after {} rounds",
            body.quiz_category.id,
            body.previous_questions.len()
        ),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router() -> Router<AppState> {
    Router::new().route("/quizzes", post(play_quiz))
}
