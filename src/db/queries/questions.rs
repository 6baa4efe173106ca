use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::pagination::Page;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// Which questions a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionFilter {
    All,
    Category(i64),
    /// Case-insensitive literal substring of the question text.
    Search(String),
}

impl QuestionFilter {
    /// Whether `question` belongs to the listing.
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            QuestionFilter::All => true,
            QuestionFilter::Category(category) => question.category == *category,
            QuestionFilter::Search(term) => question
                .question
                .to_lowercase()
                .contains(&term.to_lowercase()),
        }
    }
}

// SQLite's lower() only folds ASCII, so search terms are matched in Rust
fn push_category(builder: &mut QueryBuilder<'_, Sqlite>, filter: &QuestionFilter) {
    if let QuestionFilter::Category(category) = filter {
        builder.push(" WHERE category = ").push_bind(*category);
    }
}

const SELECT_QUESTIONS: &str = "SELECT id, question, answer, category, difficulty FROM questions";

pub async fn get_questions(pool: &SqlitePool, filter: &QuestionFilter) -> sqlx::Result<Vec<Question>> {
    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_QUESTIONS);
    push_category(&mut builder, filter);
    builder.push(" ORDER BY id");
    let questions = builder.build_query_as::<Question>().fetch_all(pool).await?;
    Ok(match filter {
        QuestionFilter::Search(_) => questions.into_iter().filter(|q| filter.matches(q)).collect(),
        _ => questions,
    })
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    filter: &QuestionFilter,
    page: Page,
) -> sqlx::Result<Vec<Question>> {
    if let QuestionFilter::Search(_) = filter {
        return Ok(page.slice(get_questions(pool, filter).await?));
    }
    let Some(offset) = page.offset() else {
        return Ok(vec![]);
    };
    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_QUESTIONS);
    push_category(&mut builder, filter);
    builder
        .push(" ORDER BY id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(offset);
    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub async fn count_questions(pool: &SqlitePool, filter: &QuestionFilter) -> sqlx::Result<i64> {
    if let QuestionFilter::Search(_) = filter {
        return Ok(get_questions(pool, filter).await?.len() as i64);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM questions");
    push_category(&mut builder, filter);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn get_question(pool: &SqlitePool, id: i64) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn create_question(
    pool: &SqlitePool,
    question: &str,
    answer: &str,
    category: i64,
    difficulty: i64,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category)
    .bind(difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns the number of deleted rows.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, category: i64) -> Question {
        Question {
            id: 1,
            question: text.to_owned(),
            answer: "answer".to_owned(),
            category,
            difficulty: 1,
        }
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let q = question("Где находится ÉCOLE Москва?", 1);
        assert!(QuestionFilter::Search("москва".to_owned()).matches(&q));
        assert!(QuestionFilter::Search("école".to_owned()).matches(&q));
        assert!(QuestionFilter::Search("ГДЕ".to_owned()).matches(&q));
        assert!(!QuestionFilter::Search("paris".to_owned()).matches(&q));
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let q = question("What is 100% water?", 1);
        assert!(QuestionFilter::Search("100%".to_owned()).matches(&q));
        assert!(!QuestionFilter::Search("1_0".to_owned()).matches(&q));
    }

    #[test]
    fn category_and_all_filters() {
        let q = question("Any", 2);
        assert!(QuestionFilter::All.matches(&q));
        assert!(QuestionFilter::Category(2).matches(&q));
        assert!(!QuestionFilter::Category(1).matches(&q));
    }
}
