//! CSV import and export of the category and question tables.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_questions, import_questions};
use crate::db::{Category, Question, QuestionFilter};
use crate::quiz::ANY_CATEGORY;

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const QUESTIONS_FILE: &str = "questions.csv";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("category {kind:?} has id {id}, ids must start at 1")]
pub struct ReservedCategoryId {
    pub id: i64,
    pub kind: String,
}

/// Category ids at or below the quiz wildcard can not be stored.
pub fn check_category_ids(categories: &[Category]) -> Result<(), ReservedCategoryId> {
    match categories.iter().find(|c| c.id <= ANY_CATEGORY) {
        Some(category) => Err(ReservedCategoryId {
            id: category.id,
            kind: category.kind.clone(),
        }),
        None => Ok(()),
    }
}

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_questions(pool, &QuestionFilter::All).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    tracing::info!(
        "Exporting {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        dir.display()
    );
    write_to(&dir.join(CATEGORIES_FILE), categories)?;
    write_to(&dir.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    check_category_ids(&categories)?;
    tracing::info!(
        "Importing {} categories and {} questions",
        categories.len(),
        questions.len()
    );
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, kind: &str) -> Category {
        Category {
            id,
            kind: kind.to_owned(),
        }
    }

    #[test]
    fn positive_ids_pass() {
        assert_eq!(
            check_category_ids(&[category(1, "Science"), category(7, "Art")]),
            Ok(())
        );
        assert_eq!(check_category_ids(&[]), Ok(()));
    }

    #[test]
    fn wildcard_and_negative_ids_are_rejected() {
        assert_eq!(
            check_category_ids(&[category(1, "Science"), category(0, "Everything")]),
            Err(ReservedCategoryId {
                id: 0,
                kind: "Everything".to_owned()
            })
        );
        let err = check_category_ids(&[category(-3, "Art")]).unwrap_err();
        assert_eq!(err.to_string(), r#"category "Art" has id -3, ids must start at 1"#);
    }
}
