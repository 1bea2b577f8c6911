use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

// JSON clients may send category and difficulty as numbers or as numeric strings
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub category: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub difficulty: i64,
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM questions
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.category = ?1 ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive literal substring match on the question text. Folding happens here
/// because sqlite's `lower()` only knows ASCII.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let needle = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect())
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// Inserts the given questions keeping their ids, overwriting rows that already exist.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
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
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{memory_pool, seeded_pool};

    fn new_question(text: &str, category: i64) -> NewQuestion {
        NewQuestion {
            question: text.to_owned(),
            answer: "answer".to_owned(),
            category,
            difficulty: 1,
        }
    }

    #[tokio::test]
    async fn pages_are_slices_of_id_order() {
        let pool = memory_pool().await;
        for n in 0..25 {
            create_question(&pool, &new_question(&format!("q{n}"), 1))
                .await
                .unwrap();
        }

        let first = get_questions_page(&pool, 10, 0).await.unwrap();
        let third = get_questions_page(&pool, 10, 20).await.unwrap();
        let beyond = get_questions_page(&pool, 10, 30).await.unwrap();

        assert_eq!(first.len(), 10);
        assert!(first.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(third.len(), 5);
        assert_eq!(third[0].question, "q20");
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn create_then_delete_changes_count_by_one() {
        let pool = seeded_pool().await;
        let before = count_questions(&pool).await.unwrap();

        let id = create_question(&pool, &new_question("", 2)).await.unwrap();
        assert_eq!(count_questions(&pool).await.unwrap(), before + 1);
        let created = get_question_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(created.question, "");
        assert_eq!(created.category, 2);

        delete_question(&pool, id).await.unwrap();
        assert_eq!(count_questions(&pool).await.unwrap(), before);
        assert!(get_question_by_id(&pool, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_missing_question_is_an_error() {
        let pool = seeded_pool().await;
        let err = delete_question(&pool, 9_999_999_999).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn search_ignores_case_and_answers() {
        let pool = seeded_pool().await;
        let found = search_questions(&pool, "TITLE").await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .all(|q| q.question.to_lowercase().contains("title")));
        // "Escher" only appears as an answer
        assert!(search_questions(&pool, "escher").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_letters() {
        let pool = seeded_pool().await;
        let id = create_question(&pool, &new_question("Where is the ÉLYSÉE palace?", 3))
            .await
            .unwrap();

        let found = search_questions(&pool, "élysée").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(search_questions(&pool, "ÉlYsÉe").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let pool = seeded_pool().await;
        assert!(search_questions(&pool, "%").await.unwrap().is_empty());
        assert!(search_questions(&pool, "_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_filter_matches_integer_ids() {
        let pool = seeded_pool().await;
        let sports = get_questions_for_category(&pool, 6).await.unwrap();

        assert_eq!(sports.len(), 2);
        assert!(sports.iter().all(|q| q.category == 6));
        assert!(get_questions_for_category(&pool, 1000)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn import_keeps_ids() {
        let pool = memory_pool().await;
        let question = Question {
            id: 77,
            question: "Imported?".to_owned(),
            answer: "Yes".to_owned(),
            category: 3,
            difficulty: 5,
        };
        import_questions(&pool, vec![question.clone()]).await.unwrap();
        import_questions(&pool, vec![question.clone()]).await.unwrap();

        assert_eq!(get_all_questions(&pool).await.unwrap(), vec![question]);
    }

    #[test]
    fn new_question_accepts_numeric_strings() {
        let parsed: NewQuestion = serde_json::from_value(serde_json::json!({
            "question": "q",
            "answer": "a",
            "category": "4",
            "difficulty": 2,
        }))
        .unwrap();
        assert_eq!(parsed.category, 4);
        assert_eq!(parsed.difficulty, 2);

        let rejected = serde_json::from_value::<NewQuestion>(serde_json::json!({
            "question": "q",
            "answer": "a",
            "category": "History",
            "difficulty": 2,
        }));
        assert!(rejected.is_err());
    }
}
