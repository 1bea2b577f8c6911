//! Storage interface used by the HTTP handlers.
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::queries::{categories, questions};
use super::{Category, NewQuestion, Question};

#[async_trait]
pub trait TriviaRepo: Send + Sync {
    async fn categories(&self) -> sqlx::Result<Vec<Category>>;

    async fn list_questions(&self, limit: i64, offset: i64) -> sqlx::Result<Vec<Question>>;
    async fn all_questions(&self) -> sqlx::Result<Vec<Question>>;
    async fn count_questions(&self) -> sqlx::Result<i64>;
    async fn find_question(&self, id: i64) -> sqlx::Result<Option<Question>>;
    async fn search_questions(&self, term: &str) -> sqlx::Result<Vec<Question>>;
    async fn questions_by_category(&self, category: i64) -> sqlx::Result<Vec<Question>>;

    /// Fails with `RowNotFound` when no question has the given id.
    async fn delete_question(&self, id: i64) -> sqlx::Result<()>;
    async fn insert_question(&self, question: &NewQuestion) -> sqlx::Result<Question>;
}

#[derive(Clone)]
pub struct SqliteTriviaRepo {
    pool: SqlitePool,
}

impl SqliteTriviaRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriviaRepo for SqliteTriviaRepo {
    async fn categories(&self) -> sqlx::Result<Vec<Category>> {
        categories::get_all_categories(&self.pool).await
    }

    async fn list_questions(&self, limit: i64, offset: i64) -> sqlx::Result<Vec<Question>> {
        questions::get_questions_page(&self.pool, limit, offset).await
    }

    async fn all_questions(&self) -> sqlx::Result<Vec<Question>> {
        questions::get_all_questions(&self.pool).await
    }

    async fn count_questions(&self) -> sqlx::Result<i64> {
        questions::count_questions(&self.pool).await
    }

    async fn find_question(&self, id: i64) -> sqlx::Result<Option<Question>> {
        questions::get_question_by_id(&self.pool, id).await
    }

    async fn search_questions(&self, term: &str) -> sqlx::Result<Vec<Question>> {
        questions::search_questions(&self.pool, term).await
    }

    async fn questions_by_category(&self, category: i64) -> sqlx::Result<Vec<Question>> {
        questions::get_questions_for_category(&self.pool, category).await
    }

    async fn delete_question(&self, id: i64) -> sqlx::Result<()> {
        questions::delete_question(&self.pool, id).await
    }

    async fn insert_question(&self, question: &NewQuestion) -> sqlx::Result<Question> {
        let id = questions::create_question(&self.pool, question).await?;
        questions::get_question_by_id(&self.pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}
