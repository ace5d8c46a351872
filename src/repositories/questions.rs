use sqlx::PgPool;

use crate::db::models::{Question, QuestionOption};

pub(crate) const QUESTION_COLUMNS: &str = "id, quiz_id, question_text, points, position";

pub(crate) struct CreateQuestion<'a> {
    pub id: &'a str,
    pub quiz_id: &'a str,
    pub question_text: &'a str,
    pub points: i32,
    pub position: i32,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO questions (id, quiz_id, question_text, points, position)
         VALUES ($1,$2,$3,$4,$5)",
    )
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.question_text)
    .bind(params.points)
    .bind(params.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) struct CreateOption<'a> {
    pub id: &'a str,
    pub question_id: &'a str,
    pub option_text: &'a str,
    pub is_correct: bool,
    pub position: i32,
}

pub(crate) async fn create_option(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateOption<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO question_options (id, question_id, option_text, is_correct, position)
         VALUES ($1,$2,$3,$4,$5)",
    )
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.option_text)
    .bind(params.is_correct)
    .bind(params.position)
    .execute(executor)
    .await?;
    Ok(())
}

/// Insertion order is the display order; never re-sorted by anything else.
pub(crate) async fn list_by_quiz(pool: &PgPool, quiz_id: &str) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY position"
    ))
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_options_by_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(
        "SELECT o.id, o.question_id, o.option_text, o.is_correct, o.position
         FROM question_options o
         JOIN questions q ON q.id = o.question_id
         WHERE q.quiz_id = $1
         ORDER BY q.position, o.position",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_quiz(pool: &PgPool, quiz_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_one(pool)
        .await
}
