use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Quiz;

pub(crate) const COLUMNS: &str = "\
    id, title, description, time_limit_minutes, is_active, examiner_id, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateQuiz<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub time_limit_minutes: i32,
    pub examiner_id: &'a str,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuiz<'_>,
) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (
            id, title, description, time_limit_minutes, is_active, examiner_id, created_at
        ) VALUES ($1,$2,$3,$4,TRUE,$5,$6)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.time_limit_minutes)
    .bind(params.examiner_id)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_examiner(
    pool: &PgPool,
    examiner_id: &str,
) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes WHERE examiner_id = $1 ORDER BY created_at"
    ))
    .bind(examiner_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_active(pool: &PgPool) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes WHERE is_active ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await
}

/// Visibility filter for users with an assigned examiner.
pub(crate) async fn list_active_by_examiner(
    pool: &PgPool,
    examiner_id: &str,
) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes WHERE is_active AND examiner_id = $1 ORDER BY created_at"
    ))
    .bind(examiner_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn set_active(
    pool: &PgPool,
    id: &str,
    active: bool,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "UPDATE quizzes SET is_active = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(active)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Questions and options go with the quiz via FK cascade.
pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
