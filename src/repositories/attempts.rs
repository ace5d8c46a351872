use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{AttemptAnswer, QuizAttempt};

pub(crate) const COLUMNS: &str = "\
    id, user_id, quiz_id, started_at, completed_at, score, completed";

const ANSWER_COLUMNS: &str = "\
    id, attempt_id, question_id, selected_option_id, free_text, is_correct, position";

/// Serializes concurrent starts for the same (user, quiz) pair within the
/// surrounding transaction. Released automatically at commit/rollback.
pub(crate) async fn acquire_pair_lock(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    quiz_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
        .bind(user_id)
        .bind(quiz_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!("SELECT {COLUMNS} FROM quiz_attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// The unique in-progress attempt for the pair, if any.
pub(crate) async fn find_open(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    quiz_id: &str,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts
         WHERE user_id = $1 AND quiz_id = $2 AND NOT completed"
    ))
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn has_completed(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    quiz_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT 1 FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2 AND completed
        )",
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(executor)
    .await
}

pub(crate) struct CreateAttempt<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub quiz_id: &'a str,
    pub started_at: PrimitiveDateTime,
}

/// Returns false when the partial unique index already holds an open attempt
/// for the pair; the caller re-reads the existing row in that case.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO quiz_attempts (id, user_id, quiz_id, started_at, completed)
         VALUES ($1,$2,$3,$4,FALSE)
         ON CONFLICT DO NOTHING",
    )
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.quiz_id)
    .bind(params.started_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Seals an attempt. The `NOT completed` guard makes the transition atomic:
/// of two racing submits exactly one sees a row change, the other gets false.
pub(crate) async fn seal(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    completed_at: PrimitiveDateTime,
    score: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE quiz_attempts
         SET completed = TRUE, completed_at = $1, score = $2
         WHERE id = $3 AND NOT completed",
    )
    .bind(completed_at)
    .bind(score)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) struct CreateAnswer<'a> {
    pub id: &'a str,
    pub attempt_id: &'a str,
    pub question_id: &'a str,
    pub selected_option_id: Option<&'a str>,
    pub free_text: Option<&'a str>,
    pub is_correct: bool,
    pub position: i32,
}

pub(crate) async fn create_answer(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAnswer<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO attempt_answers (
            id, attempt_id, question_id, selected_option_id, free_text, is_correct, position
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)",
    )
    .bind(params.id)
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.selected_option_id)
    .bind(params.free_text)
    .bind(params.is_correct)
    .bind(params.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_answers(
    pool: &PgPool,
    attempt_id: &str,
) -> Result<Vec<AttemptAnswer>, sqlx::Error> {
    sqlx::query_as::<_, AttemptAnswer>(&format!(
        "SELECT {ANSWER_COLUMNS} FROM attempt_answers WHERE attempt_id = $1 ORDER BY position"
    ))
    .bind(attempt_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_completed_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts
         WHERE user_id = $1 AND completed
         ORDER BY completed_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_completed_by_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts
         WHERE quiz_id = $1 AND completed
         ORDER BY completed_at"
    ))
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}
