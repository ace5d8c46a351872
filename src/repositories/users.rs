use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::{ApprovalStatus, UserRole};

pub(crate) const COLUMNS: &str = "\
    id, email, full_name, password, role, is_active, approval_status, \
    assigned_examiner_id, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lookup is case-sensitive by design: the store has always treated
/// "User@x.com" and "user@x.com" as distinct accounts.
pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_email(pool: &PgPool, email: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub full_name: &'a str,
    pub password: &'a str,
    pub role: UserRole,
    pub is_active: bool,
    pub approval_status: Option<ApprovalStatus>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, email, full_name, password, role, is_active, approval_status, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.full_name)
    .bind(params.password)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.approval_status)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users ORDER BY created_at"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn list_by_role(pool: &PgPool, role: UserRole) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY created_at"
    ))
    .bind(role)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_pending_examiners(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE role = $1 AND approval_status = $2 ORDER BY created_at"
    ))
    .bind(UserRole::Examiner)
    .bind(ApprovalStatus::Pending)
    .fetch_all(pool)
    .await
}

pub(crate) async fn set_active(pool: &PgPool, id: &str, active: bool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET is_active = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(active)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Approval and activation always change together; activation is derived
/// from the approval outcome.
pub(crate) async fn set_approval(
    pool: &PgPool,
    id: &str,
    status: ApprovalStatus,
    active: bool,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET approval_status = $1, is_active = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(active)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn set_assigned_examiner(
    pool: &PgPool,
    user_id: &str,
    examiner_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET assigned_examiner_id = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(examiner_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_name_by_id(pool: &PgPool, id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT full_name FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
