use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{
    AdminUserRow, AssignExaminerRequest, AssignedExaminerRef, ExaminerRow, PendingExaminerRow,
    StatusUpdateRequest,
};
use crate::services::admission::{approval_outcome, ApprovalAction};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id/status", put(update_user_status))
        .route("/users/:user_id/assign-examiner", post(assign_examiner))
        .route("/examiners", get(list_examiners))
        .route("/examiners/pending", get(list_pending_examiners))
        .route("/examiners/:examiner_id/approve", post(approve_examiner))
        .route("/examiners/:examiner_id/reject", post(reject_examiner))
}

async fn list_users(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUserRow>>, ApiError> {
    let users = repositories::users::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    let mut rows = Vec::with_capacity(users.len());
    for user in &users {
        let assigned_examiner = match user.assigned_examiner_id.as_deref() {
            Some(examiner_id) => repositories::users::find_name_by_id(state.db(), examiner_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load examiner"))?
                .map(|name| AssignedExaminerRef { id: examiner_id.to_string(), name }),
            None => None,
        };

        rows.push(AdminUserRow::from_db(user, assigned_examiner));
    }

    Ok(Json(rows))
}

/// Administrative activation override; approval status is untouched.
async fn update_user_status(
    Path(user_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = repositories::users::set_active(state.db(), &user_id, payload.active)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update user status"))?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {user_id}")))?;

    tracing::info!(user_id = %user.id, active = user.is_active, "User activation updated");

    Ok(Json(serde_json::json!({
        "message": "User status updated successfully",
        "userId": user.id,
        "active": user.is_active,
    })))
}

async fn assign_examiner(
    Path(user_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AssignExaminerRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {user_id}")))?;

    let examiner = repositories::users::find_by_id(state.db(), &payload.examiner_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load examiner"))?
        .ok_or_else(|| ApiError::NotFound(format!("Examiner not found: {}", payload.examiner_id)))?;

    if examiner.role != UserRole::Examiner {
        return Err(ApiError::Conflict("Assigned user must have EXAMINER role".to_string()));
    }

    let user = repositories::users::set_assigned_examiner(state.db(), &user_id, &examiner.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to assign examiner"))?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {user_id}")))?;

    tracing::info!(user_id = %user.id, examiner_id = %examiner.id, "Examiner assigned");

    Ok(Json(serde_json::json!({
        "message": "Examiner assigned successfully",
        "userId": user.id,
        "assignedExaminer": {
            "id": examiner.id,
            "name": examiner.full_name,
        },
    })))
}

async fn list_examiners(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExaminerRow>>, ApiError> {
    let examiners = repositories::users::list_by_role(state.db(), UserRole::Examiner)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list examiners"))?;

    Ok(Json(examiners.iter().map(ExaminerRow::from_db).collect()))
}

async fn list_pending_examiners(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingExaminerRow>>, ApiError> {
    let examiners = repositories::users::list_pending_examiners(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list pending examiners"))?;

    Ok(Json(examiners.iter().map(PendingExaminerRow::from_db).collect()))
}

async fn approve_examiner(
    Path(examiner_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    run_approval(&state, &admin.id, &examiner_id, ApprovalAction::Approve).await
}

async fn reject_examiner(
    Path(examiner_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    run_approval(&state, &admin.id, &examiner_id, ApprovalAction::Reject).await
}

/// Approve and reject run the same transition; a rejected examiner can be
/// re-approved later by the same path.
async fn run_approval(
    state: &AppState,
    admin_id: &str,
    examiner_id: &str,
    action: ApprovalAction,
) -> Result<Json<serde_json::Value>, ApiError> {
    let examiner = repositories::users::find_by_id(state.db(), examiner_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load examiner"))?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {examiner_id}")))?;

    if examiner.role != UserRole::Examiner {
        return Err(ApiError::Conflict("User is not an examiner".to_string()));
    }

    let (status, active) = approval_outcome(action);

    let updated = repositories::users::set_approval(state.db(), examiner_id, status, active)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update approval status"))?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {examiner_id}")))?;

    tracing::info!(
        admin_id = %admin_id,
        examiner_id = %updated.id,
        approval_status = status.as_str(),
        active = updated.is_active,
        "Examiner approval updated"
    );

    let message = match action {
        ApprovalAction::Approve => "Examiner approved successfully",
        ApprovalAction::Reject => "Examiner rejected successfully",
    };

    Ok(Json(serde_json::json!({
        "message": message,
        "examinerId": updated.id,
        "name": updated.full_name,
        "status": status.as_str(),
        "active": updated.is_active,
    })))
}
