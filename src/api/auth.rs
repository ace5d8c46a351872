use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::validation::{validate_email, validate_required};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{
    AccountSummary, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::services::admission::{self, LoginDenied};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/register", post(register)).route("/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate_required("name", &payload.name)?;
    validate_required("password", &payload.password)?;
    validate_email(&payload.email)?;

    let Some(role) = UserRole::parse(&payload.role) else {
        return Err(ApiError::BadRequest("Invalid role".to_string()));
    };

    // Exact-match duplicate check; addresses differing only in case pass.
    let existing = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing account"))?;

    if existing.is_some() {
        tracing::warn!(email = %payload.email, "Registration rejected: email already in use");
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }

    let (approval_status, is_active) = admission::registration_state(role);

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &payload.email,
            full_name: &payload.name,
            password: &payload.password,
            role,
            is_active,
            approval_status,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create account"))?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "Account registered");

    let response = match role {
        UserRole::Examiner => RegisterResponse {
            user_id: user.id,
            message: "Registration successful. Your account requires admin approval before you can log in."
                .to_string(),
            approval_status: user.approval_status.map(|status| status.as_str()),
            active: Some(user.is_active),
        },
        _ => RegisterResponse {
            user_id: user.id,
            message: "User registered successfully".to_string(),
            approval_status: None,
            active: None,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_required("email", &payload.email)?;
    validate_required("password", &payload.password)?;

    let user = repositories::users::find_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load account"))?;

    if let Err(denied) = admission::check_login(user.as_ref(), &payload.password) {
        return Err(match denied {
            LoginDenied::InvalidCredentials => {
                tracing::warn!(email = %payload.email, "Login rejected: invalid credentials");
                ApiError::Unauthorized("Invalid email or password")
            }
            LoginDenied::NotApproved(status) => {
                tracing::warn!(
                    email = %payload.email,
                    approval_status = status.as_str(),
                    "Login rejected: examiner not approved"
                );
                ApiError::NotApproved {
                    detail: match status {
                        crate::db::types::ApprovalStatus::Rejected => {
                            "Your examiner account was not approved by the administrator."
                        }
                        _ => "Your examiner account is pending approval by an administrator.",
                    },
                    status,
                }
            }
            LoginDenied::Disabled => {
                tracing::warn!(email = %payload.email, "Login rejected: account disabled");
                ApiError::Forbidden("User account is disabled")
            }
        });
    }

    let Some(user) = user else {
        return Err(ApiError::Unauthorized("Invalid email or password"));
    };

    let token =
        security::create_access_token(&user.id, &user.email, user.role, state.settings(), None)
            .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "Login successful");

    Ok(Json(LoginResponse { token, user: AccountSummary::from_db(&user) }))
}
