use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::types::ApprovalStatus;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
    #[serde(rename = "approvalStatus", skip_serializing_if = "Option::is_none")]
    approval_status: Option<&'static str>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    /// Login-time denial for an unapproved examiner; carries the concrete
    /// status so the client can tell pending from rejected.
    NotApproved { detail: &'static str, status: ApprovalStatus },
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let status = StatusCode::UNAUTHORIZED;
                let mut response = (
                    status,
                    Json(ErrorResponse {
                        status: status.as_u16(),
                        detail: message.to_string(),
                        approval_status: None,
                    }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::NotApproved { detail, status: approval } => {
                let status = StatusCode::FORBIDDEN;
                (
                    status,
                    Json(ErrorResponse {
                        status: status.as_u16(),
                        detail: detail.to_string(),
                        approval_status: Some(approval.as_str()),
                    }),
                )
                    .into_response()
            }
            ApiError::Forbidden(message) => {
                let status = StatusCode::FORBIDDEN;
                (
                    status,
                    Json(ErrorResponse {
                        status: status.as_u16(),
                        detail: message.to_string(),
                        approval_status: None,
                    }),
                )
                    .into_response()
            }
            ApiError::BadRequest(message) => {
                let status = StatusCode::BAD_REQUEST;
                (
                    status,
                    Json(ErrorResponse {
                        status: status.as_u16(),
                        detail: message,
                        approval_status: None,
                    }),
                )
                    .into_response()
            }
            ApiError::NotFound(message) => {
                let status = StatusCode::NOT_FOUND;
                (
                    status,
                    Json(ErrorResponse {
                        status: status.as_u16(),
                        detail: message,
                        approval_status: None,
                    }),
                )
                    .into_response()
            }
            ApiError::Conflict(message) => {
                let status = StatusCode::CONFLICT;
                (
                    status,
                    Json(ErrorResponse {
                        status: status.as_u16(),
                        detail: message,
                        approval_status: None,
                    }),
                )
                    .into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (
                    status,
                    Json(ErrorResponse {
                        status: status.as_u16(),
                        detail: message,
                        approval_status: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}
