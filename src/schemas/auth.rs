use serde::{Deserialize, Serialize};

use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
    /// Wire value, e.g. "USER" or "EXAMINER"; parsed strictly.
    pub(crate) role: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AccountSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
}

impl AccountSummary {
    pub(crate) fn from_db(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    pub(crate) token: String,
    pub(crate) user: AccountSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterResponse {
    #[serde(rename = "userId")]
    pub(crate) user_id: String,
    pub(crate) message: String,
    #[serde(rename = "approvalStatus", skip_serializing_if = "Option::is_none")]
    pub(crate) approval_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_response_omits_approval_fields_for_plain_users() {
        let response = RegisterResponse {
            user_id: "u1".to_string(),
            message: "User registered successfully".to_string(),
            approval_status: None,
            active: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("approvalStatus").is_none());
        assert!(json.get("active").is_none());
        assert_eq!(json["userId"], "u1");
    }

    #[test]
    fn register_response_carries_examiner_approval_state() {
        let response = RegisterResponse {
            user_id: "u1".to_string(),
            message: "requires approval".to_string(),
            approval_status: Some("PENDING"),
            active: Some(false),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["approvalStatus"], "PENDING");
        assert_eq!(json["active"], false);
    }
}
