use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Serialize)]
pub(crate) struct AssignedExaminerRef {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminUserRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) active: bool,
    #[serde(rename = "assignedExaminer", skip_serializing_if = "Option::is_none")]
    pub(crate) assigned_examiner: Option<AssignedExaminerRef>,
}

impl AdminUserRow {
    pub(crate) fn from_db(user: &User, assigned_examiner: Option<AssignedExaminerRef>) -> Self {
        Self {
            id: user.id.clone(),
            name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            active: user.is_active,
            assigned_examiner,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExaminerRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) active: bool,
}

impl ExaminerRow {
    pub(crate) fn from_db(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.full_name.clone(),
            email: user.email.clone(),
            active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PendingExaminerRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    #[serde(rename = "registeredAt")]
    pub(crate) registered_at: String,
}

impl PendingExaminerRow {
    pub(crate) fn from_db(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.full_name.clone(),
            email: user.email.clone(),
            registered_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    pub(crate) active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignExaminerRequest {
    #[serde(alias = "examinerId")]
    pub(crate) examiner_id: String,
}
