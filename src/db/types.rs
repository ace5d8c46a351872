use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Examiner,
    User,
}

impl UserRole {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Self::Admin),
            "EXAMINER" => Some(Self::Examiner),
            "USER" => Some(Self::User),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Examiner => "EXAMINER",
            Self::User => "USER",
        }
    }
}

/// Only meaningful for examiner accounts; NULL for every other role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "approvalstatus", rename_all = "lowercase")]
pub(crate) enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_strict_uppercase() {
        assert_eq!(UserRole::parse("EXAMINER"), Some(UserRole::Examiner));
        assert_eq!(UserRole::parse("examiner"), None);
        assert_eq!(UserRole::parse("SUPERADMIN"), None);
    }

    #[test]
    fn role_wire_format_is_uppercase() {
        assert_eq!(serde_json::to_string(&UserRole::User).unwrap(), "\"USER\"");
        assert_eq!(serde_json::to_string(&ApprovalStatus::Pending).unwrap(), "\"PENDING\"");
    }
}
