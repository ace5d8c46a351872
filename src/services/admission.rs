use thiserror::Error;

use crate::db::models::User;
use crate::db::types::{ApprovalStatus, UserRole};

/// Why an authentication attempt was turned away. `NotApproved` carries the
/// concrete status so the client can distinguish pending from rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LoginDenied {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("examiner account not approved")]
    NotApproved(ApprovalStatus),
    #[error("user account is disabled")]
    Disabled,
}

/// The admission gate. Read-only: no counters, no lockout, no side effects
/// on the account.
///
/// The secret comparison is verbatim equality. Secrets have never been
/// hashed in this system; flagged as a known weakness.
pub(crate) fn check_login(user: Option<&User>, password: &str) -> Result<(), LoginDenied> {
    let Some(user) = user else {
        return Err(LoginDenied::InvalidCredentials);
    };

    if user.password != password {
        return Err(LoginDenied::InvalidCredentials);
    }

    if user.role == UserRole::Examiner {
        match user.approval_status {
            Some(ApprovalStatus::Pending) => {
                return Err(LoginDenied::NotApproved(ApprovalStatus::Pending));
            }
            Some(ApprovalStatus::Rejected) => {
                return Err(LoginDenied::NotApproved(ApprovalStatus::Rejected));
            }
            _ => {}
        }
    }

    if !user.is_active {
        return Err(LoginDenied::Disabled);
    }

    Ok(())
}

/// Account creation state: examiners start pending and inactive, everyone
/// else carries no approval status and is active immediately.
pub(crate) fn registration_state(role: UserRole) -> (Option<ApprovalStatus>, bool) {
    match role {
        UserRole::Examiner => (Some(ApprovalStatus::Pending), false),
        UserRole::Admin | UserRole::User => (None, true),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApprovalAction {
    Approve,
    Reject,
}

/// Activation is derived from the approval outcome. Re-approving a rejected
/// examiner runs this same transition.
pub(crate) fn approval_outcome(action: ApprovalAction) -> (ApprovalStatus, bool) {
    match action {
        ApprovalAction::Approve => (ApprovalStatus::Approved, true),
        ApprovalAction::Reject => (ApprovalStatus::Rejected, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_user;

    #[test]
    fn unknown_account_is_invalid_credentials() {
        assert_eq!(check_login(None, "secret"), Err(LoginDenied::InvalidCredentials));
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let user = fixture_user(UserRole::User, "secret");
        assert_eq!(check_login(Some(&user), "other"), Err(LoginDenied::InvalidCredentials));
    }

    #[test]
    fn password_comparison_is_verbatim() {
        // No normalization of any kind, not even trailing whitespace.
        let user = fixture_user(UserRole::User, "secret");
        assert_eq!(check_login(Some(&user), "secret "), Err(LoginDenied::InvalidCredentials));
        assert_eq!(check_login(Some(&user), "Secret"), Err(LoginDenied::InvalidCredentials));
        assert_eq!(check_login(Some(&user), "secret"), Ok(()));
    }

    #[test]
    fn pending_examiner_is_turned_away_with_status() {
        let mut user = fixture_user(UserRole::Examiner, "secret");
        user.approval_status = Some(ApprovalStatus::Pending);
        user.is_active = false;

        assert_eq!(
            check_login(Some(&user), "secret"),
            Err(LoginDenied::NotApproved(ApprovalStatus::Pending))
        );
    }

    #[test]
    fn rejected_examiner_is_turned_away_with_status() {
        let mut user = fixture_user(UserRole::Examiner, "secret");
        user.approval_status = Some(ApprovalStatus::Rejected);
        user.is_active = false;

        assert_eq!(
            check_login(Some(&user), "secret"),
            Err(LoginDenied::NotApproved(ApprovalStatus::Rejected))
        );
    }

    #[test]
    fn approved_examiner_logs_in() {
        let mut user = fixture_user(UserRole::Examiner, "secret");
        user.approval_status = Some(ApprovalStatus::Approved);
        user.is_active = true;

        assert_eq!(check_login(Some(&user), "secret"), Ok(()));
    }

    #[test]
    fn deactivated_account_is_disabled() {
        let mut user = fixture_user(UserRole::User, "secret");
        user.is_active = false;

        assert_eq!(check_login(Some(&user), "secret"), Err(LoginDenied::Disabled));
    }

    #[test]
    fn wrong_password_wins_over_approval_state() {
        // Credential failures must not leak approval state.
        let mut user = fixture_user(UserRole::Examiner, "secret");
        user.approval_status = Some(ApprovalStatus::Pending);
        user.is_active = false;

        assert_eq!(check_login(Some(&user), "nope"), Err(LoginDenied::InvalidCredentials));
    }

    #[test]
    fn registration_state_per_role() {
        assert_eq!(registration_state(UserRole::Examiner), (Some(ApprovalStatus::Pending), false));
        assert_eq!(registration_state(UserRole::User), (None, true));
        assert_eq!(registration_state(UserRole::Admin), (None, true));
    }

    #[test]
    fn approval_transitions_derive_activation() {
        assert_eq!(approval_outcome(ApprovalAction::Approve), (ApprovalStatus::Approved, true));
        assert_eq!(approval_outcome(ApprovalAction::Reject), (ApprovalStatus::Rejected, false));
    }
}
