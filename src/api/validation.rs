use crate::api::errors::ApiError;

/// Shape check only. Matching stays case-sensitive everywhere downstream.
pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() <= 320
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !domain.starts_with('.')
        });

    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid email format".to_string()))
    }
}

pub(crate) fn validate_required(field: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::BadRequest(format!("{field} is required")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("User@Example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@missing-local").is_err());
        assert!(validate_email("missing-domain@").is_err());
    }

    #[test]
    fn required_rejects_blank() {
        assert!(validate_required("name", "Ada").is_ok());
        assert!(validate_required("name", "  ").is_err());
        assert!(validate_required("name", "").is_err());
    }
}
