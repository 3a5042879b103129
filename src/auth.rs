use crate::error::ApiError;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// Checks that the address has a single `@`, a non-empty local part and a
/// dotted domain. Anything stricter belongs to the backend.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid_email()),
    };
    if local.is_empty() || domain.is_empty() {
        return Err(invalid_email());
    }
    let valid_domain = domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.');
    if !valid_domain {
        return Err(invalid_email());
    }
    Ok(())
}

fn invalid_email() -> ApiError {
    ApiError::Validation("please enter a valid email".into())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Pre-flight validation for login. Nothing is sent until this passes.
pub fn validate_login(email: &str, password: &str) -> Result<(), ApiError> {
    validate_email(email)?;
    validate_password(password)
}

/// Pre-flight validation for signup: login rules plus confirmation match.
pub fn validate_signup(email: &str, password: &str, confirm: &str) -> Result<(), ApiError> {
    validate_login(email, password)?;
    if password != confirm {
        return Err(ApiError::Validation("passwords don't match".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_address() {
        assert!(validate_email("user@example.com").is_ok());
    }

    #[test]
    fn rejects_missing_at() {
        assert!(validate_email("user.example.com").is_err());
    }

    #[test]
    fn rejects_double_at() {
        assert!(validate_email("user@host@example.com").is_err());
    }

    #[test]
    fn rejects_empty_local_part() {
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn rejects_undotted_domain() {
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn rejects_domain_edge_dots() {
        assert!(validate_email("user@.example.com").is_err());
        assert!(validate_email("user@example.com.").is_err());
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn signup_requires_matching_confirmation() {
        assert!(validate_signup("user@example.com", "secret1", "secret1").is_ok());
        assert!(validate_signup("user@example.com", "secret1", "secret2").is_err());
    }
}
