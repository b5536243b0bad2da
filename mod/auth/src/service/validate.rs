//! Signup input checks.
//!
//! Deliberately light: uniqueness lives in the DB constraint, and
//! anything fancier (MX lookups, breach lists) belongs to an upstream
//! collaborator. These checks only keep obviously broken input out.

use crate::service::AuthError;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Reject empty or whitespace-only required fields.
pub fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Shape check for email addresses: one `@`, non-empty local part,
/// domain with at least one dot.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    require("email", email)?;
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(l), Some(d), None) => (l, d),
        _ => return Err(AuthError::Validation("email not valid".into())),
    };
    if local.is_empty() || domain.len() < 3 || !domain.contains('.') || domain.starts_with('.') {
        return Err(AuthError::Validation("email not valid".into()));
    }
    Ok(())
}

/// Minimum-strength password check.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    require("password", password)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation("password not strong enough".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_blank() {
        assert!(require("name", "").is_err());
        assert!(require("name", "   ").is_err());
        assert!(require("name", "Alice").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@nodot").is_err());
        assert!(validate_email("alice@.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("longenough1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
    }
}
