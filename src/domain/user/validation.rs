//! User validation utilities

use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID must look like 'USR-' followed by {0} uppercase hex characters")]
    InvalidIdFormat(usize),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email '{0}' is not a valid address")]
    InvalidEmail(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("NIP is required for role dosen")]
    MissingNip,

    #[error("NIP may only contain digits")]
    InvalidNip,
}

pub const USER_ID_PREFIX: &str = "USR-";
pub const USER_ID_SUFFIX_LENGTH: usize = 6;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a user ID
///
/// Rules:
/// - Cannot be empty
/// - `USR-` prefix followed by exactly 6 uppercase hex characters
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    let suffix = id
        .strip_prefix(USER_ID_PREFIX)
        .ok_or(UserValidationError::InvalidIdFormat(USER_ID_SUFFIX_LENGTH))?;

    let well_formed = suffix.len() == USER_ID_SUFFIX_LENGTH
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));

    if !well_formed {
        return Err(UserValidationError::InvalidIdFormat(USER_ID_SUFFIX_LENGTH));
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !email.validate_email() {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Minimum 8 characters
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Validate a lecturer NIP. Absent or blank counts as missing.
pub fn validate_nip(nip: Option<&str>) -> Result<(), UserValidationError> {
    let nip = nip.map(str::trim).unwrap_or_default();

    if nip.is_empty() {
        return Err(UserValidationError::MissingNip);
    }

    if !nip.chars().all(|c| c.is_ascii_digit()) {
        return Err(UserValidationError::InvalidNip);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_ids() {
        assert!(validate_user_id("USR-1A2B3C").is_ok());
        assert!(validate_user_id("USR-000000").is_ok());
    }

    #[test]
    fn test_invalid_user_ids() {
        assert_eq!(validate_user_id(""), Err(UserValidationError::EmptyId));
        assert_eq!(
            validate_user_id("1A2B3C"),
            Err(UserValidationError::InvalidIdFormat(6))
        );
        assert_eq!(
            validate_user_id("USR-1a2b3c"),
            Err(UserValidationError::InvalidIdFormat(6))
        );
        assert_eq!(
            validate_user_id("USR-1A2B3C4"),
            Err(UserValidationError::InvalidIdFormat(6))
        );
    }

    #[test]
    fn test_emails() {
        assert!(validate_email("budi@gmail.com").is_ok());
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
        assert!(matches!(
            validate_email("not-an-email"),
            Err(UserValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_names() {
        assert!(validate_name("Siti Aminah").is_ok());
        assert_eq!(validate_name("   "), Err(UserValidationError::EmptyName));
        assert_eq!(
            validate_name(&"a".repeat(101)),
            Err(UserValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_passwords() {
        assert!(validate_password("password123").is_ok());
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordTooShort(8))
        );
        assert_eq!(
            validate_password(&"a".repeat(129)),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_nip() {
        assert!(validate_nip(Some("198703152010121001")).is_ok());
        assert_eq!(validate_nip(None), Err(UserValidationError::MissingNip));
        assert_eq!(validate_nip(Some("  ")), Err(UserValidationError::MissingNip));
        assert_eq!(validate_nip(Some("12-34")), Err(UserValidationError::InvalidNip));
    }
}
