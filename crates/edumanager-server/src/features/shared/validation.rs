//! Shared validation utilities
//!
//! ```rust,ignore
//! use edumanager_server::features::shared::validation::{validate_email, validate_name};
//!
//! validate_name(&command.nome, 256)?;
//! validate_email(&command.email)?;
//! ```

use thiserror::Error;

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("Name is required and cannot be empty")]
    Required,

    #[error("Name must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors that can occur during email validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    #[error("Email is required and cannot be empty")]
    Required,

    #[error("Email '{0}' is not a valid address")]
    InvalidFormat(String),

    #[error("Email must be at most {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors that can occur during password validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    #[error("Password is required and cannot be empty")]
    Required,

    #[error("Password must be at most {max_length} characters")]
    TooLong { max_length: usize },
}

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_PASSWORD_LENGTH: usize = 512;

/// Validate a name field
///
/// Must not be empty after trimming and must fit in `max_length` characters.
pub fn validate_name(name: &str, max_length: usize) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Required);
    }

    if name.chars().count() > max_length {
        return Err(NameValidationError::TooLong { max_length });
    }

    Ok(())
}

/// Validate an account email
///
/// Only the shape `local@domain` is checked; deliverability is not.
pub fn validate_email(email: &str) -> Result<(), EmailValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(EmailValidationError::Required);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(EmailValidationError::TooLong {
            max_length: MAX_EMAIL_LENGTH,
        });
    }

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(())
        },
        _ => Err(EmailValidationError::InvalidFormat(email.to_string())),
    }
}

pub fn validate_password(password: &str) -> Result<(), PasswordValidationError> {
    if password.is_empty() {
        return Err(PasswordValidationError::Required);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordValidationError::TooLong {
            max_length: MAX_PASSWORD_LENGTH,
        });
    }

    Ok(())
}
