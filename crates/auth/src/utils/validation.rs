//! Input validation for the login and registration forms.

use regex::Regex;

use crate::types::{LoginRequest, RegisterRequest, SessionError, SessionResult};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 255;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn invalid(message: &str) -> SessionError {
    SessionError::Validation(message.to_string())
}

/// Validate email format
pub fn validate_email(email: &str) -> SessionResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(invalid("Email is too long"));
    }

    let email_regex =
        Regex::new(EMAIL_PATTERN).map_err(|_| invalid("Invalid email regex"))?;
    if !email_regex.is_match(email) {
        return Err(invalid("Invalid email address"));
    }

    Ok(())
}

/// Validate password length requirements
pub fn validate_password(password: &str) -> SessionResult<()> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(SessionError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(SessionError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> SessionResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("Name is required"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(invalid("Name is too long"));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(invalid("Name contains invalid characters"));
    }

    Ok(())
}

/// The login form only checks presence; strength rules belong to registration.
pub fn validate_login(request: &LoginRequest) -> SessionResult<()> {
    validate_email(&request.email)?;

    if request.password.is_empty() {
        return Err(invalid("Password is required"));
    }

    Ok(())
}

pub fn validate_registration(request: &RegisterRequest) -> SessionResult<()> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    if request.password != request.confirm_password {
        return Err(invalid("Passwords must match"));
    }

    Ok(())
}
