//! Request DTOs and their validators.
//!
//! Validation is explicit: each DTO exposes `validate()` returning the first
//! failing field as a `ValidationError`, which the HTTP layer maps to a 400
//! envelope with the field hint. All string fields default to empty on
//! deserialization so a missing field reports the same way as a blank one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scenes a verification code can be issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationScene {
    Register,
    ResetPassword,
    Login,
    BindEmail,
}

impl fmt::Display for VerificationScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Register => "REGISTER",
            Self::ResetPassword => "RESET_PASSWORD",
            Self::Login => "LOGIN",
            Self::BindEmail => "BIND_EMAIL",
        };
        f.write_str(s)
    }
}

/// A validation failure pinned to a single input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_username(&self.username)?;
        check_password(&self.password)?;
        check_email(&self.email)?;
        check_code(&self.code)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.account.chars().count() < 3 || self.account.chars().count() > 30 {
            return Err(ValidationError::new(
                "account",
                "account must be 3 to 30 characters",
            ));
        }
        check_password(&self.password)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_email(&self.email)?;
        check_code(&self.code)?;
        check_password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeRequest {
    pub scene: VerificationScene,
    #[serde(default)]
    pub email: String,
}

impl SendCodeRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_email(&self.email)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

impl RefreshRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.refresh_token.is_empty() {
            return Err(ValidationError::new(
                "refreshToken",
                "refresh token is required",
            ));
        }
        Ok(())
    }
}

fn check_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < 3 {
        return Err(ValidationError::new(
            "username",
            "username must be at least 3 characters",
        ));
    }
    if len > 30 {
        return Err(ValidationError::new(
            "username",
            "username must be at most 30 characters",
        ));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 6 {
        return Err(ValidationError::new(
            "password",
            "password must be at least 6 characters",
        ));
    }
    Ok(())
}

fn check_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            "code",
            "verification code must be 6 digits",
        ));
    }
    Ok(())
}

/// Minimal well-formedness check: one `@`, a non-empty local part, and a
/// domain containing a dot. Full RFC 5322 parsing is deliberately out.
fn check_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::new("email", "email address is not valid");
    if email.is_empty() || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.len() < 3 || !domain.contains('.') || domain.contains('@') {
        return Err(invalid());
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}
