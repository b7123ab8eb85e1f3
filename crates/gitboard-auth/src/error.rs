use gitboard_store::StoreError;
use thiserror::Error;

/// Errors from the account and token services.
///
/// Each variant knows its HTTP status and, where one input is to blame, the
/// offending field name so the API layer can return a field-scoped message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already exists")]
    UsernameTaken,

    #[error("email already registered")]
    EmailTaken,

    #[error("email is not registered")]
    EmailNotRegistered,

    #[error("verification code invalid or expired")]
    CodeInvalidOrExpired,

    #[error("verification code is incorrect")]
    CodeMismatch,

    #[error("verification code requested too frequently")]
    CodeTooFrequent,

    #[error("refresh token invalid or expired")]
    InvalidRefreshToken,

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AuthError {
    /// HTTP status this error maps to at the API boundary.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::InvalidRefreshToken => 401,
            Self::UsernameTaken | Self::EmailTaken => 409,
            Self::EmailNotRegistered => 404,
            Self::CodeInvalidOrExpired | Self::CodeMismatch => 400,
            Self::CodeTooFrequent => 429,
            Self::Token(_) | Self::PasswordHash(_) | Self::Storage(_) => 500,
        }
    }

    /// The offending input field, when the error can be pinned to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::UsernameTaken => Some("username"),
            Self::EmailTaken | Self::EmailNotRegistered => Some("email"),
            Self::CodeInvalidOrExpired | Self::CodeMismatch => Some("code"),
            _ => None,
        }
    }

    /// Internal errors are masked at the API boundary; details go to logs.
    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_api_contract() {
        assert_eq!(AuthError::InvalidCredentials.status(), 401);
        assert_eq!(AuthError::UsernameTaken.status(), 409);
        assert_eq!(AuthError::EmailNotRegistered.status(), 404);
        assert_eq!(AuthError::CodeMismatch.status(), 400);
        assert_eq!(AuthError::CodeTooFrequent.status(), 429);
        assert_eq!(AuthError::InvalidRefreshToken.status(), 401);
    }

    #[test]
    fn field_hints_cover_field_scoped_errors() {
        assert_eq!(AuthError::UsernameTaken.field(), Some("username"));
        assert_eq!(AuthError::EmailTaken.field(), Some("email"));
        assert_eq!(AuthError::CodeMismatch.field(), Some("code"));
        assert_eq!(AuthError::InvalidCredentials.field(), None);
    }

    #[test]
    fn storage_errors_are_internal() {
        let err = AuthError::Storage(StoreError::unavailable("down"));
        assert!(err.is_internal());
        assert_eq!(err.status(), 500);
    }
}
