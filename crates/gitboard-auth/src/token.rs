//! JWT access/refresh token issuance and verification.
//!
//! Both token kinds are HS256-signed with separate secrets. The access token
//! is short-lived (15 minutes by default) and the refresh token long-lived
//! (7 days). Neither is stored server-side; a token is valid iff its
//! signature checks out and its `exp` claim is in the future.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;
use crate::user::User;

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub exp: i64,
}

/// The pair handed out at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Secrets and lifetimes for the token service.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    validation: Validation,
}

impl TokenService {
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is the contract; no leeway window.
        validation.leeway = 0;

        Self {
            access_encoding: EncodingKey::from_secret(settings.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
            validation,
        }
    }

    /// Issue a fresh access/refresh pair for a user, e.g. at login.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let base = Claims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            exp: 0,
        };

        let access_token = encode(
            &Header::default(),
            &Claims {
                exp: now + self.access_ttl_secs as i64,
                ..base.clone()
            },
            &self.access_encoding,
        )?;
        let refresh_token = encode(
            &Header::default(),
            &Claims {
                exp: now + self.refresh_ttl_secs as i64,
                ..base
            },
            &self.refresh_encoding,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Issue a new access token from verified refresh-token claims.
    pub fn issue_access(&self, claims: &Claims) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = encode(
            &Header::default(),
            &Claims {
                sub: claims.sub,
                username: claims.username.clone(),
                email: claims.email.clone(),
                exp: now + self.access_ttl_secs as i64,
            },
            &self.access_encoding,
        )?;
        Ok(token)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.access_decoding, &self.validation)?;
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidRefreshToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TokenSettings {
        TokenSettings {
            access_secret: "access-test-secret".into(),
            refresh_secret: "refresh-test-secret".into(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
        }
    }

    fn user() -> User {
        User::new("alice", "alice@example.com", "hash")
    }

    #[test]
    fn issued_access_token_verifies() {
        let service = TokenService::new(&settings());
        let pair = service.issue_pair(&user()).unwrap();

        let claims = service.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn refresh_token_is_not_a_valid_access_token() {
        let service = TokenService::new(&settings());
        let pair = service.issue_pair(&user()).unwrap();

        assert!(service.verify_access(&pair.refresh_token).is_err());
        assert!(service.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let mut cfg = settings();
        cfg.access_ttl_secs = 0;
        let service = TokenService::new(&cfg);
        let pair = service.issue_pair(&user()).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(service.verify_access(&pair.access_token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service = TokenService::new(&settings());
        let other = TokenService::new(&TokenSettings {
            access_secret: "something-else".into(),
            ..settings()
        });

        let pair = other.issue_pair(&user()).unwrap();
        assert!(service.verify_access(&pair.access_token).is_err());
    }

    #[test]
    fn refreshed_access_token_keeps_identity() {
        let service = TokenService::new(&settings());
        let pair = service.issue_pair(&user()).unwrap();

        let claims = service.verify_refresh(&pair.refresh_token).unwrap();
        let access = service.issue_access(&claims).unwrap();
        let verified = service.verify_access(&access).unwrap();
        assert_eq!(verified.sub, claims.sub);
        assert_eq!(verified.username, "alice");
    }
}
