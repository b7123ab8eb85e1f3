//! The account service: register, login, refresh, reset password, and
//! verification-code issuance.

use std::sync::Arc;

use gitboard_core::{
    LoginRequest, RegisterRequest, ResetPasswordRequest, SendCodeRequest, VerificationScene,
};
use gitboard_store::KvStore;

use crate::codes::{self, CODE_COOLDOWN_SECS, CODE_TTL_SECS};
use crate::error::AuthError;
use crate::password;
use crate::token::{TokenPair, TokenService};
use crate::user::{User, UserStore};

pub struct AccountService {
    users: Arc<dyn UserStore>,
    store: KvStore,
    tokens: Arc<TokenService>,
    /// When true, issued verification codes are logged instead of mailed.
    log_codes: bool,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        store: KvStore,
        tokens: Arc<TokenService>,
        log_codes: bool,
    ) -> Self {
        Self {
            users,
            store,
            tokens,
            log_codes,
        }
    }

    /// Create an account. Requires a valid REGISTER verification code, which
    /// is consumed on success.
    pub async fn register(&self, req: &RegisterRequest) -> Result<(), AuthError> {
        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let verify_key = codes::verify_key(VerificationScene::Register, &req.email);
        self.consume_code(&verify_key, &req.code).await?;

        let hash = password::hash_password(&req.password)?;
        self.users
            .insert(User::new(&req.username, &req.email, hash))
            .await?;

        tracing::info!(username = %req.username, "account registered");
        Ok(())
    }

    /// Authenticate by username or email. Unknown accounts and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn login(&self, req: &LoginRequest) -> Result<TokenPair, AuthError> {
        let user = self
            .users
            .find_by_account(&req.account)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(&req.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens.issue_pair(&user)
    }

    /// Exchange a refresh token for a fresh access token. The refresh token
    /// itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;
        self.tokens.issue_access(&claims)
    }

    /// Set a new password for the account with this email. Requires a valid
    /// RESET_PASSWORD verification code, consumed on success.
    pub async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), AuthError> {
        let verify_key = codes::verify_key(VerificationScene::ResetPassword, &req.email);
        self.consume_code(&verify_key, &req.code).await?;

        let hash = password::hash_password(&req.password)?;
        if !self.users.update_password(&req.email, hash).await? {
            return Err(AuthError::EmailNotRegistered);
        }

        tracing::info!(email = %req.email, "password reset");
        Ok(())
    }

    /// Issue a verification code for a scene, subject to the per-(scene,
    /// email) cooldown. At most one code is active per pair: issuing again
    /// after the cooldown overwrites the previous code.
    pub async fn send_code(&self, req: &SendCodeRequest) -> Result<(), AuthError> {
        match req.scene {
            VerificationScene::Register => {
                if self.users.find_by_email(&req.email).await?.is_some() {
                    return Err(AuthError::EmailTaken);
                }
            }
            VerificationScene::ResetPassword => {
                if self.users.find_by_email(&req.email).await?.is_none() {
                    return Err(AuthError::EmailNotRegistered);
                }
            }
            VerificationScene::Login | VerificationScene::BindEmail => {}
        }

        let limit_key = codes::limit_key(req.scene, &req.email);
        let acquired = self
            .store
            .set_nx_ex(&limit_key, "1", CODE_COOLDOWN_SECS)
            .await?;
        if !acquired {
            return Err(AuthError::CodeTooFrequent);
        }

        let code = codes::generate_code();
        let verify_key = codes::verify_key(req.scene, &req.email);
        self.store.set_ex(&verify_key, &code, CODE_TTL_SECS).await?;

        if self.log_codes {
            tracing::info!(email = %req.email, scene = %req.scene, code = %code, "mock verification mail");
        }
        Ok(())
    }

    /// Check a submitted code against the stored one and delete it on match.
    async fn consume_code(&self, verify_key: &str, submitted: &str) -> Result<(), AuthError> {
        let stored = self
            .store
            .get(verify_key)
            .await?
            .ok_or(AuthError::CodeInvalidOrExpired)?;
        if stored != submitted {
            return Err(AuthError::CodeMismatch);
        }

        // Single-use: a failed delete only widens the reuse window until the
        // TTL fires, so log and continue.
        if let Err(e) = self.store.del(verify_key).await {
            tracing::warn!(error = %e, "failed to delete consumed verification code");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenSettings;
    use crate::user::MemoryUserStore;

    fn service() -> AccountService {
        let tokens = TokenService::new(&TokenSettings {
            access_secret: "access-test-secret".into(),
            refresh_secret: "refresh-test-secret".into(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
        });
        AccountService::new(
            Arc::new(MemoryUserStore::new()),
            KvStore::memory(),
            Arc::new(tokens),
            false,
        )
    }

    fn register_req(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: "secret1".into(),
            email: email.into(),
            code: "123456".into(),
        }
    }

    async fn seed_code(svc: &AccountService, scene: VerificationScene, email: &str, code: &str) {
        svc.store
            .set_ex(&codes::verify_key(scene, email), code, CODE_TTL_SECS)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_then_login() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "123456").await;
        svc.register(&register_req("alice", "a@b.io")).await.unwrap();

        let pair = svc
            .login(&LoginRequest {
                account: "alice".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert!(!pair.access_token.is_empty());

        // login by email works too
        svc.login(&LoginRequest {
            account: "a@b.io".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn register_without_code_fails() {
        let svc = service();
        let err = svc
            .register(&register_req("alice", "a@b.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CodeInvalidOrExpired));
    }

    #[tokio::test]
    async fn register_with_wrong_code_fails() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "654321").await;
        let err = svc
            .register(&register_req("alice", "a@b.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CodeMismatch));
    }

    #[tokio::test]
    async fn verification_code_is_single_use() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "123456").await;
        svc.register(&register_req("alice", "a@b.io")).await.unwrap();

        seed_code(&svc, VerificationScene::Register, "c@d.io", "123456").await;
        svc.register(&register_req("bob", "c@d.io")).await.unwrap();

        // the first code is gone; a third registration reusing it fails
        let err = svc
            .register(&register_req("carol", "a@b.io"))
            .await
            .unwrap_err();
        // duplicate-email check fires first for a@b.io, so use a fresh email
        assert!(matches!(err, AuthError::EmailTaken));
        let err = svc
            .register(&register_req("carol", "e@f.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CodeInvalidOrExpired));
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_field_scoped() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "123456").await;
        svc.register(&register_req("alice", "a@b.io")).await.unwrap();

        let err = svc
            .register(&register_req("alice", "other@b.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(err.field(), Some("username"));

        let err = svc
            .register(&register_req("bob", "a@b.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.field(), Some("email"));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_account_look_identical() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "123456").await;
        svc.register(&register_req("alice", "a@b.io")).await.unwrap();

        let wrong_password = svc
            .login(&LoginRequest {
                account: "alice".into(),
                password: "not-it".into(),
            })
            .await
            .unwrap_err();
        let unknown_account = svc
            .login(&LoginRequest {
                account: "nobody".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_account, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_issues_new_access_token() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "123456").await;
        svc.register(&register_req("alice", "a@b.io")).await.unwrap();
        let pair = svc
            .login(&LoginRequest {
                account: "alice".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        let access = svc.refresh(&pair.refresh_token).await.unwrap();
        assert!(svc.tokens.verify_access(&access).is_ok());

        let err = svc.refresh("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn send_code_respects_cooldown() {
        let svc = service();
        let req = SendCodeRequest {
            scene: VerificationScene::Register,
            email: "new@b.io".into(),
        };

        svc.send_code(&req).await.unwrap();
        let err = svc.send_code(&req).await.unwrap_err();
        assert!(matches!(err, AuthError::CodeTooFrequent));

        // the first code is still the active one
        let key = codes::verify_key(VerificationScene::Register, "new@b.io");
        assert!(svc.store.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn send_code_scene_checks() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "123456").await;
        svc.register(&register_req("alice", "a@b.io")).await.unwrap();

        let err = svc
            .send_code(&SendCodeRequest {
                scene: VerificationScene::Register,
                email: "a@b.io".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let err = svc
            .send_code(&SendCodeRequest {
                scene: VerificationScene::ResetPassword,
                email: "missing@b.io".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailNotRegistered));
    }

    #[tokio::test]
    async fn reset_password_flow() {
        let svc = service();
        seed_code(&svc, VerificationScene::Register, "a@b.io", "123456").await;
        svc.register(&register_req("alice", "a@b.io")).await.unwrap();

        seed_code(&svc, VerificationScene::ResetPassword, "a@b.io", "222333").await;
        svc.reset_password(&ResetPasswordRequest {
            email: "a@b.io".into(),
            code: "222333".into(),
            password: "brand-new".into(),
        })
        .await
        .unwrap();

        // old password no longer works, new one does
        assert!(
            svc.login(&LoginRequest {
                account: "alice".into(),
                password: "secret1".into(),
            })
            .await
            .is_err()
        );
        svc.login(&LoginRequest {
            account: "alice".into(),
            password: "brand-new".into(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn reset_password_for_unknown_email() {
        let svc = service();
        seed_code(&svc, VerificationScene::ResetPassword, "ghost@b.io", "222333").await;
        let err = svc
            .reset_password(&ResetPasswordRequest {
                email: "ghost@b.io".into(),
                code: "222333".into(),
                password: "whatever1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailNotRegistered));
    }
}
