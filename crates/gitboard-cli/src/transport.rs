//! Authenticated request pipeline.
//!
//! Every request attaches the stored access token as a bearer credential.
//! A 401 from any endpoint other than login/refresh triggers one token
//! refresh and one replay of the original request. Refreshes are
//! single-flight per transport: concurrent 401s either join the in-flight
//! refresh (queued on a oneshot) or, if the stored token already changed
//! under them, just replay with it. A refresh that itself fails ends the
//! session: queued requests are rejected, both tokens are cleared, and the
//! credentials file is removed.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, oneshot};

use gitboard_core::ApiResponse;

use crate::auth::{self, StoredCredentials};
use crate::output;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REFRESH_PATH: &str = "/api/auth/refresh";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error envelope.
    #[error("{message}")]
    Api {
        code: u16,
        message: String,
        field: Option<String>,
    },

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("not logged in; run `gitboard login` first")]
    NotLoggedIn,

    #[error("unexpected response from server: {0}")]
    Decode(String),
}

impl TransportError {
    /// Errors the transport has already surfaced to the user; `main` should
    /// not print them a second time.
    pub fn already_displayed(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::SessionExpired)
    }
}

/// Per-request options. `silent` skips the generic error printout for
/// callers that render the failure themselves; retry and logout behavior is
/// unaffected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    pub silent: bool,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

enum RefreshState {
    Idle,
    /// A refresh is in flight; waiters receive the new access token or a
    /// rejection.
    Refreshing(Vec<oneshot::Sender<Result<String, ()>>>),
}

pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    profile: String,
    tokens: Mutex<Option<TokenPair>>,
    refresh_state: Mutex<RefreshState>,
}

impl Transport {
    /// Build a transport, loading any stored credentials for the profile.
    pub fn new(server: &str, profile: &str) -> Result<Self, TransportError> {
        let tokens = auth::load_credentials(profile)
            .ok()
            .flatten()
            .map(|creds| TokenPair {
                access_token: creds.access_token,
                refresh_token: creds.refresh_token,
            });
        Self::with_tokens(server, profile, tokens)
    }

    /// Build a transport with explicit tokens (used right after login).
    pub fn with_tokens(
        server: &str,
        profile: &str,
        tokens: Option<TokenPair>,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: server.trim_end_matches('/').to_string(),
            profile: profile.to_string(),
            tokens: Mutex::new(tokens),
            refresh_state: Mutex::new(RefreshState::Idle),
        })
    }

    pub async fn is_logged_in(&self) -> bool {
        self.tokens.lock().await.is_some()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        opts: RequestOptions,
    ) -> Result<ApiResponse<T>, TransportError> {
        self.request(Method::GET, path, query, None, opts).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        opts: RequestOptions,
    ) -> Result<ApiResponse<T>, TransportError> {
        self.request(Method::POST, path, &[], Some(body), opts).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        opts: RequestOptions,
    ) -> Result<ApiResponse<T>, TransportError> {
        let sent_with = self.access_token().await;
        let response = self
            .send_once(&method, path, query, body, sent_with.as_deref())
            .await?;

        // A 401 from login or refresh is terminal; everything else gets one
        // refresh-and-replay.
        let is_auth_endpoint = path == LOGIN_PATH || path == REFRESH_PATH;
        if response.status() == StatusCode::UNAUTHORIZED && !is_auth_endpoint {
            let token = self.refresh_access_token(sent_with.as_deref()).await?;
            let response = self
                .send_once(&method, path, query, body, Some(&token))
                .await?;
            return self.finish(response, opts).await;
        }

        self.finish(response, opts).await
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut req = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await
    }

    async fn finish<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        opts: RequestOptions,
    ) -> Result<ApiResponse<T>, TransportError> {
        let status = response.status();
        let body = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|_| TransportError::Decode(format!("HTTP {status}: {body}")))?;

        if !status.is_success() {
            if !opts.silent {
                output::print_error(&envelope.message);
            }
            return Err(TransportError::Api {
                code: envelope.code,
                message: envelope.message,
                field: envelope.field,
            });
        }
        Ok(envelope)
    }

    async fn access_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .await
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    /// Get a usable access token after a 401, performing at most one
    /// refresh call across all concurrent requests.
    ///
    /// `stale_token` is the token the failing request was sent with; when
    /// the stored token already differs, another request refreshed in the
    /// meantime and that token is returned as-is.
    async fn refresh_access_token(
        &self,
        stale_token: Option<&str>,
    ) -> Result<String, TransportError> {
        let waiter = {
            let mut state = self.refresh_state.lock().await;
            match &mut *state {
                RefreshState::Refreshing(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                RefreshState::Idle => {
                    // While holding the state lock: if the stored token has
                    // moved on since this request was sent, reuse it.
                    let current = self.access_token().await;
                    if let (Some(stale), Some(current)) = (stale_token, current) {
                        if stale != current {
                            return Ok(current);
                        }
                    }
                    *state = RefreshState::Refreshing(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(Ok(token)) => Ok(token),
                _ => Err(TransportError::SessionExpired),
            };
        }

        // This request leads the refresh.
        let outcome = self.do_refresh().await;

        let waiters = {
            let mut state = self.refresh_state.lock().await;
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing(waiters) => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        match &outcome {
            Ok(token) => {
                for waiter in waiters {
                    let _ = waiter.send(Ok(token.clone()));
                }
            }
            Err(e) => {
                for waiter in waiters {
                    let _ = waiter.send(Err(()));
                }
                if matches!(e, TransportError::SessionExpired) {
                    self.force_logout().await;
                }
            }
        }

        outcome
    }

    /// Call the refresh endpoint with the stored refresh token. Any failure
    /// here means the session is over.
    async fn do_refresh(&self) -> Result<String, TransportError> {
        let refresh_token = self
            .tokens
            .lock()
            .await
            .as_ref()
            .map(|pair| pair.refresh_token.clone());
        let Some(refresh_token) = refresh_token else {
            return Err(TransportError::NotLoggedIn);
        };

        let response = self
            .http
            .post(format!("{}{}", self.base_url, REFRESH_PATH))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|_| TransportError::SessionExpired)?;

        if !response.status().is_success() {
            return Err(TransportError::SessionExpired);
        }

        let envelope: ApiResponse<Value> = response
            .json()
            .await
            .map_err(|_| TransportError::SessionExpired)?;
        let access = envelope
            .data
            .as_ref()
            .and_then(|data| data.get("accessToken"))
            .and_then(Value::as_str)
            .ok_or(TransportError::SessionExpired)?
            .to_string();

        {
            let mut tokens = self.tokens.lock().await;
            if let Some(pair) = tokens.as_mut() {
                pair.access_token = access.clone();
            }
        }
        self.persist_tokens().await;

        Ok(access)
    }

    /// Write the current pair back to the credentials file.
    async fn persist_tokens(&self) {
        let tokens = self.tokens.lock().await;
        if let Some(pair) = tokens.as_ref() {
            let creds = StoredCredentials {
                server: self.base_url.clone(),
                access_token: pair.access_token.clone(),
                refresh_token: pair.refresh_token.clone(),
            };
            if let Err(e) = auth::save_credentials(&self.profile, &creds) {
                output::print_error(&format!("failed to save credentials: {e:#}"));
            }
        }
    }

    /// Clear both tokens and drop the credentials file. The session cannot
    /// be recovered without logging in again.
    async fn force_logout(&self) {
        *self.tokens.lock().await = None;
        if let Err(e) = auth::remove_credentials(&self.profile) {
            output::print_error(&format!("failed to remove credentials: {e:#}"));
        }
        output::print_error("session expired, please log in again");
    }
}
