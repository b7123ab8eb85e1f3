use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use gitboard_auth::{AccountService, MemoryUserStore, TokenService, TokenSettings};
use gitboard_store::KvStore;

use crate::config::AppConfig;
use crate::github::SearchClient;
use crate::middleware as app_middleware;
use crate::routes;
use crate::trending::TrendingService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub trending: Arc<TrendingService>,
    pub accounts: Arc<AccountService>,
    pub tokens: Arc<TokenService>,
    pub store: KvStore,
}

impl AppState {
    /// Wire up stores and services from config.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let store = if cfg.redis.enabled {
            match KvStore::connect_redis(&cfg.redis.url, cfg.redis.pool_size) {
                Ok(store) => store,
                Err(e) => {
                    tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory store");
                    KvStore::memory()
                }
            }
        } else {
            KvStore::memory()
        };

        let tokens = Arc::new(TokenService::new(&TokenSettings {
            access_secret: cfg.auth.access_secret.clone(),
            refresh_secret: cfg.auth.refresh_secret().to_string(),
            access_ttl_secs: cfg.auth.access_ttl_secs,
            refresh_ttl_secs: cfg.auth.refresh_ttl_secs,
        }));

        let accounts = Arc::new(AccountService::new(
            Arc::new(MemoryUserStore::new()),
            store.clone(),
            tokens.clone(),
            !cfg.auth.is_production(),
        ));

        let client = SearchClient::new(&cfg.github)
            .map_err(|e| anyhow::anyhow!("github adapter init failed: {e}"))?;
        let trending = Arc::new(TrendingService::new(client, store.clone(), &cfg.github));

        Ok(Self {
            trending,
            accounts,
            tokens,
            store,
        })
    }
}

/// Assemble the router over prepared state.
pub fn build_app_with_state(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/reset-password", post(routes::auth::reset_password))
        .route("/send-code", post(routes::auth::send_code));

    let github_routes = Router::new()
        .route("/trending/list", get(routes::github::trending_list))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            app_middleware::require_auth,
        ));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/github", github_routes);

    Router::new()
        // Health and info endpoints
        .route("/", get(routes::system::root))
        .route("/healthz", get(routes::system::healthz))
        .route("/readyz", get(routes::system::readyz))
        .nest("/api", api)
        // Middleware stack (order: request id -> cors -> compression -> trace)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .with_state(state)
}

/// Build state and router from config in one step.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    Ok(build_app_with_state(AppState::from_config(cfg)?))
}
