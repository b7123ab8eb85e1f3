//! Gitboard HTTP server.
//!
//! The interesting part is the cache-aside pipeline for GitHub trending
//! data: `github` fetches from the search API, `trending` serves reads from
//! the key-value store and falls back to live fetches, and `jobs` refreshes
//! every configured category on a daily schedule. The `routes` module adds
//! the account endpoints on top.

pub mod config;
pub mod error;
pub mod github;
pub mod jobs;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod server;
pub mod trending;

pub use config::AppConfig;
pub use error::ApiError;
pub use observability::{init_tracing, init_tracing_with_level};
pub use server::{AppState, build_app, build_app_with_state};
pub use trending::TrendingService;
