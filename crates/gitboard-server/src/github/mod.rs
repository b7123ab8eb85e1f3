//! External data source adapter for the GitHub search API.
//!
//! Purely functional apart from the network call: build a category-specific
//! query, issue one request, validate the response shape. Retries are the
//! caller's business.

pub mod client;
pub mod types;

pub use client::SearchClient;
pub use types::SearchResponse;

use thiserror::Error;

/// Failure to fetch or decode upstream data.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("GitHub API error [{status}]: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid adapter configuration: {0}")]
    Config(String),
}
