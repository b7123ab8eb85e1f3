//! HTTP client for the GitHub search API.

use std::time::Duration;

use gitboard_core::GithubRepo;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use time::OffsetDateTime;

use crate::config::{CategoryQuery, GithubConfig};

use super::types::SearchResponse;
use super::UpstreamError;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for `GET /search/repositories`, with the required headers baked in.
pub struct SearchClient {
    http: reqwest::Client,
    api_base: String,
    per_page: u32,
}

impl SearchClient {
    pub fn new(cfg: &GithubConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent)
                .map_err(|e| UpstreamError::Config(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        if let Some(token) = &cfg.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| UpstreamError::Config(e.to_string()))?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(UpstreamError::Request)?;

        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            per_page: cfg.per_page,
        })
    }

    /// Run one search for a category. No retries; the caller decides how to
    /// recover.
    pub async fn search(&self, query: &CategoryQuery) -> Result<Vec<GithubRepo>, UpstreamError> {
        let q = build_query(query, OffsetDateTime::now_utc());
        let per_page = self.per_page.to_string();
        let url = format!("{}/search/repositories", self.api_base);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", q.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(UpstreamError::Decode)?;
        Ok(parsed.items)
    }
}

fn build_query(query: &CategoryQuery, now: OffsetDateTime) -> String {
    match query {
        CategoryQuery::RecentlyCreated { days } => {
            let since = now - time::Duration::days(i64::from(*days));
            format!(
                "created:>{:04}-{:02}-{:02}",
                since.year(),
                since.month() as u8,
                since.day()
            )
        }
        CategoryQuery::Topic { topic } => format!("topic:{topic}"),
    }
}
