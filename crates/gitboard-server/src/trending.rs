//! Cache-aside orchestration for the trending feed.
//!
//! Read path: serve from the store when a category entry exists, otherwise
//! fetch live and populate the store in a detached task. Store errors are
//! treated exactly like misses and never reach the caller; a failed fetch
//! degrades to an empty list rather than an error.
//!
//! Concurrent misses on the same category each fetch independently; there
//! is no single-flight de-duplication. The daily refresh keeps the cache
//! warm enough that duplicate fetches stay rare.

use std::sync::Arc;

use futures_util::future::join_all;
use gitboard_core::GithubRepo;
use gitboard_store::{KvStore, StoreError};

use crate::config::{CategoryConfig, GithubConfig};
use crate::github::SearchClient;

pub fn cache_key(category: &str) -> String {
    format!("github:{category}")
}

pub struct TrendingService {
    client: SearchClient,
    store: KvStore,
    cache_ttl_secs: u64,
    categories: Vec<CategoryConfig>,
}

impl TrendingService {
    pub fn new(client: SearchClient, store: KvStore, cfg: &GithubConfig) -> Self {
        Self {
            client,
            store,
            cache_ttl_secs: cfg.cache_ttl_secs,
            categories: cfg.categories.clone(),
        }
    }

    /// The configured categories, in config order. The first one is the
    /// default for requests that omit the `type` parameter.
    pub fn categories(&self) -> &[CategoryConfig] {
        &self.categories
    }

    pub fn find_category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Read a category, cache first. Never fails: upstream trouble shows up
    /// as an empty list, which callers treat as degraded mode.
    pub async fn get_repo_list(&self, category: &CategoryConfig) -> Vec<GithubRepo> {
        let key = cache_key(&category.name);

        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<GithubRepo>>(&raw) {
                Ok(repos) => {
                    tracing::debug!(category = %category.name, "cache hit");
                    return repos;
                }
                Err(e) => {
                    tracing::warn!(category = %category.name, error = %e, "malformed cache entry, treating as miss");
                }
            },
            Ok(None) => {
                tracing::debug!(category = %category.name, "cache miss");
            }
            Err(e) => {
                tracing::warn!(category = %category.name, error = %e, "cache read failed, treating as miss");
            }
        }

        match self.client.search(&category.query).await {
            Ok(repos) => {
                // Populate the cache off the request path; a failed write is
                // logged by the task and nothing more.
                let store = self.store.clone();
                let name = category.name.clone();
                let ttl = self.cache_ttl_secs;
                let to_cache = repos.clone();
                tokio::spawn(async move {
                    if let Err(e) = write_category(&store, &name, &to_cache, ttl).await {
                        tracing::warn!(category = %name, error = %e, "cache write failed");
                    }
                });
                repos
            }
            Err(e) => {
                tracing::error!(category = %category.name, error = %e, "upstream fetch failed, serving empty list");
                Vec::new()
            }
        }
    }

    /// Cache a category's repos. Empty lists are skipped so a bad upstream
    /// response never overwrites a previously good entry.
    pub async fn cache_repos(
        &self,
        category: &str,
        repos: &[GithubRepo],
    ) -> Result<(), StoreError> {
        write_category(&self.store, category, repos, self.cache_ttl_secs).await
    }

    /// Refresh every configured category, concurrently and independently.
    /// One category failing (or coming back empty) does not touch the
    /// others. Pure side effect; nothing is returned.
    pub async fn refresh_all(&self) {
        let jobs = self.categories.iter().map(|category| async move {
            match self.client.search(&category.query).await {
                Ok(repos) if repos.is_empty() => {
                    tracing::info!(category = %category.name, "refresh fetched no data, keeping existing cache");
                }
                Ok(repos) => {
                    match self.cache_repos(&category.name, &repos).await {
                        Ok(()) => {
                            tracing::info!(category = %category.name, count = repos.len(), "refreshed category cache");
                        }
                        Err(e) => {
                            tracing::warn!(category = %category.name, error = %e, "cache write failed during refresh");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(category = %category.name, error = %e, "category refresh failed");
                }
            }
        });
        join_all(jobs).await;
    }
}

async fn write_category(
    store: &KvStore,
    category: &str,
    repos: &[GithubRepo],
    ttl_secs: u64,
) -> Result<(), StoreError> {
    if repos.is_empty() {
        return Ok(());
    }
    let raw = serde_json::to_string(repos).map_err(|e| StoreError::backend(e.to_string()))?;
    store.set_ex(&cache_key(category), &raw, ttl_secs).await
}

/// Shared handle used by the router and the scheduler.
pub type SharedTrending = Arc<TrendingService>;
