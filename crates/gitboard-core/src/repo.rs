//! Normalized GitHub repository records.
//!
//! The GitHub search API returns nullable and occasionally missing fields;
//! normalization happens at deserialization time so every consumer sees the
//! same defaults: `description` null -> `""`, `language` null -> `"Unknown"`,
//! `forks_count` missing -> `0`.

use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel used when the upstream record carries no language.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Owner reference embedded in a repository record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    pub avatar_url: String,
}

/// A normalized repository record from the GitHub search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default = "unknown_language", deserialize_with = "nullable_language")]
    pub language: String,
    pub owner: RepoOwner,
}

fn unknown_language() -> String {
    UNKNOWN_LANGUAGE.to_string()
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_language<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_language))
}
