//! Wire types for the GitHub search API.

use gitboard_core::GithubRepo;
use serde::Deserialize;

/// Body of `GET /search/repositories`. Only the fields we consume; item
/// normalization (null description/language, missing fork count) happens in
/// `GithubRepo`'s deserializer.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    pub items: Vec<GithubRepo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_search_body() {
        let raw = r#"{
            "total_count": 1,
            "incomplete_results": false,
            "items": [{
                "id": 5,
                "name": "demo",
                "full_name": "acme/demo",
                "html_url": "https://github.com/acme/demo",
                "description": null,
                "stargazers_count": 12,
                "language": null,
                "owner": { "login": "acme", "avatar_url": "https://example.com/a.png" }
            }]
        }"#;

        let body: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.total_count, 1);
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].description, "");
        assert_eq!(body.items[0].language, "Unknown");
        assert_eq!(body.items[0].forks_count, 0);
    }

    #[test]
    fn missing_items_is_a_decode_error() {
        let err = serde_json::from_str::<SearchResponse>(r#"{"total_count": 0}"#);
        assert!(err.is_err());
    }
}
