use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use gitboard_core::{ApiResponse, GithubRepo};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(rename = "type")]
    pub list_type: Option<String>,
}

/// `GET /api/github/trending/list?type=<category>`
///
/// Omitting `type` selects the first configured category (`trending` with
/// the default config); an unconfigured value is a 400.
pub async fn trending_list(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<ApiResponse<Vec<GithubRepo>>>, ApiError> {
    let category = match query.list_type.as_deref() {
        Some(name) => state
            .trending
            .find_category(name)
            .ok_or_else(|| ApiError::validation("Invalid type param"))?,
        None => state
            .trending
            .categories()
            .first()
            .ok_or_else(|| ApiError::validation("no categories configured"))?,
    };

    let repos = state.trending.get_repo_list(category).await;
    Ok(Json(ApiResponse::ok(repos)))
}
