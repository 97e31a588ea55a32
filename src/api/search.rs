use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SearchResultDto};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /search?q=
///
/// Catalog search ordered by relevance. An unknown show is an empty
/// result list, not an error.
pub async fn search_shows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchResultDto>>>, ApiError> {
    let results = state.search_service.search(&query.q).await?;

    let dtos = results
        .into_iter()
        .map(|r| SearchResultDto {
            id: r.show.id,
            name: r.show.name,
            banner: r.show.banner,
            rating: r.rating,
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}
