use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, EpisodeDto, auth::current_user};

/// GET /episodes
///
/// Recently aired episodes of the user's subscribed shows, oldest first.
/// The window is controlled by the `days_back` profile setting.
pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<EpisodeDto>>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let episodes = state
        .episode_service
        .relevant_episodes_today(&user)
        .await?;

    let dtos = episodes
        .iter()
        .map(|ep| EpisodeDto::from_episode(ep, &user.link_format))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}
