use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, EpisodeDto, ShowDto, auth::current_user};
use crate::models::episode::Episode;

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub show: String,
}

/// GET /shows
///
/// The user's subscriptions, each with its next upcoming episode when
/// one is known.
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ShowDto>>>, ApiError> {
    let user = current_user(&state, &session).await?;
    let today = Utc::now().date_naive();

    let shows = state.subscription_service.subscribed_shows(&user).await?;

    let mut dtos = Vec::with_capacity(shows.len());
    for show in shows {
        let next = state.episode_service.next_episode(show.id, today).await?;
        let mut dto = ShowDto::from(show);
        dto.next_episode = next.map(|ep| {
            let episode = Episode {
                show_id: dto.id,
                show_name: dto.name.clone(),
                season: ep.season,
                num: ep.num,
                title: ep.title,
                airdate: ep.airdate,
            };
            EpisodeDto::from_episode(&episode, &user.link_format)
        });
        dtos.push(dto);
    }

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /shows
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<ApiResponse<ShowDto>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let show = state
        .subscription_service
        .subscribe(&user, &payload.show)
        .await?;

    Ok(Json(ApiResponse::success(ShowDto::from(show))))
}

/// GET /shows/{id}/banner
pub async fn banner(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let _user = current_user(&state, &session).await?;

    let bytes = state.subscription_service.banner(&id).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/jpeg")],
        bytes,
    )
        .into_response())
}

/// DELETE /shows/{id}
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = current_user(&state, &session).await?;

    state.subscription_service.unsubscribe(&user, &id).await?;

    Ok(Json(ApiResponse::success(())))
}
