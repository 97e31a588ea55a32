use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, ProfileDto, auth::current_user};
use crate::services::users::ProfileUpdate;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub days_back: Option<i32>,
    pub date_offset: Option<i32>,
    pub link_format: Option<String>,
    pub site_news: Option<bool>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current: String,
    pub new: String,
    pub verify: String,
}

#[derive(Serialize)]
pub struct FeedTokenResponse {
    pub token: String,
}

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let user = current_user(&state, &session).await?;
    Ok(Json(ApiResponse::success(ProfileDto::from(user))))
}

/// PUT /profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let updated = state
        .user_service
        .update_profile(
            &user,
            ProfileUpdate {
                mail: payload.email,
                days_back: payload.days_back,
                date_offset: payload.date_offset,
                link_format: payload.link_format,
                site_news: payload.site_news,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(ProfileDto::from(updated))))
}

/// PUT /profile/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = current_user(&state, &session).await?;

    state
        .user_service
        .change_password(&user, &payload.current, &payload.new, &payload.verify)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

/// POST /profile/token
///
/// Issues a fresh feed token; every previously handed-out feed URL stops
/// working.
pub async fn reset_feed_token(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<FeedTokenResponse>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let token = state.user_service.reset_feed_token(&user).await?;

    Ok(Json(ApiResponse::success(FeedTokenResponse { token })))
}
