use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct RecoveryRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub key: String,
    pub password: String,
    pub verify: String,
}

/// POST /auth/register
///
/// Creates the account and mails a generated initial password.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .user_service
        .register(&payload.name, &payload.email)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Your account has been created; check your mail for the initial password"
            .to_string(),
    })))
}

/// POST /auth/recover
pub async fn request_recovery(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecoveryRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.user_service.request_recovery(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "A recovery link has been mailed to you".to_string(),
    })))
}

/// POST /auth/recover/reset
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .user_service
        .reset_password(
            &payload.email,
            &payload.key,
            &payload.password,
            &payload.verify,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Your password has been reset".to_string(),
    })))
}
