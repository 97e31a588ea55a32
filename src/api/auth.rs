use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::entities::users;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub name: String,
}

/// Session-based authentication for the interactive API. Feed access is
/// token-based and goes through the public feed routes instead.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(user)) = session.get::<String>("user").await {
        tracing::Span::current().record("user_id", &user);
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.name.is_empty() {
        return Err(ApiError::validation("User name is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .user_service
        .authenticate(&payload.name, &payload.password)
        .await
        .map_err(|e| match e {
            // Do not reveal which half of the credentials was wrong,
            // not even in the log.
            crate::services::users::UserError::NoSuchUser
            | crate::services::users::UserError::WrongPassword => {
                tracing::info!("Login failed");
                ApiError::unauthorized("Invalid credentials")
            }
            other => other.into(),
        })?;

    session
        .insert("user", &user.name)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(LoginResponse { name: user.name })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// Resolve the session to a full user record. The account may have been
/// deleted since the session was issued.
pub async fn current_user(
    state: &AppState,
    session: &Session,
) -> Result<users::Model, ApiError> {
    let name = session
        .get::<String>("user")
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    state
        .store
        .get_user(&name)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))
}
