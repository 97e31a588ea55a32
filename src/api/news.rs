use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, NewsDto, auth::current_user};

/// GET /news
///
/// Site announcements, newest first. Reading marks the latest item as
/// seen for this user.
pub async fn list_news(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<NewsDto>>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let items = state.store.list_news().await?;

    if let Some(latest) = items.first() {
        if user.latest_news_read != Some(latest.id) {
            state
                .store
                .update_user_profile(&user.name, None, None, None, None, None, Some(latest.id))
                .await?;
        }
    }

    Ok(Json(ApiResponse::success(
        items.into_iter().map(NewsDto::from).collect(),
    )))
}
