//! Purging of published videos.

use algoviz_models::{CleanupAllResponse, CleanupResponse, RenderId};
use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Delete one published video directory.
pub async fn cleanup_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<CleanupResponse>> {
    let id = RenderId::parse(video_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    if !state.store.remove(&id).await? {
        return Err(ApiError::not_found("Video not found"));
    }

    Ok(Json(CleanupResponse {
        message: "Video cleaned up successfully".to_string(),
        video_id: id.to_string(),
    }))
}

/// Delete every published video directory.
pub async fn cleanup_all(State(state): State<AppState>) -> ApiResult<Json<CleanupAllResponse>> {
    let count = state.store.remove_all().await?;
    info!(count, "Purged published videos");

    Ok(Json(CleanupAllResponse {
        message: format!("Cleaned up {} videos", count),
        count,
    }))
}
