//! Narrated animation handler.

use algoviz_models::{AnimationRequest, AnimationResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Render, narrate and publish a video for one approach.
///
/// Runs the whole pipeline inside the request. If the client disconnects
/// the job future is dropped and its transient files are removed.
pub async fn get_animation(
    State(state): State<AppState>,
    payload: Result<Json<AnimationRequest>, JsonRejection>,
) -> ApiResult<Json<AnimationResponse>> {
    let Json(request) = payload?;
    let approach = request
        .approach
        .ok_or_else(|| ApiError::bad_request("approach is required"))?;
    approach
        .check()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    info!(approach = %approach.title, "Animation requested");
    let outcome = state.coordinator.run(&approach).await?;

    Ok(Json(AnimationResponse {
        video_url: outcome.video_url,
    }))
}
