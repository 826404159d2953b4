//! Problem analysis handler.

use algoviz_models::{AnalyzeRequest, AnalyzeResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;
use validator::Validate;

use crate::error::ApiResult;
use crate::state::AppState;

/// Propose solution approaches for a DSA question.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(mut request) = payload?;
    request.question = request.question.trim().to_string();
    request.validate()?;

    info!(question_chars = request.question.len(), "Analyzing question");
    let analysis = state.analyzer.analyze(&request.question).await?;

    Ok(Json(AnalyzeResponse {
        question: request.question,
        title: analysis.title,
        approaches: analysis.approaches,
    }))
}
