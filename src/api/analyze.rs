use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;

use super::{error::ApiError, response::ApiResponse};
use crate::controller::{AnalysisReport, AnalysisRequest, AppState};

/// POST /api/analyze - Climate metrics, charts and an energy suggestion
pub async fn analyze(
    State(st): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<ApiResponse<AnalysisReport>, ApiError> {
    let started = Instant::now();
    let Json(request) = payload?;

    let analysis = st.advisor.analyze(&request).await?;

    Ok(ApiResponse::success(analysis.report)
        .with_cached(analysis.cached)
        .with_duration(started.elapsed().as_millis() as u64))
}
