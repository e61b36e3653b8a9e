use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use super::error::ApiError;
use crate::controller::{AnalysisRequest, AppState};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// POST /api/export-csv - Daily climate rows as a CSV download
pub async fn export_csv(
    State(st): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let export = st.advisor.export_csv(&request).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.file_name
    ))
    .map_err(|e| ApiError::InternalError(format!("invalid file name: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}
