use axum::extract::State;

use super::response::ApiResponse;
use crate::controller::{AdvisorCacheStats, AppState};

/// GET /api/cache/stats - Hit, miss and eviction counters
pub async fn cache_stats(State(st): State<AppState>) -> ApiResponse<AdvisorCacheStats> {
    ApiResponse::success(st.advisor.cache_stats())
}
