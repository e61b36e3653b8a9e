use axum::{extract::State, Json};
use serde::Serialize;

use crate::{controller::AppState, domain::ZoneSummary};

#[derive(Debug, Serialize)]
pub struct ZonesResponse {
    pub zones: Vec<ZoneSummary>,
}

/// GET /api/zones - Predefined analysis zones
pub async fn list_zones(State(st): State<AppState>) -> Json<ZonesResponse> {
    Json(ZonesResponse {
        zones: st.advisor.zones(),
    })
}
