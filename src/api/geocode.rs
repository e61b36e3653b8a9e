use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::{climate::Place, controller::AppState};

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub results: Vec<Place>,
}

/// GET /api/geocode?q= - Place search for custom zones
pub async fn search_places(
    State(st): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let Query(query) = query?;
    let results = st.advisor.search_places(&query.q).await?;
    Ok(Json(GeocodeResponse { results }))
}
