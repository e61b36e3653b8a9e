use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::controller::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    message: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    advisor: ComponentHealth,
    cache: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ComponentHealth {
    fn healthy(detail: Option<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            detail,
        }
    }

    fn degraded(detail: String) -> Self {
        Self {
            status: "degraded".to_string(),
            detail: Some(detail),
        }
    }
}

/// GET /api/health - Health check endpoint
///
/// The service stays up without an AI key (suggestions fall back), so a
/// degraded advisor is reported but does not fail the check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let advisor = if state.advisor.recommender_configured() {
        ComponentHealth::healthy(None)
    } else {
        ComponentHealth::degraded("AI API key not configured; serving fallback suggestions".into())
    };

    let stats = state.advisor.cache_stats();
    let cache = ComponentHealth::healthy(Some(format!(
        "analysis {}/{}, climate {}/{}",
        stats.analysis.entries, stats.analysis.capacity, stats.climate.entries, stats.climate.capacity
    )));

    let response = HealthResponse {
        status: "ok".to_string(),
        message: "Energy Advisor Backend active".to_string(),
        timestamp: chrono::Utc::now(),
        checks: HealthChecks { advisor, cache },
    };

    (StatusCode::OK, Json(response))
}

/// GET /api/health/live - Liveness probe
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_health_healthy() {
        let health = ComponentHealth::healthy(None);
        assert_eq!(health.status, "healthy");
        assert!(health.detail.is_none());
    }

    #[test]
    fn test_component_health_degraded() {
        let health = ComponentHealth::degraded("no key".to_string());
        assert_eq!(health.status, "degraded");
        assert_eq!(health.detail, Some("no key".to_string()));
    }
}
