//! Integration tests for the upstream HTTP clients using wiremock.

use chrono::NaiveDate;
use energy_advisor::climate::{
    ClimateError, ClimateSource, Geocoder, OpenMeteoClimateClient, OpenMeteoGeocoder,
};
use energy_advisor::domain::{ForecastWindow, ZoneCatalog};
use energy_advisor::recommend::{GeminiRecommender, RecommendError, Recommender};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn climate_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 25.77,
        "longitude": -80.19,
        "daily": {
            "time": ["2026-07-01", "2026-07-02", "2026-07-03"],
            "temperature_2m_mean": [28.1, 29.4, null],
            "temperature_2m_max": [33.0, 36.2, 31.5],
            "relative_humidity_2m_mean": [70.0, 65.0, 72.0],
            "shortwave_radiation_sum": [22.5, 24.0, 18.0],
            "cloud_cover_mean": [30.0, 55.0, 20.0],
            "wind_speed_10m_mean": [12.0, 9.5, 14.1]
        }
    })
}

fn climate_client(server: &MockServer) -> OpenMeteoClimateClient {
    OpenMeteoClimateClient::new(
        format!("{}/v1/climate", server.uri()),
        "MRI_AGCM3_2_S".to_string(),
        5,
    )
    .unwrap()
}

fn window() -> ForecastWindow {
    ForecastWindow::starting(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), 7)
}

#[tokio::test]
async fn test_climate_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/climate"))
        .and(query_param("models", "MRI_AGCM3_2_S"))
        .and(query_param("start_date", "2026-07-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(climate_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let location = ZoneCatalog::default()
        .resolve("miami", None, None, None)
        .unwrap();
    let series = climate_client(&mock_server)
        .fetch_daily(&location, &window())
        .await
        .unwrap();

    assert_eq!(series.samples.len(), 3);
    assert_eq!(series.location.zone_id, "miami");
    assert_eq!(series.samples[1].max_temp_c, Some(36.2));
    assert_eq!(series.samples[2].avg_temp_c, None);
}

#[tokio::test]
async fn test_climate_upstream_error_carries_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/climate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Parameter 'start_date' is out of range"
        })))
        .mount(&mock_server)
        .await;

    let location = ZoneCatalog::default()
        .resolve("chicago", None, None, None)
        .unwrap();
    let err = climate_client(&mock_server)
        .fetch_daily(&location, &window())
        .await
        .unwrap_err();

    match err {
        ClimateError::Upstream { status, reason, .. } => {
            assert_eq!(status, 400);
            assert!(reason.contains("out of range"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_climate_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/climate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let location = ZoneCatalog::default()
        .resolve("seattle", None, None, None)
        .unwrap();
    let err = climate_client(&mock_server)
        .fetch_daily(&location, &window())
        .await
        .unwrap_err();

    assert!(matches!(err, ClimateError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_geocoder_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Monterrey"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {
                    "name": "Monterrey",
                    "country": "Mexico",
                    "admin1": "Nuevo León",
                    "latitude": 25.67,
                    "longitude": -100.31,
                    "timezone": "America/Monterrey"
                },
                { "name": "Nowhere", "country": "Mexico" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let geocoder = OpenMeteoGeocoder::new(
        format!("{}/v1/search", mock_server.uri()),
        10,
        "en".to_string(),
        5,
    )
    .unwrap();
    let places = geocoder.search("Monterrey").await.unwrap();

    assert_eq!(places.len(), 1);
    assert_eq!(places[0].display, "Monterrey, Nuevo León - Mexico");
    assert_eq!(places[0].tz, "America/Monterrey");
}

#[tokio::test]
async fn test_geocoder_no_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generationtime_ms": 0.5
        })))
        .mount(&mock_server)
        .await;

    let geocoder = OpenMeteoGeocoder::new(
        format!("{}/v1/search", mock_server.uri()),
        10,
        "en".to_string(),
        5,
    )
    .unwrap();

    assert!(geocoder.search("zzzz").await.unwrap().is_empty());
}

fn gemini(server: &MockServer, api_key: Option<&str>) -> GeminiRecommender {
    GeminiRecommender::new(
        server.uri(),
        "gemini-test".to_string(),
        api_key.map(str::to_string),
        5,
    )
    .unwrap()
}

#[tokio::test]
async fn test_gemini_generate_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "secret"))
        .and(body_string_contains("Cooling Degree Days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "### Pre-cool before peak hours"}]
                },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = gemini(&mock_server, Some("secret"))
        .generate("Total Cooling Degree Days: 120")
        .await
        .unwrap();

    assert_eq!(text, "### Pre-cool before peak hours");
}

#[tokio::test]
async fn test_gemini_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&mock_server)
        .await;

    let err = gemini(&mock_server, Some("bad"))
        .generate("prompt")
        .await
        .unwrap_err();

    match err {
        RecommendError::Upstream { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_blocked_prompt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&mock_server)
        .await;

    let err = gemini(&mock_server, Some("secret"))
        .generate("prompt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RecommendError::EmptyResponse { block_reason: Some(ref r) } if r == "SAFETY"
    ));
}

#[tokio::test]
async fn test_gemini_without_key_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = gemini(&mock_server, None);
    assert!(!client.is_configured());
    assert!(matches!(
        client.generate("prompt").await,
        Err(RecommendError::NotConfigured)
    ));
}
