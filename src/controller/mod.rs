use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::cache::{AnalysisKey, CacheStats, ClimateKey, ResponseCache};
use crate::climate::{
    export_file_name, to_csv, ClimateError, ClimateSource, Geocoder, OpenMeteoClimateClient,
    OpenMeteoGeocoder, Place,
};
use crate::config::Config;
use crate::domain::{
    ClimateSeries, ForecastWindow, Location, UserType, ZoneCatalog, ZoneError, ZoneSummary,
};
use crate::energy::{ChartData, EnergyMetrics, MetricThresholds, MetricsError};
use crate::recommend::{build_prompt, GeminiRecommender, Recommender, Suggestion, SuggestionSource};

pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub advisor: Arc<EnergyAdvisor>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let climate = OpenMeteoClimateClient::new(
            cfg.climate.base_url.clone(),
            cfg.climate.model.clone(),
            cfg.climate.http_timeout_seconds,
        )?;
        let geocoder = OpenMeteoGeocoder::new(
            cfg.geocoding.base_url.clone(),
            cfg.geocoding.result_count,
            cfg.geocoding.language.clone(),
            cfg.geocoding.http_timeout_seconds,
        )?;
        let recommender = GeminiRecommender::new(
            cfg.advisor.base_url.clone(),
            cfg.advisor.model.clone(),
            cfg.advisor.api_key().map(str::to_string),
            cfg.advisor.http_timeout_seconds,
        )?;

        let advisor = Arc::new(EnergyAdvisor::new(
            Arc::new(climate),
            Arc::new(geocoder),
            Arc::new(recommender),
            cfg.metrics.clone(),
            cfg.cache.capacity,
        ));

        Ok(Self { cfg, advisor })
    }
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Zone(#[from] ZoneError),

    #[error(transparent)]
    Climate(#[from] ClimateError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

impl From<validator::ValidationErrors> for AdvisorError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .map(|e| {
                e.message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), |m| m.to_string())
            })
            .collect::<Vec<_>>()
            .join("; ");
        AdvisorError::Validation(message)
    }
}

/// Parameters of an analysis or export, as received from the client.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct AnalysisRequest {
    #[serde(default = "default_user_type")]
    pub user_type: String,
    #[serde(default = "default_zone", alias = "zona")]
    #[validate(length(min = 1, max = 200, message = "zone must be 1-200 characters"))]
    pub zone: String,
    #[serde(default = "default_days")]
    #[validate(range(min = 7, max = 365, message = "Days range must be between 7 and 365"))]
    pub days: u32,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub tz: Option<String>,
}

fn default_user_type() -> String {
    UserType::default().to_string()
}

fn default_zone() -> String {
    "new-york".to_string()
}

fn default_days() -> u32 {
    30
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            user_type: default_user_type(),
            zone: default_zone(),
            days: default_days(),
            lat: None,
            lon: None,
            tz: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    pub user_type: UserType,
    pub zone: String,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub parameters: AnalysisParameters,
    pub location: Location,
    pub metrics: EnergyMetrics,
    pub suggestion: String,
    pub suggestion_source: SuggestionSource,
    pub charts: ChartData,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: AnalysisReport,
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdvisorCacheStats {
    pub analysis: CacheStats,
    pub climate: CacheStats,
}

/// Fetch → aggregate → recommend pipeline with its response caches.
pub struct EnergyAdvisor {
    climate: Arc<dyn ClimateSource>,
    geocoder: Arc<dyn Geocoder>,
    recommender: Arc<dyn Recommender>,
    zones: ZoneCatalog,
    thresholds: MetricThresholds,
    analysis_cache: ResponseCache<AnalysisKey, AnalysisReport>,
    climate_cache: ResponseCache<ClimateKey, ClimateSeries>,
}

impl EnergyAdvisor {
    pub fn new(
        climate: Arc<dyn ClimateSource>,
        geocoder: Arc<dyn Geocoder>,
        recommender: Arc<dyn Recommender>,
        thresholds: MetricThresholds,
        cache_capacity: usize,
    ) -> Self {
        Self {
            climate,
            geocoder,
            recommender,
            zones: ZoneCatalog::default(),
            thresholds,
            analysis_cache: ResponseCache::new(cache_capacity),
            climate_cache: ResponseCache::new(cache_capacity),
        }
    }

    pub fn zones(&self) -> Vec<ZoneSummary> {
        self.zones.list()
    }

    pub fn recommender_configured(&self) -> bool {
        self.recommender.is_configured()
    }

    pub fn cache_stats(&self) -> AdvisorCacheStats {
        AdvisorCacheStats {
            analysis: self.analysis_cache.stats(),
            climate: self.climate_cache.stats(),
        }
    }

    pub async fn search_places(&self, query: &str) -> Result<Vec<Place>, AdvisorError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(AdvisorError::Validation(format!(
                "Search term must have at least {MIN_QUERY_CHARS} characters"
            )));
        }
        Ok(self.geocoder.search(query).await?)
    }

    pub async fn analyze(&self, req: &AnalysisRequest) -> Result<Analysis, AdvisorError> {
        let user_type: UserType = req.user_type.trim().parse().map_err(|_| {
            AdvisorError::Validation("user_type must be 'home' or 'industry'".to_string())
        })?;
        let location = self.resolve(req)?;

        let key = AnalysisKey {
            zone: location.cache_fingerprint(),
            days: req.days,
            user_type,
        };
        if let Some(report) = self.analysis_cache.get(&key) {
            debug!(zone = %key.zone, days = key.days, %user_type, "analysis cache hit");
            return Ok(Analysis {
                report,
                cached: true,
            });
        }

        let series = self.climate_series(&location, req.days).await?;
        let metrics = EnergyMetrics::calculate(&series.samples, &self.thresholds)?;

        let prompt = build_prompt(
            &metrics,
            &self.thresholds,
            user_type,
            &location.display_name,
            req.days,
        );
        let suggestion = match self.recommender.generate(&prompt).await {
            Ok(text) => Suggestion::from_ai(text),
            Err(e) => {
                warn!(error = %e, zone = %location.zone_id, "falling back to basic suggestion");
                Suggestion::fallback(&e)
            }
        };
        let cacheable = !suggestion.is_fallback();

        let report = AnalysisReport {
            generated_at: Utc::now(),
            parameters: AnalysisParameters {
                user_type,
                zone: req.zone.trim().to_string(),
                days: req.days,
            },
            charts: ChartData::build(&location.display_name, &series.samples, &self.thresholds),
            location,
            metrics,
            suggestion_source: suggestion.source,
            suggestion: suggestion.text,
        };

        info!(
            zone = %report.location.zone_id,
            days = req.days,
            %user_type,
            source = ?report.suggestion_source,
            "analysis completed"
        );

        // A fallback is a transient failure, not an answer worth repeating.
        if cacheable {
            self.analysis_cache.insert(key, report.clone());
        }

        Ok(Analysis {
            report,
            cached: false,
        })
    }

    pub async fn export_csv(&self, req: &AnalysisRequest) -> Result<CsvExport, AdvisorError> {
        let location = self.resolve(req)?;

        let series = self.climate_series(&location, req.days).await?;
        let body = to_csv(&series.samples)?;

        Ok(CsvExport {
            file_name: export_file_name(&series, Local::now().date_naive()),
            body,
        })
    }

    fn resolve(&self, req: &AnalysisRequest) -> Result<Location, AdvisorError> {
        let location = self
            .zones
            .resolve(&req.zone, req.lat, req.lon, req.tz.as_deref())?;
        req.validate()?;
        Ok(location)
    }

    async fn climate_series(
        &self,
        location: &Location,
        days: u32,
    ) -> Result<ClimateSeries, AdvisorError> {
        let key = ClimateKey {
            zone: location.cache_fingerprint(),
            days,
        };
        if let Some(series) = self.climate_cache.get(&key) {
            debug!(zone = %key.zone, days, "climate cache hit");
            return Ok(series);
        }

        let window = ForecastWindow::starting_today(days);
        let series = self.climate.fetch_daily(location, &window).await?;
        self.climate_cache.insert(key, series.clone());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::{MockClimateSource, MockGeocoder};
    use crate::domain::DailySample;
    use crate::recommend::{MockRecommender, RecommendError};

    fn series_for(location: &Location, window: &ForecastWindow) -> ClimateSeries {
        let samples = (0..=window.days)
            .map(|i| DailySample {
                date: window.start + chrono::Duration::days(i64::from(i)),
                avg_temp_c: Some(26.0),
                max_temp_c: Some(33.0),
                relative_humidity_pct: Some(70.0),
                solar_radiation_mj_m2: Some(20.0),
                cloud_cover_pct: Some(30.0),
                wind_speed_kmh: Some(10.0),
            })
            .collect();
        ClimateSeries {
            location: location.clone(),
            window: *window,
            samples,
        }
    }

    fn climate_expecting(calls: usize) -> MockClimateSource {
        let mut climate = MockClimateSource::new();
        climate
            .expect_fetch_daily()
            .times(calls)
            .returning(|loc, window| Ok(series_for(loc, window)));
        climate
    }

    fn recommender_replying(calls: usize) -> MockRecommender {
        let mut rec = MockRecommender::new();
        rec.expect_generate()
            .times(calls)
            .returning(|_| Ok("### Pre-cool before noon".to_string()));
        rec
    }

    fn advisor(climate: MockClimateSource, rec: MockRecommender) -> EnergyAdvisor {
        EnergyAdvisor::new(
            Arc::new(climate),
            Arc::new(MockGeocoder::new()),
            Arc::new(rec),
            MetricThresholds::default(),
            100,
        )
    }

    fn request(zone: &str, days: u32, user_type: &str) -> AnalysisRequest {
        AnalysisRequest {
            user_type: user_type.to_string(),
            zone: zone.to_string(),
            days,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_analyze_computes_report() {
        let adv = advisor(climate_expecting(1), recommender_replying(1));
        let analysis = adv.analyze(&request("miami", 7, "home")).await.unwrap();

        assert!(!analysis.cached);
        let report = analysis.report;
        assert_eq!(report.parameters.user_type, UserType::Home);
        assert_eq!(report.location.display_name, "Miami");
        assert_eq!(report.metrics.days_analyzed, 8);
        // 8 days * (26 - 18)
        assert_eq!(report.metrics.cdd_total, 64.0);
        assert_eq!(report.metrics.high_demand_days, 8);
        assert_eq!(report.suggestion, "### Pre-cool before noon");
        assert_eq!(report.suggestion_source, SuggestionSource::Ai);
        assert_eq!(report.charts.temperature.dates.len(), 8);
    }

    #[tokio::test]
    async fn test_repeated_analysis_served_from_cache() {
        let adv = advisor(climate_expecting(1), recommender_replying(1));

        let first = adv.analyze(&request("Miami", 30, "home")).await.unwrap();
        let second = adv.analyze(&request(" MIAMI ", 30, "HOME")).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.report.metrics, second.report.metrics);

        let stats = adv.cache_stats();
        assert_eq!(stats.analysis.hits, 1);
        assert_eq!(stats.analysis.entries, 1);
    }

    #[tokio::test]
    async fn test_user_type_shares_climate_but_not_report() {
        let adv = advisor(climate_expecting(1), recommender_replying(2));

        adv.analyze(&request("seattle", 14, "home")).await.unwrap();
        let industry = adv.analyze(&request("seattle", 14, "industry")).await.unwrap();

        assert!(!industry.cached);
        let stats = adv.cache_stats();
        assert_eq!(stats.climate.hits, 1);
        assert_eq!(stats.analysis.entries, 2);
    }

    #[tokio::test]
    async fn test_fallback_suggestion_is_not_cached() {
        let mut rec = MockRecommender::new();
        rec.expect_generate().times(2).returning(|_| {
            Err(RecommendError::Upstream {
                status: 429,
                message: "quota exceeded".to_string(),
            })
        });
        let adv = advisor(climate_expecting(1), rec);

        let first = adv.analyze(&request("chicago", 7, "industry")).await.unwrap();
        assert_eq!(first.report.suggestion_source, SuggestionSource::Fallback);
        assert!(first.report.suggestion.contains("quota exceeded"));

        let second = adv.analyze(&request("chicago", 7, "industry")).await.unwrap();
        assert!(!second.cached);
        assert_eq!(adv.cache_stats().analysis.entries, 0);
    }

    #[tokio::test]
    async fn test_validation_errors_skip_upstream() {
        let adv = advisor(climate_expecting(0), recommender_replying(0));

        let bad_user = adv.analyze(&request("miami", 30, "office")).await;
        assert!(matches!(bad_user, Err(AdvisorError::Validation(msg)) if msg.contains("home")));

        let bad_days = adv.analyze(&request("miami", 6, "home")).await;
        assert!(matches!(bad_days, Err(AdvisorError::Validation(_))));

        let too_many = adv.analyze(&request("miami", 366, "home")).await;
        assert!(matches!(too_many, Err(AdvisorError::Validation(_))));

        let unknown = adv.analyze(&request("atlantis", 30, "home")).await;
        assert!(matches!(unknown, Err(AdvisorError::Zone(ZoneError::UnknownZone(_)))));
    }

    #[tokio::test]
    async fn test_custom_zone_uses_coordinates() {
        let mut climate = MockClimateSource::new();
        climate
            .expect_fetch_daily()
            .withf(|loc, _| loc.coordinates.latitude == 19.43 && loc.timezone == "auto")
            .times(1)
            .returning(|loc, window| Ok(series_for(loc, window)));
        let adv = advisor(climate, recommender_replying(1));

        let req = AnalysisRequest {
            lat: Some(19.43),
            lon: Some(-99.13),
            ..request("Mexico City", 7, "home")
        };
        let analysis = adv.analyze(&req).await.unwrap();
        assert!(!analysis.report.location.predefined);
        assert_eq!(analysis.report.parameters.zone, "Mexico City");
    }

    #[tokio::test]
    async fn test_climate_error_propagates() {
        let mut climate = MockClimateSource::new();
        climate.expect_fetch_daily().returning(|_, _| {
            Err(ClimateError::Upstream {
                service: "test",
                status: 400,
                reason: "bad model".to_string(),
            })
        });
        let adv = advisor(climate, recommender_replying(0));

        let result = adv.analyze(&request("miami", 7, "home")).await;
        assert!(matches!(result, Err(AdvisorError::Climate(_))));
        assert_eq!(adv.cache_stats().climate.entries, 0);
    }

    #[tokio::test]
    async fn test_export_csv_reuses_climate_cache() {
        let adv = advisor(climate_expecting(1), recommender_replying(1));
        adv.analyze(&request("new-york", 10, "home")).await.unwrap();

        let export = adv.export_csv(&request("new-york", 10, "")).await.unwrap();
        let text = String::from_utf8(export.body).unwrap();

        assert!(export.file_name.starts_with("climate_data_new-york_10days_"));
        assert!(text.starts_with("Date,Avg_Temp,Max_Temp"));
        assert_eq!(text.lines().count(), 12);
    }

    #[tokio::test]
    async fn test_search_places_rejects_short_query() {
        let adv = advisor(climate_expecting(0), recommender_replying(0));
        let result = adv.search_places(" a ").await;
        assert!(matches!(result, Err(AdvisorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_places_delegates() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_search()
            .withf(|q| q == "Austin")
            .returning(|_| {
                Ok(vec![Place {
                    name: "Austin".to_string(),
                    country: "United States".to_string(),
                    admin1: "Texas".to_string(),
                    lat: 30.26,
                    lon: -97.74,
                    tz: "America/Chicago".to_string(),
                    display: "Austin, Texas - United States".to_string(),
                }])
            });
        let adv = EnergyAdvisor::new(
            Arc::new(climate_expecting(0)),
            Arc::new(geocoder),
            Arc::new(recommender_replying(0)),
            MetricThresholds::default(),
            10,
        );

        let places = adv.search_places("  Austin ").await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].tz, "America/Chicago");
    }

    #[test]
    fn test_request_defaults_and_alias() {
        let req: AnalysisRequest = serde_json::from_str(r#"{"zona": "miami"}"#).unwrap();
        assert_eq!(req.zone, "miami");
        assert_eq!(req.user_type, "home");
        assert_eq!(req.days, 30);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_days_bounds() {
        let at = |days| AnalysisRequest {
            days,
            ..Default::default()
        };
        assert!(at(7).validate().is_ok());
        assert!(at(365).validate().is_ok());
        assert!(at(0).validate().is_err());
        assert!(at(366).validate().is_err());
    }
}
