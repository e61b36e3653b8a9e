//! Open-Meteo climate API client
//!
//! Daily downscaled climate-model projections used to estimate cooling
//! demand and solar yield over the requested window.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{http_client, ClimateError, ClimateSource};
use crate::domain::{ClimateSeries, DailySample, ForecastWindow, Location};

const SERVICE: &str = "Open-Meteo climate API";

/// Daily variables requested, in the order the API documents them.
pub const DAILY_VARIABLES: [&str; 6] = [
    "temperature_2m_mean",
    "temperature_2m_max",
    "relative_humidity_2m_mean",
    "shortwave_radiation_sum",
    "cloud_cover_mean",
    "wind_speed_10m_mean",
];

#[derive(Clone)]
pub struct OpenMeteoClimateClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenMeteoClimateClient {
    pub fn new(base_url: String, model: String, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url,
            model,
        })
    }

    fn query(&self, location: &Location, window: &ForecastWindow) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", location.coordinates.latitude.to_string()),
            ("longitude", location.coordinates.longitude.to_string()),
            ("start_date", window.start.format("%Y-%m-%d").to_string()),
            ("end_date", window.end.format("%Y-%m-%d").to_string()),
            ("models", self.model.clone()),
            ("daily", DAILY_VARIABLES.join(",")),
            ("timezone", location.timezone.clone()),
        ]
    }
}

#[async_trait]
impl ClimateSource for OpenMeteoClimateClient {
    async fn fetch_daily(
        &self,
        location: &Location,
        window: &ForecastWindow,
    ) -> Result<ClimateSeries, ClimateError> {
        debug!(
            zone = %location.zone_id,
            start = %window.start,
            end = %window.end,
            "fetching climate projection"
        );

        let transport = |source| ClimateError::Transport {
            service: SERVICE,
            source,
        };

        let resp = self
            .client
            .get(&self.base_url)
            .query(&self.query(location, window))
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;

        if !status.is_success() {
            let reason = upstream_reason(&body);
            warn!(status = status.as_u16(), %reason, "climate API error");
            return Err(ClimateError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                reason,
            });
        }

        let raw: RawClimateResponse =
            serde_json::from_str(&body).map_err(|e| ClimateError::MalformedResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;
        let samples = raw.daily.into_samples()?;

        info!(
            zone = %location.zone_id,
            days = samples.len(),
            "fetched climate projection"
        );

        Ok(ClimateSeries {
            location: location.clone(),
            window: *window,
            samples,
        })
    }
}

/// Open-Meteo reports failures as `{"error": true, "reason": "..."}`.
pub(crate) fn upstream_reason(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        reason: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.reason)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[derive(Debug, Deserialize)]
struct RawClimateResponse {
    daily: RawDaily,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    time: Vec<NaiveDate>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    shortwave_radiation_sum: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover_mean: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_mean: Vec<Option<f64>>,
}

impl RawDaily {
    /// Zip the column arrays into rows. An absent column reads as all-missing;
    /// a column of the wrong length is rejected.
    fn into_samples(self) -> Result<Vec<DailySample>, ClimateError> {
        let n = self.time.len();
        let columns = [
            ("temperature_2m_mean", self.temperature_2m_mean),
            ("temperature_2m_max", self.temperature_2m_max),
            ("relative_humidity_2m_mean", self.relative_humidity_2m_mean),
            ("shortwave_radiation_sum", self.shortwave_radiation_sum),
            ("cloud_cover_mean", self.cloud_cover_mean),
            ("wind_speed_10m_mean", self.wind_speed_10m_mean),
        ];

        let mut aligned = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            match values.len() {
                0 => aligned.push(vec![None; n]),
                len if len == n => aligned.push(values),
                len => {
                    return Err(ClimateError::MalformedResponse {
                        service: SERVICE,
                        reason: format!("{name} has {len} values for {n} days"),
                    })
                }
            }
        }

        let [avg, max, humidity, radiation, cloud, wind]: [Vec<Option<f64>>; 6] = aligned
            .try_into()
            .map_err(|_| ClimateError::MalformedResponse {
                service: SERVICE,
                reason: "unexpected column count".to_string(),
            })?;

        Ok(self
            .time
            .into_iter()
            .enumerate()
            .map(|(i, date)| DailySample {
                date,
                avg_temp_c: avg[i],
                max_temp_c: max[i],
                relative_humidity_pct: humidity[i],
                solar_radiation_mj_m2: radiation[i],
                cloud_cover_pct: cloud[i],
                wind_speed_kmh: wind[i],
            })
            .collect())
    }
}
