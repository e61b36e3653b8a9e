use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, open_meteo::upstream_reason, ClimateError, Geocoder};
use crate::domain::DEFAULT_TIMEZONE;

const SERVICE: &str = "Open-Meteo geocoding API";

/// A geocoding match, shaped for the location picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    /// State / province
    pub admin1: String,
    pub lat: f64,
    pub lon: f64,
    pub tz: String,
    pub display: String,
}

#[derive(Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
    result_count: u32,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(
        base_url: String,
        result_count: u32,
        language: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url,
            result_count,
            language,
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>, ClimateError> {
        debug!(%query, "searching places");

        let transport = |source| ClimateError::Transport {
            service: SERVICE,
            source,
        };

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", query.to_string()),
                ("count", self.result_count.to_string()),
                ("language", self.language.clone()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(ClimateError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                reason: upstream_reason(&body),
            });
        }

        let raw: RawSearchResponse =
            serde_json::from_str(&body).map_err(|e| ClimateError::MalformedResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        Ok(raw
            .results
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawPlace::into_place)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    results: Option<Vec<RawPlace>>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    admin1: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
}

impl RawPlace {
    /// Matches without coordinates are useless to the analysis and dropped.
    fn into_place(self) -> Option<Place> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        let display = format!("{}, {} - {}", self.name, self.admin1, self.country);
        Some(Place {
            display,
            name: self.name,
            country: self.country,
            admin1: self.admin1,
            lat,
            lon,
            tz: self
                .timezone
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        })
    }
}
