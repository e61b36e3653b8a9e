//! Upstream climate data: daily projections, place search and CSV export.

pub mod export;
pub mod geocoding;
pub mod open_meteo;

pub use export::*;
pub use geocoding::*;
pub use open_meteo::*;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use thiserror::Error;

use crate::domain::{ClimateSeries, ForecastWindow, Location};

#[derive(Debug, Error)]
pub enum ClimateError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {reason}")]
    Upstream {
        service: &'static str,
        status: u16,
        reason: String,
    },

    #[error("malformed {service} response: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },
}

/// Source of daily climate projections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClimateSource: Send + Sync {
    async fn fetch_daily(
        &self,
        location: &Location,
        window: &ForecastWindow,
    ) -> Result<ClimateSeries, ClimateError>;
}

/// Free-text place search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Place>, ClimateError>;
}

pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("energy-advisor/0.1"));
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .default_headers(headers)
        .build()
}
