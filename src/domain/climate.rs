use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Location;

/// One day of projected climate. Upstream reports `null` for missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySample {
    pub date: NaiveDate,
    pub avg_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub solar_radiation_mj_m2: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
}

impl DailySample {
    /// Radiation discounted by cloud cover.
    pub fn solar_potential(&self) -> Option<f64> {
        match (self.solar_radiation_mj_m2, self.cloud_cover_pct) {
            (Some(radiation), Some(cloud)) => Some(radiation * (1.0 - cloud / 100.0)),
            _ => None,
        }
    }
}

/// Date range requested upstream. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

impl ForecastWindow {
    pub fn starting(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            end: start + Duration::days(i64::from(days)),
            days,
        }
    }

    pub fn starting_today(days: u32) -> Self {
        Self::starting(Local::now().date_naive(), days)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateSeries {
    pub location: Location,
    pub window: ForecastWindow,
    pub samples: Vec<DailySample>,
}
