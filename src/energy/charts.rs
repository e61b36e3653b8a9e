//! Chart series for the thermal profile and solar potential views.
//!
//! The frontend draws the charts; the backend only ships the data.

use chrono::NaiveDate;
use serde::Serialize;

use super::{metrics::round1, MetricThresholds};
use crate::domain::DailySample;

/// Trailing window for the temperature trend line.
pub const TREND_WINDOW_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureChart {
    pub title: String,
    pub dates: Vec<NaiveDate>,
    pub max_temp: Vec<Option<f64>>,
    /// Trailing mean of the daily mean temperature; `None` until a full
    /// window of present values is available.
    pub trend: Vec<Option<f64>>,
    /// Days whose max temperature exceeds the comfort threshold.
    pub above_comfort: Vec<bool>,
    pub comfort_threshold: f64,
    pub extreme_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarChart {
    pub title: String,
    pub dates: Vec<NaiveDate>,
    pub radiation: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub temperature: TemperatureChart,
    pub solar: SolarChart,
}

impl ChartData {
    pub fn build(zone_name: &str, samples: &[DailySample], thresholds: &MetricThresholds) -> Self {
        let dates: Vec<NaiveDate> = samples.iter().map(|s| s.date).collect();
        let max_temp: Vec<Option<f64>> = samples.iter().map(|s| s.max_temp_c).collect();
        let avg_temp: Vec<Option<f64>> = samples.iter().map(|s| s.avg_temp_c).collect();

        let above_comfort = max_temp
            .iter()
            .map(|t| t.is_some_and(|t| t >= thresholds.comfort_c))
            .collect();

        Self {
            temperature: TemperatureChart {
                title: format!("Thermal Profile - {zone_name}: Energy Demand Prediction"),
                dates: dates.clone(),
                trend: rolling_mean(&avg_temp, TREND_WINDOW_DAYS),
                max_temp,
                above_comfort,
                comfort_threshold: thresholds.comfort_c,
                extreme_threshold: thresholds.extreme_heat_c,
            },
            solar: SolarChart {
                title: format!("Solar Generation Potential - {zone_name}"),
                dates,
                radiation: samples.iter().map(|s| s.solar_radiation_mj_m2).collect(),
                cloud_cover: samples.iter().map(|s| s.cloud_cover_pct).collect(),
            },
        }
    }
}

/// Trailing mean; a window containing any gap yields `None`.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| round1(sum / window as f64))
        })
        .collect()
}
