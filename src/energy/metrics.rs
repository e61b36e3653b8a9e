//! Energy Metrics
//!
//! Scalar indicators derived from a daily climate series: temperature
//! extremes, cooling degree days, solar potential and high-demand day counts.
//! Everything is computed in a single pass over the samples.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::DailySample;

/// Thresholds the day counts are measured against (°C / %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricThresholds {
    /// Cooling degree day baseline
    pub cdd_base_c: f64,
    /// Max temperature above which a day counts as extreme heat
    pub extreme_heat_c: f64,
    /// Max temperature below which a day counts as comfortable
    pub comfort_c: f64,
    /// Cloud cover below which a day is optimal for solar
    pub optimal_cloud_cover_pct: f64,
    /// High demand requires max temperature above this...
    pub high_demand_temp_c: f64,
    /// ...and relative humidity above this
    pub high_demand_humidity_pct: f64,
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self {
            cdd_base_c: 18.0,
            extreme_heat_c: 35.0,
            comfort_c: 24.0,
            optimal_cloud_cover_pct: 40.0,
            high_demand_temp_c: 32.0,
            high_demand_humidity_pct: 60.0,
        }
    }
}

/// Aggregated energy indicators for a forecast window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyMetrics {
    /// Number of daily samples aggregated
    pub days_analyzed: usize,
    /// Mean of the daily mean temperature (°C)
    pub avg_temp: Option<f64>,
    /// Highest daily max temperature (°C)
    pub max_temp: Option<f64>,
    /// Lowest daily mean temperature (°C)
    pub min_temp: Option<f64>,
    /// Cooling degree days
    pub cdd_total: f64,
    pub extreme_heat_days: u32,
    pub comfortable_days: u32,
    /// Mean shortwave radiation sum (MJ/m²)
    pub avg_radiation: Option<f64>,
    /// Mean radiation after cloud cover discount (MJ/m²)
    pub avg_solar_potential: Option<f64>,
    pub optimal_solar_days: u32,
    /// Mean relative humidity (%)
    pub avg_humidity: Option<f64>,
    pub high_demand_days: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("Empty climate series provided")]
    EmptySeries,
}

/// Running mean/min/max over the values that are present.
#[derive(Debug, Clone, Copy, Default)]
struct RunningStat {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl RunningStat {
    fn push(&mut self, value: Option<f64>) {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return;
        };
        self.sum += v;
        self.count += 1;
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    days: usize,
    avg_temp: RunningStat,
    max_temp: RunningStat,
    radiation: RunningStat,
    solar_potential: RunningStat,
    humidity: RunningStat,
    cdd: f64,
    extreme_heat_days: u32,
    comfortable_days: u32,
    optimal_solar_days: u32,
    high_demand_days: u32,
}

impl Accumulator {
    fn push(&mut self, s: &DailySample, t: &MetricThresholds) {
        self.days += 1;
        self.avg_temp.push(s.avg_temp_c);
        self.max_temp.push(s.max_temp_c);
        self.radiation.push(s.solar_radiation_mj_m2);
        self.solar_potential.push(s.solar_potential());
        self.humidity.push(s.relative_humidity_pct);

        if let Some(avg) = s.avg_temp_c.filter(|v| v.is_finite()) {
            self.cdd += (avg - t.cdd_base_c).max(0.0);
        }

        let above = |v: Option<f64>, threshold: f64| v.is_some_and(|v| v > threshold);
        let below = |v: Option<f64>, threshold: f64| v.is_some_and(|v| v < threshold);

        if above(s.max_temp_c, t.extreme_heat_c) {
            self.extreme_heat_days += 1;
        }
        if below(s.max_temp_c, t.comfort_c) {
            self.comfortable_days += 1;
        }
        if below(s.cloud_cover_pct, t.optimal_cloud_cover_pct) {
            self.optimal_solar_days += 1;
        }
        if above(s.max_temp_c, t.high_demand_temp_c)
            && above(s.relative_humidity_pct, t.high_demand_humidity_pct)
        {
            self.high_demand_days += 1;
        }
    }

    fn finish(self) -> EnergyMetrics {
        EnergyMetrics {
            days_analyzed: self.days,
            avg_temp: self.avg_temp.mean().map(round1),
            max_temp: self.max_temp.max.map(round1),
            min_temp: self.avg_temp.min.map(round1),
            cdd_total: round1(self.cdd),
            extreme_heat_days: self.extreme_heat_days,
            comfortable_days: self.comfortable_days,
            avg_radiation: self.radiation.mean().map(round1),
            avg_solar_potential: self.solar_potential.mean().map(round1),
            optimal_solar_days: self.optimal_solar_days,
            avg_humidity: self.humidity.mean().map(round1),
            high_demand_days: self.high_demand_days,
        }
    }
}

impl EnergyMetrics {
    /// Aggregate a daily series. Missing values are skipped and never
    /// satisfy a threshold.
    pub fn calculate(
        samples: &[DailySample],
        thresholds: &MetricThresholds,
    ) -> Result<Self, MetricsError> {
        if samples.is_empty() {
            return Err(MetricsError::EmptySeries);
        }

        let acc = samples.iter().fold(Accumulator::default(), |mut acc, s| {
            acc.push(s, thresholds);
            acc
        });

        Ok(acc.finish())
    }
}

impl fmt::Display for EnergyMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Metrics: days={}, avg_temp={}, max_temp={}, CDD={:.1}, extreme_heat_days={}, high_demand_days={}",
            self.days_analyzed,
            fmt_opt(self.avg_temp),
            fmt_opt(self.max_temp),
            self.cdd_total,
            self.extreme_heat_days,
            self.high_demand_days
        )
    }
}

pub(crate) fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"))
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
