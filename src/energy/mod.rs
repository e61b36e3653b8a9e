pub mod charts;
pub mod metrics;

pub use charts::*;
pub use metrics::{EnergyMetrics, MetricThresholds, MetricsError};
