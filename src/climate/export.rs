use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{ClimateSeries, DailySample};

/// Column layout of the exported file. Missing values become empty fields.
#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Avg_Temp")]
    avg_temp: Option<f64>,
    #[serde(rename = "Max_Temp")]
    max_temp: Option<f64>,
    #[serde(rename = "Relative_Humidity")]
    relative_humidity: Option<f64>,
    #[serde(rename = "Solar_Radiation")]
    solar_radiation: Option<f64>,
    #[serde(rename = "Cloud_Cover")]
    cloud_cover: Option<f64>,
    #[serde(rename = "Wind_Speed")]
    wind_speed: Option<f64>,
}

impl From<&DailySample> for CsvRow {
    fn from(s: &DailySample) -> Self {
        Self {
            date: s.date,
            avg_temp: s.avg_temp_c,
            max_temp: s.max_temp_c,
            relative_humidity: s.relative_humidity_pct,
            solar_radiation: s.solar_radiation_mj_m2,
            cloud_cover: s.cloud_cover_pct,
            wind_speed: s.wind_speed_kmh,
        }
    }
}

pub const CSV_HEADER: &str =
    "Date,Avg_Temp,Max_Temp,Relative_Humidity,Solar_Radiation,Cloud_Cover,Wind_Speed";

pub fn to_csv(samples: &[DailySample]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    if samples.is_empty() {
        // serialize() only emits the header alongside the first row
        wtr.write_record(CSV_HEADER.split(','))?;
    }
    for sample in samples {
        wtr.serialize(CsvRow::from(sample))?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// `climate_data_{zone}_{days}days_{YYYYMMDD}.csv`, with the zone reduced to
/// filename-safe characters.
pub fn export_file_name(series: &ClimateSeries, today: NaiveDate) -> String {
    let zone: String = series
        .location
        .zone_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!(
        "climate_data_{}_{}days_{}.csv",
        zone,
        series.window.days,
        today.format("%Y%m%d")
    )
}
