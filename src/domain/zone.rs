//! Zone resolution: predefined cities plus user-supplied coordinates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timezone passed upstream when a custom zone does not name one.
pub const DEFAULT_TIMEZONE: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ZoneError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(ZoneError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A zone resolved to the coordinates and timezone used for upstream queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Normalized zone name (trimmed, lower-case).
    pub zone_id: String,
    pub display_name: String,
    pub coordinates: Coordinates,
    pub timezone: String,
    pub predefined: bool,
}

impl Location {
    /// Stable identity used in cache keys.
    ///
    /// Two custom zones with the same name but different coordinates must not
    /// share cache entries, so custom zones carry their coordinates.
    pub fn cache_fingerprint(&self) -> String {
        if self.predefined {
            self.zone_id.clone()
        } else {
            format!(
                "{}@{:.4},{:.4}|{}",
                self.zone_id,
                self.coordinates.latitude,
                self.coordinates.longitude,
                self.timezone
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("Zone '{0}' is not predefined. Provide coordinates (lat, lon) or search for a location.")]
    UnknownZone(String),

    #[error("Invalid coordinates: lat={latitude}, lon={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone)]
struct ZoneEntry {
    id: &'static str,
    latitude: f64,
    longitude: f64,
    timezone: &'static str,
}

/// Zone summary exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ZoneCatalog {
    zones: Vec<ZoneEntry>,
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        Self {
            zones: vec![
                ZoneEntry {
                    id: "new-york",
                    latitude: 40.7128,
                    longitude: -74.0060,
                    timezone: "America/New_York",
                },
                ZoneEntry {
                    id: "los-angeles",
                    latitude: 34.0522,
                    longitude: -118.2437,
                    timezone: "America/Los_Angeles",
                },
                ZoneEntry {
                    id: "chicago",
                    latitude: 41.8781,
                    longitude: -87.6298,
                    timezone: "America/Chicago",
                },
                ZoneEntry {
                    id: "miami",
                    latitude: 25.7617,
                    longitude: -80.1918,
                    timezone: "America/New_York",
                },
                ZoneEntry {
                    id: "seattle",
                    latitude: 47.6062,
                    longitude: -122.3321,
                    timezone: "America/Los_Angeles",
                },
            ],
        }
    }
}

impl ZoneCatalog {
    pub fn list(&self) -> Vec<ZoneSummary> {
        self.zones
            .iter()
            .map(|z| ZoneSummary {
                id: z.id.to_string(),
                name: title_case(z.id),
            })
            .collect()
    }

    /// Resolve a zone name and optional coordinates to a [`Location`].
    ///
    /// Explicit coordinates win over the catalog, even for a predefined name.
    pub fn resolve(
        &self,
        zone: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        timezone: Option<&str>,
    ) -> Result<Location, ZoneError> {
        let zone_id = normalize_zone(zone);

        if let (Some(lat), Some(lon)) = (latitude, longitude) {
            let timezone = timezone
                .map(str::trim)
                .filter(|tz| !tz.is_empty())
                .unwrap_or(DEFAULT_TIMEZONE);
            return Ok(Location {
                display_name: title_case(&zone_id),
                zone_id,
                coordinates: Coordinates::new(lat, lon)?,
                timezone: timezone.to_string(),
                predefined: false,
            });
        }

        let entry = self
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| ZoneError::UnknownZone(zone.trim().to_string()))?;

        Ok(Location {
            zone_id,
            display_name: title_case(entry.id),
            coordinates: Coordinates {
                latitude: entry.latitude,
                longitude: entry.longitude,
            },
            timezone: entry.timezone.to_string(),
            predefined: true,
        })
    }
}

pub fn normalize_zone(zone: &str) -> String {
    zone.trim().to_lowercase()
}

/// "new-york" -> "New York", "san josé" -> "San José".
pub fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
