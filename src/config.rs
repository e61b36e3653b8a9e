use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::energy::MetricThresholds;

/// Placeholder shipped in `config/default.toml`; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "__SET_VIA_ENV__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub climate: ClimateConfig,
    pub geocoding: GeocodingConfig,
    pub advisor: AdvisorConfig,
    pub cache: CacheConfig,
    pub metrics: MetricThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Empty or `["*"]` allows any origin.
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Zero would time out every request, so it is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            enable_cors: true,
            cors_allowed_origins: Vec::new(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub base_url: String,
    pub model: String,
    pub http_timeout_seconds: u64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            base_url: "https://climate-api.open-meteo.com/v1/climate".to_string(),
            model: "MRI_AGCM3_2_S".to_string(),
            http_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub result_count: u32,
    pub language: String,
    pub http_timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            result_count: 10,
            language: "en".to_string(),
            http_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub http_timeout_seconds: u64,
}

impl AdvisorConfig {
    /// The configured key, or `None` when unset or still the placeholder.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        if key.is_empty() || key == API_KEY_PLACEHOLDER {
            None
        } else {
            Some(key)
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            api_key: String::new(),
            http_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::figment(Toml::file("config/default.toml"))
    }

    fn figment(file: impl figment::Provider) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(file)
            .merge(
                Env::raw()
                    .only(&["GEMINI_API_KEY"])
                    .map(|_| "advisor.api_key".into()),
            )
            .merge(Env::prefixed("EADV__").split("__"));
        Ok(figment.extract()?)
    }
}
