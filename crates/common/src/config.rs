//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Default One Call endpoint (API version 3.0).
pub const ONECALL_V3_ENDPOINT: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// OpenWeather API key (`appid`).
    #[serde(default)]
    pub api_key: String,

    /// Port the HTTP endpoint listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Parks to track, refreshed in this order.
    #[serde(default = "default_parks")]
    pub parks: Vec<ParkConfig>,

    /// Weather provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Timing parameters (seconds).
    #[serde(default)]
    pub timing: TimingConfig,
}

/// A tracked off-road park.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkConfig {
    /// Display name, also the cache key.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl ParkConfig {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// One Call endpoint URL. Point at a `2.5/onecall` URL for older API plans.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP client timeout per request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Timing configuration (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Period between refresh cycles. 12h by default; 5h is the other common choice.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Upper bound for a single park fetch inside a cycle.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_port() -> u16 {
    3000
}
fn default_endpoint() -> String {
    ONECALL_V3_ENDPOINT.to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    12 * 60 * 60
}
fn default_fetch_timeout() -> u64 {
    60
}

fn default_parks() -> Vec<ParkConfig> {
    vec![
        ParkConfig::new("Hawk Pride Mountain Offroad Park", 34.6727, -87.8203),
        ParkConfig::new("Adventure Offroad Park", 35.0191, -85.7303),
        ParkConfig::new("Stony Lonesome OHV Park", 33.9643, -86.9936),
        ParkConfig::new("Windrock Offroad Park", 36.0455, -84.4057),
        ParkConfig::new("Coalmont OHV Park", 35.2605, -85.7435),
        ParkConfig::new("Hot Springs Off-Road Park", 34.5136, -93.0935),
        ParkConfig::new("Moab, Utah", 38.5725, -109.5497),
        ParkConfig::new("Johnson Valley, California", 34.4033, -116.5925),
    ]
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            port: default_port(),
            parks: default_parks(),
            provider: ProviderConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: ServerConfig = serde_json::from_str(r#"{"port": 8080}"#).expect("valid config");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.parks.len(), 8);
        assert_eq!(cfg.timing.refresh_interval_secs, 43_200);
        assert_eq!(cfg.provider.endpoint, ONECALL_V3_ENDPOINT);
    }

    #[test]
    fn test_parks_override_replaces_defaults() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{"parks": [{"name": "Test Park", "lat": 35.0, "lon": -85.0}]}"#,
        )
        .expect("valid config");
        assert_eq!(cfg.parks, vec![ParkConfig::new("Test Park", 35.0, -85.0)]);
    }
}
