//! OpenWeather One Call API client.
//!
//! Fetches current + 7-day forecast data for a single location and
//! normalizes it into the shared `RawForecast` format.

use std::time::Duration;

use common::config::{ParkConfig, ProviderConfig};
use common::{DailyReading, Error, HourlyReading, RawForecast};
use serde::Deserialize;
use tracing::debug;

/// Temperatures in °F, wind in mph.
const UNITS: &str = "imperial";
const EXCLUDE: &str = "minutely,alerts";
const MAX_ERROR_BODY: usize = 500;

/// One Call API client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

// ── One Call response types ───────────────────────────────────────────

/// Response from `GET /onecall`. Only the fields the service reads.
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub hourly: Option<Vec<OneCallHour>>,
    #[serde(default)]
    pub daily: Option<Vec<OneCallDay>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallHour {
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub rain: Option<RainVolume>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RainVolume {
    /// Rain volume over the last hour.
    #[serde(rename = "1h", default)]
    pub one_hour: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallDay {
    /// Rain volume for the day.
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub temp: Option<DayTemp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayTemp {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl OneCallResponse {
    /// Convert to the provider-neutral forecast. Rain values pass through as reported.
    pub fn into_raw_forecast(self) -> RawForecast {
        let hourly = self
            .hourly
            .unwrap_or_default()
            .into_iter()
            .map(|hour| HourlyReading {
                rain_1h_in: hour.rain.and_then(|r| r.one_hour),
                wind_speed_mph: hour.wind_speed,
            })
            .collect();

        let daily = self
            .daily
            .unwrap_or_default()
            .into_iter()
            .map(|day| DailyReading {
                rain_in: day.rain,
                temp_min_f: day.temp.as_ref().and_then(|t| t.min),
                temp_max_f: day.temp.as_ref().and_then(|t| t.max),
            })
            .collect();

        RawForecast { hourly, daily }
    }
}

// ── Implementation ────────────────────────────────────────────────────

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, provider: &ProviderConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("trail-conditions/0.1")
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(provider.request_timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: provider.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn query(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", UNITS.to_string()),
            ("exclude", EXCLUDE.to_string()),
        ]
    }

    /// Fetch the raw One Call payload for a coordinate.
    pub async fn fetch_onecall(&self, lat: f64, lon: f64) -> Result<OneCallResponse, Error> {
        debug!("Fetching One Call forecast: {} lat={} lon={}", self.endpoint, lat, lon);

        // Transport errors carry the request URL, which includes `appid`.
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&self.query(lat, lon))
            .send()
            .await
            .map_err(|e| {
                Error::Provider(format!("HTTP error for ({lat},{lon}): {}", e.without_url()))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let cut = floor_char_boundary(&body, MAX_ERROR_BODY);
            return Err(Error::Provider(format!(
                "OpenWeather returned {} for ({lat},{lon}): {}",
                status.as_u16(),
                &body[..cut]
            )));
        }

        resp.json::<OneCallResponse>().await.map_err(|e| {
            Error::Provider(format!("JSON parse error for ({lat},{lon}): {}", e.without_url()))
        })
    }

    /// Fetch and normalize the forecast for a park.
    pub async fn get_forecast(&self, park: &ParkConfig) -> Result<RawForecast, Error> {
        let payload = self.fetch_onecall(park.lat, park.lon).await?;
        debug!(
            "Got {} hourly / {} daily entries for {}",
            payload.hourly.as_ref().map_or(0, Vec::len),
            payload.daily.as_ref().map_or(0, Vec::len),
            park.name
        );
        Ok(payload.into_raw_forecast())
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
