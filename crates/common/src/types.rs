//! Domain types shared across the service.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Status string reported for parks whose latest refresh failed.
pub const FALLBACK_STATUS: &str = "Fallback - using last known data";

/// Label for "no rain anywhere in the hourly window".
pub const NO_RECENT_RAIN_LABEL: &str = "Over 48 hours ago";

// ── Provider-neutral forecast ─────────────────────────────────────────

/// Forecast for one park. Rain as reported by the provider, °F, mph.
///
/// Index 0 of each sequence is the current hour or today.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub hourly: Vec<HourlyReading>,
    #[serde(default)]
    pub daily: Vec<DailyReading>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    /// Rain over the last hour.
    #[serde(default)]
    pub rain_1h_in: Option<f64>,
    /// Wind speed, mph.
    #[serde(default)]
    pub wind_speed_mph: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    /// Total rain for the day.
    #[serde(default)]
    pub rain_in: Option<f64>,
    #[serde(default)]
    pub temp_min_f: Option<f64>,
    #[serde(default)]
    pub temp_max_f: Option<f64>,
}

// ── Derived trail conditions ──────────────────────────────────────────

/// When rain was last seen in the hourly forecast window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastRain {
    /// Index of the first hourly entry with rain.
    HoursAgo(usize),
    /// No hourly entry with rain at all.
    BeyondWindow,
}

impl LastRain {
    pub fn label(&self) -> String {
        match self {
            LastRain::HoursAgo(n) => format!("{} hours ago", n),
            LastRain::BeyondWindow => NO_RECENT_RAIN_LABEL.to_string(),
        }
    }
}

/// Output of the metrics calculator for one forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailMetrics {
    pub total_weekly_rain_in: f64,
    pub recent_rain_in: f64,
    pub today_high_f: Option<f64>,
    pub today_low_f: Option<f64>,
    pub dry_streak_days: u32,
    pub last_rain: LastRain,
    /// 0 (dry) ..= 10 (very muddy).
    pub mud_level: u8,
    /// 0 (settled) ..= 10 (very dusty).
    pub dust_level: u8,
}

/// Metrics from a successful refresh, stamped with when they were computed.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedConditions {
    pub metrics: TrailMetrics,
    pub last_updated: DateTime<Utc>,
}

/// Recorded when the latest refresh for a park failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackStatus {
    pub last_updated: DateTime<Utc>,
    /// Most recent successful conditions, if the park ever refreshed.
    pub last_known: Option<DerivedConditions>,
}

/// One cache slot per park.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionsEntry {
    Current(DerivedConditions),
    Fallback(FallbackStatus),
}

impl ConditionsEntry {
    pub fn last_updated(&self) -> DateTime<Utc> {
        match self {
            ConditionsEntry::Current(c) => c.last_updated,
            ConditionsEntry::Fallback(f) => f.last_updated,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ConditionsEntry::Fallback(_))
    }

    /// Demote to a fallback entry, keeping the newest good conditions.
    pub fn into_fallback(self, now: DateTime<Utc>) -> FallbackStatus {
        let last_known = match self {
            ConditionsEntry::Current(c) => Some(c),
            ConditionsEntry::Fallback(f) => f.last_known,
        };
        FallbackStatus {
            last_updated: now,
            last_known,
        }
    }
}

// ── Wire format ───────────────────────────────────────────────────────

fn iso_millis(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn temp_label(temp: Option<f64>) -> String {
    match temp {
        Some(t) => format!("{}°F", t),
        None => "Unknown".to_string(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConditionsWire {
    total_weekly_rain: String,
    recent_rain: String,
    today_high: String,
    today_low: String,
    mud_level: u8,
    dust_level: u8,
    dry_streak_days: u32,
    last_rain_hours_ago: String,
    last_updated: String,
}

impl From<&DerivedConditions> for ConditionsWire {
    fn from(c: &DerivedConditions) -> Self {
        let m = &c.metrics;
        Self {
            total_weekly_rain: format!("{:.2} in", m.total_weekly_rain_in),
            recent_rain: format!("{:.2} in (last 6h)", m.recent_rain_in),
            today_high: temp_label(m.today_high_f),
            today_low: temp_label(m.today_low_f),
            mud_level: m.mud_level,
            dust_level: m.dust_level,
            dry_streak_days: m.dry_streak_days,
            last_rain_hours_ago: m.last_rain.label(),
            last_updated: iso_millis(&c.last_updated),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FallbackWire {
    status: &'static str,
    last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_known: Option<ConditionsWire>,
}

impl Serialize for DerivedConditions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ConditionsWire::from(self).serialize(serializer)
    }
}

impl Serialize for FallbackStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FallbackWire {
            status: FALLBACK_STATUS,
            last_updated: iso_millis(&self.last_updated),
            last_known: self.last_known.as_ref().map(ConditionsWire::from),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_metrics() -> TrailMetrics {
        TrailMetrics {
            total_weekly_rain_in: 1.2,
            recent_rain_in: 0.3,
            today_high_f: Some(75.2),
            today_low_f: None,
            dry_streak_days: 2,
            last_rain: LastRain::HoursAgo(2),
            mud_level: 2,
            dust_level: 1,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_current_entry_wire_format() {
        let entry = ConditionsEntry::Current(DerivedConditions {
            metrics: sample_metrics(),
            last_updated: noon(),
        });
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["totalWeeklyRain"], "1.20 in");
        assert_eq!(json["recentRain"], "0.30 in (last 6h)");
        assert_eq!(json["todayHigh"], "75.2°F");
        assert_eq!(json["todayLow"], "Unknown");
        assert_eq!(json["mudLevel"], 2);
        assert_eq!(json["dustLevel"], 1);
        assert_eq!(json["dryStreakDays"], 2);
        assert_eq!(json["lastRainHoursAgo"], "2 hours ago");
        assert_eq!(json["lastUpdated"], "2026-10-16T12:00:00.000Z");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_zero_degrees_is_not_unknown() {
        assert_eq!(temp_label(Some(0.0)), "0°F");
        assert_eq!(temp_label(None), "Unknown");
    }

    #[test]
    fn test_fallback_without_history_omits_last_known() {
        let entry = ConditionsEntry::Fallback(FallbackStatus {
            last_updated: noon(),
            last_known: None,
        });
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["status"], FALLBACK_STATUS);
        assert_eq!(json["lastUpdated"], "2026-10-16T12:00:00.000Z");
        assert!(json.get("lastKnown").is_none());
    }

    #[test]
    fn test_into_fallback_keeps_last_good_conditions() {
        let good = DerivedConditions {
            metrics: sample_metrics(),
            last_updated: noon(),
        };
        let later = noon() + chrono::Duration::hours(12);
        let even_later = later + chrono::Duration::hours(12);

        let first = ConditionsEntry::Current(good.clone()).into_fallback(later);
        assert_eq!(first.last_updated, later);
        assert_eq!(first.last_known.as_ref(), Some(&good));

        let second = ConditionsEntry::Fallback(first).into_fallback(even_later);
        assert_eq!(second.last_updated, even_later);
        assert_eq!(second.last_known, Some(good));
    }

    #[test]
    fn test_last_rain_labels() {
        assert_eq!(LastRain::HoursAgo(0).label(), "0 hours ago");
        assert_eq!(LastRain::HoursAgo(1).label(), "1 hours ago");
        assert_eq!(LastRain::HoursAgo(30).label(), "30 hours ago");
        assert_eq!(LastRain::BeyondWindow.label(), NO_RECENT_RAIN_LABEL);
    }
}
