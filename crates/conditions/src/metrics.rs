//! Trail metrics from a normalized forecast.
//!
//! Mud tracks the weekly rain total. Dust tracks how long the week has
//! been dry plus the current wind. Both levels are integers in `0..=10`.

use common::{DailyReading, Error, HourlyReading, LastRain, RawForecast, TrailMetrics};

const WEEK_DAYS: usize = 7;
const RECENT_HOURS: usize = 6;
const MAX_LEVEL: f64 = 10.0;

const DUST_STREAK_WEIGHT: f64 = 0.7;
const DUST_WIND_WEIGHT: f64 = 0.3;
/// Wind speed (mph) at which the wind term saturates.
const DUST_WIND_REFERENCE_MPH: f64 = 30.0;
const DUST_SCALE: f64 = 5.0;

// ── Main API ──────────────────────────────────────────────────────────

/// Compute trail metrics for one forecast.
///
/// Missing rain or wind readings count as zero; missing temperatures stay
/// `None`. Negative or non-finite readings are rejected as
/// [`Error::Calculation`].
pub fn compute_trail_metrics(forecast: &RawForecast) -> Result<TrailMetrics, Error> {
    validate(forecast)?;

    let total_weekly_rain_in = weekly_rain(&forecast.daily);
    let dry_streak_days = dry_streak(&forecast.daily);
    let wind_now = forecast
        .hourly
        .first()
        .and_then(|h| h.wind_speed_mph)
        .unwrap_or(0.0);
    let today = forecast.daily.first();

    Ok(TrailMetrics {
        total_weekly_rain_in,
        recent_rain_in: recent_rain(&forecast.hourly),
        today_high_f: today.and_then(|d| d.temp_max_f),
        today_low_f: today.and_then(|d| d.temp_min_f),
        dry_streak_days,
        last_rain: last_rain(&forecast.hourly),
        mud_level: mud_level(total_weekly_rain_in),
        dust_level: dust_level(dry_streak_days, wind_now),
    })
}

/// Sum of daily rain over the first week.
pub fn weekly_rain(daily: &[DailyReading]) -> f64 {
    daily.iter().take(WEEK_DAYS).map(day_rain).sum()
}

/// Running dry-day counter over the first week, reset by any rainy day.
pub fn dry_streak(daily: &[DailyReading]) -> u32 {
    daily.iter().take(WEEK_DAYS).fold(0, |streak, day| {
        if day_rain(day) > 0.0 {
            0
        } else {
            streak + 1
        }
    })
}

/// Sum of hourly rain over the first six hours.
pub fn recent_rain(hourly: &[HourlyReading]) -> f64 {
    hourly.iter().take(RECENT_HOURS).map(hour_rain).sum()
}

/// First hour in the whole window with measurable rain.
pub fn last_rain(hourly: &[HourlyReading]) -> LastRain {
    hourly
        .iter()
        .position(|h| hour_rain(h) > 0.0)
        .map_or(LastRain::BeyondWindow, LastRain::HoursAgo)
}

pub fn mud_level(weekly_rain_in: f64) -> u8 {
    to_level(weekly_rain_in / WEEK_DAYS as f64 * MAX_LEVEL)
}

pub fn dust_level(dry_streak_days: u32, wind_mph: f64) -> u8 {
    let streak_term = dry_streak_days as f64 / WEEK_DAYS as f64 * DUST_STREAK_WEIGHT;
    let wind_term = wind_mph / DUST_WIND_REFERENCE_MPH * DUST_WIND_WEIGHT;
    to_level((streak_term + wind_term) * DUST_SCALE)
}

// ── Helpers ───────────────────────────────────────────────────────────

fn day_rain(day: &DailyReading) -> f64 {
    day.rain_in.unwrap_or(0.0)
}

fn hour_rain(hour: &HourlyReading) -> f64 {
    hour.rain_1h_in.unwrap_or(0.0)
}

/// Round and clamp into `0..=MAX_LEVEL`. NaN saturates to 0 on the cast.
fn to_level(raw: f64) -> u8 {
    raw.round().clamp(0.0, MAX_LEVEL) as u8
}

fn check_amount(value: Option<f64>, what: &str, index: usize) -> Result<(), Error> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::Calculation(format!(
            "{what}[{index}] is not a valid amount: {v}"
        ))),
        _ => Ok(()),
    }
}

fn check_temperature(value: Option<f64>, what: &str) -> Result<(), Error> {
    match value {
        Some(v) if !v.is_finite() => Err(Error::Calculation(format!(
            "{what} is not a valid temperature: {v}"
        ))),
        _ => Ok(()),
    }
}

fn validate(forecast: &RawForecast) -> Result<(), Error> {
    for (i, day) in forecast.daily.iter().take(WEEK_DAYS).enumerate() {
        check_amount(day.rain_in, "daily.rain", i)?;
    }
    if let Some(today) = forecast.daily.first() {
        check_temperature(today.temp_max_f, "daily[0].temp.max")?;
        check_temperature(today.temp_min_f, "daily[0].temp.min")?;
    }
    for (i, hour) in forecast.hourly.iter().enumerate() {
        check_amount(hour.rain_1h_in, "hourly.rain", i)?;
    }
    if let Some(now) = forecast.hourly.first() {
        check_amount(now.wind_speed_mph, "hourly.wind_speed", 0)?;
    }
    Ok(())
}
