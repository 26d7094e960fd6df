//! Periodic refresh of trail conditions.
//!
//! One task sweeps every park in order, fetching and deriving conditions
//! one park at a time. A failing park is logged and marked as fallback in
//! the cache; the sweep always continues with the next park.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::config::{ParkConfig, TimingConfig};
use common::{Error, RawForecast, TrailMetrics};
use openweather_client::OpenWeatherClient;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::cache::ConditionsCache;
use crate::metrics::compute_trail_metrics;

/// Anything that can produce a forecast for a park.
pub trait ForecastSource: Send + Sync {
    fn fetch_forecast(
        &self,
        park: &ParkConfig,
    ) -> impl Future<Output = Result<RawForecast, Error>> + Send;
}

impl ForecastSource for OpenWeatherClient {
    fn fetch_forecast(
        &self,
        park: &ParkConfig,
    ) -> impl Future<Output = Result<RawForecast, Error>> + Send {
        self.get_forecast(park)
    }
}

impl<T: ForecastSource> ForecastSource for Arc<T> {
    fn fetch_forecast(
        &self,
        park: &ParkConfig,
    ) -> impl Future<Output = Result<RawForecast, Error>> + Send {
        (**self).fetch_forecast(park)
    }
}

/// Outcome counts for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub cycle_id: u64,
    pub refreshed: usize,
    pub failed: usize,
}

/// Drives refresh cycles over a fixed park list.
pub struct RefreshScheduler<S> {
    source: S,
    parks: Vec<ParkConfig>,
    cache: ConditionsCache,
    period: Duration,
    fetch_timeout: Duration,
    cycles: Arc<AtomicU64>,
}

impl<S: ForecastSource> RefreshScheduler<S> {
    pub fn new(
        source: S,
        parks: Vec<ParkConfig>,
        cache: ConditionsCache,
        timing: &TimingConfig,
    ) -> Self {
        Self::with_intervals(
            source,
            parks,
            cache,
            Duration::from_secs(timing.refresh_interval_secs),
            Duration::from_secs(timing.fetch_timeout_secs),
        )
    }

    pub fn with_intervals(
        source: S,
        parks: Vec<ParkConfig>,
        cache: ConditionsCache,
        period: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            parks,
            cache,
            period,
            fetch_timeout,
            cycles: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn cache(&self) -> &ConditionsCache {
        &self.cache
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Refresh every park once, in order. Never fails as a whole.
    pub async fn run_cycle(&self) -> CycleSummary {
        let cycle_id = self.cycles.load(Ordering::Acquire).saturating_add(1);
        info!(
            "Refresh cycle {} starting ({} parks)",
            cycle_id,
            self.parks.len()
        );

        let mut refreshed = 0usize;
        let mut failed = 0usize;

        for park in &self.parks {
            match self.refresh_park(park).await {
                Ok(metrics) => {
                    info!(
                        "{}: weekly rain {:.2} in, recent {:.2} in, mud {}/10, dust {}/10, last rain {}",
                        park.name,
                        metrics.total_weekly_rain_in,
                        metrics.recent_rain_in,
                        metrics.mud_level,
                        metrics.dust_level,
                        metrics.last_rain.label(),
                    );
                    self.cache.record_success(&park.name, metrics, Utc::now());
                    refreshed += 1;
                }
                Err(e) => {
                    warn!("Refresh failed for {}: {}", park.name, e);
                    self.cache.record_failure(&park.name, Utc::now());
                    failed += 1;
                }
            }
        }

        self.cycles.store(cycle_id, Ordering::Release);
        let summary = CycleSummary {
            cycle_id,
            refreshed,
            failed,
        };
        info!(
            "Refresh cycle {} done: refreshed={} failed={}",
            cycle_id, refreshed, failed
        );
        summary
    }

    async fn refresh_park(&self, park: &ParkConfig) -> Result<TrailMetrics, Error> {
        let forecast = tokio::time::timeout(self.fetch_timeout, self.source.fetch_forecast(park))
            .await
            .map_err(|_| {
                Error::Provider(format!(
                    "fetch for {} timed out after {}s",
                    park.name,
                    self.fetch_timeout.as_secs()
                ))
            })??;

        compute_trail_metrics(&forecast)
    }
}

impl<S: ForecastSource + 'static> RefreshScheduler<S> {
    /// Spawn the periodic task. The first cycle runs immediately.
    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let cycles = Arc::clone(&self.cycles);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    // Also fires when the handle is dropped.
                    _ = stop_rx.changed() => break,
                }

                // Not raced against the stop signal: a started cycle always finishes.
                self.run_cycle().await;

                if *stop_rx.borrow() {
                    break;
                }
            }

            info!("Refresh scheduler stopped");
        });

        SchedulerHandle {
            stop_tx,
            task,
            cycles,
        }
    }
}

/// Lifecycle handle for a running [`RefreshScheduler`].
///
/// Dropping the handle also stops the scheduler once any in-flight cycle ends.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    cycles: Arc<AtomicU64>,
}

impl SchedulerHandle {
    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    /// Request shutdown and wait for the task. An in-flight cycle completes first.
    pub async fn stop(self) {
        // Err only means the task already exited.
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("Refresh scheduler task failed: {}", e);
        }
    }
}
