//! Trail conditions crate.
//!
//! Derives trail metrics from forecasts, keeps the per-park cache, and runs
//! the periodic refresh.

pub mod cache;
pub mod metrics;
pub mod scheduler;

pub use cache::ConditionsCache;
pub use metrics::compute_trail_metrics;
pub use scheduler::{CycleSummary, ForecastSource, RefreshScheduler, SchedulerHandle};
