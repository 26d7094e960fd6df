//! In-memory cache of trail conditions.
//!
//! Uses `DashMap` so HTTP readers never wait on a whole refresh cycle. Each
//! park's entry is replaced under its shard lock, so readers see either the
//! old entry or the new one.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{ConditionsEntry, DerivedConditions, FallbackStatus, TrailMetrics};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Thread-safe conditions cache keyed by park name. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct ConditionsCache {
    entries: Arc<DashMap<String, ConditionsEntry>>,
}

impl ConditionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store freshly computed conditions for a park.
    pub fn record_success(&self, park: &str, metrics: TrailMetrics, now: DateTime<Utc>) {
        self.entries.insert(
            park.to_string(),
            ConditionsEntry::Current(DerivedConditions {
                metrics,
                last_updated: now,
            }),
        );
    }

    /// Mark a park's latest refresh as failed, keeping any earlier good data.
    pub fn record_failure(&self, park: &str, now: DateTime<Utc>) {
        match self.entries.entry(park.to_string()) {
            Entry::Occupied(mut slot) => {
                let fallback = slot.get().clone().into_fallback(now);
                slot.insert(ConditionsEntry::Fallback(fallback));
            }
            Entry::Vacant(slot) => {
                slot.insert(ConditionsEntry::Fallback(FallbackStatus {
                    last_updated: now,
                    last_known: None,
                }));
            }
        }
    }

    pub fn get(&self, park: &str) -> Option<ConditionsEntry> {
        self.entries.get(park).map(|e| e.value().clone())
    }

    /// Copy of every entry, ordered by park name.
    pub fn snapshot(&self) -> BTreeMap<String, ConditionsEntry> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
