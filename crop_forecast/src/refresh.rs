//! Recurring refresh cycle
//!
//! An external driver ticks [`RefreshCycle::run`] on a fixed interval. Each
//! tick polls the event store (expiring stale events, possibly synthesizing
//! a random one), rebuilds every tracked prediction from a fresh model pass,
//! folds in the events relevant to each pair, and publishes the results.
//! Rebuilding from scratch keeps ticks idempotent: adjustments never
//! accumulate across cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::engine::PredictionEngine;
use crate::events::EventStore;
use crate::store::PredictionStore;

/// What one refresh tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A cycle was already in progress; this tick was dropped, not queued
    Skipped,
    /// The cycle ran over every tracked key
    Completed {
        /// Pairs republished with a fresh prediction
        refreshed: usize,
        /// Pairs skipped after a prediction failure; their previous
        /// snapshots remain published
        failed: usize,
    },
}

/// Two-state (idle / refreshing) recomputation driver
#[derive(Debug)]
pub struct RefreshCycle {
    engine: Arc<PredictionEngine>,
    store: PredictionStore,
    events: Arc<EventStore>,
    refreshing: AtomicBool,
    last_completed: RwLock<Option<DateTime<Utc>>>,
}

impl RefreshCycle {
    pub fn new(
        engine: Arc<PredictionEngine>,
        store: PredictionStore,
        events: Arc<EventStore>,
    ) -> Self {
        Self {
            engine,
            store,
            events,
            refreshing: AtomicBool::new(false),
            last_completed: RwLock::new(None),
        }
    }

    /// Run one refresh tick
    ///
    /// Returns [`RefreshOutcome::Skipped`] without touching anything if a
    /// cycle is already in progress. A failure on one pair is logged and
    /// skipped; it never aborts the cycle or disturbs that pair's previously
    /// published snapshot.
    pub fn run(&self, now: DateTime<Utc>, rng: &mut impl Rng) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            debug!("refresh tick skipped, cycle already in progress");
            return RefreshOutcome::Skipped;
        }

        let active = self.events.poll(now, rng);
        let year = now.year();
        let current_month = now.month();

        let mut refreshed = 0;
        let mut failed = 0;
        for key in self.store.tracked_keys() {
            let relevant: Vec<_> = active
                .iter()
                .filter(|e| e.applies_to(&key.location, &key.crop))
                .cloned()
                .collect();

            match self
                .engine
                .predict_with_events(&key, year, current_month, &relevant, now, rng)
            {
                Ok(prediction) => {
                    self.store.publish(prediction);
                    refreshed += 1;
                }
                Err(error) => {
                    warn!(%key, %error, "refresh failed for pair, keeping previous snapshot");
                    failed += 1;
                }
            }
        }

        *self.last_completed.write().unwrap() = Some(now);
        self.refreshing.store(false, Ordering::Release);

        info!(refreshed, failed, active_events = active.len(), "refresh cycle completed");
        RefreshOutcome::Completed { refreshed, failed }
    }

    /// Whether a cycle is currently in progress
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// When the last cycle completed, if any has
    pub fn last_completed(&self) -> Option<DateTime<Utc>> {
        *self.last_completed.read().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cycle() -> RefreshCycle {
        let mut rng = StdRng::seed_from_u64(1);
        let engine = Arc::new(PredictionEngine::with_defaults(2024, &mut rng).unwrap());
        RefreshCycle::new(engine, PredictionStore::new(), Arc::new(EventStore::default()))
    }

    #[test]
    fn test_tick_during_a_running_cycle_is_skipped() {
        let cycle = cycle();
        let mut rng = StdRng::seed_from_u64(2);
        let now = Utc::now();

        cycle.refreshing.store(true, Ordering::SeqCst);
        assert!(cycle.is_refreshing());
        assert_eq!(cycle.run(now, &mut rng), RefreshOutcome::Skipped);
        assert_eq!(cycle.last_completed(), None);

        cycle.refreshing.store(false, Ordering::SeqCst);
        let outcome = cycle.run(now, &mut rng);
        assert_eq!(
            outcome,
            RefreshOutcome::Completed {
                refreshed: 0,
                failed: 0
            }
        );
        assert_eq!(cycle.last_completed(), Some(now));
        assert!(!cycle.is_refreshing());
    }
}
