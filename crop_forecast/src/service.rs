//! Routing-facing service facade
//!
//! Bundles the engine, the snapshot store, the event store, and the refresh
//! cycle behind the operations a request-handling layer needs. HTTP itself
//! stays outside this crate; every method here is a plain synchronous call
//! over the data model.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::PredictionEngine;
use crate::error::{ForecastError, Result};
use crate::events::{Event, EventStore};
use crate::prediction::{PairKey, Prediction};
use crate::refresh::{RefreshCycle, RefreshOutcome};
use crate::store::PredictionStore;

/// Health summary for a monitoring endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Pairs with a published prediction
    pub tracked_predictions: usize,
    /// Events live at the time of the query
    pub active_events: usize,
    /// Completion instant of the most recent refresh cycle
    pub last_refresh: Option<DateTime<Utc>>,
}

/// One service instance per deployment: owns the fitted engine and the
/// shared stores, and drives refreshes on behalf of an external timer
#[derive(Debug)]
pub struct ForecastService {
    engine: Arc<PredictionEngine>,
    store: PredictionStore,
    events: Arc<EventStore>,
    cycle: RefreshCycle,
}

impl ForecastService {
    /// Assemble a service around a fitted engine and an event store
    pub fn new(engine: PredictionEngine, events: EventStore) -> Self {
        Self::from_parts(Arc::new(engine), PredictionStore::new(), Arc::new(events))
    }

    /// Assemble a service from shared handles
    ///
    /// Useful when tests or an embedding application want to hold their own
    /// handle to a store.
    pub fn from_parts(
        engine: Arc<PredictionEngine>,
        store: PredictionStore,
        events: Arc<EventStore>,
    ) -> Self {
        let cycle = RefreshCycle::new(Arc::clone(&engine), store.clone(), Arc::clone(&events));
        Self {
            engine,
            store,
            events,
            cycle,
        }
    }

    /// Predict a pair's outlook for the year containing `now`, publish it,
    /// and return the published snapshot
    ///
    /// The pair becomes tracked: subsequent refresh ticks keep its
    /// prediction current.
    pub fn predict_and_track(
        &self,
        location: &str,
        crop: &str,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Arc<Prediction>> {
        let key = PairKey::new(location, crop);
        let prediction = self.engine.predict(&key, now.year(), now.month(), now, rng)?;
        Ok(self.store.publish(prediction))
    }

    /// Apply an operator override to a tracked pair's current snapshot and
    /// republish it
    ///
    /// Fails with [`ForecastError::UnknownKey`] if the pair was never
    /// predicted.
    pub fn manual_adjust(
        &self,
        location: &str,
        crop: &str,
        month: u32,
        demand_change_pct: f64,
        price_change_pct: f64,
        now: DateTime<Utc>,
    ) -> Result<Arc<Prediction>> {
        let key = PairKey::new(location, crop);
        let current = self.store.get(&key).ok_or_else(|| ForecastError::UnknownKey {
            location: location.to_string(),
            crop: crop.to_string(),
        })?;

        let adjusted = self.engine.apply_manual_override(
            &current,
            month,
            demand_change_pct,
            price_change_pct,
            now,
        );
        Ok(self.store.publish(adjusted))
    }

    /// Compose a fresh prediction with the given events, without publishing
    pub fn updated_prediction(
        &self,
        location: &str,
        crop: &str,
        events: &[Event],
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Prediction> {
        let key = PairKey::new(location, crop);
        self.engine
            .predict_with_events(&key, now.year(), now.month(), events, now, rng)
    }

    /// Run one refresh tick over every tracked pair
    pub fn refresh_tick(&self, now: DateTime<Utc>, rng: &mut impl Rng) -> RefreshOutcome {
        self.cycle.run(now, rng)
    }

    /// Events currently live, expiring stale ones as a side effect
    pub fn current_events(&self, now: DateTime<Utc>) -> Vec<Event> {
        self.events.active(now)
    }

    /// Health summary at `now`
    pub fn status(&self, now: DateTime<Utc>) -> ServiceStatus {
        ServiceStatus {
            tracked_predictions: self.store.len(),
            active_events: self.events.active(now).len(),
            last_refresh: self.cycle.last_completed(),
        }
    }

    /// The fitted engine
    pub fn engine(&self) -> &PredictionEngine {
        &self.engine
    }

    /// Handle to the snapshot store
    pub fn prediction_store(&self) -> &PredictionStore {
        &self.store
    }

    /// Handle to the event store
    pub fn event_store(&self) -> &EventStore {
        &self.events
    }
}
