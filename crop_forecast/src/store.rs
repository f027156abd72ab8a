//! Published prediction snapshots
//!
//! The store maps each tracked pair to its currently published
//! [`Prediction`], shared between the request path and the refresh driver.
//! Snapshots are immutable once published: an update builds a new value and
//! swaps the entry wholesale, so a reader holding the previous `Arc` keeps a
//! consistent view for as long as it wants.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::prediction::{PairKey, Prediction};

/// Thread-safe map from pair to published snapshot
///
/// Cheap to clone; clones share the same underlying map.
#[derive(Clone, Default)]
pub struct PredictionStore {
    inner: Arc<RwLock<HashMap<PairKey, Arc<Prediction>>>>,
}

impl fmt::Debug for PredictionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.inner.read().unwrap();
        f.debug_struct("PredictionStore")
            .field("tracked", &map.len())
            .finish()
    }
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a snapshot, replacing any previous entry for the same pair
    ///
    /// Returns the shared handle to the newly published snapshot.
    pub fn publish(&self, prediction: Prediction) -> Arc<Prediction> {
        let snapshot = Arc::new(prediction);
        self.inner
            .write()
            .unwrap()
            .insert(snapshot.key.clone(), Arc::clone(&snapshot));
        snapshot
    }

    /// Currently published snapshot for a pair
    pub fn get(&self, key: &PairKey) -> Option<Arc<Prediction>> {
        self.inner.read().unwrap().get(key).cloned()
    }

    /// Every tracked key, sorted for deterministic iteration
    pub fn tracked_keys(&self) -> Vec<PairKey> {
        let mut keys: Vec<_> = self.inner.read().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Stop tracking a pair, returning its last snapshot
    pub fn remove(&self, key: &PairKey) -> Option<Arc<Prediction>> {
        self.inner.write().unwrap().remove(key)
    }

    /// Number of tracked pairs
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }
}
