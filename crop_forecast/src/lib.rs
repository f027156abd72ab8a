//! # Crop Forecast
//!
//! A Rust library producing twelve-month crop demand and price outlooks and
//! keeping them live as exogenous market events arrive.
//!
//! ## Features
//!
//! - Calendar feature encoding and trend regression over a synthetic
//!   seasonal corpus
//! - Twelve-month demand/price predictions with per-pair baselines and
//!   historical/forecast month flags
//! - Event composition: disasters, economic shocks, and operator overrides
//!   folded deterministically into fresh predictions
//! - A time-bounded event store with expiry and optional random
//!   demonstration events
//! - A refresh cycle that rebuilds every tracked prediction on an external
//!   timer without ever exposing a half-updated snapshot
//! - Dashboard-style market rate snapshots over an injected price table
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::Utc;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! use crop_forecast::{EventStore, ForecastService, PredictionEngine, Result};
//!
//! fn main() -> Result<()> {
//!     let mut rng = StdRng::seed_from_u64(7);
//!     let now = Utc::now();
//!
//!     // Fit the engine once, at startup
//!     let engine = PredictionEngine::with_defaults(2024, &mut rng)?;
//!     let events = EventStore::default();
//!     events.seed_demo_events(now);
//!
//!     let service = ForecastService::new(engine, events);
//!
//!     // Predict and start tracking a pair
//!     let outlook = service.predict_and_track("Pune", "wheat", now, &mut rng)?;
//!     println!("June demand: {}", outlook.demand_series[5].value);
//!
//!     // An external timer ticks this every five minutes
//!     service.refresh_tick(now, &mut rng);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod events;
pub mod market;
pub mod prediction;
pub mod refresh;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use crate::config::{EngineConfig, RandomEventConfig};
pub use crate::corpus::{default_training_pairs, BaselineCorpus};
pub use crate::engine::PredictionEngine;
pub use crate::error::{ForecastError, Result};
pub use crate::events::{Event, EventDraft, EventKind, EventScope, EventStore};
pub use crate::market::{MarketAlert, MarketBoard, MarketRate, MarketTrend};
pub use crate::prediction::{MonthlyPoint, PairKey, Prediction};
pub use crate::refresh::{RefreshCycle, RefreshOutcome};
pub use crate::service::{ForecastService, ServiceStatus};
pub use crate::store::PredictionStore;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
