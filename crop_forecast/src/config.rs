//! Engine configuration
//!
//! Every stochastic range and interval the engine consumes is a field here
//! rather than a buried literal, so tests can pin them and deployments can
//! tune them. `Default` carries the production values.

use std::time::Duration;

use crate::error::{ForecastError, Result};

/// How often the external driver is expected to invoke a refresh tick
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Chance per refresh tick of synthesizing one random market event
pub const DEFAULT_RANDOM_EVENT_PROBABILITY: f64 = 0.10;

/// Baseline demand for pairs absent from the training corpus
pub const DEFAULT_BASELINE_DEMAND: f64 = 2500.0;

/// Baseline price for pairs absent from the training corpus
pub const DEFAULT_BASELINE_PRICE: f64 = 50.0;

/// Controls the random event synthesizer that runs on refresh ticks
///
/// Disabled by default: random events are demo behavior, and production
/// deployments feed the store from real detection instead.
#[derive(Debug, Clone)]
pub struct RandomEventConfig {
    /// Whether refresh ticks may synthesize events at all
    pub enabled: bool,
    /// Per-tick probability of synthesizing one event, in `[0, 1]`
    pub probability: f64,
    /// Locations a synthesized event may affect
    pub location_pool: Vec<String>,
    /// Crops a synthesized event may affect
    pub crop_pool: Vec<String>,
}

impl Default for RandomEventConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: DEFAULT_RANDOM_EVENT_PROBABILITY,
            location_pool: [
                "Mumbai",
                "Delhi",
                "Bangalore",
                "Chennai",
                "Kolkata",
                "Hyderabad",
                "Pune",
                "Ahmedabad",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            crop_pool: [
                "wheat",
                "rice",
                "corn",
                "cotton",
                "sugarcane",
                "potato",
                "tomato",
                "onion",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Tunable parameters for corpus synthesis, prediction jitter, and refresh
///
/// All ranges are `(low, high)` pairs sampled uniformly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval at which the external driver should tick the refresh cycle
    pub refresh_interval: Duration,
    /// Multiplicative jitter applied to each predicted demand value
    pub demand_jitter: (f64, f64),
    /// Multiplicative jitter applied to each predicted price value
    pub price_jitter: (f64, f64),
    /// Amplitude of the seasonal sine swing in synthetic demand
    pub demand_amplitude: f64,
    /// Price moves counter to the season: its factor is this constant minus
    /// the seasonal demand factor
    pub price_counter_base: f64,
    /// Per-sample noise on synthetic demand
    pub demand_noise: (f64, f64),
    /// Per-sample noise on synthetic price
    pub price_noise: (f64, f64),
    /// Range the per-pair base demand level is drawn from
    pub base_demand_range: (f64, f64),
    /// Range the per-pair base price level is drawn from
    pub base_price_range: (f64, f64),
    /// Baseline demand for pairs the corpus never saw
    pub default_baseline_demand: f64,
    /// Baseline price for pairs the corpus never saw
    pub default_baseline_price: f64,
    /// Random event synthesis settings
    pub random_events: RandomEventConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            demand_jitter: (0.95, 1.05),
            price_jitter: (0.95, 1.05),
            demand_amplitude: 0.3,
            price_counter_base: 2.0,
            demand_noise: (0.8, 1.2),
            price_noise: (0.9, 1.1),
            base_demand_range: (1000.0, 5000.0),
            base_price_range: (20.0, 100.0),
            default_baseline_demand: DEFAULT_BASELINE_DEMAND,
            default_baseline_price: DEFAULT_BASELINE_PRICE,
            random_events: RandomEventConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration, returning a configuration error describing
    /// the first problem found
    pub fn validate(&self) -> Result<()> {
        for (label, range) in [
            ("demand_jitter", self.demand_jitter),
            ("price_jitter", self.price_jitter),
            ("demand_noise", self.demand_noise),
            ("price_noise", self.price_noise),
            ("base_demand_range", self.base_demand_range),
            ("base_price_range", self.base_price_range),
        ] {
            if range.0 <= 0.0 || range.1 < range.0 {
                return Err(ForecastError::Configuration(format!(
                    "{} must be a positive ascending range, got ({}, {})",
                    label, range.0, range.1
                )));
            }
        }

        if !(0.0..1.0).contains(&self.demand_amplitude) {
            return Err(ForecastError::Configuration(format!(
                "demand_amplitude must be in [0, 1), got {}",
                self.demand_amplitude
            )));
        }
        // Seasonal price factor is counter_base − (1 + amplitude·sin); keep
        // it positive at the seasonal peak.
        if self.price_counter_base <= 1.0 + self.demand_amplitude {
            return Err(ForecastError::Configuration(format!(
                "price_counter_base must exceed 1 + demand_amplitude, got {}",
                self.price_counter_base
            )));
        }
        if self.default_baseline_demand <= 0.0 || self.default_baseline_price <= 0.0 {
            return Err(ForecastError::Configuration(
                "default baselines must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.random_events.probability) {
            return Err(ForecastError::Configuration(format!(
                "random event probability must be in [0, 1], got {}",
                self.random_events.probability
            )));
        }
        Ok(())
    }
}
