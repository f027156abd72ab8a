//! Prediction engine
//!
//! Fits the feature scaler and both trend regressors once, at construction,
//! from the synthetic corpus; after that every operation is a pure
//! transformation. Adjustment paths never edit their input: they clone,
//! modify the clone, and return it, so previously published snapshots stay
//! intact for concurrent readers.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use agro_math::features::{month_features, StandardScaler};
use agro_math::regression::LinearModel;

use crate::config::EngineConfig;
use crate::corpus::{default_training_pairs, BaselineCorpus};
use crate::error::{ForecastError, Result};
use crate::events::{Event, EventKind, MANUAL_ADJUSTMENT_LABEL};
use crate::prediction::{MonthlyPoint, PairKey, Prediction, MONTHS_PER_YEAR};

/// Demand multiplier a disaster event applies to forecast months
pub const DISASTER_DEMAND_FACTOR: f64 = 1.2;

/// Price multiplier a disaster event applies to forecast months
pub const DISASTER_PRICE_FACTOR: f64 = 1.3;

/// Produces and adjusts twelve-month outlooks
#[derive(Debug)]
pub struct PredictionEngine {
    scaler: StandardScaler,
    demand_model: LinearModel,
    price_model: LinearModel,
    corpus: BaselineCorpus,
    config: EngineConfig,
}

impl PredictionEngine {
    /// Fit an engine from a generated corpus
    ///
    /// Fails with a configuration error on an invalid config, an empty
    /// corpus, or a failed fit; the service must not start without a fitted
    /// engine.
    pub fn new(corpus: BaselineCorpus, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        if corpus.is_empty() {
            return Err(ForecastError::Configuration(
                "training corpus is empty".to_string(),
            ));
        }

        let data = corpus.training_data();

        let mut scaler = StandardScaler::new();
        scaler
            .fit(&data.features)
            .map_err(|e| ForecastError::Configuration(format!("scaler fit failed: {}", e)))?;

        let scaled: Vec<_> = data
            .features
            .iter()
            .map(|row| scaler.transform(row))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ForecastError::Configuration(format!("scaling failed: {}", e)))?;

        let mut demand_model = LinearModel::new();
        demand_model
            .fit(&scaled, &data.demands)
            .map_err(|e| ForecastError::Configuration(format!("demand fit failed: {}", e)))?;

        let mut price_model = LinearModel::new();
        price_model
            .fit(&scaled, &data.prices)
            .map_err(|e| ForecastError::Configuration(format!("price fit failed: {}", e)))?;

        info!(
            samples = data.features.len(),
            pairs = corpus.len(),
            "fitted demand and price models"
        );

        Ok(Self {
            scaler,
            demand_model,
            price_model,
            corpus,
            config,
        })
    }

    /// Fit an engine over the stock training pairs for `target_year`
    pub fn with_defaults(target_year: i32, rng: &mut impl Rng) -> Result<Self> {
        let config = EngineConfig::default();
        let corpus =
            BaselineCorpus::generate(&default_training_pairs(), target_year, &config, rng);
        Self::new(corpus, config)
    }

    /// Produce a fresh twelve-month outlook for a pair
    ///
    /// Each month is encoded, scaled, run through both regressors, jittered,
    /// and rounded; months before `current_month` are flagged historical.
    /// The returned Prediction has no event labels; fold events in with
    /// [`apply_events`].
    ///
    /// [`apply_events`]: PredictionEngine::apply_events
    pub fn predict(
        &self,
        key: &PairKey,
        year: i32,
        current_month: u32,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Prediction> {
        if !(1..=MONTHS_PER_YEAR as u32).contains(&current_month) {
            return Err(ForecastError::InvalidParameter(format!(
                "current_month must be 1..=12, got {}",
                current_month
            )));
        }

        let (baseline_demand, baseline_price) = self.baselines_for(key);

        let mut demand_series = Vec::with_capacity(MONTHS_PER_YEAR);
        let mut price_series = Vec::with_capacity(MONTHS_PER_YEAR);

        for month in 1..=MONTHS_PER_YEAR as u32 {
            let scaled = self.scaler.transform(&month_features(month, year))?;

            let demand_jitter = rng
                .gen_range(self.config.demand_jitter.0..=self.config.demand_jitter.1);
            let price_jitter =
                rng.gen_range(self.config.price_jitter.0..=self.config.price_jitter.1);

            let raw_demand = self.demand_model.predict(&scaled) * demand_jitter;
            let raw_price = self.price_model.predict(&scaled) * price_jitter;

            let is_historical = month < current_month;
            demand_series.push(MonthlyPoint::from_raw(
                month,
                raw_demand,
                baseline_demand,
                is_historical,
            ));
            price_series.push(MonthlyPoint::from_raw(
                month,
                raw_price,
                baseline_price,
                is_historical,
            ));
        }

        Ok(Prediction {
            key: key.clone(),
            year,
            current_month,
            demand_series,
            price_series,
            baseline_demand,
            baseline_price,
            last_updated: now,
        })
    }

    /// Fold an ordered event list into a prediction, returning the adjusted
    /// copy
    ///
    /// Disasters scale demand and price on every forecast month; economic
    /// events scale price only, by their impact factor; positive and manual
    /// kinds are never auto-applied. Same-month effects compound in input
    /// order. Not idempotent: always start from a fresh [`predict`] result,
    /// never from an already-adjusted snapshot.
    ///
    /// [`predict`]: PredictionEngine::predict
    pub fn apply_events(
        &self,
        prediction: &Prediction,
        events: &[Event],
        now: DateTime<Utc>,
    ) -> Prediction {
        let mut updated = prediction.clone();
        let baseline_demand = updated.baseline_demand;
        let baseline_price = updated.baseline_price;

        for event in events {
            match event.kind {
                EventKind::Disaster => {
                    for (demand, price) in updated
                        .demand_series
                        .iter_mut()
                        .zip(updated.price_series.iter_mut())
                    {
                        if demand.is_historical {
                            continue;
                        }
                        demand.rescale(DISASTER_DEMAND_FACTOR, baseline_demand, &event.name);
                        price.rescale(DISASTER_PRICE_FACTOR, baseline_price, &event.name);
                    }
                }
                EventKind::Economic => {
                    for price in updated.price_series.iter_mut() {
                        if price.is_historical {
                            continue;
                        }
                        price.rescale(event.impact_factor, baseline_price, &event.name);
                    }
                }
                // Informational kinds reach predictions through the manual
                // override path only.
                EventKind::Positive | EventKind::Manual => {}
            }
        }

        updated.last_updated = now;
        updated
    }

    /// Apply an operator override to a single month of a prediction
    ///
    /// A zero change leaves that series' point untouched; demand and price
    /// overrides are independent. A month outside 1..=12 returns the input
    /// unchanged (logged, never an error).
    pub fn apply_manual_override(
        &self,
        prediction: &Prediction,
        month: u32,
        demand_change_pct: f64,
        price_change_pct: f64,
        now: DateTime<Utc>,
    ) -> Prediction {
        if !(1..=MONTHS_PER_YEAR as u32).contains(&month) {
            warn!(month, "manual override month out of range, ignoring");
            return prediction.clone();
        }

        let mut updated = prediction.clone();
        let index = (month - 1) as usize;

        if demand_change_pct != 0.0 {
            let new_value =
                updated.demand_series[index].value * (1.0 + demand_change_pct / 100.0);
            updated.demand_series[index].overwrite(
                new_value,
                updated.baseline_demand,
                MANUAL_ADJUSTMENT_LABEL,
            );
        }

        if price_change_pct != 0.0 {
            let new_value = updated.price_series[index].value * (1.0 + price_change_pct / 100.0);
            updated.price_series[index].overwrite(
                new_value,
                updated.baseline_price,
                MANUAL_ADJUSTMENT_LABEL,
            );
        }

        updated.last_updated = now;
        updated
    }

    /// Compose [`predict`] and [`apply_events`] in one call
    ///
    /// [`predict`]: PredictionEngine::predict
    /// [`apply_events`]: PredictionEngine::apply_events
    pub fn predict_with_events(
        &self,
        key: &PairKey,
        year: i32,
        current_month: u32,
        events: &[Event],
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Prediction> {
        let prediction = self.predict(key, year, current_month, now, rng)?;
        Ok(self.apply_events(&prediction, events, now))
    }

    /// Baselines for a pair: corpus-derived when covered, stock defaults
    /// otherwise
    pub fn baselines_for(&self, key: &PairKey) -> (f64, f64) {
        self.corpus.baselines_for(key).unwrap_or((
            self.config.default_baseline_demand,
            self.config.default_baseline_price,
        ))
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_corpus_is_a_configuration_error() {
        let result = PredictionEngine::new(BaselineCorpus::default(), EngineConfig::default());
        assert!(matches!(result, Err(ForecastError::Configuration(_))));
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = EngineConfig {
            demand_jitter: (0.0, 1.05),
            ..EngineConfig::default()
        };
        let corpus = BaselineCorpus::generate(
            &default_training_pairs(),
            2024,
            &EngineConfig::default(),
            &mut rng,
        );
        assert!(PredictionEngine::new(corpus, config).is_err());
    }

    #[test]
    fn test_out_of_range_current_month_is_an_error() {
        let mut rng = StdRng::seed_from_u64(2);
        let engine = PredictionEngine::with_defaults(2024, &mut rng).unwrap();

        let result = engine.predict(
            &PairKey::new("district1", "wheat"),
            2024,
            13,
            Utc::now(),
            &mut rng,
        );
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }
}
