//! Synthetic baseline corpus
//!
//! The engine has no access to real historical series, so it trains on a
//! synthetic corpus: for each configured (location, crop) pair, twelve
//! monthly observations following a seasonal multiplicative model. The same
//! corpus supplies each pair's baseline demand and price levels, which serve
//! as percentage denominators in every published prediction.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rand::Rng;

use agro_math::features::{month_features, FEATURE_DIMS};

use crate::config::EngineConfig;
use crate::prediction::{PairKey, MONTHS_PER_YEAR};

/// One synthetic monthly observation for a pair
#[derive(Debug, Clone)]
pub struct MonthlySample {
    pub month: u32,
    pub year: i32,
    pub demand: f64,
    pub price: f64,
}

/// A pair's twelve-month synthetic history and the baselines derived from it
#[derive(Debug, Clone)]
pub struct PairHistory {
    pub samples: Vec<MonthlySample>,
    pub baseline_demand: f64,
    pub baseline_price: f64,
}

/// Training rows extracted from the corpus, one row per sample
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub features: Vec<[f64; FEATURE_DIMS]>,
    pub demands: Vec<f64>,
    pub prices: Vec<f64>,
}

/// The full synthetic corpus for a configured pair set
#[derive(Debug, Clone, Default)]
pub struct BaselineCorpus {
    histories: BTreeMap<PairKey, PairHistory>,
}

impl BaselineCorpus {
    /// Generate the corpus for `pairs`, with samples dated to the year
    /// before `target_year`
    ///
    /// # Arguments
    /// * `pairs` - The (location, crop) pairs to synthesize histories for
    /// * `target_year` - The year predictions will be made for
    /// * `config` - Seasonal amplitude, noise, and base-level ranges
    /// * `rng` - Random source; seed it for reproducible corpora
    pub fn generate(
        pairs: &[PairKey],
        target_year: i32,
        config: &EngineConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let history_year = target_year - 1;
        let mut histories = BTreeMap::new();

        for pair in pairs {
            let base_demand = rng.gen_range(config.base_demand_range.0..config.base_demand_range.1);
            let base_price = rng.gen_range(config.base_price_range.0..config.base_price_range.1);

            let mut samples = Vec::with_capacity(MONTHS_PER_YEAR);
            for month in 1..=MONTHS_PER_YEAR as u32 {
                let seasonal = 1.0 + config.demand_amplitude * (2.0 * PI * month as f64 / 12.0).sin();

                let demand = base_demand
                    * seasonal
                    * rng.gen_range(config.demand_noise.0..=config.demand_noise.1);
                let price = base_price
                    * (config.price_counter_base - seasonal)
                    * rng.gen_range(config.price_noise.0..=config.price_noise.1);

                samples.push(MonthlySample {
                    month,
                    year: history_year,
                    demand,
                    price,
                });
            }

            let baseline_demand =
                samples.iter().map(|s| s.demand).sum::<f64>() / samples.len() as f64;
            let baseline_price =
                samples.iter().map(|s| s.price).sum::<f64>() / samples.len() as f64;

            histories.insert(
                pair.clone(),
                PairHistory {
                    samples,
                    baseline_demand,
                    baseline_price,
                },
            );
        }

        Self { histories }
    }

    /// Flatten every pair's samples into feature rows and target columns
    pub fn training_data(&self) -> TrainingData {
        let mut features = Vec::with_capacity(self.histories.len() * MONTHS_PER_YEAR);
        let mut demands = Vec::with_capacity(features.capacity());
        let mut prices = Vec::with_capacity(features.capacity());

        for history in self.histories.values() {
            for sample in &history.samples {
                features.push(month_features(sample.month, sample.year));
                demands.push(sample.demand);
                prices.push(sample.price);
            }
        }

        TrainingData {
            features,
            demands,
            prices,
        }
    }

    /// Baselines for a pair, if the corpus covers it
    pub fn baselines_for(&self, key: &PairKey) -> Option<(f64, f64)> {
        self.histories
            .get(key)
            .map(|h| (h.baseline_demand, h.baseline_price))
    }

    /// Full history for a pair, if the corpus covers it
    pub fn history_for(&self, key: &PairKey) -> Option<&PairHistory> {
        self.histories.get(key)
    }

    /// Number of pairs covered
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

/// The stock training pair set: five districts crossed with seven staple
/// crops
pub fn default_training_pairs() -> Vec<PairKey> {
    let crops = [
        "wheat",
        "rice",
        "corn",
        "cotton",
        "sugarcane",
        "potato",
        "tomato",
    ];
    let districts = ["district1", "district2", "district3", "district4", "district5"];

    let mut pairs = Vec::with_capacity(crops.len() * districts.len());
    for district in &districts {
        for crop in &crops {
            pairs.push(PairKey::new(*district, *crop));
        }
    }
    pairs
}
