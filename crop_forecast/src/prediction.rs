//! Core prediction data model
//!
//! A [`Prediction`] is an immutable snapshot of one point in time: twelve
//! demand points and twelve price points for a (location, crop) pair, plus
//! the baselines the percentages are computed against. Adjustment paths
//! build a new snapshot rather than editing a published one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Number of monthly points in each series
pub const MONTHS_PER_YEAR: usize = 12;

/// Round to two decimal places, the precision every published value carries
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Identity of a tracked prediction
///
/// Ordered so key collections iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    /// Location identifier, e.g. a district name
    pub location: String,
    /// Crop identifier
    pub crop: String,
}

impl PairKey {
    pub fn new(location: impl Into<String>, crop: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            crop: crop.into(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.crop)
    }
}

/// One month of a demand or price series
///
/// `percentage` is always derived as `round2(100 · value / baseline)`;
/// [`MonthlyPoint::rescale`] and the engine's adjustment paths keep that
/// relationship intact whenever `value` changes. `event_label` names the
/// last adjustment applied to this point and serializes as an explicit
/// `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// Calendar month, 1 through 12
    pub month: u32,
    /// Predicted demand volume or price level
    pub value: f64,
    /// Value relative to the pair's baseline, in percent
    pub percentage: f64,
    /// Months before the prediction's current month are historical and
    /// frozen against adjustment
    pub is_historical: bool,
    /// Name of the last event or override applied to this point
    pub event_label: Option<String>,
}

impl MonthlyPoint {
    /// Build a point from a raw model output, rounding the value and
    /// deriving the percentage from the rounded value
    pub fn from_raw(month: u32, raw_value: f64, baseline: f64, is_historical: bool) -> Self {
        let value = round2(raw_value);
        Self {
            month,
            value,
            percentage: round2(100.0 * value / baseline),
            is_historical,
            event_label: None,
        }
    }

    /// Multiply the value by `factor`, re-derive the percentage, and record
    /// the adjustment's label
    pub fn rescale(&mut self, factor: f64, baseline: f64, label: &str) {
        self.value *= factor;
        self.percentage = round2(100.0 * self.value / baseline);
        self.event_label = Some(label.to_string());
    }

    /// Replace the value outright (rounded), re-derive the percentage, and
    /// record the adjustment's label
    pub fn overwrite(&mut self, new_value: f64, baseline: f64, label: &str) {
        self.value = round2(new_value);
        self.percentage = round2(100.0 * self.value / baseline);
        self.event_label = Some(label.to_string());
    }
}

/// Twelve-month demand/price outlook for one (location, crop) pair
///
/// The historical/forecast split is fixed at creation from `current_month`;
/// a Prediction is never re-derived against a later "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The pair this outlook belongs to
    #[serde(flatten)]
    pub key: PairKey,
    /// Calendar year the outlook covers
    pub year: i32,
    /// Month the prediction was made in; earlier months are historical
    pub current_month: u32,
    /// Demand points for months 1 through 12, ascending
    pub demand_series: Vec<MonthlyPoint>,
    /// Price points for months 1 through 12, ascending
    pub price_series: Vec<MonthlyPoint>,
    /// Long-run demand level used as the percentage denominator
    pub baseline_demand: f64,
    /// Long-run price level used as the percentage denominator
    pub baseline_price: f64,
    /// When this snapshot was produced or last adjusted
    pub last_updated: DateTime<Utc>,
}

impl Prediction {
    /// Serialize to a JSON record with ISO-8601 timestamps
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the JSON record shape produced by [`to_json`]
    ///
    /// [`to_json`]: Prediction::to_json
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
