//! Calendar feature encoding and standard scaling
//!
//! Seasonal models in this workspace describe a month as a small numeric
//! vector: the raw month index, its position on the yearly cycle (sine and
//! cosine of the month angle) and the calendar year. A fitted
//! [`StandardScaler`] normalizes those vectors before they reach a regressor.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of dimensions produced by [`month_features`]
pub const FEATURE_DIMS: usize = 4;

/// Encode a calendar position as a fixed-size feature vector
///
/// The layout is `[month, sin(2π·month/12), cos(2π·month/12), year]`. The
/// cyclic pair lets a linear model express seasonality without treating
/// December and January as twelve steps apart.
pub fn month_features(month: u32, year: i32) -> [f64; FEATURE_DIMS] {
    let angle = 2.0 * PI * month as f64 / 12.0;
    [month as f64, angle.sin(), angle.cos(), year as f64]
}

/// Per-dimension statistics captured by a fit
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerStats {
    means: [f64; FEATURE_DIMS],
    scales: [f64; FEATURE_DIMS],
}

/// Standard scaler over fixed-size feature vectors
///
/// `fit` computes the per-dimension mean and population standard deviation
/// of a sample set; `transform` then maps a vector to
/// `(x - mean) / scale` per dimension. A dimension whose standard deviation
/// is zero keeps a scale of 1.0, so constant training columns are centered
/// but never divided away.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    stats: Option<ScalerStats>,
}

impl StandardScaler {
    /// Create an unfitted scaler
    pub fn new() -> Self {
        Self { stats: None }
    }

    /// Compute scaling statistics from a sample set
    ///
    /// Refitting replaces the previous statistics wholesale.
    pub fn fit(&mut self, samples: &[[f64; FEATURE_DIMS]]) -> Result<()> {
        if samples.is_empty() {
            return Err(MathError::InvalidInput(
                "Cannot fit scaler on an empty sample set".to_string(),
            ));
        }

        let n = samples.len() as f64;
        let mut means = [0.0; FEATURE_DIMS];
        for sample in samples {
            for (dim, value) in sample.iter().enumerate() {
                means[dim] += value;
            }
        }
        for mean in means.iter_mut() {
            *mean /= n;
        }

        let mut scales = [0.0; FEATURE_DIMS];
        for sample in samples {
            for (dim, value) in sample.iter().enumerate() {
                scales[dim] += (value - means[dim]).powi(2);
            }
        }
        for scale in scales.iter_mut() {
            let std_dev = (*scale / n).sqrt();
            // Constant columns scale by 1.0 (center only)
            *scale = if std_dev == 0.0 { 1.0 } else { std_dev };
        }

        self.stats = Some(ScalerStats { means, scales });
        Ok(())
    }

    /// Apply the fitted statistics to a feature vector
    pub fn transform(&self, features: &[f64; FEATURE_DIMS]) -> Result<[f64; FEATURE_DIMS]> {
        let stats = self.stats.as_ref().ok_or(MathError::NotFitted)?;

        let mut scaled = [0.0; FEATURE_DIMS];
        for dim in 0..FEATURE_DIMS {
            scaled[dim] = (features[dim] - stats.means[dim]) / stats.scales[dim];
        }
        Ok(scaled)
    }

    /// Whether `fit` has been called
    pub fn is_fitted(&self) -> bool {
        self.stats.is_some()
    }
}
