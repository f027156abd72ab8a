//! Least-squares regression over calendar feature vectors
//!
//! A [`LinearModel`] is fitted once, in batch, from `(features, target)`
//! pairs and then queried many times. There is no online update path.

use crate::features::FEATURE_DIMS;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Intercept plus one weight per feature dimension
const PARAMS: usize = FEATURE_DIMS + 1;

/// Diagonal term added to the normal equations. A constant training column
/// yields a singular system; the ridge term keeps it solvable and pins the
/// dead column's weight at zero.
const RIDGE: f64 = 1e-9;

/// Ordinary-least-squares regressor with intercept
///
/// `predict` is deliberately infallible: an unfitted model carries zero
/// coefficients and simply returns 0.0. Callers that need a guarantee fit
/// the model during construction and never expose the unfitted state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearModel {
    intercept: f64,
    weights: [f64; FEATURE_DIMS],
    fitted: bool,
}

impl LinearModel {
    /// Create an unfitted model with zero coefficients
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the model to `(row, target)` pairs by solving the normal equations
    ///
    /// Replaces any previously fitted coefficients.
    pub fn fit(&mut self, rows: &[[f64; FEATURE_DIMS]], targets: &[f64]) -> Result<()> {
        if rows.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Row count ({}) doesn't match target count ({})",
                rows.len(),
                targets.len()
            )));
        }
        if rows.len() < PARAMS {
            return Err(MathError::InsufficientData(format!(
                "Need at least {} observations to fit {} parameters",
                PARAMS, PARAMS
            )));
        }

        // Build X^T X and X^T y with an implicit leading column of ones.
        let mut normal = [[0.0; PARAMS + 1]; PARAMS];
        for (row, &target) in rows.iter().zip(targets.iter()) {
            let mut extended = [1.0; PARAMS];
            extended[1..].copy_from_slice(row);

            for i in 0..PARAMS {
                for j in 0..PARAMS {
                    normal[i][j] += extended[i] * extended[j];
                }
                normal[i][PARAMS] += extended[i] * target;
            }
        }
        for (i, equation) in normal.iter_mut().enumerate() {
            equation[i] += RIDGE;
        }

        let solution = solve(normal)?;
        self.intercept = solution[0];
        self.weights.copy_from_slice(&solution[1..]);
        self.fitted = true;
        Ok(())
    }

    /// Evaluate the model at a feature vector
    pub fn predict(&self, features: &[f64; FEATURE_DIMS]) -> f64 {
        let mut value = self.intercept;
        for (weight, feature) in self.weights.iter().zip(features.iter()) {
            value += weight * feature;
        }
        value
    }

    /// Whether `fit` has completed successfully
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fitted intercept term
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Fitted per-dimension weights
    pub fn weights(&self) -> &[f64; FEATURE_DIMS] {
        &self.weights
    }
}

/// Solve an augmented linear system by Gaussian elimination with partial
/// pivoting
fn solve(mut matrix: [[f64; PARAMS + 1]; PARAMS]) -> Result<[f64; PARAMS]> {
    for col in 0..PARAMS {
        let mut pivot = col;
        for row in (col + 1)..PARAMS {
            if matrix[row][col].abs() > matrix[pivot][col].abs() {
                pivot = row;
            }
        }
        if matrix[pivot][col].abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Normal equations are singular".to_string(),
            ));
        }
        matrix.swap(col, pivot);

        for row in (col + 1)..PARAMS {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..=PARAMS {
                matrix[row][k] -= factor * matrix[col][k];
            }
        }
    }

    let mut solution = [0.0; PARAMS];
    for row in (0..PARAMS).rev() {
        let mut acc = matrix[row][PARAMS];
        for col in (row + 1)..PARAMS {
            acc -= matrix[row][col] * solution[col];
        }
        solution[row] = acc / matrix[row][row];
    }
    Ok(solution)
}
