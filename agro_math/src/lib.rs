//! # Agro Math
//!
//! Mathematical building blocks for agricultural demand and price modelling.
//! This crate provides calendar feature encoding, standard scaling and a
//! small ordinary-least-squares regressor used to fit seasonal trends.

use thiserror::Error;

// Numeric modules
pub mod features;
pub mod regression;

/// Errors that can occur in modelling-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Transform requested before fit")]
    NotFitted,
}

/// Result type for modelling math operations
pub type Result<T> = std::result::Result<T, MathError>;
