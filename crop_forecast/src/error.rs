//! Error types for the crop_forecast crate

use thiserror::Error;

/// Custom error types for the crop_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error from invalid engine or service configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from requesting a pair that was never predicted
    #[error("No prediction tracked for {location}/{crop}")]
    UnknownKey { location: String, crop: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the regression and scaling layer
    #[error("Math error: {0}")]
    Math(#[from] agro_math::MathError),

    /// Error from serializing or deserializing predictions and events
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
