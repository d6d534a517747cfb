//! Error types.
//!
//! Two layers:
//!
//! - [`ForecastError`]: typed failures raised by the pipeline stages (ingest,
//!   normalization, training, inference). Callers match on these.
//! - [`AppError`]: what the binary reports. Carries a process exit code and a
//!   human-readable message.

use thiserror::Error;

/// Failures raised by the forecasting pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// A date value could not be parsed into a calendar date.
    #[error("invalid date '{value}' in record {record}")]
    Parse { record: usize, value: String },

    /// A required input column is missing from the dataset.
    #[error("missing required column: `{0}`")]
    MissingColumn(String),

    /// The product has too few periods to produce features or a forecast.
    #[error("insufficient history for '{product}': {available} periods available, {required} required")]
    InsufficientHistory {
        product: String,
        available: usize,
        required: usize,
    },

    /// The product has no trained model.
    #[error("unknown product '{0}'")]
    UnknownProduct(String),

    /// The regression for a product could not be solved.
    #[error("regression for '{product}' could not be solved")]
    Fit { product: String },

    /// A request payload failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ForecastError {
    /// True for errors that mean "no forecast available" rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ForecastError::UnknownProduct(_) | ForecastError::InsufficientHistory { .. }
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let exit_code = match &err {
            ForecastError::Parse { .. } | ForecastError::MissingColumn(_) | ForecastError::Validation(_) => 2,
            ForecastError::InsufficientHistory { .. } | ForecastError::UnknownProduct(_) => 3,
            ForecastError::Fit { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let parse: AppError = ForecastError::Parse {
            record: 3,
            value: "31/31/2020".to_string(),
        }
        .into();
        assert_eq!(parse.exit_code(), 2);
        assert!(parse.to_string().contains("31/31/2020"));

        let unknown: AppError = ForecastError::UnknownProduct("Zinc".to_string()).into();
        assert_eq!(unknown.exit_code(), 3);
    }

    #[test]
    fn not_found_covers_unknown_and_insufficient() {
        assert!(ForecastError::UnknownProduct("x".into()).is_not_found());
        assert!(
            ForecastError::InsufficientHistory {
                product: "x".into(),
                available: 3,
                required: 12
            }
            .is_not_found()
        );
        assert!(!ForecastError::Fit { product: "x".into() }.is_not_found());
    }
}
