//! Error taxonomy for loan calculations and plan loading

use thiserror::Error;

/// Errors raised by the amortization engine and the plan loaders
#[derive(Debug, Error)]
pub enum LoanError {
    /// Caller supplied parameters that can never produce a schedule
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// Numeric breakdown while amortizing (non-finite payment, interest, etc.)
    #[error("Computation error: {0}")]
    Computation(String),

    /// Table or plan file parsed but its contents are unusable
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoanError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by bad caller input (reject, don't retry)
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LoanError::InvalidInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
