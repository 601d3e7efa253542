//! User-facing error messages shown in the form's error slot.

use crate::core::rates::FetchError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Endpoint or credentials were not configured; no request was made.
    #[error("Missing API configuration: {0}")]
    MissingConfig(String),

    /// Generic message for any network or response failure. Details are logged.
    #[error("Failed to fetch currency data.")]
    FetchFailed,

    #[error("Please enter an amount.")]
    AmountRequired,

    #[error("Invalid input. Please enter a valid amount.")]
    InvalidAmount,

    #[error("Conversion rate unavailable for {from} to {to}.")]
    RateUnavailable { from: String, to: String },
}

impl FormError {
    /// Whether this error came from fetching rates, as opposed to a conversion.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, FormError::MissingConfig(_) | FormError::FetchFailed)
    }
}

impl From<&FetchError> for FormError {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::MissingConfig(what) => FormError::MissingConfig(what.clone()),
            _ => FormError::FetchFailed,
        }
    }
}
