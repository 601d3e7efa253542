//! Exchange rate abstractions and core types

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

/// Snapshot of exchange rates relative to a single base currency.
///
/// A table is always replaced as a whole; there is no merging of partial
/// updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    pub base: Option<String>,
    pub date: Option<NaiveDate>,
    pub rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn new(rates: BTreeMap<String, f64>) -> Self {
        RateTable {
            base: None,
            date: None,
            rates,
        }
    }

    /// Currency codes available for selection, in sorted order.
    pub fn currencies(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Multiplier converting an amount in `source` into `target`.
    ///
    /// Returns `None` if either code is missing, or if the source rate cannot
    /// be divided by.
    pub fn ratio(&self, source: &str, target: &str) -> Option<f64> {
        let from = self.rate(source)?;
        let to = self.rate(target)?;
        if from == 0.0 || !from.is_finite() || !to.is_finite() {
            return None;
        }
        Some(to / from)
    }
}

/// Failure modes of a rate fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Request error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to parse rates response: {0}")]
    Malformed(String),

    #[error("Currency rates data not available in API response")]
    MissingRates,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Rate fetch task failed: {0}")]
    TaskFailed(String),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable, FetchError>;
}
