//! Conversion form state and its event-driven transitions.
//!
//! `FormState` is a plain value: events are applied to it with
//! [`FormState::apply`], which may return an [`Effect`] for the caller to run.
//! Rate fetches are tagged with a generation number so that a response to a
//! superseded request is discarded instead of overwriting newer state.

use crate::core::conversion::{self, ConversionRequest, ConversionResult};
use crate::core::error::FormError;
use crate::core::rates::{FetchError, RateTable};
use tracing::{debug, error, info};

#[derive(Debug)]
pub enum Event {
    AmountEdited(String),
    SourceChanged(String),
    TargetChanged(String),
    FetchResolved {
        generation: u64,
        outcome: Result<RateTable, FetchError>,
    },
    ConvertRequested,
}

/// Side effects requested by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchRates { generation: u64 },
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub amount: String,
    pub source: String,
    pub target: String,
    pub currencies: Vec<String>,
    pub table: Option<RateTable>,
    pub ratio: Option<f64>,
    pub error: Option<FormError>,
    pub result: Option<ConversionResult>,
    generation: u64,
    fetching: bool,
}

impl FormState {
    pub fn new(source: &str, target: &str) -> Self {
        FormState {
            amount: String::new(),
            source: source.to_string(),
            target: target.to_string(),
            currencies: Vec::new(),
            table: None,
            ratio: None,
            error: None,
            result: None,
            generation: 0,
            fetching: false,
        }
    }

    /// Initial fetch, issued once when the form is first shown.
    pub fn start(&mut self) -> Effect {
        self.request_fetch()
    }

    /// Generation of the most recently requested fetch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the most recently requested fetch is still outstanding.
    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn apply(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::AmountEdited(amount) => {
                self.amount = amount;
                None
            }
            Event::SourceChanged(code) => {
                if code == self.source {
                    return None;
                }
                debug!(from = %self.source, to = %code, "Source currency changed");
                self.source = code;
                self.refresh_ratio();
                Some(self.request_fetch())
            }
            Event::TargetChanged(code) => {
                if code == self.target {
                    return None;
                }
                debug!(from = %self.target, to = %code, "Target currency changed");
                self.target = code;
                self.refresh_ratio();
                Some(self.request_fetch())
            }
            Event::FetchResolved {
                generation,
                outcome,
            } => {
                self.resolve_fetch(generation, outcome);
                None
            }
            Event::ConvertRequested => {
                self.convert();
                None
            }
        }
    }

    fn request_fetch(&mut self) -> Effect {
        self.generation += 1;
        self.fetching = true;
        Effect::FetchRates {
            generation: self.generation,
        }
    }

    fn refresh_ratio(&mut self) {
        self.ratio = self
            .table
            .as_ref()
            .and_then(|table| table.ratio(&self.source, &self.target));
    }

    fn resolve_fetch(&mut self, generation: u64, outcome: Result<RateTable, FetchError>) {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Discarding stale rate fetch result"
            );
            return;
        }
        self.fetching = false;

        match outcome {
            Ok(table) => {
                info!(
                    currencies = table.rates.len(),
                    base = ?table.base,
                    "Rate table updated"
                );
                self.currencies = table.currencies();
                self.table = Some(table);
                self.refresh_ratio();
                if self.ratio.is_none() {
                    debug!(source = %self.source, target = %self.target, "No ratio for selected pair");
                }
                if self.error.as_ref().is_some_and(FormError::is_fetch_error) {
                    self.error = None;
                }
            }
            Err(err) => {
                error!(error = %err, "An error occurred while fetching currency data");
                self.error = Some(FormError::from(&err));
            }
        }
    }

    fn convert(&mut self) {
        let request = ConversionRequest {
            amount: self.amount.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        };
        match conversion::convert(&request, self.ratio) {
            Ok(result) => {
                debug!(%result, "Conversion succeeded");
                self.result = Some(result);
                self.error = None;
            }
            Err(err) => {
                debug!(error = %err, "Conversion rejected");
                self.result = None;
                self.error = Some(err);
            }
        }
    }
}
