//! Drives a [`FormState`] by running its effects on the tokio runtime.

use crate::core::form::{Effect, Event, FormState};
use crate::core::rates::{FetchError, RateProvider, RateTable};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct FetchResolution {
    generation: u64,
    outcome: Result<RateTable, FetchError>,
}

/// Owns the form state and dispatches events to it.
///
/// Rate fetches run as spawned tasks and report back through a channel;
/// in-flight fetches are never aborted, their results are simply ignored by
/// the form once a newer fetch has been requested.
pub struct FormController {
    state: FormState,
    provider: Arc<dyn RateProvider>,
    tx: mpsc::UnboundedSender<FetchResolution>,
    rx: mpsc::UnboundedReceiver<FetchResolution>,
}

impl FormController {
    pub fn new(provider: Arc<dyn RateProvider>, source: &str, target: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        FormController {
            state: FormState::new(source, target),
            provider,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Issues the initial rate fetch.
    pub fn start(&mut self) {
        let effect = self.state.start();
        self.run(effect);
    }

    pub fn dispatch(&mut self, event: Event) {
        if let Some(effect) = self.state.apply(event) {
            self.run(effect);
        }
    }

    fn run(&self, effect: Effect) {
        match effect {
            Effect::FetchRates { generation } => {
                debug!(generation, "Spawning rate fetch");
                let provider = Arc::clone(&self.provider);
                let tx = self.tx.clone();
                let fetch = tokio::spawn(async move { provider.fetch_rates().await });
                tokio::spawn(async move {
                    // A panicking provider still has to resolve its generation
                    let outcome = fetch.await.unwrap_or_else(|e| {
                        error!(generation, error = %e, "Rate fetch task failed");
                        Err(FetchError::TaskFailed(e.to_string()))
                    });
                    // Receiver only goes away when the controller is dropped
                    let _ = tx.send(FetchResolution {
                        generation,
                        outcome,
                    });
                });
            }
        }
    }

    /// Waits for the next fetch to finish and applies its outcome.
    pub async fn next_resolution(&mut self) {
        if let Some(FetchResolution {
            generation,
            outcome,
        }) = self.rx.recv().await
        {
            self.dispatch(Event::FetchResolved {
                generation,
                outcome,
            });
        }
    }

    /// Applies fetch outcomes until the latest requested fetch has resolved.
    pub async fn settle(&mut self) {
        while self.state.is_fetching() {
            self.next_resolution().await;
        }
    }
}
