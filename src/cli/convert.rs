use super::ui;
use crate::core::{ConversionRequest, ConversionResult, Event, FormController, RateProvider};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::debug;

/// Fetches rates once and converts a single amount.
pub async fn run(
    provider: Arc<dyn RateProvider>,
    request: ConversionRequest,
) -> Result<ConversionResult> {
    let mut controller = FormController::new(provider, &request.source, &request.target);

    let pb = ui::new_spinner("Fetching rates...");
    controller.start();
    controller.settle().await;
    pb.finish_and_clear();

    if let Some(err) = &controller.state().error {
        bail!("{err}");
    }

    controller.dispatch(Event::AmountEdited(request.amount));
    controller.dispatch(Event::ConvertRequested);

    let state = controller.state();
    match (&state.result, &state.error) {
        (Some(result), _) => {
            debug!(ratio = ?state.ratio, "Converted amount");
            println!("{}", ui::style_text(&result.to_string(), ui::StyleType::Result));
            Ok(result.clone())
        }
        (None, Some(err)) => bail!("{err}"),
        (None, None) => bail!("Conversion produced no result"),
    }
}
