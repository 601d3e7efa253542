use super::ui;
use crate::core::{FormController, RateProvider, RateTable};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::sync::Arc;

impl RateTable {
    /// Renders the selectable currencies with their rate against the base and
    /// the multiplier from `source`.
    pub fn display_as_table(&self, source: &str) -> String {
        let mut table = ui::new_styled_table();

        let base = self.base.as_deref().unwrap_or("base");
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell(&format!("Rate ({base})")),
            ui::header_cell(&format!("1 {source} =")),
        ]);

        for code in self.rates.keys() {
            table.add_row(vec![
                Cell::new(code),
                ui::rate_cell(self.rate(code)),
                ui::rate_cell(self.ratio(source, code)),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Available currencies", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        if let Some(date) = self.date {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(&format!("Rates as of {date}"), ui::StyleType::Subtle)
            ));
        }
        output
    }
}

/// Fetches rates and lists every selectable currency code.
pub async fn run(provider: Arc<dyn RateProvider>, source: &str) -> Result<RateTable> {
    let mut controller = FormController::new(provider, source, source);

    let pb = ui::new_spinner("Fetching rates...");
    controller.start();
    controller.settle().await;
    pb.finish_and_clear();

    let state = controller.state();
    if let Some(err) = &state.error {
        bail!("{err}");
    }
    let Some(table) = &state.table else {
        bail!("No rate data available");
    };

    println!("{}", table.display_as_table(source));
    Ok(table.clone())
}
