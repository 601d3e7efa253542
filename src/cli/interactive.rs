//! Line-driven conversion form.
//!
//! Mirrors a single-page converter: one amount field, source and target
//! pickers, a convert action, a result line and an error line. Rate fetches
//! resolve in the background while the prompt stays responsive.

use super::ui;
use crate::core::{Event, FormController, FormState, RateProvider};
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Amount(String),
    From(String),
    To(String),
    Convert,
    List,
    Help,
    Quit,
}

const HELP: &str = "Commands:
  amount <value>   set the amount to convert (empty clears it)
  from <CODE>      select the source currency
  to <CODE>        select the target currency
  convert          convert the current amount
  list             show available currencies
  help             show this help
  quit             exit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    let currency = |arg: &str| {
        if arg.is_empty() {
            Err(format!("Usage: {name} <CODE>"))
        } else {
            Ok(arg.to_uppercase())
        }
    };

    match name.to_lowercase().as_str() {
        "amount" | "a" => Ok(Command::Amount(arg.to_string())),
        "from" | "f" => currency(arg).map(Command::From),
        "to" | "t" => currency(arg).map(Command::To),
        "convert" | "c" => Ok(Command::Convert),
        "list" | "l" => Ok(Command::List),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "" => Err("Type 'help' for a list of commands".to_string()),
        other => Err(format!("Unknown command: {other}")),
    }
}

/// Renders the form: selected pair, amount, result line and error line.
pub fn render(state: &FormState) -> String {
    let ratio = state
        .ratio
        .map_or("N/A".to_string(), |ratio| format!("{ratio:.6}"));
    let status = if state.is_fetching() {
        " (fetching rates...)"
    } else {
        ""
    };
    let mut output = format!(
        "{} -> {}  rate: {}{}\nAmount: {}",
        state.source,
        state.target,
        ratio,
        ui::style_text(status, ui::StyleType::Subtle),
        state.amount
    );
    if let Some(result) = &state.result {
        output.push('\n');
        output.push_str(&ui::style_text(&result.to_string(), ui::StyleType::Result));
    }
    if let Some(err) = &state.error {
        output.push('\n');
        output.push_str(&ui::style_text(&err.to_string(), ui::StyleType::Error));
    }
    output
}

/// Before the first table arrives any code may be picked.
fn is_selectable(state: &FormState, code: &str) -> bool {
    state.currencies.is_empty() || state.currencies.iter().any(|c| c == code)
}

enum Flow {
    Continue,
    Stop,
}

fn handle_line(controller: &mut FormController, line: &str, out: &mut impl Write) -> Result<Flow> {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(message) => {
            writeln!(out, "{}", ui::style_text(&message, ui::StyleType::Error))?;
            return Ok(Flow::Continue);
        }
    };
    debug!(?command, "Handling command");

    let event = match command {
        Command::Quit => return Ok(Flow::Stop),
        Command::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(Flow::Continue);
        }
        Command::List => {
            let state = controller.state();
            match &state.table {
                Some(table) => writeln!(out, "{}", table.display_as_table(&state.source))?,
                None => writeln!(out, "No currencies loaded yet.")?,
            }
            return Ok(Flow::Continue);
        }
        Command::From(code) | Command::To(code)
            if !is_selectable(controller.state(), &code) =>
        {
            writeln!(
                out,
                "{}",
                ui::style_text(&format!("Unknown currency: {code}"), ui::StyleType::Error)
            )?;
            return Ok(Flow::Continue);
        }
        Command::From(code) => Event::SourceChanged(code),
        Command::To(code) => Event::TargetChanged(code),
        Command::Amount(amount) => Event::AmountEdited(amount),
        Command::Convert => Event::ConvertRequested,
    };

    controller.dispatch(event);
    writeln!(out, "{}", render(controller.state()))?;
    Ok(Flow::Continue)
}

fn prompt(out: &mut impl Write) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Runs the form until `quit` or end of input.
pub async fn run(provider: Arc<dyn RateProvider>, source: &str, target: &str) -> Result<()> {
    let mut controller = FormController::new(provider, source, target);
    let input = BufReader::new(tokio::io::stdin());
    drive(&mut controller, input, &mut std::io::stdout()).await
}

/// Starts the form and feeds it lines from `input` while applying fetch
/// results as they arrive. The form is re-rendered only once the most recent
/// fetch has landed.
pub async fn drive<R>(controller: &mut FormController, input: R, out: &mut impl Write) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    writeln!(
        out,
        "{}\n{HELP}\n",
        ui::style_text("Currency Converter", ui::StyleType::Title)
    )?;
    controller.start();
    writeln!(out, "{}", render(controller.state()))?;
    prompt(out)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if let Flow::Stop = handle_line(controller, &line, out)? {
                    break;
                }
                prompt(out)?;
            }
            _ = controller.next_resolution() => {
                if !controller.state().is_fetching() {
                    writeln!(out, "\n{}", render(controller.state()))?;
                    prompt(out)?;
                }
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FetchError, RateTable};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn plain(out: Vec<u8>) -> String {
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("amount 100"),
            Ok(Command::Amount("100".to_string()))
        );
        assert_eq!(parse_command("amount"), Ok(Command::Amount(String::new())));
        assert_eq!(
            parse_command("  a   12.5 "),
            Ok(Command::Amount("12.5".to_string()))
        );
        assert_eq!(parse_command("from usd"), Ok(Command::From("USD".to_string())));
        assert_eq!(parse_command("TO eur"), Ok(Command::To("EUR".to_string())));
        assert_eq!(parse_command("convert"), Ok(Command::Convert));
        assert_eq!(parse_command("c"), Ok(Command::Convert));
        assert_eq!(parse_command("list"), Ok(Command::List));
        assert_eq!(parse_command("?"), Ok(Command::Help));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_command_errors() {
        assert_eq!(parse_command("from"), Err("Usage: from <CODE>".to_string()));
        assert_eq!(
            parse_command("swap USD"),
            Err("Unknown command: swap".to_string())
        );
        assert!(parse_command("   ").is_err());
    }

    #[test]
    fn test_render_result_and_error_lines() {
        let mut state = FormState::new("USD", "EUR");
        let output = console::strip_ansi_codes(&render(&state)).to_string();
        assert!(output.contains("USD -> EUR  rate: N/A"));

        state.apply(Event::ConvertRequested);
        let output = console::strip_ansi_codes(&render(&state)).to_string();
        assert!(output.ends_with("Please enter an amount."));
    }

    struct FixedProvider;

    #[async_trait]
    impl RateProvider for FixedProvider {
        async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
            Ok(RateTable::new(
                [("USD".to_string(), 1.0), ("EUR".to_string(), 0.9)].into(),
            ))
        }
    }

    #[tokio::test]
    async fn test_handle_lines_drive_form() {
        let mut controller = FormController::new(Arc::new(FixedProvider), "USD", "EUR");
        let mut out = Vec::new();
        controller.start();
        controller.settle().await;

        assert!(matches!(
            handle_line(&mut controller, "amount 100", &mut out).unwrap(),
            Flow::Continue
        ));
        handle_line(&mut controller, "convert", &mut out).unwrap();
        assert_eq!(
            controller.state().result.as_ref().unwrap().to_string(),
            "100 USD = 90.00 EUR"
        );

        // Codes outside the loaded list are not selectable
        handle_line(&mut controller, "to JPY", &mut out).unwrap();
        assert_eq!(controller.state().target, "EUR");
        assert!(!controller.state().is_fetching());

        handle_line(&mut controller, "from EUR", &mut out).unwrap();
        assert_eq!(controller.state().source, "EUR");
        assert!(controller.state().is_fetching());

        assert!(matches!(
            handle_line(&mut controller, "quit", &mut out).unwrap(),
            Flow::Stop
        ));

        let output = String::from_utf8(out).unwrap();
        assert!(console::strip_ansi_codes(&output).contains("Unknown currency: JPY"));
    }

    #[tokio::test]
    async fn test_drive_renders_fetched_rate_then_converts() {
        let mut controller = FormController::new(Arc::new(FixedProvider), "USD", "EUR");
        let (mut client, server) = tokio::io::duplex(256);
        let mut out = Vec::new();

        let typing = async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client
                .write_all(b"amount 100\nconvert\nquit\n")
                .await
                .unwrap();
            client
        };
        let (driven, _client) = tokio::join!(
            drive(&mut controller, BufReader::new(server), &mut out),
            typing
        );
        driven.unwrap();

        assert_eq!(
            controller.state().result.as_ref().unwrap().to_string(),
            "100 USD = 90.00 EUR"
        );
        let output = plain(out);
        assert!(output.starts_with("Currency Converter"));
        assert!(output.contains("rate: N/A (fetching rates...)"));
        let fetched = output.find("rate: 0.900000").unwrap();
        let converted = output.find("100 USD = 90.00 EUR").unwrap();
        assert!(fetched < converted);
    }

    /// Answers each call after its own delay.
    struct DelayedProvider {
        delays: Vec<Duration>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateProvider for DelayedProvider {
        async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delays.get(call).copied().unwrap_or_default();
            tokio::time::sleep(delay).await;
            Ok(RateTable::new(
                [
                    ("USD".to_string(), 1.0),
                    ("EUR".to_string(), 0.9),
                    ("GBP".to_string(), 0.8),
                ]
                .into(),
            ))
        }
    }

    #[tokio::test]
    async fn test_drive_waits_for_latest_fetch_before_rendering() {
        let provider = Arc::new(DelayedProvider {
            delays: vec![Duration::from_millis(100), Duration::from_millis(300)],
            calls: AtomicUsize::new(0),
        });
        let mut controller = FormController::new(provider.clone(), "USD", "EUR");
        let (mut client, server) = tokio::io::duplex(256);
        let mut out = Vec::new();

        let typing = async move {
            client.write_all(b"to GBP\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(600)).await;
            client.write_all(b"quit\n").await.unwrap();
            client
        };
        let (driven, _client) = tokio::join!(
            drive(&mut controller, BufReader::new(server), &mut out),
            typing
        );
        driven.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(controller.state().ratio, Some(0.8));
        let output = plain(out);
        // Rendered once for the pick and once when its fetch lands
        assert_eq!(output.matches("USD -> GBP").count(), 2);
        assert!(output.contains("USD -> GBP  rate: 0.800000"));
        assert!(!output.contains("rate: 0.900000"));
    }

    #[tokio::test]
    async fn test_drive_stops_at_end_of_input() {
        let mut controller = FormController::new(Arc::new(FixedProvider), "USD", "EUR");
        let mut out = Vec::new();

        drive(&mut controller, &b"amount 5\n"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(controller.state().amount, "5");
        assert!(plain(out).contains("Amount: 5"));
    }
}
