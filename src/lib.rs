pub mod cli;
pub mod core;
pub mod providers;

// Re-exported for callers that only need configuration
pub use crate::core::config;

use crate::core::{ConversionRequest, RateProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
    },
    Currencies {
        from: Option<String>,
    },
    Interactive {
        from: Option<String>,
        to: Option<String>,
    },
}

fn currency_or(code: Option<String>, default: &str) -> String {
    code.unwrap_or_else(|| default.to_string()).to_uppercase()
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = config::AppConfig::resolve(config_path)?;
    debug!(
        base_url = %config.provider.base_url,
        key_location = ?config.provider.key_location,
        api_key_set = config.provider.api_key.is_some(),
        source = %config.source,
        target = %config.target,
        "Loaded config"
    );

    let provider: Arc<dyn RateProvider> =
        Arc::new(providers::FixerProvider::new(config.provider.clone())?);

    match command {
        AppCommand::Convert { amount, from, to } => {
            let request = ConversionRequest {
                amount,
                source: currency_or(from, &config.source),
                target: currency_or(to, &config.target),
            };
            cli::convert::run(provider, request).await.map(|_| ())
        }
        AppCommand::Currencies { from } => {
            let source = currency_or(from, &config.source);
            cli::currencies::run(provider, &source).await.map(|_| ())
        }
        AppCommand::Interactive { from, to } => {
            let source = currency_or(from, &config.source);
            let target = currency_or(to, &config.target);
            cli::interactive::run(provider, &source, &target).await
        }
    }
}
