use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert, e.g. 100 or 12.50
        amount: String,
        /// Source currency code (defaults to the configured source)
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency code (defaults to the configured target)
        #[arg(short, long)]
        to: Option<String>,
    },
    /// List the currencies offered by the rate provider
    Currencies {
        /// Show multipliers from this currency
        #[arg(short, long)]
        from: Option<String>,
    },
    /// Start an interactive conversion form
    Interactive {
        /// Initially selected source currency
        #[arg(short, long)]
        from: Option<String>,
        /// Initially selected target currency
        #[arg(short, long)]
        to: Option<String>,
    },
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => {
                fxconv::AppCommand::Convert { amount, from, to }
            }
            Commands::Currencies { from } => fxconv::AppCommand::Currencies { from },
            Commands::Interactive { from, to } => fxconv::AppCommand::Interactive { from, to },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => fxconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
