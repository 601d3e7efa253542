//! Logging setup for the binary.
//!
//! Without `--verbose` only the crate's errors reach stderr, so failed rate
//! fetches are always reported. An explicit `RUST_LOG` replaces the default
//! directives entirely.

use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const QUIET_DIRECTIVES: &str = "fxconv=error";
const VERBOSE_DIRECTIVES: &str = "fxconv=debug";

fn env_filter(verbose: bool, rust_log: Option<String>) -> EnvFilter {
    match rust_log.filter(|directives| !directives.trim().is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None if verbose => EnvFilter::new(VERBOSE_DIRECTIVES),
        None => EnvFilter::new(QUIET_DIRECTIVES),
    }
}

/// Pretty stderr subscriber filtered by `RUST_LOG` or the verbosity flag.
pub fn build_subscriber(
    verbose: bool,
    rust_log: Option<String>,
) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(env_filter(verbose, rust_log))
}

pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_subscriber(verbose, rust_log).init();
}
