//! Diagnostic tracing for the simulator.
//!
//! Events go to stderr so stdout stays reserved for command output.
//! `RUST_LOG` wins over the configured default filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// # Example
/// ```bash
/// RUST_LOG=beamsim=debug beamsim run --scenario scenario.json --seed 7
/// ```
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
