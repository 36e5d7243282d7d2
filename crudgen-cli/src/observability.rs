//! Logging setup for the CLI
//!
//! Events go to stderr so generated source on stdout stays clean.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks the level
/// (0 = warn, 1 = debug, 2+ = trace).
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbose: u8) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "warn,crudgen=debug,crudgen_cli_lib=debug",
            _ => "warn,crudgen=trace,crudgen_cli_lib=trace",
        })
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}
