//! Log setup for the `formkit` binary.
//!
//! Log lines go to stderr so that stdout only carries command output (JSON,
//! CSV or text reports). `RUST_LOG` wins over the `-v`/`-q` flags.

use std::io;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level derived from the CLI verbosity flags.
///
/// - `-q`: errors only
/// - default: warnings
/// - `-v`: info, `-vv`: debug, `-vvv` and up: trace
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber. A second call is reported, not a panic.
pub fn init_logging(level: Level) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .try_init()?;
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!(
            "warn,formkit={level},form_spec={level}",
            level = level
        ))
    })
}
