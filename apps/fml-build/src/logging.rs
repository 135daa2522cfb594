//! Tracing setup.
//!
//! Logs go to stderr so the generator's own stdout stays clean. `RUST_LOG`
//! takes precedence; otherwise `--verbose` selects `debug` for this crate and
//! the default is `info`.

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the filter used when `RUST_LOG` is unset.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,fml_build=debug"
    } else {
        "warn,fml_build=info"
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` holds an invalid directive or a subscriber
/// is already installed.
pub fn init(verbose: bool) -> Result<()> {
    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(default_directive(verbose)),
    }
    .context("Failed to create tracing filter")?;

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()
        .context("Failed to initialize tracing")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_crate_level() {
        assert!(default_directive(true).contains("fml_build=debug"));
        assert!(default_directive(false).contains("fml_build=info"));
    }

    #[test]
    fn default_directives_parse() {
        EnvFilter::try_new(default_directive(true)).unwrap();
        EnvFilter::try_new(default_directive(false)).unwrap();
    }
}
