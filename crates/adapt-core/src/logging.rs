//! Tracing subscriber setup

use crate::config::{AdaptConfig, LogFormat};
use crate::error::{AdaptError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global subscriber for `config`
///
/// `RUST_LOG` takes precedence over `config.log_filter`.
///
/// # Errors
/// Returns [`AdaptError::Config`] for an invalid filter or if a global
/// subscriber is already set.
pub fn init(config: &AdaptConfig) -> Result<()> {
    let filter = filter(&config.log_filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| AdaptError::Config(format!("logging: {e}")))
}

fn filter(directives: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(directives)
            .map_err(|e| AdaptError::Config(format!("log filter {directives:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_directives() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(filter("adapt_core=debug,info").is_ok());
        }
    }

    #[test]
    fn rejects_garbage_directives() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(matches!(filter("adapt_core=loud"), Err(AdaptError::Config(_))));
        }
    }
}
