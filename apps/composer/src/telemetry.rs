use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Installs the structured logging subscriber for an embedding application.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at `config.rust_log`.
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter_for(config))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

fn filter_for(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            &config.rust_log
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        let config = Config::default();
        // Another test may have installed a subscriber first; either way the
        // second call in this process must fail cleanly rather than panic.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
