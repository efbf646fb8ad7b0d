//! Log output for applications embedding the signers.
//!
//! The libraries only emit `tracing` events and, with the `telemetry`
//! feature, spans. [`Telemetry`] installs a global subscriber that prints
//! them, filtered by `RUST_LOG`.

use serde::{Deserialize, Serialize};
use std::env;
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting [`LogFormat`].
pub const LOG_FORMAT_ENV: &str = "PERMIT_SIGNER_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

impl LogFormat {
    /// Reads [`LOG_FORMAT_ENV`]; anything but `compact` means [`LogFormat::Full`].
    pub fn from_env() -> Self {
        match env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.eq_ignore_ascii_case("compact") => LogFormat::Compact,
            _ => LogFormat::Full,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("A global subscriber is already installed: {0}")]
    Init(#[from] TryInitError),
}

/// Subscriber settings; consumed by [`Telemetry::try_init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telemetry {
    filter: String,
    format: LogFormat,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    /// Settings from `RUST_LOG` (default `info`) and [`LOG_FORMAT_ENV`].
    pub fn new() -> Self {
        Self {
            filter: env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
            format: LogFormat::from_env(),
        }
    }

    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = directives.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Installs the global subscriber.
    pub fn try_init(self) -> Result<(), TelemetryError> {
        let filter = EnvFilter::try_new(&self.filter)?;
        let (full, compact) = match self.format {
            LogFormat::Full => (Some(tracing_subscriber::fmt::layer()), None),
            LogFormat::Compact => (None, Some(tracing_subscriber::fmt::layer().compact())),
        };
        tracing_subscriber::registry()
            .with(filter)
            .with(full)
            .with(compact)
            .try_init()?;
        tracing::debug!(filter = %self.filter, format = ?self.format, "Logging initialized");
        Ok(())
    }

    /// Like [`try_init`](Self::try_init), but reports failure on stderr
    /// instead of returning it.
    pub fn init(self) {
        if let Err(err) = self.try_init() {
            eprintln!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let telemetry = Telemetry::new()
            .with_filter("permit_chain_eip155=debug")
            .with_format(LogFormat::Compact);
        assert_eq!(telemetry.filter(), "permit_chain_eip155=debug");
        assert_eq!(telemetry.format(), LogFormat::Compact);
    }

    #[test]
    fn test_invalid_filter() {
        let result = Telemetry::new().with_filter("permit=notalevel").try_init();
        assert!(matches!(result, Err(TelemetryError::Filter(_))));
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(format, LogFormat::Compact);
    }
}
