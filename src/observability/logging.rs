//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Settings;
use crate::errors::{FrontdoorError, Result};

/// Create a tracing span for one resolution pass
#[macro_export]
macro_rules! resolve_span {
    ($operation:expr) => {
        tracing::info_span!(
            "resolution",
            operation = %$operation,
            descriptor_count = tracing::field::Empty
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "resolution",
            operation = %$operation,
            descriptor_count = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Build the env filter: `RUST_LOG` wins over the configured level
pub fn build_env_filter(default_level: &str) -> Result<EnvFilter> {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_level),
    }
    .map_err(|e| FrontdoorError::config(format!("Invalid log filter: {}", e)))
}

/// Install the global subscriber.
///
/// Logs go to stderr so rendered plans on stdout stay machine readable. A subscriber
/// installed earlier (e.g. by integration tests) is left in place.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let filter = build_env_filter(&settings.log_level)?;

    let installed = if settings.log_json {
        tracing::subscriber::set_global_default(
            fmt().json().with_env_filter(filter).with_writer(std::io::stderr).finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            fmt().with_env_filter(filter).with_writer(std::io::stderr).finish(),
        )
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed, keeping it");
    }

    Ok(())
}

/// Log settings at startup
pub fn log_settings_info(settings: &Settings) {
    tracing::debug!(
        log_level = %settings.log_level,
        log_json = settings.log_json,
        output_format = %settings.output_format,
        "Frontdoor settings"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = resolve_span!("resolve_plan");
        let _span = resolve_span!("resolve_plan", region = "us-east-1");
    }

    #[test]
    fn test_invalid_filter_rejected() {
        assert!(build_env_filter("info").is_ok());
        assert!(EnvFilter::try_new("frontdoor=[").is_err());
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        let settings = Settings::default();
        assert!(init_logging(&settings).is_ok());
        assert!(init_logging(&settings).is_ok());
        log_settings_info(&settings);
    }
}
