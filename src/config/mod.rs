//! # Configuration Management
//!
//! Two layers: process [`Settings`] read from `FRONTDOOR_*` environment variables, and
//! the per-stack [`FrontendDeclaration`] loaded from a file with `FRONTDOOR__*`
//! environment overrides.

pub mod declaration;

pub use declaration::{
    AccessLogDeclaration, AllowListDeclaration, DnsDeclaration, ExposureDeclaration,
    FrontendDeclaration, ProtocolDeclaration, RoutingDeclaration, RoutingModeDeclaration,
};

use std::path::Path;
use tracing::debug;

use crate::errors::{ErrorContext, FrontdoorError, Result};

/// Prefix of environment variables that override declaration values,
/// e.g. `FRONTDOOR__EXPOSURE__PROTOCOL=https`
pub const DECLARATION_ENV_PREFIX: &str = "FRONTDOOR";

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: String,
    pub log_json: bool,
    pub output_format: String,
    /// Account used when synthesising identifiers in dry runs
    pub account_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            output_format: "json".to_string(),
            account_id: "000000000000".to_string(),
        }
    }
}

impl Settings {
    /// Create settings from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let log_level = std::env::var("FRONTDOOR_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_json = match std::env::var("FRONTDOOR_LOG_JSON") {
            Ok(value) => parse_bool(&value).ok_or_else(|| {
                FrontdoorError::config(format!("Invalid FRONTDOOR_LOG_JSON value: '{}'", value))
            })?,
            Err(_) => defaults.log_json,
        };

        let output_format =
            std::env::var("FRONTDOOR_OUTPUT").unwrap_or(defaults.output_format).to_lowercase();

        let account_id = std::env::var("FRONTDOOR_ACCOUNT_ID").unwrap_or(defaults.account_id);
        if account_id.len() != 12 || !account_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(FrontdoorError::config(format!(
                "Invalid FRONTDOOR_ACCOUNT_ID: '{}' (expected 12 digits)",
                account_id
            )));
        }

        Ok(Self { log_level, log_json, output_format, account_id })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load, layer and validate a declaration file.
///
/// The file format follows its extension (`.yaml`, `.yml`, `.toml`, `.json`).
/// Environment variables such as `FRONTDOOR__REGION` take precedence over the file.
pub fn load_declaration<P: AsRef<Path>>(path: P) -> Result<FrontendDeclaration> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))
        .context(format!("reading declaration {}", path.display()));
    }

    let source = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(DECLARATION_ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("allow_list.ipv4")
                .with_list_parse_key("allow_list.ipv6")
                .try_parsing(true),
        )
        .build()
        .context(format!("loading declaration {}", path.display()))?;

    let declaration: FrontendDeclaration = source
        .try_deserialize()
        .context(format!("parsing declaration {}", path.display()))?;

    declaration.validate()?;

    debug!(
        path = %path.display(),
        region = %declaration.region,
        protocol = ?declaration.exposure.protocol,
        routing = ?declaration.routing.mode,
        "Loaded frontend declaration"
    );

    Ok(declaration)
}
