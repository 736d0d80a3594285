//! # Observability Infrastructure
//!
//! Structured logging for the resolver and CLI. Resolution is a synchronous, pure
//! transform, so logging is the only signal it emits.

pub mod logging;

pub use logging::{build_env_filter, init_logging, log_settings_info};
