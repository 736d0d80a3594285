//! # Error Handling
//!
//! Every resolution failure is reported synchronously as a typed error before any
//! descriptor reaches a provisioning client.

pub mod types;

pub use types::{ErrorContext, FrontdoorError, Result};
