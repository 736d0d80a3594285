//! # Frontdoor
//!
//! Frontdoor resolves a declarative description of how a web frontend is exposed to the
//! internet into an ordered plan of resource descriptors: an IP allow-list firewall, an
//! internet-facing load balancer with its listener, target group and access logging, the
//! firewall association, and optionally DNS, a managed certificate and a static site build.
//!
//! ## Architecture
//!
//! ```text
//! Declaration file → config::load_declaration → plan::resolve_plan → DeploymentPlan
//!                                                       ↓
//!                                            provisioning::Provisioner
//! ```
//!
//! Resolution is pure: descriptors carry [`resolver::ResourceRef`] forward references
//! instead of live identifiers, and a [`provisioning::Provisioner`] substitutes them in
//! dependency order.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use frontdoor::{load_declaration, resolve_plan, Result};
//!
//! fn main() -> Result<()> {
//!     let declaration = load_declaration("frontend.yaml")?;
//!     let plan = resolve_plan(&declaration)?;
//!     println!("{} descriptors, origin {}", plan.len(), plan.origin);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod plan;
pub mod provisioning;
pub mod resolver;
pub mod utils;

// Re-export commonly used types and traits
pub use config::{load_declaration, FrontendDeclaration, Settings};
pub use errors::{FrontdoorError, Result};
pub use plan::{resolve_plan, DeploymentPlan, Descriptor};
pub use provisioning::{DryRunProvisioner, Provisioner};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "frontdoor");
    }
}
