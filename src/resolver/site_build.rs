//! Static-site build hand-off
//!
//! The build itself is run by an external tool. This module only describes what it
//! needs: sources, commands, the `VITE_APP_*` environment and the destination bucket.

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::errors::{FrontdoorError, Result};
use crate::resolver::bucket::AssetBucketDescriptor;
use crate::resolver::refs::{LogicalId, ResourceRef};

/// Declared build of the frontend sources
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct SiteBuildSpec {
    #[serde(default = "default_source_path")]
    #[validate(length(min = 1, message = "Source path cannot be empty"))]
    pub source_path: String,

    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    #[serde(default = "default_install_commands")]
    pub install_commands: Vec<String>,

    #[serde(default = "default_build_commands")]
    #[validate(length(min = 1, message = "At least one build command is required"))]
    pub build_commands: Vec<String>,

    #[serde(default = "default_output_directory")]
    #[validate(length(min = 1, message = "Output directory cannot be empty"))]
    pub output_directory: String,

    #[validate(nested)]
    pub environment: BuildEnvironment,
}

/// Values exposed to the frontend at build time
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct BuildEnvironment {
    #[validate(url(message = "API endpoint must be a URL"))]
    pub api_endpoint: String,

    #[validate(url(message = "WebSocket endpoint must be a URL"))]
    pub websocket_endpoint: String,

    #[validate(length(min = 1, message = "User pool id cannot be empty"))]
    pub user_pool_id: String,

    #[validate(length(min = 1, message = "User pool client id cannot be empty"))]
    pub user_pool_client_id: String,

    /// Overrides the deployment region
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_use_streaming")]
    pub use_streaming: bool,
}

fn default_source_path() -> String {
    "../frontend".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string(), "dist".to_string()]
}

fn default_install_commands() -> Vec<String> {
    vec!["npm ci".to_string()]
}

fn default_build_commands() -> Vec<String> {
    vec!["npm run build".to_string()]
}

fn default_output_directory() -> String {
    "dist".to_string()
}

fn default_use_streaming() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticSiteBuildDescriptor {
    pub logical_id: LogicalId,
    pub source_path: String,
    pub exclude: Vec<String>,
    pub install_commands: Vec<String>,
    pub build_commands: Vec<String>,
    pub output_directory: String,
    pub destination_bucket: ResourceRef,
    pub environment: Vec<EnvVar>,
}

impl StaticSiteBuildDescriptor {
    pub fn env(&self, name: &str) -> Option<&str> {
        self.environment.iter().find(|var| var.name == name).map(|var| var.value.as_str())
    }
}

/// Describe the build that publishes the frontend into `bucket`
pub fn resolve_static_site_build(
    spec: &SiteBuildSpec,
    region: &str,
    bucket: &AssetBucketDescriptor,
) -> Result<StaticSiteBuildDescriptor> {
    spec.validate()?;

    let env = &spec.environment;
    let region = env.region.as_deref().unwrap_or(region);
    if region.trim().is_empty() {
        return Err(FrontdoorError::validation_field(
            "build region cannot be empty",
            "build.environment.region",
        ));
    }

    let var = |name: &str, value: &str| EnvVar { name: name.to_string(), value: value.to_string() };
    let environment = vec![
        var("VITE_APP_API_ENDPOINT", &env.api_endpoint),
        var("VITE_APP_WS_ENDPOINT", &env.websocket_endpoint),
        var("VITE_APP_USER_POOL_ID", &env.user_pool_id),
        var("VITE_APP_USER_POOL_CLIENT_ID", &env.user_pool_client_id),
        var("VITE_APP_REGION", region),
        var("VITE_APP_USE_STREAMING", if env.use_streaming { "true" } else { "false" }),
    ];

    debug!(source = %spec.source_path, region = %region, "Resolved static site build");

    Ok(StaticSiteBuildDescriptor {
        logical_id: LogicalId::fixed("ReactBuild"),
        source_path: spec.source_path.clone(),
        exclude: spec.exclude.clone(),
        install_commands: spec.install_commands.clone(),
        build_commands: spec.build_commands.clone(),
        output_directory: spec.output_directory.clone(),
        destination_bucket: bucket.name(),
        environment,
    })
}
