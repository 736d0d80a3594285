//! Load balancer listener resolution
//!
//! The exposure policy picks port, protocol and certificate; the routing target picks
//! the default action. HTTPS never falls back to plain HTTP: a missing or blank
//! certificate aborts resolution.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::errors::{FrontdoorError, Result};
use crate::resolver::load_balancer::LoadBalancerDescriptor;
use crate::resolver::refs::{ArnRef, Attribute, LogicalId, ResourceRef};
use crate::resolver::target_group::TargetGroupDescriptor;

/// Security policy attached to HTTPS listeners
pub const DEFAULT_SSL_POLICY: &str = "ELBSecurityPolicy-TLS13-1-2-2021-06";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationProtocol {
    Http,
    Https,
}

impl ApplicationProtocol {
    pub fn default_port(self) -> u16 {
        match self {
            ApplicationProtocol::Http => 80,
            ApplicationProtocol::Https => 443,
        }
    }
}

impl fmt::Display for ApplicationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationProtocol::Http => f.write_str("HTTP"),
            ApplicationProtocol::Https => f.write_str("HTTPS"),
        }
    }
}

/// How the frontend is exposed to clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExposurePolicy {
    HttpPlain,
    Https { certificate: Option<ArnRef> },
}

impl ExposurePolicy {
    pub fn https<C: Into<ArnRef>>(certificate: C) -> Self {
        ExposurePolicy::Https { certificate: Some(certificate.into()) }
    }

    pub fn protocol(&self) -> ApplicationProtocol {
        match self {
            ExposurePolicy::HttpPlain => ApplicationProtocol::Http,
            ExposurePolicy::Https { .. } => ApplicationProtocol::Https,
        }
    }
}

/// Canned response returned without forwarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedResponse {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_body: Option<String>,
}

impl FixedResponse {
    pub fn ok() -> Self {
        Self { status_code: 200, content_type: None, message_body: None }
    }
}

impl Default for FixedResponse {
    fn default() -> Self {
        Self::ok()
    }
}

/// Routing mode of a listener; exactly one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    FixedResponse,
    IpTarget,
    Compute,
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::FixedResponse => f.write_str("fixed-response"),
            RoutingMode::IpTarget => f.write_str("ip-target"),
            RoutingMode::Compute => f.write_str("compute"),
        }
    }
}

/// Where the listener sends traffic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingTarget {
    FixedResponse(FixedResponse),
    IpTargetGroup { target_group: ResourceRef },
    Compute { target_arn: String },
}

impl RoutingTarget {
    /// Canned 200 response
    pub fn fixed_response() -> Self {
        RoutingTarget::FixedResponse(FixedResponse::ok())
    }

    /// Forward to an already-resolved IP target group
    pub fn ip_target_group(group: &TargetGroupDescriptor) -> Self {
        RoutingTarget::IpTargetGroup { target_group: group.arn() }
    }

    pub fn compute<S: Into<String>>(target_arn: S) -> Self {
        RoutingTarget::Compute { target_arn: target_arn.into() }
    }

    pub fn mode(&self) -> RoutingMode {
        match self {
            RoutingTarget::FixedResponse(_) => RoutingMode::FixedResponse,
            RoutingTarget::IpTargetGroup { .. } => RoutingMode::IpTarget,
            RoutingTarget::Compute { .. } => RoutingMode::Compute,
        }
    }
}

/// Listener default action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerAction {
    FixedResponse(FixedResponse),
    Forward { target_group: ResourceRef },
    ForwardToCompute { target_arn: String },
}

impl ListenerAction {
    pub fn routing_mode(&self) -> RoutingMode {
        match self {
            ListenerAction::FixedResponse(_) => RoutingMode::FixedResponse,
            ListenerAction::Forward { .. } => RoutingMode::IpTarget,
            ListenerAction::ForwardToCompute { .. } => RoutingMode::Compute,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerDescriptor {
    pub logical_id: LogicalId,
    pub load_balancer: ResourceRef,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<ArnRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<String>,
    pub default_action: ListenerAction,
}

impl ListenerDescriptor {
    pub fn arn(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Arn)
    }

    pub fn routing_mode(&self) -> RoutingMode {
        self.default_action.routing_mode()
    }
}

/// Resolve the single listener of `load_balancer`.
///
/// Equal inputs always produce equal descriptors.
pub fn resolve_listener(
    load_balancer: &LoadBalancerDescriptor,
    policy: &ExposurePolicy,
    target: &RoutingTarget,
) -> Result<ListenerDescriptor> {
    let protocol = policy.protocol();

    let (certificates, ssl_policy) = match policy {
        ExposurePolicy::HttpPlain => (Vec::new(), None),
        ExposurePolicy::Https { certificate } => match certificate {
            Some(certificate) if certificate.is_resolvable() => {
                (vec![certificate.clone()], Some(DEFAULT_SSL_POLICY.to_string()))
            }
            _ => {
                return Err(FrontdoorError::configuration(
                    "certificate required for HTTPS exposure",
                    "exposure.certificate",
                    "HTTPS listeners require a resolvable certificate reference",
                ));
            }
        },
    };

    let default_action = match target {
        RoutingTarget::FixedResponse(response) => {
            if !(200..=599).contains(&response.status_code) {
                return Err(FrontdoorError::validation_field(
                    format!(
                        "fixed response status code {} must be between 200 and 599",
                        response.status_code
                    ),
                    "routing.status_code",
                ));
            }
            ListenerAction::FixedResponse(response.clone())
        }
        RoutingTarget::IpTargetGroup { target_group } => {
            ListenerAction::Forward { target_group: target_group.clone() }
        }
        RoutingTarget::Compute { target_arn } => {
            if target_arn.trim().is_empty() {
                return Err(FrontdoorError::configuration(
                    "compute routing requires a target ARN",
                    "routing.compute_target_arn",
                    "compute targets must name the resource to forward to",
                ));
            }
            ListenerAction::ForwardToCompute { target_arn: target_arn.clone() }
        }
    };

    debug!(
        protocol = %protocol,
        port = protocol.default_port(),
        routing_mode = %target.mode(),
        "Resolved listener"
    );

    Ok(ListenerDescriptor {
        logical_id: LogicalId::fixed("Listener"),
        load_balancer: load_balancer.arn(),
        port: protocol.default_port(),
        protocol,
        certificates,
        ssl_policy,
        default_action,
    })
}
