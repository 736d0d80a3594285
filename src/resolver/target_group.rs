//! IP target groups and their binding to a listener

use serde::Serialize;
use tracing::debug;

use crate::errors::{FrontdoorError, Result};
use crate::resolver::listener::{ApplicationProtocol, ListenerAction, ListenerDescriptor};
use crate::resolver::load_balancer::VpcRef;
use crate::resolver::refs::{Attribute, LogicalId, ResourceRef};

/// Port used when the declaration does not name one
pub const DEFAULT_TARGET_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Ip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetGroupDescriptor {
    pub logical_id: LogicalId,
    pub vpc: VpcRef,
    pub protocol: ApplicationProtocol,
    pub port: u16,
    pub target_type: TargetType,
}

impl TargetGroupDescriptor {
    pub fn arn(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Arn)
    }
}

/// Attachment of a target group to a forwarding listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingDescriptor {
    pub logical_id: LogicalId,
    pub listener: ResourceRef,
    pub target_group: ResourceRef,
    pub protocol: ApplicationProtocol,
    pub port: u16,
}

pub fn resolve_target_group(
    vpc: &VpcRef,
    protocol: ApplicationProtocol,
    port: u16,
) -> Result<TargetGroupDescriptor> {
    if port == 0 {
        return Err(FrontdoorError::validation_field(
            "target port must be between 1 and 65535",
            "routing.target_port",
        ));
    }

    Ok(TargetGroupDescriptor {
        logical_id: LogicalId::fixed("TargetGroup"),
        vpc: vpc.clone(),
        protocol,
        port,
        target_type: TargetType::Ip,
    })
}

/// Bind `group` to `listener`.
///
/// The listener must be in IP-target mode and forward to this very group. TLS
/// terminates at the listener, so an HTTP group may sit behind either protocol, but an
/// HTTPS group cannot sit behind a plain HTTP listener.
pub fn resolve_target_group_binding(
    listener: &ListenerDescriptor,
    group: &TargetGroupDescriptor,
) -> Result<BindingDescriptor> {
    let forwarded = match &listener.default_action {
        ListenerAction::Forward { target_group } => target_group,
        other => {
            return Err(FrontdoorError::invalid_state(
                "target groups can only be bound to a listener that forwards to IP targets",
                "resolve_target_group_binding",
                other.routing_mode().to_string(),
            ));
        }
    };

    if *forwarded != group.arn() {
        return Err(FrontdoorError::invalid_state(
            format!(
                "listener forwards to {} but the binding names {}",
                forwarded,
                group.arn()
            ),
            "resolve_target_group_binding",
            listener.routing_mode().to_string(),
        ));
    }

    if listener.protocol == ApplicationProtocol::Http && group.protocol == ApplicationProtocol::Https
    {
        return Err(FrontdoorError::configuration(
            "an HTTPS target group cannot be served by a plain HTTP listener",
            "routing.target_protocol",
            "target group protocol must be compatible with the listener protocol",
        ));
    }

    debug!(
        listener_protocol = %listener.protocol,
        target_protocol = %group.protocol,
        target_port = group.port,
        "Resolved target group binding"
    );

    Ok(BindingDescriptor {
        logical_id: LogicalId::fixed("TargetGroupBinding"),
        listener: listener.arn(),
        target_group: group.arn(),
        protocol: group.protocol,
        port: group.port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::listener::{resolve_listener, ExposurePolicy, RoutingTarget};
    use crate::resolver::load_balancer::{
        resolve_load_balancer, resolve_security_group, LoadBalancerDescriptor,
    };

    fn fixture() -> (VpcRef, LoadBalancerDescriptor) {
        let vpc = VpcRef::new("vpc-1").unwrap();
        let lb = resolve_load_balancer(&resolve_security_group(&vpc), None).unwrap();
        (vpc, lb)
    }

    #[test]
    fn test_binding_to_fixed_response_listener_is_invalid_state() {
        let (vpc, lb) = fixture();
        let listener =
            resolve_listener(&lb, &ExposurePolicy::HttpPlain, &RoutingTarget::fixed_response())
                .unwrap();
        let group = resolve_target_group(&vpc, ApplicationProtocol::Http, 8080).unwrap();

        let err = resolve_target_group_binding(&listener, &group).unwrap_err();
        match err {
            FrontdoorError::InvalidState { mode, .. } => assert_eq!(mode, "fixed-response"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_http_group_behind_https_listener() {
        let (vpc, lb) = fixture();
        let group = resolve_target_group(&vpc, ApplicationProtocol::Http, 8080).unwrap();
        let listener = resolve_listener(
            &lb,
            &ExposurePolicy::https("arn:aws:acm:us-east-1:1:certificate/x"),
            &RoutingTarget::ip_target_group(&group),
        )
        .unwrap();

        let binding = resolve_target_group_binding(&listener, &group).unwrap();
        assert_eq!(binding.listener, listener.arn());
        assert_eq!(binding.target_group, group.arn());
        assert_eq!(binding.port, 8080);
    }

    #[test]
    fn test_https_group_behind_http_listener_rejected() {
        let (vpc, lb) = fixture();
        let group = resolve_target_group(&vpc, ApplicationProtocol::Https, 8443).unwrap();
        let listener = resolve_listener(
            &lb,
            &ExposurePolicy::HttpPlain,
            &RoutingTarget::ip_target_group(&group),
        )
        .unwrap();

        let err = resolve_target_group_binding(&listener, &group).unwrap_err();
        assert!(matches!(err, FrontdoorError::Configuration { .. }));
    }

    #[test]
    fn test_binding_a_different_group_is_invalid_state() {
        let (vpc, lb) = fixture();
        let group = resolve_target_group(&vpc, ApplicationProtocol::Http, 8080).unwrap();
        let listener = resolve_listener(
            &lb,
            &ExposurePolicy::HttpPlain,
            &RoutingTarget::IpTargetGroup {
                target_group: ResourceRef::new(
                    LogicalId::new("OtherGroup").unwrap(),
                    Attribute::Arn,
                ),
            },
        )
        .unwrap();

        let err = resolve_target_group_binding(&listener, &group).unwrap_err();
        assert!(matches!(err, FrontdoorError::InvalidState { .. }));
    }

    #[test]
    fn test_zero_port_rejected() {
        let vpc = VpcRef::new("vpc-1").unwrap();
        assert!(resolve_target_group(&vpc, ApplicationProtocol::Http, 0).is_err());
    }
}
