//! Security group and internet-facing application load balancer

use serde::Serialize;
use tracing::debug;

use crate::errors::{FrontdoorError, Result};
use crate::resolver::refs::{Attribute, LogicalId, ResourceRef};
use crate::utils::is_valid_load_balancer_name;

/// VPC the load balancer and target group live in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VpcRef(String);

impl VpcRef {
    pub fn new<S: Into<String>>(vpc_id: S) -> Result<Self> {
        let vpc_id = vpc_id.into();
        if vpc_id.trim().is_empty() {
            return Err(FrontdoorError::validation_field("VPC id cannot be empty", "vpc_id"));
        }
        Ok(Self(vpc_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityGroupDescriptor {
    pub logical_id: LogicalId,
    pub vpc: VpcRef,
    pub allow_all_outbound: bool,
}

impl SecurityGroupDescriptor {
    pub fn id(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadBalancerScheme {
    InternetFacing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadBalancerDescriptor {
    pub logical_id: LogicalId,
    /// Fixed physical name; the provisioning client generates one when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub vpc: VpcRef,
    pub scheme: LoadBalancerScheme,
    pub security_group: ResourceRef,
}

impl LoadBalancerDescriptor {
    pub fn arn(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Arn)
    }

    pub fn dns_name(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::DnsName)
    }

    pub fn canonical_hosted_zone_id(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::CanonicalHostedZoneId)
    }
}

/// Security group in `vpc` with unrestricted egress
pub fn resolve_security_group(vpc: &VpcRef) -> SecurityGroupDescriptor {
    SecurityGroupDescriptor {
        logical_id: LogicalId::fixed("SecurityGroup"),
        vpc: vpc.clone(),
        allow_all_outbound: true,
    }
}

/// Internet-facing load balancer guarded by `security_group`
pub fn resolve_load_balancer(
    security_group: &SecurityGroupDescriptor,
    name: Option<&str>,
) -> Result<LoadBalancerDescriptor> {
    if let Some(name) = name {
        if !is_valid_load_balancer_name(name) {
            return Err(FrontdoorError::validation_field(
                format!(
                    "'{}' is not a valid load balancer name (1-32 alphanumerics or hyphens, \
                     no leading or trailing hyphen, no 'internal-' prefix)",
                    name
                ),
                "load_balancer.name",
            ));
        }
    }

    debug!(name = ?name, vpc = %security_group.vpc.as_str(), "Resolved load balancer");

    Ok(LoadBalancerDescriptor {
        logical_id: LogicalId::fixed("Alb"),
        name: name.map(str::to_string),
        vpc: security_group.vpc.clone(),
        scheme: LoadBalancerScheme::InternetFacing,
        security_group: security_group.id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_balancer_references_security_group() {
        let vpc = VpcRef::new("vpc-0abc").unwrap();
        let sg = resolve_security_group(&vpc);
        let lb = resolve_load_balancer(&sg, None).unwrap();

        assert!(sg.allow_all_outbound);
        assert_eq!(lb.security_group, sg.id());
        assert_eq!(lb.vpc, vpc);
        assert_eq!(lb.scheme, LoadBalancerScheme::InternetFacing);
        assert_eq!(lb.name, None);
    }

    #[test]
    fn test_named_load_balancer() {
        let sg = resolve_security_group(&VpcRef::new("vpc-0abc").unwrap());
        let lb = resolve_load_balancer(&sg, Some("frontend-alb")).unwrap();
        assert_eq!(lb.name.as_deref(), Some("frontend-alb"));

        let err = resolve_load_balancer(&sg, Some("-frontend")).unwrap_err();
        assert!(matches!(err, FrontdoorError::Validation { .. }));
    }

    #[test]
    fn test_empty_vpc_rejected() {
        assert!(VpcRef::new(" ").is_err());
    }
}
