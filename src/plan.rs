//! # Deployment Plan
//!
//! One resolution pass over a [`FrontendDeclaration`]. Descriptors are emitted in
//! dependency order and the finished plan is checked so that every reference points
//! at a descriptor emitted before it. A pass either yields a complete plan or an
//! error; nothing partial escapes.

use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use crate::config::{FrontendDeclaration, ProtocolDeclaration, RoutingModeDeclaration};
use crate::errors::{FrontdoorError, Result};
use crate::resolver::{
    resolve_access_logging, resolve_alias_record, resolve_asset_bucket,
    resolve_certificate_request, resolve_firewall_rules, resolve_hosted_zone, resolve_ip_sets,
    resolve_listener, resolve_load_balancer, resolve_security_group, resolve_static_site_build,
    resolve_target_group, resolve_target_group_binding, resolve_waf_association,
    resolve_web_acl, AliasRecordDescriptor, ArnRef, AssetBucketDescriptor, AssociationDescriptor,
    BindingDescriptor, CertificateRequestDescriptor, ExposurePolicy, FirewallRuleDescriptor,
    HostedZoneDescriptor, IpSetDescriptor, ListenerDescriptor, LoadBalancerDescriptor, LogicalId,
    LoggingDescriptor, ResourceRef, RoutingTarget, SecurityGroupDescriptor,
    StaticSiteBuildDescriptor, TargetGroupDescriptor, WebAclDescriptor,
};
use crate::resolve_span;

/// Any descriptor the provisioning client accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Descriptor {
    AssetBucket(AssetBucketDescriptor),
    IpSet(IpSetDescriptor),
    WebAcl(WebAclDescriptor),
    SecurityGroup(SecurityGroupDescriptor),
    LoadBalancer(LoadBalancerDescriptor),
    HostedZone(HostedZoneDescriptor),
    Certificate(CertificateRequestDescriptor),
    TargetGroup(TargetGroupDescriptor),
    Listener(ListenerDescriptor),
    TargetGroupBinding(BindingDescriptor),
    WafAssociation(AssociationDescriptor),
    AccessLogging(LoggingDescriptor),
    AliasRecord(AliasRecordDescriptor),
    StaticSiteBuild(StaticSiteBuildDescriptor),
}

impl Descriptor {
    pub fn logical_id(&self) -> &LogicalId {
        match self {
            Descriptor::AssetBucket(d) => &d.logical_id,
            Descriptor::IpSet(d) => &d.logical_id,
            Descriptor::WebAcl(d) => &d.logical_id,
            Descriptor::SecurityGroup(d) => &d.logical_id,
            Descriptor::LoadBalancer(d) => &d.logical_id,
            Descriptor::HostedZone(d) => &d.logical_id,
            Descriptor::Certificate(d) => &d.logical_id,
            Descriptor::TargetGroup(d) => &d.logical_id,
            Descriptor::Listener(d) => &d.logical_id,
            Descriptor::TargetGroupBinding(d) => &d.logical_id,
            Descriptor::WafAssociation(d) => &d.logical_id,
            Descriptor::AccessLogging(d) => &d.logical_id,
            Descriptor::AliasRecord(d) => &d.logical_id,
            Descriptor::StaticSiteBuild(d) => &d.logical_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Descriptor::AssetBucket(_) => "asset_bucket",
            Descriptor::IpSet(_) => "ip_set",
            Descriptor::WebAcl(_) => "web_acl",
            Descriptor::SecurityGroup(_) => "security_group",
            Descriptor::LoadBalancer(_) => "load_balancer",
            Descriptor::HostedZone(_) => "hosted_zone",
            Descriptor::Certificate(_) => "certificate",
            Descriptor::TargetGroup(_) => "target_group",
            Descriptor::Listener(_) => "listener",
            Descriptor::TargetGroupBinding(_) => "target_group_binding",
            Descriptor::WafAssociation(_) => "waf_association",
            Descriptor::AccessLogging(_) => "access_logging",
            Descriptor::AliasRecord(_) => "alias_record",
            Descriptor::StaticSiteBuild(_) => "static_site_build",
        }
    }

    /// Every in-plan resource this descriptor points at
    pub fn references(&self) -> Vec<&ResourceRef> {
        match self {
            Descriptor::AssetBucket(_)
            | Descriptor::IpSet(_)
            | Descriptor::SecurityGroup(_)
            | Descriptor::HostedZone(_)
            | Descriptor::TargetGroup(_) => Vec::new(),
            Descriptor::WebAcl(d) => d.rules.iter().map(|rule| &rule.ip_set).collect(),
            Descriptor::LoadBalancer(d) => vec![&d.security_group],
            Descriptor::Certificate(d) => match &d.validation {
                crate::resolver::dns::CertificateValidation::Dns { hosted_zone } => {
                    vec![hosted_zone]
                }
            },
            Descriptor::Listener(d) => {
                let mut refs = vec![&d.load_balancer];
                refs.extend(d.certificates.iter().filter_map(ArnRef::resource_ref));
                if let crate::resolver::ListenerAction::Forward { target_group } =
                    &d.default_action
                {
                    refs.push(target_group);
                }
                refs
            }
            Descriptor::TargetGroupBinding(d) => vec![&d.listener, &d.target_group],
            Descriptor::WafAssociation(d) => [&d.resource_arn, &d.web_acl_arn]
                .into_iter()
                .filter_map(ArnRef::resource_ref)
                .collect(),
            Descriptor::AccessLogging(d) => vec![&d.load_balancer],
            Descriptor::AliasRecord(d) => {
                vec![&d.hosted_zone, &d.target_dns_name, &d.target_hosted_zone_id]
            }
            Descriptor::StaticSiteBuild(d) => vec![&d.destination_bucket],
        }
    }
}

/// Ordered, fully linked output of one resolution pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    pub region: String,
    pub descriptors: Vec<Descriptor>,
    /// Where the frontend is reachable once applied
    pub origin: String,
    /// Exported ARN of the web ACL this plan creates
    pub web_acl_output: ResourceRef,
}

impl DeploymentPlan {
    /// Check that logical ids are unique and every reference points backwards
    pub fn verify_order(&self) -> Result<()> {
        let mut seen: HashSet<&LogicalId> = HashSet::new();

        for descriptor in &self.descriptors {
            for reference in descriptor.references() {
                if !seen.contains(&reference.logical_id) {
                    return Err(FrontdoorError::invalid_state(
                        format!(
                            "{} '{}' references {} before it is declared",
                            descriptor.kind(),
                            descriptor.logical_id(),
                            reference
                        ),
                        "verify_order",
                        "unordered",
                    ));
                }
            }
            if !seen.insert(descriptor.logical_id()) {
                return Err(FrontdoorError::invalid_state(
                    format!("logical id '{}' is declared twice", descriptor.logical_id()),
                    "verify_order",
                    "duplicate",
                ));
            }
        }

        if !seen.contains(&self.web_acl_output.logical_id) {
            return Err(FrontdoorError::invalid_state(
                format!("output {} names no descriptor in the plan", self.web_acl_output),
                "verify_order",
                "dangling-output",
            ));
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn count_of(&self, kind: &str) -> usize {
        self.descriptors.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn get(&self, logical_id: &str) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.logical_id().as_str() == logical_id)
    }

    pub fn web_acl(&self) -> Option<&WebAclDescriptor> {
        self.descriptors.iter().find_map(|d| match d {
            Descriptor::WebAcl(acl) => Some(acl),
            _ => None,
        })
    }

    pub fn firewall_rules(&self) -> &[FirewallRuleDescriptor] {
        self.web_acl().map(|acl| acl.rules.as_slice()).unwrap_or(&[])
    }

    pub fn listener(&self) -> Option<&ListenerDescriptor> {
        self.descriptors.iter().find_map(|d| match d {
            Descriptor::Listener(listener) => Some(listener),
            _ => None,
        })
    }

    pub fn bindings(&self) -> Vec<&BindingDescriptor> {
        self.descriptors
            .iter()
            .filter_map(|d| match d {
                Descriptor::TargetGroupBinding(binding) => Some(binding),
                _ => None,
            })
            .collect()
    }

    pub fn associations(&self) -> Vec<&AssociationDescriptor> {
        self.descriptors
            .iter()
            .filter_map(|d| match d {
                Descriptor::WafAssociation(association) => Some(association),
                _ => None,
            })
            .collect()
    }

    pub fn logging(&self) -> Vec<&LoggingDescriptor> {
        self.descriptors
            .iter()
            .filter_map(|d| match d {
                Descriptor::AccessLogging(logging) => Some(logging),
                _ => None,
            })
            .collect()
    }
}

/// Resolve a whole declaration into an ordered plan
pub fn resolve_plan(declaration: &FrontendDeclaration) -> Result<DeploymentPlan> {
    let span = resolve_span!("resolve_plan", region = %declaration.region);
    let _enter = span.enter();

    declaration.validate()?;

    let mut descriptors = Vec::new();

    let bucket = resolve_asset_bucket();

    let allow_list = declaration.allow_list()?;
    let ip_sets = resolve_ip_sets(&allow_list);
    let web_acl = resolve_web_acl(resolve_firewall_rules(&allow_list));
    let web_acl_output = web_acl.arn();

    let vpc = declaration.vpc()?;
    let security_group = resolve_security_group(&vpc);
    let load_balancer =
        resolve_load_balancer(&security_group, declaration.load_balancer_name.as_deref())?;

    let zone = declaration.dns.as_ref().map(|dns| resolve_hosted_zone(&dns.zone_name)).transpose()?;

    let mut certificate_request = None;
    let policy = match declaration.exposure.protocol {
        ProtocolDeclaration::Http => ExposurePolicy::HttpPlain,
        ProtocolDeclaration::Https => {
            let certificate = match (&declaration.exposure.certificate_arn, &zone, &declaration.dns)
            {
                (Some(arn), _, _) => Some(ArnRef::from(arn.as_str())),
                (None, Some(zone), Some(dns)) => {
                    let request = resolve_certificate_request(&dns.host_name(), zone)?;
                    let arn = ArnRef::from(request.arn());
                    certificate_request = Some(request);
                    Some(arn)
                }
                _ => None,
            };
            ExposurePolicy::Https { certificate }
        }
    };

    let routing = &declaration.routing;
    let target_group = match routing.mode {
        RoutingModeDeclaration::IpTargetGroup => Some(resolve_target_group(
            &vpc,
            routing.target_protocol.into(),
            routing.target_port,
        )?),
        _ => None,
    };
    let target = match (routing.mode, &target_group) {
        (RoutingModeDeclaration::IpTargetGroup, Some(group)) => {
            RoutingTarget::ip_target_group(group)
        }
        (RoutingModeDeclaration::Compute, _) => {
            RoutingTarget::compute(routing.compute_target_arn.clone().unwrap_or_default())
        }
        _ => RoutingTarget::FixedResponse(routing.fixed_response()),
    };

    let listener = resolve_listener(&load_balancer, &policy, &target)?;
    let binding = target_group
        .as_ref()
        .map(|group| resolve_target_group_binding(&listener, group))
        .transpose()?;

    let web_acl_arn = match &declaration.web_acl_arn {
        Some(arn) => ArnRef::from(arn.as_str()),
        None => ArnRef::from(web_acl.arn()),
    };
    let association = resolve_waf_association(ArnRef::from(load_balancer.arn()), web_acl_arn);

    let log_bucket = declaration.log_bucket();
    let logging = resolve_access_logging(&load_balancer, log_bucket.as_ref());

    let alias_record = match (&zone, &declaration.dns) {
        (Some(zone), Some(dns)) => {
            Some(resolve_alias_record(zone, &dns.host_name(), &load_balancer)?)
        }
        _ => None,
    };

    let build = declaration
        .build
        .as_ref()
        .map(|spec| resolve_static_site_build(spec, &declaration.region, &bucket))
        .transpose()?;

    // The alias record, when present, is the published host for either protocol
    let scheme = policy.protocol().to_string().to_lowercase();
    let origin = match &declaration.dns {
        Some(dns) => format!("{}://{}", scheme, dns.host_name()),
        None => format!("{}://${{{}}}", scheme, load_balancer.dns_name()),
    };

    descriptors.push(Descriptor::AssetBucket(bucket));
    descriptors.extend(ip_sets.into_iter().map(Descriptor::IpSet));
    descriptors.push(Descriptor::WebAcl(web_acl));
    descriptors.push(Descriptor::SecurityGroup(security_group));
    descriptors.push(Descriptor::LoadBalancer(load_balancer));
    descriptors.extend(zone.map(Descriptor::HostedZone));
    descriptors.extend(certificate_request.map(Descriptor::Certificate));
    descriptors.extend(target_group.map(Descriptor::TargetGroup));
    descriptors.push(Descriptor::Listener(listener));
    descriptors.extend(binding.map(Descriptor::TargetGroupBinding));
    descriptors.push(Descriptor::WafAssociation(association));
    descriptors.extend(logging.map(Descriptor::AccessLogging));
    descriptors.extend(alias_record.map(Descriptor::AliasRecord));
    descriptors.extend(build.map(Descriptor::StaticSiteBuild));

    let plan = DeploymentPlan {
        region: declaration.region.clone(),
        descriptors,
        origin,
        web_acl_output,
    };
    plan.verify_order()?;

    span.record("descriptor_count", plan.len());
    info!(
        descriptors = plan.len(),
        firewall_rules = plan.firewall_rules().len(),
        origin = %plan.origin,
        "Resolved deployment plan"
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AccessLogDeclaration, AllowListDeclaration, DnsDeclaration, ExposureDeclaration,
        RoutingDeclaration,
    };
    use crate::resolver::{Attribute, ListenerAction};

    fn declaration() -> FrontendDeclaration {
        FrontendDeclaration {
            region: "us-east-1".into(),
            vpc_id: "vpc-0abc".into(),
            allow_list: AllowListDeclaration {
                ipv4: vec!["10.0.0.0/16".into()],
                ipv6: vec!["2001:db8::/32".into()],
            },
            exposure: ExposureDeclaration {
                protocol: ProtocolDeclaration::Http,
                certificate_arn: None,
            },
            routing: RoutingDeclaration::default(),
            load_balancer_name: Some("frontend-alb".into()),
            access_log: None,
            web_acl_arn: None,
            dns: None,
            build: None,
        }
    }

    #[test]
    fn test_plan_order_for_minimal_http() {
        let plan = resolve_plan(&declaration()).unwrap();
        let kinds: Vec<&str> = plan.descriptors.iter().map(Descriptor::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "asset_bucket",
                "ip_set",
                "ip_set",
                "web_acl",
                "security_group",
                "load_balancer",
                "listener",
                "waf_association",
            ]
        );
        assert!(plan.origin.starts_with("http://"));
    }

    #[test]
    fn test_association_defaults_to_own_web_acl() {
        let plan = resolve_plan(&declaration()).unwrap();
        let association = plan.associations()[0];
        assert_eq!(
            association.web_acl_arn,
            ArnRef::from(ResourceRef::new(LogicalId::fixed("FrontendWebAcl"), Attribute::Arn))
        );
        assert_eq!(plan.web_acl_output.logical_id.as_str(), "FrontendWebAcl");
    }

    #[test]
    fn test_https_with_managed_certificate() {
        let mut declaration = declaration();
        declaration.exposure.protocol = ProtocolDeclaration::Https;
        declaration.dns = Some(DnsDeclaration {
            zone_name: "example.com".into(),
            domain_name: None,
            record_name: "www".into(),
        });

        let plan = resolve_plan(&declaration).unwrap();
        let listener = plan.listener().unwrap();
        assert_eq!(listener.port, 443);
        assert_eq!(
            listener.certificates,
            vec![ArnRef::from(ResourceRef::new(LogicalId::fixed("Certificate"), Attribute::Arn))]
        );
        assert_eq!(plan.count_of("hosted_zone"), 1);
        assert_eq!(plan.count_of("certificate"), 1);
        assert_eq!(plan.count_of("alias_record"), 1);
        assert_eq!(plan.origin, "https://www.example.com");
    }

    #[test]
    fn test_domain_name_drives_certificate_alias_and_origin() {
        let mut declaration = declaration();
        declaration.exposure.protocol = ProtocolDeclaration::Https;
        declaration.dns = Some(DnsDeclaration {
            zone_name: "example.com".into(),
            domain_name: Some("app.example.com".into()),
            record_name: "www".into(),
        });

        let plan = resolve_plan(&declaration).unwrap();
        let certificate = match plan.get("Certificate") {
            Some(Descriptor::Certificate(certificate)) => certificate,
            other => panic!("expected certificate, got {:?}", other),
        };
        let alias = match plan.get("AliasRecord") {
            Some(Descriptor::AliasRecord(alias)) => alias,
            other => panic!("expected alias record, got {:?}", other),
        };

        assert_eq!(certificate.domain_name, "app.example.com");
        assert_eq!(alias.record_name, "app");
        assert_eq!(plan.origin, "https://app.example.com");
    }

    #[test]
    fn test_http_origin_uses_alias_host() {
        let mut declaration = declaration();
        declaration.dns = Some(DnsDeclaration {
            zone_name: "example.com".into(),
            domain_name: None,
            record_name: "www".into(),
        });

        let plan = resolve_plan(&declaration).unwrap();
        assert_eq!(plan.count_of("certificate"), 0);
        assert_eq!(plan.count_of("alias_record"), 1);
        assert_eq!(plan.origin, "http://www.example.com");
    }

    #[test]
    fn test_https_without_certificate_aborts_pass() {
        let mut declaration = declaration();
        declaration.exposure.protocol = ProtocolDeclaration::Https;
        let err = resolve_plan(&declaration).unwrap_err();
        assert!(matches!(err, FrontdoorError::Configuration { .. }));
    }

    #[test]
    fn test_access_logging_is_opt_in() {
        let mut declaration = declaration();
        assert!(resolve_plan(&declaration).unwrap().logging().is_empty());

        declaration.access_log =
            Some(AccessLogDeclaration { bucket: "frontend-logs".into(), prefix: None });
        let plan = resolve_plan(&declaration).unwrap();
        assert_eq!(plan.logging().len(), 1);
        assert_eq!(plan.descriptors.last().map(Descriptor::kind), Some("access_logging"));
    }

    #[test]
    fn test_ip_target_mode_binds_group() {
        let mut declaration = declaration();
        declaration.routing.mode = RoutingModeDeclaration::IpTargetGroup;
        let plan = resolve_plan(&declaration).unwrap();

        let listener = plan.listener().unwrap();
        assert!(matches!(listener.default_action, ListenerAction::Forward { .. }));
        assert_eq!(plan.bindings().len(), 1);
        assert_eq!(plan.count_of("target_group"), 1);
    }

    #[test]
    fn test_verify_order_rejects_forward_reference() {
        let mut plan = resolve_plan(&declaration()).unwrap();
        // move the listener ahead of its load balancer
        let listener_index =
            plan.descriptors.iter().position(|d| d.kind() == "listener").unwrap();
        let listener = plan.descriptors.remove(listener_index);
        plan.descriptors.insert(0, listener);

        let err = plan.verify_order().unwrap_err();
        assert!(matches!(err, FrontdoorError::InvalidState { .. }));
    }

    #[test]
    fn test_verify_order_rejects_duplicates() {
        let mut plan = resolve_plan(&declaration()).unwrap();
        let bucket = plan.descriptors[0].clone();
        plan.descriptors.push(bucket);
        assert!(plan.verify_order().is_err());
    }
}
