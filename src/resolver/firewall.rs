//! Regional web ACL built from the IP allow-list
//!
//! One IP set and one allow rule are produced per non-empty address family. The ACL
//! blocks everything that no rule matches; that default is not configurable.

use serde::Serialize;
use tracing::debug;

use crate::resolver::allow_list::{IpVersion, NetworkAllowList};
use crate::resolver::refs::{Attribute, LogicalId, ResourceRef};

/// Name and metric name of the frontend web ACL
pub const WEB_ACL_NAME: &str = "FrontendWebAcl";

/// Scope of every firewall resource the resolver emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WafScope {
    Regional,
}

/// What a rule, or the ACL itself, does with a matching request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FirewallAction {
    Allow,
    Block,
}

/// CloudWatch visibility settings shared by the ACL and its rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityConfig {
    pub cloud_watch_metrics_enabled: bool,
    pub metric_name: String,
    pub sampled_requests_enabled: bool,
}

impl VisibilityConfig {
    fn for_metric(metric_name: &str) -> Self {
        Self {
            cloud_watch_metrics_enabled: true,
            metric_name: metric_name.to_string(),
            sampled_requests_enabled: true,
        }
    }
}

/// A named set of CIDR ranges of a single address family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpSetDescriptor {
    pub logical_id: LogicalId,
    pub ip_address_version: IpVersion,
    pub scope: WafScope,
    pub addresses: Vec<String>,
}

impl IpSetDescriptor {
    pub fn arn(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Arn)
    }
}

/// One allow rule matching an IP set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallRuleDescriptor {
    pub name: String,
    pub priority: u32,
    pub action: FirewallAction,
    pub address_family: IpVersion,
    pub ip_set: ResourceRef,
    pub visibility: VisibilityConfig,
}

/// The web ACL holding the allow rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebAclDescriptor {
    pub logical_id: LogicalId,
    pub name: String,
    pub scope: WafScope,
    pub default_action: FirewallAction,
    pub visibility: VisibilityConfig,
    pub rules: Vec<FirewallRuleDescriptor>,
}

impl WebAclDescriptor {
    /// Reference to the ACL's ARN, consumed by the load-balancer association
    pub fn arn(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Arn)
    }
}

fn ip_set_id(version: IpVersion) -> LogicalId {
    match version {
        IpVersion::V4 => LogicalId::fixed("FrontendIpV4Set"),
        IpVersion::V6 => LogicalId::fixed("FrontendIpV6Set"),
    }
}

fn rule_name(version: IpVersion) -> &'static str {
    match version {
        IpVersion::V4 => "FrontendWebAclIpV4RuleSet",
        IpVersion::V6 => "FrontendWebAclIpV6RuleSet",
    }
}

/// IP sets for every non-empty family, IPv4 first
pub fn resolve_ip_sets(allow_list: &NetworkAllowList) -> Vec<IpSetDescriptor> {
    allow_list
        .non_empty_families()
        .into_iter()
        .map(|version| IpSetDescriptor {
            logical_id: ip_set_id(version),
            ip_address_version: version,
            scope: WafScope::Regional,
            addresses: allow_list.addresses(version),
        })
        .collect()
}

/// Allow rules for every non-empty family.
///
/// Priorities start at 0 and increase by one in emission order (IPv4 before IPv6).
/// Each rule references the IP set [`resolve_ip_sets`] produces for the same family.
pub fn resolve_firewall_rules(allow_list: &NetworkAllowList) -> Vec<FirewallRuleDescriptor> {
    let rules: Vec<FirewallRuleDescriptor> = resolve_ip_sets(allow_list)
        .iter()
        .zip(0u32..)
        .map(|(ip_set, priority)| FirewallRuleDescriptor {
            name: rule_name(ip_set.ip_address_version).to_string(),
            priority,
            action: FirewallAction::Allow,
            address_family: ip_set.ip_address_version,
            ip_set: ip_set.arn(),
            visibility: VisibilityConfig::for_metric(WEB_ACL_NAME),
        })
        .collect();

    debug!(
        ipv4_ranges = allow_list.ipv4().len(),
        ipv6_ranges = allow_list.ipv6().len(),
        rule_count = rules.len(),
        "Resolved firewall rules"
    );

    rules
}

/// Wrap resolved rules in the frontend web ACL
pub fn resolve_web_acl(rules: Vec<FirewallRuleDescriptor>) -> WebAclDescriptor {
    WebAclDescriptor {
        logical_id: LogicalId::fixed("FrontendWebAcl"),
        name: WEB_ACL_NAME.to_string(),
        scope: WafScope::Regional,
        default_action: FirewallAction::Block,
        visibility: VisibilityConfig::for_metric(WEB_ACL_NAME),
        rules,
    }
}
