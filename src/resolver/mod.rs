//! # Network Exposure Resolver
//!
//! Pure functions that turn declared exposure inputs into resource descriptors.
//! Dependency order is structural: every function that references another resource
//! takes that resource's resolved descriptor as an argument, so a descriptor can only
//! be built after everything it points at.
//!
//! ```text
//! security group → load balancer → listener → target-group binding
//!                        │              ▲
//!                        │        target group
//!                        ├→ access logging
//! allow-list → IP sets → web ACL → association ←┘
//! ```

pub mod access_log;
pub mod allow_list;
pub mod bucket;
pub mod dns;
pub mod firewall;
pub mod listener;
pub mod load_balancer;
pub mod refs;
pub mod site_build;
pub mod target_group;
pub mod waf;

pub use access_log::{resolve_access_logging, LogBucketRef, LoggingDescriptor};
pub use allow_list::{IpVersion, NetworkAllowList};
pub use bucket::{resolve_asset_bucket, AssetBucketDescriptor};
pub use dns::{
    resolve_alias_record, resolve_certificate_request, resolve_hosted_zone,
    AliasRecordDescriptor, CertificateRequestDescriptor, HostedZoneDescriptor,
};
pub use firewall::{
    resolve_firewall_rules, resolve_ip_sets, resolve_web_acl, FirewallAction,
    FirewallRuleDescriptor, IpSetDescriptor, WebAclDescriptor,
};
pub use listener::{
    resolve_listener, ApplicationProtocol, ExposurePolicy, FixedResponse, ListenerAction,
    ListenerDescriptor, RoutingMode, RoutingTarget,
};
pub use load_balancer::{
    resolve_load_balancer, resolve_security_group, LoadBalancerDescriptor,
    SecurityGroupDescriptor, VpcRef,
};
pub use refs::{ArnRef, Attribute, LogicalId, ResourceRef};
pub use site_build::{resolve_static_site_build, SiteBuildSpec, StaticSiteBuildDescriptor};
pub use target_group::{
    resolve_target_group, resolve_target_group_binding, BindingDescriptor,
    TargetGroupDescriptor,
};
pub use waf::{resolve_waf_association, AssociationDescriptor};
