//! Hosted zone, DNS-validated certificate and alias record for HTTPS exposure

use serde::Serialize;
use tracing::debug;

use crate::errors::{FrontdoorError, Result};
use crate::resolver::load_balancer::LoadBalancerDescriptor;
use crate::resolver::refs::{Attribute, LogicalId, ResourceRef};
use crate::utils::is_valid_domain_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedZoneDescriptor {
    pub logical_id: LogicalId,
    pub zone_name: String,
}

impl HostedZoneDescriptor {
    pub fn id(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CertificateValidation {
    Dns { hosted_zone: ResourceRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateRequestDescriptor {
    pub logical_id: LogicalId,
    pub domain_name: String,
    pub validation: CertificateValidation,
}

impl CertificateRequestDescriptor {
    pub fn arn(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Arn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRecordDescriptor {
    pub logical_id: LogicalId,
    pub hosted_zone: ResourceRef,
    pub record_name: String,
    pub target_dns_name: ResourceRef,
    pub target_hosted_zone_id: ResourceRef,
}

fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

pub fn resolve_hosted_zone(zone_name: &str) -> Result<HostedZoneDescriptor> {
    let zone_name = normalize(zone_name);
    if !is_valid_domain_name(&zone_name) || zone_name.starts_with("*.") {
        return Err(FrontdoorError::validation_field(
            format!("'{}' is not a valid hosted zone name", zone_name),
            "dns.zone_name",
        ));
    }

    Ok(HostedZoneDescriptor { logical_id: LogicalId::fixed("HostedZone"), zone_name })
}

/// Request a certificate for `domain_name`, validated through records in `zone`
pub fn resolve_certificate_request(
    domain_name: &str,
    zone: &HostedZoneDescriptor,
) -> Result<CertificateRequestDescriptor> {
    let domain = normalize(domain_name);
    if !is_valid_domain_name(&domain) {
        return Err(FrontdoorError::validation_field(
            format!("'{}' is not a valid domain name", domain_name),
            "dns.domain_name",
        ));
    }

    ensure_in_zone(&domain, zone)?;

    debug!(domain = %domain, zone = %zone.zone_name, "Resolved certificate request");

    Ok(CertificateRequestDescriptor {
        logical_id: LogicalId::fixed("Certificate"),
        domain_name: domain,
        validation: CertificateValidation::Dns { hosted_zone: zone.id() },
    })
}

fn ensure_in_zone(domain: &str, zone: &HostedZoneDescriptor) -> Result<()> {
    if domain != zone.zone_name && !domain.ends_with(&format!(".{}", zone.zone_name)) {
        return Err(FrontdoorError::configuration(
            format!("domain '{}' is outside hosted zone '{}'", domain, zone.zone_name),
            "dns.domain_name",
            "DNS records must be created in a zone that contains the domain",
        ));
    }
    Ok(())
}

/// Alias `host_name` to the load balancer.
///
/// The record is stored relative to `zone`; the apex is an empty record name.
pub fn resolve_alias_record(
    zone: &HostedZoneDescriptor,
    host_name: &str,
    load_balancer: &LoadBalancerDescriptor,
) -> Result<AliasRecordDescriptor> {
    let host = normalize(host_name);
    if !is_valid_domain_name(&host) {
        return Err(FrontdoorError::validation_field(
            format!("'{}' is not a valid host name", host_name),
            "dns.domain_name",
        ));
    }
    if host.starts_with("*.") {
        return Err(FrontdoorError::configuration(
            format!("'{}' cannot be served as an origin", host),
            "dns.domain_name",
            "the served host name must not be a wildcard",
        ));
    }
    ensure_in_zone(&host, zone)?;

    let record_name = host
        .strip_suffix(&zone.zone_name)
        .map(|relative| relative.trim_end_matches('.').to_string())
        .unwrap_or_default();

    debug!(host = %host, zone = %zone.zone_name, "Resolved alias record");

    Ok(AliasRecordDescriptor {
        logical_id: LogicalId::fixed("AliasRecord"),
        hosted_zone: zone.id(),
        record_name,
        target_dns_name: load_balancer.dns_name(),
        target_hosted_zone_id: load_balancer.canonical_hosted_zone_id(),
    })
}
