//! # Provisioning Hand-off
//!
//! The provisioning API is an external collaborator. [`Provisioner`] is the seam a real
//! client implements; [`DryRunProvisioner`] walks a plan offline, synthesising the
//! identifiers a real client would return so that cross-references can be inspected.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::errors::{FrontdoorError, Result};
use crate::plan::{DeploymentPlan, Descriptor};
use crate::resolver::{ArnRef, Attribute, LogicalId, ResourceRef};

/// What applying one descriptor did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedResource {
    pub logical_id: LogicalId,
    pub kind: String,
    pub action: ChangeAction,
    pub attributes: BTreeMap<Attribute, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub resources: Vec<ProvisionedResource>,
    pub origin: String,
    pub web_acl_arn: String,
}

impl ProvisionReport {
    pub fn resource(&self, logical_id: &str) -> Option<&ProvisionedResource> {
        self.resources.iter().find(|r| r.logical_id.as_str() == logical_id)
    }

    pub fn count(&self, action: ChangeAction) -> usize {
        self.resources.iter().filter(|r| r.action == action).count()
    }
}

/// Dependency-ordered apply of a whole plan
pub trait Provisioner {
    fn apply(&mut self, plan: &DeploymentPlan) -> Result<ProvisionReport>;
}

/// Offline provisioner that assigns synthetic identifiers.
///
/// State survives across `apply` calls, so re-applying an equal plan reports every
/// descriptor as unchanged.
#[derive(Debug)]
pub struct DryRunProvisioner {
    account_id: String,
    applied: HashMap<LogicalId, (Descriptor, BTreeMap<Attribute, String>)>,
}

impl DryRunProvisioner {
    pub fn new<S: Into<String>>(account_id: S) -> Self {
        Self { account_id: account_id.into(), applied: HashMap::new() }
    }

    fn lookup(&self, reference: &ResourceRef) -> Result<String> {
        self.applied
            .get(&reference.logical_id)
            .and_then(|(_, attributes)| attributes.get(&reference.attribute))
            .cloned()
            .ok_or_else(|| {
                FrontdoorError::invalid_state(
                    format!("{} has not been provisioned", reference),
                    "apply",
                    "unresolved-reference",
                )
            })
    }

    fn substitute(&self, arn: &ArnRef) -> Result<String> {
        match arn {
            ArnRef::Literal(value) => Ok(value.clone()),
            ArnRef::Ref(reference) => self.lookup(reference),
        }
    }

    fn attributes_for(&self, region: &str, descriptor: &Descriptor) -> BTreeMap<Attribute, String> {
        let id = descriptor.logical_id().as_str().to_lowercase();
        let account = &self.account_id;
        let mut attributes = BTreeMap::new();

        match descriptor {
            Descriptor::AssetBucket(_) => {
                let name = format!("frontdoor-{}-{}", id, account);
                attributes.insert(Attribute::Arn, format!("arn:aws:s3:::{}", name));
                attributes.insert(Attribute::Name, name);
            }
            Descriptor::IpSet(_) | Descriptor::WebAcl(_) => {
                let kind = if matches!(descriptor, Descriptor::IpSet(_)) { "ipset" } else { "webacl" };
                attributes.insert(
                    Attribute::Arn,
                    format!("arn:aws:wafv2:{}:{}:regional/{}/{}/{}", region, account, kind, id, id),
                );
                attributes.insert(Attribute::Id, id);
            }
            Descriptor::SecurityGroup(_) => {
                attributes.insert(Attribute::Id, format!("sg-{}", id));
            }
            Descriptor::LoadBalancer(lb) => {
                let name = lb.name.clone().unwrap_or_else(|| format!("frontdoor-{}", id));
                attributes.insert(
                    Attribute::Arn,
                    format!(
                        "arn:aws:elasticloadbalancing:{}:{}:loadbalancer/app/{}/{}",
                        region, account, name, id
                    ),
                );
                attributes.insert(
                    Attribute::DnsName,
                    format!("{}.{}.elb.amazonaws.com", name, region),
                );
                attributes.insert(Attribute::CanonicalHostedZoneId, "Z35SXDOTRQ7X7K".to_string());
                attributes.insert(Attribute::Name, name);
            }
            Descriptor::HostedZone(zone) => {
                attributes.insert(Attribute::Id, format!("Z{}", id.to_uppercase()));
                attributes.insert(Attribute::Name, zone.zone_name.clone());
            }
            Descriptor::Certificate(_) => {
                attributes.insert(
                    Attribute::Arn,
                    format!("arn:aws:acm:{}:{}:certificate/{}", region, account, id),
                );
            }
            Descriptor::TargetGroup(_) => {
                attributes.insert(
                    Attribute::Arn,
                    format!(
                        "arn:aws:elasticloadbalancing:{}:{}:targetgroup/{}/{}",
                        region, account, id, id
                    ),
                );
            }
            Descriptor::Listener(_) => {
                attributes.insert(
                    Attribute::Arn,
                    format!(
                        "arn:aws:elasticloadbalancing:{}:{}:listener/app/{}/{}",
                        region, account, id, id
                    ),
                );
            }
            Descriptor::TargetGroupBinding(_)
            | Descriptor::WafAssociation(_)
            | Descriptor::AccessLogging(_)
            | Descriptor::AliasRecord(_)
            | Descriptor::StaticSiteBuild(_) => {
                attributes.insert(Attribute::Id, id);
            }
        }

        attributes
    }
}

impl Provisioner for DryRunProvisioner {
    fn apply(&mut self, plan: &DeploymentPlan) -> Result<ProvisionReport> {
        plan.verify_order()?;

        let mut resources = Vec::with_capacity(plan.len());
        for descriptor in &plan.descriptors {
            for reference in descriptor.references() {
                self.lookup(reference)?;
            }
            if let Descriptor::WafAssociation(association) = descriptor {
                let resource_arn = self.substitute(&association.resource_arn)?;
                let web_acl_arn = self.substitute(&association.web_acl_arn)?;
                debug!(%resource_arn, %web_acl_arn, "Associating web ACL");
            }

            let logical_id = descriptor.logical_id().clone();
            let action = match self.applied.get(&logical_id) {
                None => ChangeAction::Created,
                Some((previous, _)) if previous == descriptor => ChangeAction::Unchanged,
                Some(_) => ChangeAction::Updated,
            };

            let attributes = match (action, self.applied.get(&logical_id)) {
                (ChangeAction::Unchanged, Some((_, attributes))) => attributes.clone(),
                _ => self.attributes_for(&plan.region, descriptor),
            };
            self.applied.insert(logical_id.clone(), (descriptor.clone(), attributes.clone()));

            debug!(logical_id = %logical_id, kind = descriptor.kind(), ?action, "Applied descriptor");
            resources.push(ProvisionedResource {
                logical_id,
                kind: descriptor.kind().to_string(),
                action,
                attributes,
            });
        }

        let origin = match plan.descriptors.iter().find_map(|d| match d {
            Descriptor::LoadBalancer(lb) => Some(lb.dns_name()),
            _ => None,
        }) {
            Some(dns) => plan.origin.replace(&format!("${{{}}}", dns), &self.lookup(&dns)?),
            None => plan.origin.clone(),
        };
        let web_acl_arn = self.lookup(&plan.web_acl_output)?;

        let report = ProvisionReport { resources, origin, web_acl_arn };
        info!(
            created = report.count(ChangeAction::Created),
            updated = report.count(ChangeAction::Updated),
            unchanged = report.count(ChangeAction::Unchanged),
            "Dry run applied"
        );
        Ok(report)
    }
}
