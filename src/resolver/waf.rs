//! Web ACL to load balancer association

use serde::Serialize;
use tracing::debug;

use crate::resolver::refs::{ArnRef, LogicalId};

/// Binds a web ACL to the load balancer it protects.
///
/// Re-submitting an equal descriptor is a no-op update for the provisioning client;
/// equality is the whole idempotency contract, the resolver keeps no memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssociationDescriptor {
    pub logical_id: LogicalId,
    pub resource_arn: ArnRef,
    pub web_acl_arn: ArnRef,
}

pub fn resolve_waf_association(lb_arn: ArnRef, web_acl_arn: ArnRef) -> AssociationDescriptor {
    debug!(resource_arn = %lb_arn, web_acl_arn = %web_acl_arn, "Resolved web ACL association");

    AssociationDescriptor {
        logical_id: LogicalId::fixed("AlbWafAssociation"),
        resource_arn: lb_arn,
        web_acl_arn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::refs::{Attribute, ResourceRef};

    #[test]
    fn test_association_is_equal_on_resubmission() {
        let lb = ArnRef::from(ResourceRef::new(LogicalId::fixed("Alb"), Attribute::Arn));
        let acl = ArnRef::from("arn:aws:wafv2:us-east-1:111122223333:regional/webacl/X/1");

        let first = resolve_waf_association(lb.clone(), acl.clone());
        let second = resolve_waf_association(lb, acl);
        assert_eq!(first, second);
        assert_eq!(first.logical_id.as_str(), "AlbWafAssociation");
    }
}
