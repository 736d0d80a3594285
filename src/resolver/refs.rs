//! Logical identifiers and cross-resource references
//!
//! Descriptors never hold provisioned identifiers directly. They point at each other
//! through a [`ResourceRef`] (logical id plus attribute), which the provisioning client
//! substitutes once the referenced resource exists.

use serde::Serialize;
use std::fmt;

use crate::errors::{FrontdoorError, Result};
use crate::utils::LOGICAL_ID_REGEX;

/// Stable, deterministic identity of a descriptor inside one plan
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Create a logical id, rejecting anything other than `[A-Za-z][A-Za-z0-9]*`
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if !LOGICAL_ID_REGEX.is_match(&id) {
            return Err(FrontdoorError::validation_field(
                format!("'{}' is not a valid logical id", id),
                "logical_id",
            ));
        }
        Ok(Self(id))
    }

    /// Logical ids baked into the resolver; callers never pass user input here.
    pub(crate) fn fixed(id: &'static str) -> Self {
        debug_assert!(LOGICAL_ID_REGEX.is_match(id));
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute of a provisioned resource that another descriptor consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Arn,
    Id,
    Name,
    DnsName,
    CanonicalHostedZoneId,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Arn => "Arn",
            Attribute::Id => "Id",
            Attribute::Name => "Name",
            Attribute::DnsName => "DnsName",
            Attribute::CanonicalHostedZoneId => "CanonicalHostedZoneId",
        };
        f.write_str(name)
    }
}

/// Forward-declared reference to an attribute of another descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceRef {
    pub logical_id: LogicalId,
    pub attribute: Attribute,
}

impl ResourceRef {
    pub fn new(logical_id: LogicalId, attribute: Attribute) -> Self {
        Self { logical_id, attribute }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.logical_id, self.attribute)
    }
}

/// An ARN that is either known up front or produced earlier in the same pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ArnRef {
    Literal(String),
    Ref(ResourceRef),
}

impl ArnRef {
    /// The in-plan reference, if this ARN is not a literal
    pub fn resource_ref(&self) -> Option<&ResourceRef> {
        match self {
            ArnRef::Literal(_) => None,
            ArnRef::Ref(reference) => Some(reference),
        }
    }

    /// A literal that is empty or whitespace resolves to nothing
    pub fn is_resolvable(&self) -> bool {
        match self {
            ArnRef::Literal(arn) => !arn.trim().is_empty(),
            ArnRef::Ref(_) => true,
        }
    }
}

impl fmt::Display for ArnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArnRef::Literal(arn) => f.write_str(arn),
            ArnRef::Ref(reference) => write!(f, "${{{}}}", reference),
        }
    }
}

impl From<&str> for ArnRef {
    fn from(arn: &str) -> Self {
        ArnRef::Literal(arn.to_string())
    }
}

impl From<String> for ArnRef {
    fn from(arn: String) -> Self {
        ArnRef::Literal(arn)
    }
}

impl From<ResourceRef> for ArnRef {
    fn from(reference: ResourceRef) -> Self {
        ArnRef::Ref(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_id_validation() {
        assert!(LogicalId::new("AlbWafAssociation").is_ok());
        assert!(LogicalId::new("alb-waf").is_err());
        assert!(LogicalId::new("").is_err());
    }

    #[test]
    fn test_arn_ref_display() {
        let literal = ArnRef::from("arn:aws:wafv2:us-east-1:123:regional/webacl/X");
        assert_eq!(literal.to_string(), "arn:aws:wafv2:us-east-1:123:regional/webacl/X");

        let reference =
            ArnRef::from(ResourceRef::new(LogicalId::fixed("FrontendWebAcl"), Attribute::Arn));
        assert_eq!(reference.to_string(), "${FrontendWebAcl.Arn}");
        assert!(reference.resource_ref().is_some());
    }

    #[test]
    fn test_blank_literal_is_unresolvable() {
        assert!(!ArnRef::from("  ").is_resolvable());
        assert!(ArnRef::from("arn:aws:acm:eu-west-1:1:certificate/abc").is_resolvable());
    }
}
