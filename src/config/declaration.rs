//! # Frontend Declaration
//!
//! The declared desired state of one frontend stack, as read from a YAML, TOML or
//! JSON file. Structural checks run through `validator`; anything that depends on a
//! combination of inputs is left to the resolver so it fails with the resolver's
//! error kinds.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{FrontdoorError, Result};
use crate::resolver::access_log::LogBucketRef;
use crate::resolver::allow_list::NetworkAllowList;
use crate::resolver::listener::{ApplicationProtocol, FixedResponse};
use crate::resolver::load_balancer::VpcRef;
use crate::resolver::site_build::SiteBuildSpec;
use crate::resolver::target_group::DEFAULT_TARGET_PORT;

/// Complete declared input of one resolution pass
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct FrontendDeclaration {
    /// Deployment region, also handed to the frontend build
    #[validate(length(min = 1, message = "Region cannot be empty"))]
    pub region: String,

    #[validate(length(min = 1, message = "VPC id cannot be empty"))]
    pub vpc_id: String,

    #[serde(default)]
    #[validate(nested)]
    pub allow_list: AllowListDeclaration,

    #[validate(nested)]
    pub exposure: ExposureDeclaration,

    #[serde(default)]
    #[validate(nested)]
    pub routing: RoutingDeclaration,

    /// Fixed load balancer name
    #[serde(default)]
    pub load_balancer_name: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub access_log: Option<AccessLogDeclaration>,

    /// Web ACL created elsewhere; when absent the plan's own ACL is associated
    #[serde(default)]
    #[validate(custom(function = "validate_arn"))]
    pub web_acl_arn: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub dns: Option<DnsDeclaration>,

    #[serde(default)]
    #[validate(nested)]
    pub build: Option<SiteBuildSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct AllowListDeclaration {
    #[serde(default)]
    pub ipv4: Vec<String>,
    #[serde(default)]
    pub ipv6: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolDeclaration {
    Http,
    Https,
}

impl From<ProtocolDeclaration> for ApplicationProtocol {
    fn from(protocol: ProtocolDeclaration) -> Self {
        match protocol {
            ProtocolDeclaration::Http => ApplicationProtocol::Http,
            ProtocolDeclaration::Https => ApplicationProtocol::Https,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct ExposureDeclaration {
    pub protocol: ProtocolDeclaration,

    /// Existing certificate; when absent an HTTPS exposure needs `dns.domain_name`
    #[serde(default)]
    #[validate(custom(function = "validate_arn"))]
    pub certificate_arn: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoutingModeDeclaration {
    #[default]
    FixedResponse,
    IpTargetGroup,
    Compute,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct RoutingDeclaration {
    #[serde(default)]
    pub mode: RoutingModeDeclaration,

    #[serde(default = "default_target_protocol")]
    pub target_protocol: ProtocolDeclaration,

    #[serde(default = "default_target_port")]
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub target_port: u16,

    #[serde(default)]
    pub compute_target_arn: Option<String>,

    #[serde(default = "default_status_code")]
    #[validate(range(min = 200, max = 599, message = "Status code must be between 200 and 599"))]
    pub status_code: u16,

    #[serde(default)]
    pub message_body: Option<String>,
}

impl Default for RoutingDeclaration {
    fn default() -> Self {
        Self {
            mode: RoutingModeDeclaration::FixedResponse,
            target_protocol: default_target_protocol(),
            target_port: default_target_port(),
            compute_target_arn: None,
            status_code: default_status_code(),
            message_body: None,
        }
    }
}

impl RoutingDeclaration {
    pub fn fixed_response(&self) -> FixedResponse {
        FixedResponse {
            status_code: self.status_code,
            content_type: self.message_body.as_ref().map(|_| "text/plain".to_string()),
            message_body: self.message_body.clone(),
        }
    }
}

fn default_target_protocol() -> ProtocolDeclaration {
    ProtocolDeclaration::Http
}

fn default_target_port() -> u16 {
    DEFAULT_TARGET_PORT
}

fn default_status_code() -> u16 {
    200
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct AccessLogDeclaration {
    #[validate(length(min = 3, max = 63, message = "Bucket name must be 3-63 characters"))]
    pub bucket: String,

    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct DnsDeclaration {
    #[validate(length(min = 1, message = "Zone name cannot be empty"))]
    pub zone_name: String,

    /// Host the frontend is served on; when set it replaces `<record_name>.<zone_name>`
    /// for the certificate, the alias record and the origin
    #[serde(default)]
    pub domain_name: Option<String>,

    #[serde(default = "default_record_name")]
    pub record_name: String,
}

impl DnsDeclaration {
    /// Served host name, lowercased, without a trailing dot
    pub fn host_name(&self) -> String {
        let domain = match &self.domain_name {
            Some(domain) => domain.trim().to_string(),
            None if self.record_name.is_empty() => self.zone_name.trim().to_string(),
            None => format!("{}.{}", self.record_name.trim(), self.zone_name.trim()),
        };
        domain.trim_end_matches('.').to_ascii_lowercase()
    }
}

fn default_record_name() -> String {
    "www".to_string()
}

fn validate_arn(arn: &String) -> std::result::Result<(), validator::ValidationError> {
    if arn.starts_with("arn:") && arn.split(':').count() >= 6 {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("arn");
        error.message = Some(format!("'{}' is not an ARN", arn).into());
        Err(error)
    }
}

impl FrontendDeclaration {
    /// Run `validator` rules and parse the allow-list
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(FrontdoorError::from)?;
        self.allow_list()?;
        Ok(())
    }

    pub fn allow_list(&self) -> Result<NetworkAllowList> {
        NetworkAllowList::new(&self.allow_list.ipv4, &self.allow_list.ipv6)
    }

    pub fn vpc(&self) -> Result<VpcRef> {
        VpcRef::new(self.vpc_id.clone())
    }

    pub fn log_bucket(&self) -> Option<LogBucketRef> {
        self.access_log.as_ref().map(|log| LogBucketRef {
            bucket: log.bucket.clone(),
            prefix: log.prefix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration() -> FrontendDeclaration {
        FrontendDeclaration {
            region: "us-east-1".into(),
            vpc_id: "vpc-0abc".into(),
            allow_list: AllowListDeclaration {
                ipv4: vec!["10.0.0.0/16".into()],
                ipv6: vec![],
            },
            exposure: ExposureDeclaration {
                protocol: ProtocolDeclaration::Http,
                certificate_arn: None,
            },
            routing: RoutingDeclaration::default(),
            load_balancer_name: None,
            access_log: None,
            web_acl_arn: None,
            dns: None,
            build: None,
        }
    }

    #[test]
    fn test_valid_declaration() {
        assert!(declaration().validate().is_ok());
    }

    #[test]
    fn test_bad_cidr_fails_validation() {
        let mut declaration = declaration();
        declaration.allow_list.ipv4.push("300.0.0.0/8".into());
        let err = declaration.validate().unwrap_err();
        assert!(matches!(err, FrontdoorError::Validation { .. }));
    }

    #[test]
    fn test_web_acl_arn_must_be_an_arn() {
        let mut declaration = declaration();
        declaration.web_acl_arn = Some("FrontendWebAcl".into());
        match declaration.validate().unwrap_err() {
            FrontdoorError::Validation { field, message } => {
                assert_eq!(field.as_deref(), Some("web_acl_arn"));
                assert!(message.contains("is not an ARN"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nested_routing_validation() {
        let mut declaration = declaration();
        declaration.routing.status_code = 99;
        match declaration.validate().unwrap_err() {
            FrontdoorError::Validation { field, .. } => {
                assert_eq!(field.as_deref(), Some("routing.status_code"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_host_name_defaults_to_record() {
        let dns = DnsDeclaration {
            zone_name: "example.com".into(),
            domain_name: None,
            record_name: "www".into(),
        };
        assert_eq!(dns.host_name(), "www.example.com");
    }

    #[test]
    fn test_fixed_response_body_sets_content_type() {
        let routing = RoutingDeclaration {
            message_body: Some("ok".into()),
            ..RoutingDeclaration::default()
        };
        let response = routing.fixed_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.content_type.as_deref(), Some("text/plain"));
    }
}
