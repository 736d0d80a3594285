//! Opt-in load balancer access logging
//!
//! Logging is expressed as load balancer attributes keyed to the balancer's identity,
//! so the descriptor can only be produced from an already-resolved load balancer.

use serde::Serialize;
use tracing::debug;

use crate::resolver::load_balancer::LoadBalancerDescriptor;
use crate::resolver::refs::{LogicalId, ResourceRef};

/// Destination bucket for access logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogBucketRef {
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl LogBucketRef {
    pub fn new<S: Into<String>>(bucket: S) -> Self {
        Self { bucket: bucket.into(), prefix: None }
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// A single load balancer attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadBalancerAttribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingDescriptor {
    pub logical_id: LogicalId,
    pub load_balancer: ResourceRef,
    pub destination: LogBucketRef,
    pub attributes: Vec<LoadBalancerAttribute>,
}

/// Enable access logging on `load_balancer`, or `None` when no bucket is declared
pub fn resolve_access_logging(
    load_balancer: &LoadBalancerDescriptor,
    log_bucket: Option<&LogBucketRef>,
) -> Option<LoggingDescriptor> {
    let destination = log_bucket?;

    let mut attributes = vec![
        LoadBalancerAttribute { key: "access_logs.s3.enabled".into(), value: "true".into() },
        LoadBalancerAttribute {
            key: "access_logs.s3.bucket".into(),
            value: destination.bucket.clone(),
        },
    ];
    if let Some(prefix) = &destination.prefix {
        attributes.push(LoadBalancerAttribute {
            key: "access_logs.s3.prefix".into(),
            value: prefix.clone(),
        });
    }

    debug!(bucket = %destination.bucket, "Resolved access logging");

    Some(LoggingDescriptor {
        logical_id: LogicalId::fixed("AlbAccessLogging"),
        load_balancer: load_balancer.arn(),
        destination: destination.clone(),
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::load_balancer::{resolve_load_balancer, resolve_security_group, VpcRef};

    fn load_balancer() -> LoadBalancerDescriptor {
        resolve_load_balancer(&resolve_security_group(&VpcRef::new("vpc-1").unwrap()), None)
            .unwrap()
    }

    #[test]
    fn test_no_bucket_no_descriptor() {
        assert!(resolve_access_logging(&load_balancer(), None).is_none());
    }

    #[test]
    fn test_logging_tied_to_load_balancer() {
        let lb = load_balancer();
        let bucket = LogBucketRef::new("frontend-access-logs").with_prefix("alb");
        let logging = resolve_access_logging(&lb, Some(&bucket)).unwrap();

        assert_eq!(logging.load_balancer, lb.arn());
        assert_eq!(logging.attributes.len(), 3);
        assert_eq!(logging.attributes[1].value, "frontend-access-logs");
        assert_eq!(logging.attributes[2].key, "access_logs.s3.prefix");
    }
}
