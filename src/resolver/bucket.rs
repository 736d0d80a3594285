//! Private asset bucket that receives the static-site build output

use serde::Serialize;

use crate::resolver::refs::{Attribute, LogicalId, ResourceRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BucketEncryption {
    S3Managed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    Destroy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetBucketDescriptor {
    pub logical_id: LogicalId,
    pub encryption: BucketEncryption,
    pub block_all_public_access: bool,
    pub enforce_ssl: bool,
    pub removal_policy: RemovalPolicy,
    pub auto_delete_objects: bool,
}

impl AssetBucketDescriptor {
    pub fn name(&self) -> ResourceRef {
        ResourceRef::new(self.logical_id.clone(), Attribute::Name)
    }
}

/// Encrypted, non-public, SSL-only bucket that is emptied and removed with the stack
pub fn resolve_asset_bucket() -> AssetBucketDescriptor {
    AssetBucketDescriptor {
        logical_id: LogicalId::fixed("AssetBucket"),
        encryption: BucketEncryption::S3Managed,
        block_all_public_access: true,
        enforce_ssl: true,
        removal_policy: RemovalPolicy::Destroy,
        auto_delete_objects: true,
    }
}
