//! Remote state backend binding
//!
//! Each stack persists its last-known resource attributes in a shared S3
//! bucket, keyed by `{application}/{environment}`, with a DynamoDB table
//! serializing concurrent applies. This crate only declares the binding;
//! locking itself is the external engine's job.

use serde::Serialize;

/// S3 remote state binding for one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct S3Backend {
    pub bucket: String,
    pub key: String,
    pub region: String,
    /// Lock table for serializing applies against the same state record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamodb_table: Option<String>,
    pub encrypt: bool,
}

impl S3Backend {
    /// Configuration for a `terraform_remote_state` data source reading
    /// this backend from a consuming stack.
    pub(crate) fn remote_state_config(&self) -> serde_json::Value {
        serde_json::json!({
            "backend": "s3",
            "config": {
                "bucket": self.bucket,
                "key": self.key,
                "region": self.region,
            },
        })
    }
}
