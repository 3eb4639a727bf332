//! S3 bucket family

use homeport_synth::Expr;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct S3Bucket {
    pub bucket: String,
}

impl S3Bucket {
    pub const TYPE: &'static str = "aws_s3_bucket";
}

#[derive(Debug, Clone, Serialize)]
pub struct S3BucketPublicAccessBlock {
    pub bucket: Expr,
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl S3BucketPublicAccessBlock {
    pub const TYPE: &'static str = "aws_s3_bucket_public_access_block";

    /// All four blocking flags raised
    pub fn locked(bucket: Expr) -> Self {
        Self {
            bucket,
            block_public_acls: true,
            block_public_policy: true,
            ignore_public_acls: true,
            restrict_public_buckets: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectOwnership {
    BucketOwnerEnforced,
    BucketOwnerPreferred,
}

#[derive(Debug, Clone, Serialize)]
pub struct S3BucketOwnershipControls {
    pub bucket: Expr,
    pub rule: OwnershipRule,
}

impl S3BucketOwnershipControls {
    pub const TYPE: &'static str = "aws_s3_bucket_ownership_controls";
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnershipRule {
    pub object_ownership: ObjectOwnership,
}

#[derive(Debug, Clone, Serialize)]
pub struct S3BucketServerSideEncryptionConfiguration {
    pub bucket: Expr,
    pub rule: Vec<SseRule>,
}

impl S3BucketServerSideEncryptionConfiguration {
    pub const TYPE: &'static str = "aws_s3_bucket_server_side_encryption_configuration";

    pub fn aes256(bucket: Expr) -> Self {
        Self {
            bucket,
            rule: vec![SseRule {
                apply_server_side_encryption_by_default: SseDefault {
                    sse_algorithm: "AES256".to_string(),
                },
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SseRule {
    pub apply_server_side_encryption_by_default: SseDefault,
}

#[derive(Debug, Clone, Serialize)]
pub struct SseDefault {
    pub sse_algorithm: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct S3BucketVersioning {
    pub bucket: Expr,
    pub versioning_configuration: VersioningConfiguration,
}

impl S3BucketVersioning {
    pub const TYPE: &'static str = "aws_s3_bucket_versioning";

    pub fn enabled(bucket: Expr) -> Self {
        Self {
            bucket,
            versioning_configuration: VersioningConfiguration {
                status: "Enabled".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersioningConfiguration {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct S3BucketLifecycleConfiguration {
    pub bucket: Expr,
    pub rule: Vec<LifecycleRule>,
}

impl S3BucketLifecycleConfiguration {
    pub const TYPE: &'static str = "aws_s3_bucket_lifecycle_configuration";
}

#[derive(Debug, Clone, Serialize)]
pub struct LifecycleRule {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noncurrent_version_expiration: Option<NoncurrentVersionExpiration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoncurrentVersionExpiration {
    pub noncurrent_days: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct S3BucketCorsConfiguration {
    pub bucket: Expr,
    pub cors_rule: Vec<CorsRule>,
}

impl S3BucketCorsConfiguration {
    pub const TYPE: &'static str = "aws_s3_bucket_cors_configuration";
}

#[derive(Debug, Clone, Serialize)]
pub struct CorsRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    pub allowed_methods: Vec<String>,
    pub allowed_origins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct S3BucketPolicy {
    pub bucket: Expr,
    pub policy: String,
}

impl S3BucketPolicy {
    pub const TYPE: &'static str = "aws_s3_bucket_policy";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_access_block_raises_all_flags() {
        let value =
            serde_json::to_value(S3BucketPublicAccessBlock::locked(Expr::literal("b"))).unwrap();
        for flag in [
            "block_public_acls",
            "block_public_policy",
            "ignore_public_acls",
            "restrict_public_buckets",
        ] {
            assert_eq!(value[flag], true, "{flag} must be raised");
        }
    }

    #[test]
    fn ownership_serializes_exact_mode_names() {
        let controls = S3BucketOwnershipControls {
            bucket: Expr::literal("b"),
            rule: OwnershipRule {
                object_ownership: ObjectOwnership::BucketOwnerEnforced,
            },
        };
        let value = serde_json::to_value(controls).unwrap();
        assert_eq!(value["rule"]["object_ownership"], "BucketOwnerEnforced");
    }

    #[test]
    fn sse_defaults_to_aes256() {
        let value = serde_json::to_value(S3BucketServerSideEncryptionConfiguration::aes256(
            Expr::literal("b"),
        ))
        .unwrap();
        assert_eq!(
            value["rule"][0]["apply_server_side_encryption_by_default"]["sse_algorithm"],
            "AES256"
        );
    }
}
