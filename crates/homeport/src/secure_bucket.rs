//! Hardened S3 bucket building block
//!
//! Declares a bucket together with its hardening sub-resources behind one
//! logical id and returns an immutable descriptor of the derived
//! identifiers for downstream wiring.

use homeport_aws::s3::{
    CorsRule, LifecycleRule, NoncurrentVersionExpiration, ObjectOwnership, OwnershipRule, S3Bucket,
    S3BucketCorsConfiguration, S3BucketLifecycleConfiguration, S3BucketOwnershipControls,
    S3BucketPublicAccessBlock, S3BucketServerSideEncryptionConfiguration, S3BucketVersioning,
};
use homeport_synth::{Expr, Result, Stack};

/// Noncurrent object versions are kept this many days
const NONCURRENT_RETENTION_DAYS: u32 = 10;

#[derive(Debug, Clone)]
pub struct SecureBucketProps {
    pub bucket_name: String,
    pub cors_rule: Option<CorsRule>,
    pub object_ownership: Option<ObjectOwnership>,
}

impl SecureBucketProps {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            cors_rule: None,
            object_ownership: None,
        }
    }
}

/// Derived identifiers of a declared secure bucket
#[derive(Debug, Clone)]
pub struct SecureBucket {
    pub id: Expr,
    pub arn: Expr,
    pub name: String,
    /// Regional domain name, the address a CDN origin points at
    pub domain_name: Expr,
}

pub fn secure_bucket(stack: &mut Stack, id: &str, props: SecureBucketProps) -> Result<SecureBucket> {
    let bucket = stack.resource(
        S3Bucket::TYPE,
        id,
        S3Bucket {
            bucket: props.bucket_name.clone(),
        },
    )?;

    stack.resource(
        S3BucketPublicAccessBlock::TYPE,
        &format!("{id}-public-access-lock"),
        S3BucketPublicAccessBlock::locked(bucket.id()),
    )?;

    if let Some(cors_rule) = props.cors_rule {
        stack.resource(
            S3BucketCorsConfiguration::TYPE,
            &format!("{id}-cors-config"),
            S3BucketCorsConfiguration {
                bucket: bucket.attr("bucket"),
                cors_rule: vec![cors_rule],
            },
        )?;
    }

    stack.resource(
        S3BucketOwnershipControls::TYPE,
        &format!("{id}-disable-acl"),
        S3BucketOwnershipControls {
            bucket: bucket.id(),
            rule: OwnershipRule {
                object_ownership: props
                    .object_ownership
                    .unwrap_or(ObjectOwnership::BucketOwnerEnforced),
            },
        },
    )?;

    stack.resource(
        S3BucketServerSideEncryptionConfiguration::TYPE,
        &format!("{id}-encryption"),
        S3BucketServerSideEncryptionConfiguration::aes256(bucket.id()),
    )?;

    stack.resource(
        S3BucketVersioning::TYPE,
        &format!("{id}-versioning"),
        S3BucketVersioning::enabled(bucket.id()),
    )?;

    stack.resource(
        S3BucketLifecycleConfiguration::TYPE,
        &format!("{id}-remove-old-versions"),
        S3BucketLifecycleConfiguration {
            bucket: bucket.id(),
            rule: vec![LifecycleRule {
                id: "remove-old".to_string(),
                status: "Enabled".to_string(),
                noncurrent_version_expiration: Some(NoncurrentVersionExpiration {
                    noncurrent_days: NONCURRENT_RETENTION_DAYS,
                }),
            }],
        },
    )?;

    Ok(SecureBucket {
        id: bucket.id(),
        arn: bucket.arn(),
        name: props.bucket_name,
        domain_name: bucket.attr("bucket_regional_domain_name"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeport_aws::AwsProvider;

    fn stack() -> Stack {
        let mut stack = Stack::new("test");
        stack
            .add_provider("aws", AwsProvider::new("eu-west-1"))
            .unwrap();
        stack
    }

    #[test]
    fn declares_six_hardening_resources() {
        let mut stack = stack();
        let bucket = secure_bucket(&mut stack, "origin", SecureBucketProps::new("my-origin")).unwrap();
        assert_eq!(stack.resource_count(), 6);
        assert_eq!(bucket.name, "my-origin");
        assert_eq!(bucket.domain_name.as_str(), "${aws_s3_bucket.origin.bucket_regional_domain_name}");
    }

    #[test]
    fn cors_rule_adds_a_seventh_declaration() {
        let mut stack = stack();
        let mut props = SecureBucketProps::new("my-origin");
        props.cors_rule = Some(CorsRule {
            allowed_headers: None,
            allowed_methods: vec!["GET".into()],
            allowed_origins: vec!["*".into()],
            expose_headers: None,
            max_age_seconds: None,
        });
        secure_bucket(&mut stack, "origin", props).unwrap();
        assert_eq!(stack.resource_count(), 7);
    }

    #[test]
    fn two_buckets_in_one_stack_do_not_collide() {
        let mut stack = stack();
        secure_bucket(&mut stack, "origin", SecureBucketProps::new("a")).unwrap();
        secure_bucket(&mut stack, "logs", SecureBucketProps::new("b")).unwrap();
        assert_eq!(stack.resource_count(), 12);
    }
}
