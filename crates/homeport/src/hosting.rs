//! Hosting stack: the public delivery path for the portal's static content

use std::path::PathBuf;

use homeport_aws::AwsProvider;
use homeport_aws::cloudfront::{
    CloudfrontDistribution, CloudfrontFunction, FunctionAssociation, GeoRestriction, Restrictions,
    ViewerCertificate,
};
use homeport_aws::iam::{PolicyDocument, Principal, Statement, condition};
use homeport_aws::provider::PROVIDER;
use homeport_aws::s3::S3BucketPolicy;
use homeport_synth::{Expr, OutputRef, Result, Stack};

use crate::config::AppConfig;
use crate::secure_bucket::{SecureBucketProps, secure_bucket};
use crate::web::{frontend_cache_behaviour, frontend_origin};

/// CloudFront functions can only live in us-east-1
const EDGE_REGION: &str = "us-east-1";

/// Values other stacks may consume from the hosting stack
#[derive(Debug, Clone)]
pub struct HostingOutputs {
    pub bucket_name: OutputRef,
    pub distribution_id: OutputRef,
}

fn rewrite_function_source() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("functions")
        .join("path.js")
}

pub fn hosting_stack(config: &AppConfig, env: &str) -> Result<(Stack, HostingOutputs)> {
    let mut stack = Stack::new(format!("hosting-{env}"));

    stack.add_provider(
        PROVIDER,
        AwsProvider::new(&config.default_region).allow_account(&config.account_id),
    )?;
    stack.add_provider(
        PROVIDER,
        AwsProvider::aliased(EDGE_REGION, EDGE_REGION).allow_account(&config.account_id),
    )?;

    let bucket = secure_bucket(
        &mut stack,
        "origin",
        SecureBucketProps::new(format!(
            "{}-{}-{}-origin",
            config.prefix, config.app, env
        )),
    )?;

    let rewrite_asset = stack.add_asset(rewrite_function_source())?;
    let rewrite_function = stack.resource_on(
        EDGE_REGION,
        CloudfrontFunction::TYPE,
        "path-rewrite",
        CloudfrontFunction {
            name: format!("{}-{}-path-rewrite", config.app, env),
            runtime: "cloudfront-js-1.0".to_string(),
            code: rewrite_asset.file_expr(),
            publish: true,
        },
    )?;

    let origin = frontend_origin(&mut stack, config, env, bucket.domain_name.clone())?;
    let mut behaviour = frontend_cache_behaviour(&mut stack, config, env)?;
    behaviour.function_association = Some(vec![FunctionAssociation {
        event_type: "viewer-request".to_string(),
        function_arn: rewrite_function.arn(),
    }]);

    let distribution = stack.resource(
        CloudfrontDistribution::TYPE,
        "home",
        CloudfrontDistribution {
            enabled: true,
            is_ipv6_enabled: true,
            http_version: "http2and3".to_string(),
            comment: "Home Portal".to_string(),
            default_root_object: "index.html".to_string(),
            viewer_certificate: ViewerCertificate {
                cloudfront_default_certificate: true,
            },
            restrictions: Restrictions {
                geo_restriction: GeoRestriction {
                    restriction_type: "none".to_string(),
                },
            },
            origin: vec![origin],
            default_cache_behavior: behaviour,
        },
    )?;

    // Only requests signed for this stack's own distribution may read the
    // origin; any other distribution arn fails the condition
    let mut read_only = Statement::allow();
    read_only.sid = Some("AllowCloudFrontServicePrincipalReadOnly".to_string());
    read_only.principal = Some(Principal {
        service: Some("cloudfront.amazonaws.com".to_string()),
        federated: None,
    });
    read_only.action = vec!["s3:GetObject".to_string()];
    read_only.resource = Some(vec![format!("arn:aws:s3:::{}/*", bucket.name)]);
    read_only.condition = Some(condition(
        "StringEquals",
        "AWS:SourceArn",
        vec![distribution.arn().to_string()],
    ));

    stack.resource(
        S3BucketPolicy::TYPE,
        "cf-access",
        S3BucketPolicy {
            bucket: Expr::literal(bucket.name.clone()),
            policy: PolicyDocument::new(vec![read_only]).json()?,
        },
    )?;

    let outputs = HostingOutputs {
        bucket_name: stack.export("bucket_name", Expr::literal(bucket.name.clone())),
        distribution_id: stack.export("distribution_id", distribution.id()),
    };
    Ok((stack, outputs))
}
