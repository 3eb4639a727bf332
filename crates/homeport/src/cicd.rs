//! Deploy-automation stack: short-lived GitHub Actions credentials
//!
//! Grants the CI workflows of one repository a narrowly scoped role via
//! OIDC federation; no static secrets are provisioned anywhere.

use homeport_aws::AwsProvider;
use homeport_aws::iam::{
    IamOpenidConnectProvider, IamPolicy, IamRole, PolicyDocument, Principal, Statement, condition,
};
use homeport_aws::provider::PROVIDER;
use homeport_synth::{Expr, Result, Stack};

use crate::config::AppConfig;

const GITHUB_ISSUER: &str = "https://token.actions.githubusercontent.com";
const GITHUB_CLAIMS: &str = "token.actions.githubusercontent.com";
const STS_AUDIENCE: &str = "sts.amazonaws.com";

/// GitHub's published OIDC intermediary thumbprints
const GITHUB_THUMBPRINTS: [&str; 2] = [
    "6938fd4d98bab03faadb97b34396831e3780aea1",
    "1c58a3a8518e8759bf075b76b750d4f2df264fcd",
];

/// Inputs produced by the hosting stack; this stack treats them as opaque
#[derive(Debug, Clone)]
pub struct CicdProps {
    pub bucket_name: Expr,
    pub distribution_id: Expr,
}

pub fn cicd_stack(config: &AppConfig, props: CicdProps) -> Result<Stack> {
    let mut stack = Stack::new("cicd");
    stack.add_provider(PROVIDER, AwsProvider::new(&config.default_region))?;

    let oidc = stack.resource(
        IamOpenidConnectProvider::TYPE,
        "oidc-gh-provider",
        IamOpenidConnectProvider {
            url: GITHUB_ISSUER.to_string(),
            client_id_list: vec![STS_AUDIENCE.to_string()],
            thumbprint_list: GITHUB_THUMBPRINTS.iter().map(|s| s.to_string()).collect(),
        },
    )?;

    let deploy_name = format!("{}-cicd-deploy", config.app);
    let tags = [("Name".to_string(), deploy_name.clone())]
        .into_iter()
        .collect();

    let policy = stack.resource(
        IamPolicy::TYPE,
        "policy-cicd-deploy",
        IamPolicy {
            name: deploy_name.clone(),
            description: "Permissions for authorized GitHub Actions running deployments"
                .to_string(),
            policy: deploy_policy(config, &props).json()?,
            tags,
        },
    )?;

    let tags = [("Name".to_string(), deploy_name.clone())]
        .into_iter()
        .collect();
    stack.resource(
        IamRole::TYPE,
        "role-cicd-deploy",
        IamRole {
            name: deploy_name,
            description: "Allows authorized GitHub Actions to deploy".to_string(),
            assume_role_policy: assume_role_policy(config, oidc.arn()).json()?,
            managed_policy_arns: vec![
                Expr::literal("arn:aws:iam::aws:policy/ReadOnlyAccess"),
                policy.arn(),
            ],
            tags,
        },
    )?;

    Ok(stack)
}

/// Federated trust document: tokens must come from GitHub's issuer, be
/// addressed to STS, and name this repository's branch refs or pull
/// requests.
fn assume_role_policy(config: &AppConfig, provider_arn: Expr) -> PolicyDocument {
    let mut trust = Statement::allow();
    trust.action = vec!["sts:AssumeRoleWithWebIdentity".to_string()];
    trust.principal = Some(Principal {
        service: None,
        federated: Some(provider_arn),
    });

    let mut conditions = condition(
        "ForAllValues:StringEquals",
        &format!("{GITHUB_CLAIMS}:iss"),
        vec![GITHUB_ISSUER.to_string()],
    );
    conditions
        .entry("ForAllValues:StringEquals".to_string())
        .or_default()
        .insert(
            format!("{GITHUB_CLAIMS}:aud"),
            vec![STS_AUDIENCE.to_string()],
        );
    conditions.extend(condition(
        "ForAllValues:StringLike",
        &format!("{GITHUB_CLAIMS}:sub"),
        vec![
            format!("repo:{}:ref:refs/heads/*", config.github_repository),
            format!("repo:{}:pull_request", config.github_repository),
        ],
    ));
    trust.condition = Some(conditions);

    PolicyDocument::new(vec![trust])
}

/// Least-privilege deploy permissions: list and read versioning on the
/// origin bucket, write and delete its objects, invalidate the one
/// distribution. Nothing else.
fn deploy_policy(config: &AppConfig, props: &CicdProps) -> PolicyDocument {
    let mut read_bucket = Statement::allow();
    read_bucket.action = vec![
        "s3:GetBucketVersioning".to_string(),
        "s3:ListBucket".to_string(),
    ];
    read_bucket.resource = Some(vec![format!("arn:aws:s3:::{}", props.bucket_name)]);

    let mut write_objects = Statement::allow();
    write_objects.action = vec!["s3:PutObject".to_string(), "s3:DeleteObject".to_string()];
    write_objects.resource = Some(vec![format!("arn:aws:s3:::{}/*", props.bucket_name)]);

    let mut invalidate = Statement::allow();
    invalidate.action = vec!["cloudfront:CreateInvalidation".to_string()];
    invalidate.resource = Some(vec![format!(
        "arn:aws:cloudfront::{}:distribution/{}",
        config.account_id, props.distribution_id
    )]);

    PolicyDocument::new(vec![read_bucket, write_objects, invalidate])
}
