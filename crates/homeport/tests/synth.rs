//! Plan-shape tests over the synthesized stacks

use homeport::cicd::{CicdProps, cicd_stack};
use homeport::config::AppConfig;
use homeport::{init_backend, synth_all};
use homeport_synth::{App, Expr};
use serde_json::Value;

fn synth() -> homeport_synth::SynthOutput {
    let dir = tempfile::tempdir().unwrap();
    synth_all(&AppConfig::default(), dir.path()).unwrap()
}

fn plan(output: &homeport_synth::SynthOutput, stack: &str) -> Value {
    output.stack(stack).unwrap().plan().unwrap()
}

#[test]
fn bucket_policy_condition_matches_own_distribution() {
    let output = synth();
    let hosting = plan(&output, "hosting-p");

    // The distribution this stack declares
    assert!(hosting["resource"]["aws_cloudfront_distribution"]
        .as_object()
        .unwrap()
        .contains_key("home"));

    let policy: Value = serde_json::from_str(
        hosting["resource"]["aws_s3_bucket_policy"]["cf-access"]["policy"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    let source_arn =
        &policy["Statement"][0]["Condition"]["StringEquals"]["AWS:SourceArn"][0];
    assert_eq!(source_arn, "${aws_cloudfront_distribution.home.arn}");
}

#[test]
fn exactly_one_public_access_block_with_all_flags() {
    let output = synth();
    let hosting = plan(&output, "hosting-p");

    let blocks = hosting["resource"]["aws_s3_bucket_public_access_block"]
        .as_object()
        .unwrap();
    assert_eq!(blocks.len(), 1);
    let block = blocks.values().next().unwrap();
    for flag in [
        "block_public_acls",
        "block_public_policy",
        "ignore_public_acls",
        "restrict_public_buckets",
    ] {
        assert_eq!(block[flag], true, "{flag} must be raised");
    }
}

#[test]
fn cache_behavior_references_three_distinct_policies() {
    let output = synth();
    let hosting = plan(&output, "hosting-p");

    let behavior =
        &hosting["resource"]["aws_cloudfront_distribution"]["home"]["default_cache_behavior"];
    let ids: Vec<&str> = [
        "cache_policy_id",
        "origin_request_policy_id",
        "response_headers_policy_id",
    ]
    .iter()
    .map(|key| behavior[*key].as_str().unwrap())
    .collect();

    for id in &ids {
        assert!(!id.is_empty());
    }
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
}

#[test]
fn deploy_permissions_name_exactly_the_given_resources() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default();

    let mut stack = cicd_stack(
        &config,
        CicdProps {
            bucket_name: Expr::literal("example-origin"),
            distribution_id: Expr::literal("E123"),
        },
    )
    .unwrap();
    init_backend(&mut stack, &config, "gbl").unwrap();

    let mut app = App::new(dir.path());
    app.add_stack(stack).unwrap();
    let output = app.synth().unwrap();
    let cicd = plan(&output, "cicd");

    let policy: Value = serde_json::from_str(
        cicd["resource"]["aws_iam_policy"]["policy-cicd-deploy"]["policy"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    let mut resources: Vec<String> = policy["Statement"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|s| s["Resource"].as_array().unwrap().iter())
        .map(|r| r.as_str().unwrap().to_string())
        .collect();
    resources.sort();

    let mut expected = vec![
        "arn:aws:s3:::example-origin".to_string(),
        "arn:aws:s3:::example-origin/*".to_string(),
        format!(
            "arn:aws:cloudfront::{}:distribution/E123",
            config.account_id
        ),
    ];
    expected.sort();
    assert_eq!(resources, expected);
}

#[test]
fn synthesis_twice_is_byte_identical() {
    let one = synth();
    let two = synth();
    for stack in one.stacks() {
        assert_eq!(stack.json, two.stack(&stack.name).unwrap().json);
    }
}

#[test]
fn trust_document_subjects_are_branch_refs_and_pull_requests() {
    let output = synth();
    let cicd = plan(&output, "cicd");

    let trust: Value = serde_json::from_str(
        cicd["resource"]["aws_iam_role"]["role-cicd-deploy"]["assume_role_policy"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    let subjects = trust["Statement"][0]["Condition"]["ForAllValues:StringLike"]
        ["token.actions.githubusercontent.com:sub"]
        .as_array()
        .unwrap();
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[0], "repo:ntrp/home:ref:refs/heads/*");
    assert_eq!(subjects[1], "repo:ntrp/home:pull_request");
}

#[test]
fn hosting_is_applied_before_cicd() {
    let output = synth();
    let names: Vec<&str> = output.stacks().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["hosting-p", "cicd"]);

    // The cicd stack reads the hosting outputs through remote state
    let cicd = plan(&output, "cicd");
    let remote = &cicd["data"]["terraform_remote_state"]["hosting-p"];
    assert_eq!(remote["backend"], "s3");
    assert_eq!(remote["config"]["key"], "home/p");
}

#[test]
fn stack_listing_matches_synthesis_order() {
    let names = homeport::stack_order(&AppConfig::default()).unwrap();
    assert_eq!(names, vec!["hosting-p", "cicd"]);

    let output = synth();
    let synthesized: Vec<&str> = output.stacks().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, synthesized);
}

#[test]
fn backends_are_keyed_by_app_and_environment() {
    let output = synth();
    let hosting = plan(&output, "hosting-p");
    let cicd = plan(&output, "cicd");
    assert_eq!(hosting["terraform"]["backend"]["s3"]["key"], "home/p");
    assert_eq!(cicd["terraform"]["backend"]["s3"]["key"], "home/gbl");
    assert_eq!(hosting["terraform"]["backend"]["s3"]["encrypt"], true);
    assert_eq!(
        hosting["terraform"]["backend"]["s3"]["dynamodb_table"],
        "ntrp-tf-lock"
    );
}

#[test]
fn edge_function_is_staged_as_content_addressed_asset() {
    let dir = tempfile::tempdir().unwrap();
    let output = synth_all(&AppConfig::default(), dir.path()).unwrap();
    let hosting = plan(&output, "hosting-p");

    let code = hosting["resource"]["aws_cloudfront_function"]["path-rewrite"]["code"]
        .as_str()
        .unwrap();
    assert!(code.starts_with("${file(\"assets/"));
    assert_eq!(
        hosting["resource"]["aws_cloudfront_function"]["path-rewrite"]["provider"],
        "aws.us-east-1"
    );

    // The referenced file exists next to the plan
    let staged = code
        .trim_start_matches("${file(\"")
        .trim_end_matches("\")}");
    let path = dir.path().join("stacks/hosting-p").join(staged);
    assert!(path.exists(), "asset missing at {}", path.display());
}
