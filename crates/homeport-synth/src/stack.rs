//! Stack declarations
//!
//! A [`Stack`] is an independently provisionable bundle of resource
//! declarations with exactly one remote-state binding. Resources are
//! identified by a `(type, logical id)` pair; logical ids are unique within
//! their stack, and attribute references between declarations must form a
//! DAG. Both invariants are enforced here rather than left to apply time.

use crate::asset::Asset;
use crate::backend::S3Backend;
use crate::error::{Result, SynthError};
use crate::expr::{Expr, collect_interpolations};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Handle to a declared resource, used to reference its output attributes
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    address: String,
}

impl ResourceHandle {
    /// Deferred reference to one of the resource's output attributes
    pub fn attr(&self, name: &str) -> Expr {
        Expr::interpolation(format!("{}.{}", self.address, name))
    }

    pub fn id(&self) -> Expr {
        self.attr("id")
    }

    pub fn arn(&self) -> Expr {
        self.attr("arn")
    }
}

/// Reference to a named output exported by a stack.
///
/// Embedding [`OutputRef::expr`] in another stack's declarations makes that
/// stack a consumer: the producer-to-consumer edge is recovered from the
/// declaration graph itself at synth time, so apply ordering never depends
/// on entry-point call order alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRef {
    pub(crate) stack: String,
    pub(crate) output: String,
}

impl OutputRef {
    /// Deferred expression reading this output from the producer's remote
    /// state after the producer has been applied
    pub fn expr(&self) -> Expr {
        Expr::interpolation(format!(
            "data.terraform_remote_state.{}.outputs.{}",
            self.stack, self.output
        ))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ProviderBlock {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) config: Value,
}

/// An independently deployable unit of declared infrastructure
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    providers: Vec<ProviderBlock>,
    resources: BTreeMap<String, BTreeMap<String, Value>>,
    logical_ids: BTreeSet<String>,
    outputs: BTreeMap<String, Expr>,
    backend: Option<S3Backend>,
    assets: Vec<Asset>,
    /// Remote-state data sources injected at synth time by [`crate::App`]
    pub(crate) remote_states: BTreeMap<String, Value>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            providers: Vec::new(),
            resources: BTreeMap::new(),
            logical_ids: BTreeSet::new(),
            outputs: BTreeMap::new(),
            backend: None,
            assets: Vec::new(),
            remote_states: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_count(&self) -> usize {
        self.resources.values().map(|ids| ids.len()).sum()
    }

    /// Bind a provider block. Aliased providers (e.g. a second `aws`
    /// binding pinned to `us-east-1`) are selected per resource with
    /// [`Stack::resource_on`].
    pub fn add_provider(&mut self, name: &str, config: impl Serialize) -> Result<()> {
        let config = serde_json::to_value(config)?;
        let alias = config
            .get("alias")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.providers.push(ProviderBlock {
            name: name.to_string(),
            alias,
            config,
        });
        Ok(())
    }

    /// Declare a resource on the default provider
    pub fn resource(
        &mut self,
        resource_type: &str,
        logical_id: &str,
        properties: impl Serialize,
    ) -> Result<ResourceHandle> {
        let properties = serde_json::to_value(properties)?;
        self.declare(resource_type, logical_id, properties)
    }

    /// Declare a resource pinned to an aliased provider
    pub fn resource_on(
        &mut self,
        alias: &str,
        resource_type: &str,
        logical_id: &str,
        properties: impl Serialize,
    ) -> Result<ResourceHandle> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.alias.as_deref() == Some(alias))
            .ok_or_else(|| SynthError::UnknownProviderAlias {
                stack: self.name.clone(),
                alias: alias.to_string(),
            })?;
        let qualified = format!("{}.{}", provider.name, alias);

        let mut properties = serde_json::to_value(properties)?;
        if let Value::Object(map) = &mut properties {
            map.insert("provider".to_string(), json!(qualified));
        }
        self.declare(resource_type, logical_id, properties)
    }

    fn declare(
        &mut self,
        resource_type: &str,
        logical_id: &str,
        properties: Value,
    ) -> Result<ResourceHandle> {
        if self.providers.is_empty() {
            return Err(SynthError::NoProvider {
                stack: self.name.clone(),
                resource: format!("{resource_type}.{logical_id}"),
            });
        }
        if !self.logical_ids.insert(logical_id.to_string()) {
            return Err(SynthError::DuplicateLogicalId {
                stack: self.name.clone(),
                id: logical_id.to_string(),
            });
        }

        tracing::debug!(
            stack = %self.name,
            "Declared {}.{}",
            resource_type,
            logical_id
        );
        self.resources
            .entry(resource_type.to_string())
            .or_default()
            .insert(logical_id.to_string(), properties);
        Ok(ResourceHandle {
            address: format!("{resource_type}.{logical_id}"),
        })
    }

    /// Package a local file as a content-addressed asset of this stack
    pub fn add_asset(&mut self, path: impl AsRef<Path>) -> Result<Asset> {
        let asset = Asset::from_path(path.as_ref())?;
        if !self.assets.iter().any(|a| a == &asset) {
            self.assets.push(asset.clone());
        }
        Ok(asset)
    }

    /// Export a named value for consumption by other stacks
    pub fn export(&mut self, name: &str, value: Expr) -> OutputRef {
        self.outputs.insert(name.to_string(), value);
        OutputRef {
            stack: self.name.clone(),
            output: name.to_string(),
        }
    }

    /// Bind the remote-state backend. Must be called exactly once per
    /// stack; order relative to resource declarations does not matter.
    pub fn set_backend(&mut self, backend: S3Backend) -> Result<()> {
        if self.backend.is_some() {
            return Err(SynthError::BackendAlreadySet(self.name.clone()));
        }
        self.backend = Some(backend);
        Ok(())
    }

    pub fn backend(&self) -> Option<&S3Backend> {
        self.backend.as_ref()
    }

    pub(crate) fn outputs(&self) -> &BTreeMap<String, Expr> {
        &self.outputs
    }

    pub(crate) fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Cross-stack outputs this stack consumes, recovered by scanning the
    /// declaration graph for remote-state references: producer stack to
    /// output names.
    pub(crate) fn consumed_outputs(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut raw = Vec::new();
        for ids in self.resources.values() {
            for properties in ids.values() {
                collect_interpolations(properties, &mut raw);
            }
        }
        for value in self.outputs.values() {
            raw.extend(crate::expr::interpolations(value.as_str()));
        }

        let mut consumed: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for expr in raw {
            let segments: Vec<&str> = expr.split('.').collect();
            if segments.len() >= 5
                && segments[0] == "data"
                && segments[1] == "terraform_remote_state"
                && segments[3] == "outputs"
            {
                consumed
                    .entry(segments[2].to_string())
                    .or_default()
                    .insert(segments[4].to_string());
            }
        }
        consumed
    }

    /// Check that every in-stack reference resolves to a declaration and
    /// that references form a DAG. Runs automatically during
    /// [`crate::App::synth`].
    pub fn validate_references(&self) -> Result<()> {
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for (resource_type, ids) in &self.resources {
            for (logical_id, properties) in ids {
                let address = format!("{resource_type}.{logical_id}");
                let mut raw = Vec::new();
                collect_interpolations(properties, &mut raw);
                for target in raw.iter().filter_map(|expr| self.reference_target(expr)) {
                    let target = target?;
                    edges.entry(address.clone()).or_default().insert(target);
                }
            }
        }
        for value in self.outputs.values() {
            let mut raw = Vec::new();
            collect_interpolations(&Value::String(value.to_string()), &mut raw);
            for target in raw.iter().filter_map(|expr| self.reference_target(expr)) {
                target?;
            }
        }

        // Depth-first cycle detection over the reference edges
        let mut done: BTreeSet<String> = BTreeSet::new();
        for address in edges.keys() {
            let mut in_progress = BTreeSet::new();
            self.walk(address, &edges, &mut in_progress, &mut done)?;
        }
        Ok(())
    }

    /// Map an interpolation to the in-stack declaration it refers to.
    /// Function calls (`file(...)`) and remote-state attribute paths are
    /// not reference edges; the latter are validated against the injected
    /// data sources.
    fn reference_target(&self, expr: &str) -> Option<Result<String>> {
        if expr.contains('(') {
            return None;
        }
        let segments: Vec<&str> = expr.split('.').collect();
        if segments.first() == Some(&"data") {
            let resolvable = segments.len() >= 3
                && segments[1] == "terraform_remote_state"
                && self.remote_states.contains_key(segments[2]);
            if resolvable {
                return None;
            }
            return Some(Err(SynthError::UnknownReference {
                stack: self.name.clone(),
                address: expr.to_string(),
            }));
        }
        if segments.len() < 2 {
            return None;
        }
        let address = format!("{}.{}", segments[0], segments[1]);
        let declared = self
            .resources
            .get(segments[0])
            .is_some_and(|ids| ids.contains_key(segments[1]));
        if declared {
            Some(Ok(address))
        } else {
            Some(Err(SynthError::UnknownReference {
                stack: self.name.clone(),
                address: expr.to_string(),
            }))
        }
    }

    fn walk(
        &self,
        address: &str,
        edges: &BTreeMap<String, BTreeSet<String>>,
        in_progress: &mut BTreeSet<String>,
        done: &mut BTreeSet<String>,
    ) -> Result<()> {
        if done.contains(address) {
            return Ok(());
        }
        if !in_progress.insert(address.to_string()) {
            return Err(SynthError::ReferenceCycle {
                stack: self.name.clone(),
                address: address.to_string(),
            });
        }
        if let Some(targets) = edges.get(address) {
            for target in targets {
                self.walk(target, edges, in_progress, done)?;
            }
        }
        in_progress.remove(address);
        done.insert(address.to_string());
        Ok(())
    }

    /// Render the stack as a Terraform-JSON document. Maps are kept sorted
    /// so the rendering is deterministic.
    pub(crate) fn render(&self) -> Value {
        let mut doc = Map::new();

        if let Some(backend) = &self.backend {
            doc.insert(
                "terraform".to_string(),
                json!({ "backend": { "s3": backend } }),
            );
        }

        let mut providers: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
        for provider in &self.providers {
            providers
                .entry(provider.name.clone())
                .or_default()
                .push(&provider.config);
        }
        if !providers.is_empty() {
            doc.insert("provider".to_string(), json!(providers));
        }

        if !self.remote_states.is_empty() {
            doc.insert(
                "data".to_string(),
                json!({ "terraform_remote_state": self.remote_states }),
            );
        }

        if !self.resources.is_empty() {
            doc.insert("resource".to_string(), json!(self.resources));
        }

        if !self.outputs.is_empty() {
            let outputs: BTreeMap<&String, Value> = self
                .outputs
                .iter()
                .map(|(name, value)| (name, json!({ "value": value })))
                .collect();
            doc.insert("output".to_string(), json!(outputs));
        }

        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_with_provider() -> Stack {
        let mut stack = Stack::new("test");
        stack
            .add_provider("aws", json!({ "region": "eu-west-1" }))
            .unwrap();
        stack
    }

    #[test]
    fn resource_before_provider_is_rejected() {
        let mut stack = Stack::new("test");
        let err = stack
            .resource("aws_s3_bucket", "origin", json!({ "bucket": "b" }))
            .unwrap_err();
        assert!(matches!(err, SynthError::NoProvider { .. }));
    }

    #[test]
    fn logical_ids_are_unique_per_stack() {
        let mut stack = stack_with_provider();
        stack
            .resource("aws_s3_bucket", "origin", json!({ "bucket": "b" }))
            .unwrap();
        // Same id under a different type still collides
        let err = stack
            .resource("aws_s3_bucket_policy", "origin", json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            SynthError::DuplicateLogicalId { ref id, .. } if id == "origin"
        ));
    }

    #[test]
    fn aliased_provider_is_stamped_on_resource() {
        let mut stack = stack_with_provider();
        stack
            .add_provider(
                "aws",
                json!({ "region": "us-east-1", "alias": "us-east-1" }),
            )
            .unwrap();
        stack
            .resource_on(
                "us-east-1",
                "aws_cloudfront_function",
                "rewrite",
                json!({ "name": "fn" }),
            )
            .unwrap();
        let rendered = stack.render();
        assert_eq!(
            rendered["resource"]["aws_cloudfront_function"]["rewrite"]["provider"],
            "aws.us-east-1"
        );
    }

    #[test]
    fn unknown_alias_is_rejected() {
        let mut stack = stack_with_provider();
        let err = stack
            .resource_on("us-east-1", "aws_cloudfront_function", "rewrite", json!({}))
            .unwrap_err();
        assert!(matches!(err, SynthError::UnknownProviderAlias { .. }));
    }

    #[test]
    fn backend_binds_exactly_once() {
        let mut stack = stack_with_provider();
        let backend = S3Backend {
            bucket: "state".into(),
            key: "home/p".into(),
            region: "eu-west-1".into(),
            dynamodb_table: None,
            encrypt: true,
        };
        stack.set_backend(backend.clone()).unwrap();
        assert!(matches!(
            stack.set_backend(backend),
            Err(SynthError::BackendAlreadySet(_))
        ));
    }

    #[test]
    fn consumed_output_is_recovered_from_the_graph() {
        let mut producer = Stack::new("hosting-p");
        let output = producer.export("bucket_name", Expr::literal("my-bucket"));
        assert_eq!(
            output.expr().as_str(),
            "${data.terraform_remote_state.hosting-p.outputs.bucket_name}"
        );

        let mut consumer = stack_with_provider();
        consumer
            .resource(
                "aws_iam_policy",
                "deploy",
                json!({ "policy": format!("arn:aws:s3:::{}", output.expr()) }),
            )
            .unwrap();
        let consumed = consumer.consumed_outputs();
        assert!(consumed["hosting-p"].contains("bucket_name"));
    }

    #[test]
    fn unresolved_reference_fails_validation() {
        let mut stack = stack_with_provider();
        stack
            .resource(
                "aws_s3_bucket_policy",
                "access",
                json!({ "bucket": "${aws_s3_bucket.missing.id}" }),
            )
            .unwrap();
        let err = stack.validate_references().unwrap_err();
        assert!(matches!(
            err,
            SynthError::UnknownReference { ref address, .. }
                if address == "aws_s3_bucket.missing.id"
        ));
    }

    #[test]
    fn reference_cycle_is_detected() {
        let mut stack = stack_with_provider();
        stack
            .resource("aws_s3_bucket", "a", json!({ "tag": "${aws_s3_bucket.b.id}" }))
            .unwrap();
        stack
            .resource("aws_s3_bucket", "b", json!({ "tag": "${aws_s3_bucket.a.id}" }))
            .unwrap();
        let err = stack.validate_references().unwrap_err();
        assert!(matches!(err, SynthError::ReferenceCycle { .. }));
    }

    #[test]
    fn acyclic_references_pass_validation() {
        let mut stack = stack_with_provider();
        let bucket = stack
            .resource("aws_s3_bucket", "origin", json!({ "bucket": "b" }))
            .unwrap();
        stack
            .resource(
                "aws_s3_bucket_versioning",
                "versioning",
                json!({ "bucket": bucket.id() }),
            )
            .unwrap();
        stack.validate_references().unwrap();
    }

    #[test]
    fn render_groups_resources_by_type() {
        let mut stack = stack_with_provider();
        stack
            .resource("aws_s3_bucket", "origin", json!({ "bucket": "b" }))
            .unwrap();
        stack.export("bucket_name", Expr::literal("b"));
        let rendered = stack.render();
        assert_eq!(rendered["resource"]["aws_s3_bucket"]["origin"]["bucket"], "b");
        assert_eq!(rendered["output"]["bucket_name"]["value"], "b");
        assert_eq!(rendered["provider"]["aws"][0]["region"], "eu-west-1");
    }
}
