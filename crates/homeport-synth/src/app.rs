//! Application root: stack DAG wiring and plan emission
//!
//! The [`App`] owns every stack of a run, resolves cross-stack imports
//! into `terraform_remote_state` data sources, orders stacks over the
//! producer-to-consumer edges, and writes one Terraform-JSON plan per stack.

use crate::backend::S3Backend;
use crate::error::{Result, SynthError};
use crate::stack::Stack;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Root of the declaration graph for one synthesis run
pub struct App {
    out_dir: PathBuf,
    stacks: Vec<Stack>,
}

/// Rendered plan for one stack
#[derive(Debug, Clone)]
pub struct StackArtifact {
    pub name: String,
    /// Where the plan was written, `<out>/stacks/<name>/plan.tf.json`
    pub path: PathBuf,
    /// The rendered plan document
    pub json: String,
    pub resource_count: usize,
}

impl StackArtifact {
    pub fn plan(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.json)?)
    }
}

/// Result of a synthesis run, in apply order
#[derive(Debug, Clone)]
pub struct SynthOutput {
    stacks: Vec<StackArtifact>,
}

impl SynthOutput {
    /// Stacks in the order they must be applied
    pub fn stacks(&self) -> &[StackArtifact] {
        &self.stacks
    }

    pub fn stack(&self, name: &str) -> Option<&StackArtifact> {
        self.stacks.iter().find(|s| s.name == name)
    }
}

impl App {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            stacks: Vec::new(),
        }
    }

    pub fn add_stack(&mut self, stack: Stack) -> Result<()> {
        if self.stacks.iter().any(|s| s.name() == stack.name()) {
            return Err(SynthError::DuplicateStack(stack.name().to_string()));
        }
        self.stacks.push(stack);
        Ok(())
    }

    /// Names of the registered stacks in the order their plans must be
    /// applied. Computed from the declarations alone; nothing is written.
    pub fn stack_order(&self) -> Result<Vec<String>> {
        Ok(self
            .apply_order()?
            .into_iter()
            .map(|i| self.stacks[i].name().to_string())
            .collect())
    }

    /// Resolve cross-stack imports, validate every stack's reference
    /// graph, and write the plans. Synthesis is deterministic: running it
    /// twice over the same declarations yields byte-identical output.
    pub fn synth(&mut self) -> Result<SynthOutput> {
        self.resolve_imports()?;
        let order = self.apply_order()?;

        let mut artifacts = Vec::with_capacity(order.len());
        for index in order {
            let stack = &self.stacks[index];
            stack.validate_references()?;

            let stack_dir = self.out_dir.join("stacks").join(stack.name());
            std::fs::create_dir_all(&stack_dir)?;

            for asset in stack.assets() {
                let asset_dir = stack_dir.join("assets").join(&asset.hash);
                std::fs::create_dir_all(&asset_dir)?;
                std::fs::copy(&asset.source, asset_dir.join(&asset.file_name))?;
            }

            let mut json = serde_json::to_string_pretty(&stack.render())?;
            json.push('\n');
            let path = stack_dir.join("plan.tf.json");
            std::fs::write(&path, &json)?;

            tracing::info!(
                "Synthesized stack {} ({} resources)",
                stack.name(),
                stack.resource_count()
            );
            artifacts.push(StackArtifact {
                name: stack.name().to_string(),
                path,
                json,
                resource_count: stack.resource_count(),
            });
        }
        Ok(SynthOutput { stacks: artifacts })
    }

    /// Inject a `terraform_remote_state` data source into every consumer
    /// for each producer it imports from.
    fn resolve_imports(&mut self) -> Result<()> {
        let producers: BTreeMap<String, (Option<S3Backend>, BTreeSet<String>)> = self
            .stacks
            .iter()
            .map(|stack| {
                (
                    stack.name().to_string(),
                    (
                        stack.backend().cloned(),
                        stack.outputs().keys().cloned().collect(),
                    ),
                )
            })
            .collect();

        for stack in &mut self.stacks {
            let consumer = stack.name().to_string();
            for (producer, outputs) in stack.consumed_outputs() {
                let Some((backend, exported)) = producers.get(&producer) else {
                    return Err(SynthError::UnknownStack {
                        consumer: consumer.clone(),
                        producer,
                    });
                };
                for output in &outputs {
                    if !exported.contains(output) {
                        return Err(SynthError::UnknownOutput {
                            stack: producer.clone(),
                            output: output.clone(),
                        });
                    }
                }
                let Some(backend) = backend else {
                    return Err(SynthError::MissingBackend {
                        stack: producer.clone(),
                        consumer: consumer.clone(),
                    });
                };
                stack
                    .remote_states
                    .insert(producer.clone(), backend.remote_state_config());
            }
        }
        Ok(())
    }

    /// Topological order over the producer-to-consumer edges, stable with
    /// respect to registration order.
    fn apply_order(&self) -> Result<Vec<usize>> {
        let index_of: BTreeMap<&str, usize> = self
            .stacks
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name(), i))
            .collect();
        let upstream: Vec<Vec<String>> = self
            .stacks
            .iter()
            .map(|s| s.consumed_outputs().into_keys().collect())
            .collect();

        let mut remaining: Vec<usize> = (0..self.stacks.len()).collect();
        let mut emitted: BTreeSet<usize> = BTreeSet::new();
        let mut order = Vec::with_capacity(self.stacks.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|&i| {
                upstream[i].iter().all(|producer| {
                    index_of
                        .get(producer.as_str())
                        .is_none_or(|p| emitted.contains(p))
                })
            });
            match ready {
                Some(pos) => {
                    let index = remaining.remove(pos);
                    emitted.insert(index);
                    order.push(index);
                }
                None => {
                    let names: Vec<&str> =
                        remaining.iter().map(|&i| self.stacks[i].name()).collect();
                    return Err(SynthError::StackCycle(names.join(" -> ")));
                }
            }
        }
        Ok(order)
    }
}
