//! Homeport: declarative AWS infrastructure for the home portal
//!
//! Two stacks make up the deployment:
//!
//! - **hosting**: a hardened S3 origin behind a CloudFront distribution
//!   with a viewer-request path-rewrite function.
//! - **cicd**: an OIDC-federated deploy role for GitHub Actions, scoped to
//!   the hosting stack's bucket and distribution.
//!
//! [`synth_all`] wires the two together: the hosting stack's exported
//! outputs become the cicd stack's inputs, and the resulting plans are
//! written in apply order.

pub mod cicd;
pub mod config;
pub mod hosting;
pub mod secure_bucket;
pub mod web;

use std::path::Path;

use homeport_synth::{App, Result, S3Backend, Stack, SynthOutput};

use cicd::CicdProps;
use config::AppConfig;

/// Bind a stack's remote state record at `{app}/{env}` in the shared
/// state bucket, locked through the shared DynamoDB table.
pub fn init_backend(stack: &mut Stack, config: &AppConfig, env: &str) -> Result<()> {
    stack.set_backend(S3Backend {
        bucket: config.state_bucket.clone(),
        key: format!("{}/{}", config.app, env),
        region: config.state_region.clone(),
        dynamodb_table: Some(config.state_table.clone()),
        encrypt: true,
    })
}

fn build_app(config: &AppConfig, out_dir: &Path) -> Result<App> {
    let mut app = App::new(out_dir);

    let (mut hosting, outputs) = hosting::hosting_stack(config, "p")?;
    init_backend(&mut hosting, config, "p")?;
    app.add_stack(hosting)?;

    let mut cicd = cicd::cicd_stack(
        config,
        CicdProps {
            bucket_name: outputs.bucket_name.expr(),
            distribution_id: outputs.distribution_id.expr(),
        },
    )?;
    init_backend(&mut cicd, config, "gbl")?;
    app.add_stack(cicd)?;

    Ok(app)
}

/// Fixed two-stack entry point: hosting for environment `p`, cicd for the
/// global environment, plans written under `out_dir`.
pub fn synth_all(config: &AppConfig, out_dir: impl AsRef<Path>) -> Result<SynthOutput> {
    tracing::debug!("Synthesizing {} stacks", config.app);
    build_app(config, out_dir.as_ref())?.synth()
}

/// Stack names in the order their plans must be applied; no plans are
/// written.
pub fn stack_order(config: &AppConfig) -> Result<Vec<String>> {
    build_app(config, Path::new("homeport.out"))?.stack_order()
}
