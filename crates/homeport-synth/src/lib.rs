//! Homeport Synthesis Core
//!
//! This crate models independently deployable stacks of declared cloud
//! resources and renders them into Terraform-JSON plans for an external
//! plan/apply pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 homeport CLI                     │
//! │               (homeport synth)                   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               homeport-synth                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  App: stack DAG + cross-stack wiring      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Stack     │  │  S3Backend   │            │
//! │  │ declarations │  │ remote state │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!        stacks/<name>/plan.tf.json
//!                   │
//!           terraform plan / apply
//! ```
//!
//! Declaration is single-threaded and synchronous: building the graph has
//! no suspension points and no shared mutable state. Locking of concurrent
//! applies is delegated to the DynamoDB table named in each stack's
//! [`S3Backend`] binding and performed entirely by the external engine.

pub mod app;
pub mod asset;
pub mod backend;
pub mod error;
pub mod expr;
pub mod stack;

// Re-exports
pub use app::{App, StackArtifact, SynthOutput};
pub use asset::Asset;
pub use backend::S3Backend;
pub use error::{Result, SynthError};
pub use expr::Expr;
pub use stack::{OutputRef, ResourceHandle, Stack};
