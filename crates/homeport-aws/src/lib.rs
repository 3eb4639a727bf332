//! Typed AWS resource declarations
//!
//! Property bags for the AWS resources Homeport provisions. Each struct
//! serializes to the exact Terraform argument names for its resource type
//! and carries the type name as an associated `TYPE` constant, so stacks
//! declare resources as `stack.resource(S3Bucket::TYPE, "origin", ...)`.
//! Deferred attribute references flow through as [`homeport_synth::Expr`].

pub mod cloudfront;
pub mod iam;
pub mod provider;
pub mod s3;

pub use provider::AwsProvider;
