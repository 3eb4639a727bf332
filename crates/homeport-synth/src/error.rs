//! Synthesis error types

use thiserror::Error;

/// Errors raised while building or rendering the declaration graph
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Stack already registered: {0}")]
    DuplicateStack(String),

    #[error("Duplicate logical id '{id}' in stack '{stack}'")]
    DuplicateLogicalId { stack: String, id: String },

    #[error("Stack '{stack}' declares '{resource}' before binding a provider")]
    NoProvider { stack: String, resource: String },

    #[error("Unknown provider alias '{alias}' in stack '{stack}'")]
    UnknownProviderAlias { stack: String, alias: String },

    #[error("Backend already bound for stack '{0}'")]
    BackendAlreadySet(String),

    #[error("Stack '{consumer}' imports output from unknown stack '{producer}'")]
    UnknownStack { consumer: String, producer: String },

    #[error("Stack '{stack}' exports no output named '{output}'")]
    UnknownOutput { stack: String, output: String },

    #[error("Stack '{stack}' has no backend; '{consumer}' cannot import its outputs")]
    MissingBackend { stack: String, consumer: String },

    #[error("Unresolved reference '{address}' in stack '{stack}'")]
    UnknownReference { stack: String, address: String },

    #[error("Reference cycle in stack '{stack}' through '{address}'")]
    ReferenceCycle { stack: String, address: String },

    #[error("Dependency cycle between stacks: {0}")]
    StackCycle(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SynthError>;
