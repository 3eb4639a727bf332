//! Content-addressed file assets
//!
//! Local files referenced by resource declarations (edge-function scripts)
//! are staged into the synthesis output under a SHA-256 content hash, so
//! identical content always yields an identical plan.

use crate::error::{Result, SynthError};
use crate::expr::Expr;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A local file packaged into the plan output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub(crate) source: PathBuf,
    pub(crate) hash: String,
    pub(crate) file_name: String,
}

impl Asset {
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SynthError::AssetNotFound(path.display().to_string()))?
            .to_string();
        let content = std::fs::read(path)
            .map_err(|_| SynthError::AssetNotFound(path.display().to_string()))?;
        let hash = hex::encode(Sha256::digest(&content));
        Ok(Self {
            source: path.to_path_buf(),
            hash,
            file_name,
        })
    }

    /// Path of the staged file, relative to the stack's plan directory
    pub fn plan_path(&self) -> String {
        format!("assets/{}/{}", self.hash, self.file_name)
    }

    /// `${file("...")}` expression reading the staged file at apply time
    pub fn file_expr(&self) -> Expr {
        Expr::interpolation(format!("file(\"{}\")", self.plan_path()))
    }
}
