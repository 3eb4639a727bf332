//! Deferred value expressions
//!
//! An [`Expr`] is either a literal string or a Terraform interpolation such
//! as `${aws_s3_bucket.origin.arn}`. Consumers cannot tell the two apart:
//! both format into property values and policy documents the same way, and
//! interpolations are resolved to real values only when the external engine
//! applies the plan.

use serde::Serialize;
use std::fmt;

/// A string-typed value that may be deferred until apply time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Expr(String);

impl Expr {
    /// A value known at declaration time
    pub fn literal(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// A reference resolved by the engine, e.g. `aws_s3_bucket.origin.id`
    pub fn interpolation(address: impl fmt::Display) -> Self {
        Self(format!("${{{address}}}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value embeds at least one deferred reference
    pub fn is_deferred(&self) -> bool {
        !interpolations(&self.0).is_empty()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::literal(value)
    }
}

/// Extract the inner text of every `${...}` interpolation in a string.
///
/// `$${` is the Terraform escape for a literal `${` and is skipped.
pub(crate) fn interpolations(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'$' && bytes[i + 1] == b'$' {
            i += 2;
            continue;
        }
        if bytes[i] == b'$' && bytes[i + 1] == b'{' {
            if let Some(end) = text[i + 2..].find('}') {
                found.push(text[i + 2..i + 2 + end].to_string());
                i += 2 + end + 1;
                continue;
            }
        }
        i += 1;
    }
    found
}

/// Collect every interpolation appearing anywhere in a JSON property bag,
/// including inside embedded policy-document strings.
pub(crate) fn collect_interpolations(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.extend(interpolations(s)),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_interpolations(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect_interpolations(item, out);
            }
        }
        _ => {}
    }
}
