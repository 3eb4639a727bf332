//! AWS provider block

use serde::Serialize;

/// Name of the provider block, `provider "aws" { ... }`
pub const PROVIDER: &str = "aws";

#[derive(Debug, Clone, Serialize)]
pub struct AwsProvider {
    pub region: String,
    /// Set for secondary bindings, e.g. the `us-east-1` binding required
    /// by CloudFront edge resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Guard against applying into the wrong account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_account_ids: Option<Vec<String>>,
}

impl AwsProvider {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            alias: None,
            allowed_account_ids: None,
        }
    }

    pub fn aliased(region: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            alias: Some(alias.into()),
            allowed_account_ids: None,
        }
    }

    pub fn allow_account(mut self, account_id: impl Into<String>) -> Self {
        self.allowed_account_ids = Some(vec![account_id.into()]);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binding_has_no_alias() {
        let value = serde_json::to_value(AwsProvider::new("eu-west-1")).unwrap();
        assert_eq!(value["region"], "eu-west-1");
        assert!(value.get("alias").is_none());
    }

    #[test]
    fn aliased_binding_carries_alias_and_account_guard() {
        let provider = AwsProvider::aliased("us-east-1", "us-east-1").allow_account("123456789012");
        let value = serde_json::to_value(provider).unwrap();
        assert_eq!(value["alias"], "us-east-1");
        assert_eq!(value["allowed_account_ids"][0], "123456789012");
    }
}
