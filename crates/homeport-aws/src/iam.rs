//! IAM family: federated identity provider, policies, roles, and the
//! policy-document model serialized into resource properties

use serde::Serialize;
use std::collections::BTreeMap;

use homeport_synth::Expr;

#[derive(Debug, Clone, Serialize)]
pub struct IamOpenidConnectProvider {
    pub url: String,
    pub client_id_list: Vec<String>,
    pub thumbprint_list: Vec<String>,
}

impl IamOpenidConnectProvider {
    pub const TYPE: &'static str = "aws_iam_openid_connect_provider";
}

#[derive(Debug, Clone, Serialize)]
pub struct IamPolicy {
    pub name: String,
    pub description: String,
    pub policy: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl IamPolicy {
    pub const TYPE: &'static str = "aws_iam_policy";
}

#[derive(Debug, Clone, Serialize)]
pub struct IamRole {
    pub name: String,
    pub description: String,
    pub assume_role_policy: String,
    pub managed_policy_arns: Vec<Expr>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl IamRole {
    pub const TYPE: &'static str = "aws_iam_role";
}

/// AWS policy document, serialized as embedded JSON inside resource
/// properties. Condition operators map variable names to value lists,
/// e.g. `{"StringEquals": {"AWS:SourceArn": ["..."]}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: "2012-10-17".to_string(),
            statement,
        }
    }

    /// Render as the JSON string embedded in a resource property
    pub fn json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub type ConditionMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub action: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionMap>,
}

impl Statement {
    pub fn allow() -> Self {
        Self {
            sid: None,
            effect: "Allow".to_string(),
            principal: None,
            action: Vec::new(),
            resource: None,
            condition: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federated: Option<Expr>,
}

/// Single-operator, single-variable condition shorthand
pub fn condition(operator: &str, variable: &str, values: Vec<String>) -> ConditionMap {
    let mut map = ConditionMap::new();
    map.entry(operator.to_string())
        .or_default()
        .insert(variable.to_string(), values);
    map
}
