//! Typed shapes of `list` and `version` replies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Top level of a `list` reply: domain name → domain
pub type JmxDomains = BTreeMap<String, JmxDomain>;

/// MBeans of one domain, keyed by their key-property list
pub type JmxDomain = BTreeMap<String, JmxMBean>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmxMBean {
    #[serde(default)]
    pub op: BTreeMap<String, JmxOperationSignatures>,
    #[serde(default)]
    pub attr: BTreeMap<String, JmxAttribute>,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_invoke: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmxAttribute {
    #[serde(default)]
    pub desc: String,
    pub rw: bool,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_invoke: Option<bool>,
}

/// Overloaded operations are listed as an array of signatures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JmxOperationSignatures {
    Single(JmxOperation),
    Overloaded(Vec<JmxOperation>),
}

impl JmxOperationSignatures {
    pub fn signatures(&self) -> &[JmxOperation] {
        match self {
            JmxOperationSignatures::Single(op) => std::slice::from_ref(op),
            JmxOperationSignatures::Overloaded(ops) => ops,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmxOperation {
    #[serde(default)]
    pub args: Vec<JmxOperationArgument>,
    #[serde(default)]
    pub desc: String,
    pub ret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_invoke: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JmxOperationArgument {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Reply of a `version` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub protocol: String,
    pub agent: String,
    #[serde(default)]
    pub config: AgentConfig,
    #[serde(default)]
    pub info: AgentInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default)]
    pub agent_description: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub serialize_exception: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub extra_info: Map<String, Value>,
}
