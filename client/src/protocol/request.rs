use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::ProcessingParams;
use crate::errors::ShapeError;

/// Attribute selector of a read request: one name or a list of names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribute {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for Attribute {
    fn from(name: &str) -> Self {
        Attribute::Single(name.to_string())
    }
}

impl From<String> for Attribute {
    fn from(name: String) -> Self {
        Attribute::Single(name)
    }
}

impl From<Vec<String>> for Attribute {
    fn from(names: Vec<String>) -> Self {
        Attribute::Multiple(names)
    }
}

impl From<&[&str]> for Attribute {
    fn from(names: &[&str]) -> Self {
        Attribute::Multiple(names.iter().map(|n| n.to_string()).collect())
    }
}

/// A single protocol request.
///
/// Each variant carries exactly the fields the agent accepts for that
/// operation; the `type` discriminator is written on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    Read {
        mbean: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<Attribute>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Write {
        mbean: String,
        attribute: String,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Exec {
        mbean: String,
        operation: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<Value>,
    },
    Search {
        mbean: String,
    },
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Version,
}

impl Request {
    /// Read one or more attributes of an MBean
    pub fn read(mbean: impl Into<String>, attribute: impl Into<Attribute>) -> Self {
        Request::Read {
            mbean: mbean.into(),
            attribute: Some(attribute.into()),
            path: None,
        }
    }

    /// Read a value inside an attribute, addressed by an inner path
    pub fn read_path(
        mbean: impl Into<String>,
        attribute: impl Into<Attribute>,
        path: impl Into<String>,
    ) -> Self {
        Request::Read {
            mbean: mbean.into(),
            attribute: Some(attribute.into()),
            path: Some(path.into()),
        }
    }

    /// Read every attribute of an MBean
    pub fn read_all(mbean: impl Into<String>) -> Self {
        Request::Read {
            mbean: mbean.into(),
            attribute: None,
            path: None,
        }
    }

    pub fn write(mbean: impl Into<String>, attribute: impl Into<String>, value: Value) -> Self {
        Request::Write {
            mbean: mbean.into(),
            attribute: attribute.into(),
            value,
            path: None,
        }
    }

    pub fn write_path(
        mbean: impl Into<String>,
        attribute: impl Into<String>,
        value: Value,
        path: impl Into<String>,
    ) -> Self {
        Request::Write {
            mbean: mbean.into(),
            attribute: attribute.into(),
            value,
            path: Some(path.into()),
        }
    }

    pub fn exec(mbean: impl Into<String>, operation: impl Into<String>, arguments: Vec<Value>) -> Self {
        Request::Exec {
            mbean: mbean.into(),
            operation: operation.into(),
            arguments,
        }
    }

    pub fn search(pattern: impl Into<String>) -> Self {
        Request::Search {
            mbean: pattern.into(),
        }
    }

    pub fn list(path: Option<&str>) -> Self {
        Request::List {
            path: path.map(str::to_string),
        }
    }

    pub fn version() -> Self {
        Request::Version
    }

    /// Wire name of the operation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Read { .. } => "read",
            Request::Write { .. } => "write",
            Request::Exec { .. } => "exec",
            Request::Search { .. } => "search",
            Request::List { .. } => "list",
            Request::Version => "version",
        }
    }

    /// Target MBean (or pattern) for kinds that address one
    pub fn mbean(&self) -> Option<&str> {
        match self {
            Request::Read { mbean, .. }
            | Request::Write { mbean, .. }
            | Request::Exec { mbean, .. }
            | Request::Search { mbean } => Some(mbean),
            Request::List { .. } | Request::Version => None,
        }
    }

    /// Check the per-kind shape rules that the type system cannot express.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if let Some(mbean) = self.mbean() {
            if mbean.trim().is_empty() {
                return Err(ShapeError::EmptyMBean { kind: self.kind() });
            }
        }

        match self {
            Request::Read {
                attribute: Some(Attribute::Multiple(names)),
                ..
            } => {
                if names.is_empty() {
                    return Err(ShapeError::EmptyAttributeList);
                }
                if names.iter().any(|n| n.is_empty()) {
                    return Err(ShapeError::EmptyAttribute { kind: "read" });
                }
            }
            Request::Read {
                attribute: Some(Attribute::Single(name)),
                ..
            } if name.is_empty() => {
                return Err(ShapeError::EmptyAttribute { kind: "read" });
            }
            Request::Write { attribute, .. } if attribute.is_empty() => {
                return Err(ShapeError::EmptyAttribute { kind: "write" });
            }
            Request::Exec { operation, .. } if operation.trim().is_empty() => {
                return Err(ShapeError::EmptyOperation);
            }
            _ => {}
        }

        Ok(())
    }
}

/// A request as it travels to the transport, with its own processing
/// parameters (written as the `config` member of the request body).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRequest {
    #[serde(flatten)]
    pub request: Request,
    #[serde(skip_serializing_if = "ProcessingParams::is_empty")]
    pub config: ProcessingParams,
}

impl PreparedRequest {
    pub fn new(request: Request, config: ProcessingParams) -> Self {
        Self { request, config }
    }
}

impl From<Request> for PreparedRequest {
    fn from(request: Request) -> Self {
        Self {
            request,
            config: ProcessingParams::default(),
        }
    }
}
