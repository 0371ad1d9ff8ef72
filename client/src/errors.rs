//! Error types for the Jolokia client
//!
//! Failures fall into three classes that callers route differently:
//! transport failures (no usable reply), protocol failures (a well-formed
//! reply with a status other than 200) and shape failures (a request rejected
//! before it was sent).

use std::fmt;

use crate::protocol::ErrorResponse;

/// Main error type for the client
#[derive(Debug)]
pub enum ClientError {
    /// The transport produced no usable reply
    Transport(TransportError),

    /// The agent answered with an error status
    Protocol(ErrorResponse),

    /// The request was rejected before dispatch
    Shape(ShapeError),

    /// Configuration-related errors
    Config(ConfigError),

    /// A successful reply whose value did not have the expected shape
    Decode { kind: &'static str, reason: String },
}

/// Transport error variants
#[derive(Debug, Clone)]
pub enum TransportError {
    /// Connection to the agent failed
    ConnectionFailed { url: String, reason: String },

    /// The agent did not answer in time
    Timeout { url: String },

    /// The agent answered with a non-success HTTP status
    Http { url: String, status: u16, body: String },

    /// The reply body was not a JSON reply of the expected shape
    InvalidPayload { url: String, reason: String },

    /// The number of replies does not match the number of requests
    CountMismatch { expected: usize, actual: usize },

    /// The HTTP method cannot carry this batch
    UnsupportedMethod { method: String, reason: String },

    /// The HTTP client could not be constructed
    Setup { reason: String },
}

/// Request shape error variants
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// MBean name or pattern is empty
    EmptyMBean { kind: &'static str },

    /// Attribute name is empty
    EmptyAttribute { kind: &'static str },

    /// Multi-attribute read with no attribute names
    EmptyAttributeList,

    /// Exec request with no operation name
    EmptyOperation,

    /// Bulk dispatch or job with no requests
    EmptyBatch,

    /// Per-request success callbacks given as an empty list
    NoCallbacks,
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

impl TransportError {
    /// HTTP status of the failed exchange, when the agent got that far
    pub fn http_status(&self) -> Option<u16> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a reqwest failure
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            TransportError::InvalidPayload {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            TransportError::ConnectionFailed {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "Transport error: {}", e),
            ClientError::Protocol(e) => write!(f, "Protocol error: {}", e),
            ClientError::Shape(e) => write!(f, "Invalid request: {}", e),
            ClientError::Config(e) => write!(f, "Configuration error: {}", e),
            ClientError::Decode { kind, reason } => {
                write!(f, "Failed to decode {} value: {}", kind, reason)
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionFailed { url, reason } => {
                write!(f, "Connection to {} failed: {}", url, reason)
            }
            TransportError::Timeout { url } => write!(f, "Timeout waiting for {}", url),
            TransportError::Http { url, status, body } => {
                if body.is_empty() {
                    write!(f, "{} answered with HTTP {}", url, status)
                } else {
                    write!(f, "{} answered with HTTP {}: {}", url, status, body)
                }
            }
            TransportError::InvalidPayload { url, reason } => {
                write!(f, "Invalid reply from {}: {}", url, reason)
            }
            TransportError::CountMismatch { expected, actual } => {
                write!(f, "Expected {} replies, got {}", expected, actual)
            }
            TransportError::UnsupportedMethod { method, reason } => {
                write!(f, "Cannot use {}: {}", method, reason)
            }
            TransportError::Setup { reason } => {
                write!(f, "Failed to create HTTP client: {}", reason)
            }
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::EmptyMBean { kind } => write!(f, "{} request needs an MBean name", kind),
            ShapeError::EmptyAttribute { kind } => {
                write!(f, "{} request has an empty attribute name", kind)
            }
            ShapeError::EmptyAttributeList => {
                write!(f, "read request has an empty attribute list")
            }
            ShapeError::EmptyOperation => write!(f, "exec request needs an operation name"),
            ShapeError::EmptyBatch => write!(f, "no requests given"),
            ShapeError::NoCallbacks => write!(f, "empty list of success callbacks"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl std::error::Error for ClientError {}
impl std::error::Error for TransportError {}
impl std::error::Error for ShapeError {}
impl std::error::Error for ConfigError {}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Transport(err)
    }
}

impl From<ErrorResponse> for ClientError {
    fn from(err: ErrorResponse) -> Self {
        ClientError::Protocol(err)
    }
}

impl From<ShapeError> for ClientError {
    fn from(err: ShapeError) -> Self {
        ClientError::Shape(err)
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        ClientError::Config(err)
    }
}
