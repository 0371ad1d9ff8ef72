//! Common test data and constants

use serde_json::{json, Value};

/// Common test MBean names
pub mod mbeans {
    pub const MEMORY: &str = "java.lang:type=Memory";
    pub const RUNTIME: &str = "java.lang:type=Runtime";
    pub const THREADING: &str = "java.lang:type=Threading";
    pub const MISSING: &str = "java.lang:type=Missing";
    pub const CATALINA: &str = "Catalina:type=Server";
}

/// Credentials accepted by the secured mock agent
pub mod auth {
    pub const USERNAME: &str = "jmx";
    pub const PASSWORD: &str = "secret";
    /// `Authorization` header for USERNAME:PASSWORD
    pub const BASIC_HEADER: &str = "Basic am14OnNlY3JldA==";
}

pub fn heap_usage() -> Value {
    json!({
        "init": 268435456,
        "committed": 257425408,
        "max": 4294967296u64,
        "used": 49315720
    })
}

pub fn version_value() -> Value {
    json!({
        "protocol": "7.2",
        "agent": "1.7.2",
        "config": {
            "agentId": "10.0.0.5-4242-6c1d-jvm",
            "agentType": "jvm",
            "maxDepth": "15"
        },
        "info": {
            "product": "tomcat",
            "vendor": "Apache",
            "version": "9.0.80"
        }
    })
}

/// Successful reply with the given value
pub fn ok_reply(value: Value) -> Value {
    json!({
        "status": 200,
        "timestamp": 1700000000,
        "request": {"type": "read"},
        "value": value
    })
}

/// Error reply as the agent sends it
pub fn error_reply(status: u16, error_type: &str, error: &str) -> Value {
    json!({
        "status": status,
        "timestamp": 1700000000,
        "error_type": error_type,
        "error": error,
        "stacktrace": format!("{}: {}\n\tat Agent.handle", error_type, error)
    })
}
