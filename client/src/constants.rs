//! Central repository for protocol constants and default values
//!
//! Constants are grouped by the component that consumes them so the
//! dispatcher, transport and scheduler each have one place to look.

use std::time::Duration;

/// Protocol-level constants shared by the model and the dispatcher
pub mod protocol {
    /// Status code the agent uses for a successful request
    pub const STATUS_OK: u16 = 200;

    /// Status assigned to synthesized responses when no HTTP status is known
    pub const STATUS_TRANSPORT_FAILURE: u16 = 0;

    /// `error_type` of responses synthesized for transport failures
    pub const TRANSPORT_ERROR_TYPE: &str = "TransportError";

    /// `error_type` for a reply element that is not a protocol reply
    pub const MALFORMED_REPLY_TYPE: &str = "MalformedReply";

    /// `error_type` for a successful reply whose value has the wrong shape
    pub const DECODE_ERROR_TYPE: &str = "DecodeError";
}

/// HTTP transport constants
pub mod http {
    use super::Duration;

    /// Default agent endpoint
    pub const DEFAULT_URL: &str = "http://localhost:8778/jolokia";

    /// Default timeout for a single transport call
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for establishing connections to the agent
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Scheduler constants
pub mod scheduler {
    use super::Duration;

    /// Lower bound for a poll period; shorter values are clamped
    pub const MIN_PERIOD: Duration = Duration::from_millis(10);
}

/// Default configuration values
pub mod defaults {
    /// Default configuration directory for the poller binary
    pub const CONFIG_DIR: &str = "config";

    /// Environment variable overriding the configuration directory
    pub const CONFIG_DIR_ENV: &str = "JOLOKIA_CONFIG_DIR";

    /// Default transport timeout in seconds
    pub const TIMEOUT_SECONDS: u64 = 30;

    /// Default poll period in milliseconds
    pub const POLL_PERIOD_MS: u64 = 30_000;
}
