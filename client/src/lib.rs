pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod protocol;
pub mod scheduler;
pub mod transport;

// Re-export commonly used types
pub use client::{BulkOptions, Jolokia, RequestOptions, SimpleOptions};
pub use config::{ClientConfig, ConfigManager, JobConfig};
pub use errors::{ClientError, ConfigError, ShapeError, TransportError};
pub use protocol::{Attribute, ErrorResponse, Outcome, ProcessingParams, Request, Response};
pub use scheduler::{JobCallback, JobHandle, Scheduler};
pub use transport::{HttpMethod, HttpTransport, Transport};
