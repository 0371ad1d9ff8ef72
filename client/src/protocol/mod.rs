//! Protocol model: the vocabulary shared by the dispatcher, the transport and
//! the scheduler.
//!
//! # Wire format
//!
//! ```text
//! POST /jolokia?maxDepth=3
//! [{"type":"read","mbean":"java.lang:type=Memory","attribute":"HeapMemoryUsage"},
//!  {"type":"version"}]
//!
//! [{"status":200,"timestamp":1700000000,"request":{...},"value":{...}},
//!  {"status":200,"timestamp":1700000000,"request":{...},"value":{...}}]
//! ```
//!
//! Replies arrive in request order; a status other than 200 marks an error
//! reply carrying `error_type`, `error` and optionally `stacktrace`.

pub mod meta;
pub mod params;
pub mod request;
pub mod response;

pub use meta::{JmxAttribute, JmxDomain, JmxDomains, JmxMBean, JmxOperation, Version};
pub use params::ProcessingParams;
pub use request::{Attribute, PreparedRequest, Request};
pub use response::{parse_outcome, ErrorResponse, HistoryEntry, Outcome, Response};
