//! This module provides reusable test utilities:
//! - A fake agent served over HTTP by wiremock
//! - A scripted in-process transport
//! - Test configuration builders
//! - Common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_agent;
pub mod stub_transport;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_agent::{FakeAgent, MockAgentServer};
pub use stub_transport::StubTransport;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
