pub mod manager;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{defaults, http};
use crate::errors::ConfigError;
use crate::protocol::{ProcessingParams, Request};
use crate::transport::HttpMethod;

pub use manager::ConfigManager;

/// Client settings from `main.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_poll_period_ms")]
    pub poll_period_ms: u64,
    // Dispatcher-wide processing parameters
    #[serde(default)]
    pub params: ProcessingParams,
    // Populated from the job files next to main.toml
    #[serde(skip)]
    pub jobs: Vec<JobConfig>,
}

fn default_url() -> String {
    http::DEFAULT_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    defaults::TIMEOUT_SECONDS
}

fn default_poll_period_ms() -> u64 {
    defaults::POLL_PERIOD_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            method: HttpMethod::default(),
            timeout_seconds: default_timeout_seconds(),
            username: None,
            password: None,
            poll_period_ms: default_poll_period_ms(),
            params: ProcessingParams::default(),
            jobs: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "url".to_string(),
            });
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.url),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.poll_period_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_period_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::MissingRequired {
                field: "username".to_string(),
            });
        }
        for job in &self.jobs {
            job.validate()?;
        }
        Ok(())
    }
}

/// One polling job declared in a job file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub requests: Vec<Request>,
    #[serde(default)]
    pub params: ProcessingParams,
}

impl JobConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("jobs.{}.requests", self.name),
                reason: "a job needs at least one request".to_string(),
            });
        }
        for request in &self.requests {
            request.validate().map_err(|e| ConfigError::InvalidValue {
                field: format!("jobs.{}.requests", self.name),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Layout of a job file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}
