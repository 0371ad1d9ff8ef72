use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use super::Transport;
use crate::config::ClientConfig;
use crate::constants::http::{CONNECT_TIMEOUT, REQUEST_TIMEOUT};
use crate::errors::TransportError;
use crate::protocol::{Attribute, PreparedRequest, ProcessingParams, Request};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "POST")]
    Post,
    #[serde(alias = "GET")]
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
            HttpMethod::Get => "GET",
        }
    }
}

/// reqwest-backed transport talking to one agent URL
pub struct HttpTransport {
    client: Client,
    url: String,
    method: HttpMethod,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::build(url.into(), HttpMethod::Post, REQUEST_TIMEOUT, None, None)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::build(
            config.url.clone(),
            config.method,
            Duration::from_secs(config.timeout_seconds),
            config.username.clone(),
            config.password.clone(),
        )
    }

    fn build(
        url: String,
        method: HttpMethod,
        timeout: Duration,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Setup {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            url,
            method,
            username,
            password,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    #[instrument(skip(self, batch, params), fields(url = %self.url, size = batch.len()))]
    async fn post(
        &self,
        batch: &[PreparedRequest],
        params: &ProcessingParams,
    ) -> Result<Vec<Value>, TransportError> {
        let builder = self
            .client
            .post(&self.url)
            .query(&params.to_query())
            .json(batch);

        let body = self.exchange(&self.url, builder).await?;
        match body {
            Value::Array(replies) => Ok(replies),
            reply @ Value::Object(_) if batch.len() == 1 => Ok(vec![reply]),
            other => Err(TransportError::InvalidPayload {
                url: self.url.clone(),
                reason: format!("expected a JSON array of replies, got {}", other),
            }),
        }
    }

    #[instrument(skip(self, batch, params), fields(url = %self.url))]
    async fn get(
        &self,
        batch: &[PreparedRequest],
        params: &ProcessingParams,
    ) -> Result<Vec<Value>, TransportError> {
        let prepared = match batch {
            [single] => single,
            _ => {
                return Err(TransportError::UnsupportedMethod {
                    method: HttpMethod::Get.as_str().to_string(),
                    reason: format!("bulk request of {} requests", batch.len()),
                })
            }
        };

        let url = build_get_url(&self.url, &prepared.request)?;
        let query = params.overlay(&prepared.config).to_query();
        let builder = self.client.get(url.as_str()).query(&query);

        let reply = self.exchange(url.as_str(), builder).await?;
        Ok(vec![reply])
    }

    async fn exchange(&self, url: &str, builder: RequestBuilder) -> Result<Value, TransportError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;
        debug!("Received {} bytes from {}", text.len(), url);

        serde_json::from_str(&text).map_err(|e| TransportError::InvalidPayload {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(
        &'a self,
        batch: &'a [PreparedRequest],
        params: &'a ProcessingParams,
    ) -> BoxFuture<'a, Result<Vec<Value>, TransportError>> {
        match self.method {
            HttpMethod::Post => self.post(batch, params).boxed(),
            HttpMethod::Get => self.get(batch, params).boxed(),
        }
    }
}

/// Escape a path part the way the agent expects: `!` → `!!`, `/` → `!/`.
pub fn escape_part(part: &str) -> String {
    part.replace('!', "!!").replace('/', "!/")
}

fn value_part(value: &Value) -> String {
    match value {
        Value::Null => "[null]".to_string(),
        Value::String(s) if s.is_empty() => "\"\"".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_part).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Path segments encoding a request for GET. Inner paths are already in
/// the agent's path notation and are split, not escaped.
pub fn get_segments(request: &Request) -> Result<Vec<String>, TransportError> {
    let mut segments = vec![request.kind().to_string()];
    let inner_path = |segments: &mut Vec<String>, path: &Option<String>| {
        if let Some(path) = path {
            segments.extend(path.split('/').filter(|p| !p.is_empty()).map(str::to_string));
        }
    };

    match request {
        Request::Read {
            mbean,
            attribute,
            path,
        } => {
            segments.push(escape_part(mbean));
            match attribute {
                Some(Attribute::Single(name)) => {
                    segments.push(escape_part(name));
                    inner_path(&mut segments, path);
                }
                Some(Attribute::Multiple(_)) => {
                    return Err(TransportError::UnsupportedMethod {
                        method: HttpMethod::Get.as_str().to_string(),
                        reason: "read of multiple attributes".to_string(),
                    })
                }
                None => {}
            }
        }
        Request::Write {
            mbean,
            attribute,
            value,
            path,
        } => {
            segments.push(escape_part(mbean));
            segments.push(escape_part(attribute));
            segments.push(escape_part(&value_part(value)));
            inner_path(&mut segments, path);
        }
        Request::Exec {
            mbean,
            operation,
            arguments,
        } => {
            segments.push(escape_part(mbean));
            segments.push(escape_part(operation));
            segments.extend(arguments.iter().map(|a| escape_part(&value_part(a))));
        }
        Request::Search { mbean } => segments.push(escape_part(mbean)),
        Request::List { path } => inner_path(&mut segments, path),
        Request::Version => {}
    }

    Ok(segments)
}

pub fn build_get_url(base: &str, request: &Request) -> Result<Url, TransportError> {
    let mut url = Url::parse(base).map_err(|e| TransportError::Setup {
        reason: format!("invalid agent URL '{}': {}", base, e),
    })?;
    let segments = get_segments(request)?;

    url.path_segments_mut()
        .map_err(|_| TransportError::Setup {
            reason: format!("agent URL '{}' cannot carry a path", base),
        })?
        .pop_if_empty()
        .extend(segments.iter());

    Ok(url)
}
