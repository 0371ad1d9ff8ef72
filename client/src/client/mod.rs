//! Request dispatcher
//!
//! Turns one or more requests into a single transport call and routes the
//! replies back to the caller.
//!
//! # Modes
//!
//! - **Sync**: the call awaits the transport and returns the response
//!   (`None` on any failure, after the error handlers ran)
//! - **Callback**: the call spawns the dispatch on the tokio runtime, returns
//!   `None` at once and hands the reply to the success handler later
//!
//! # Failure routing
//!
//! - Reply with status other than 200 → `error` (logged at warn when unset)
//! - Unreadable element of a reply → `error`, for that request only
//! - No usable reply at all → `transport_error` (logged at error when unset)
//! - Malformed request → `Err(ShapeError)`, nothing is sent

pub mod options;

pub use options::{
    BulkOptions, BulkSuccess, Completion, ErrorFn, RequestOptions, ResponseFn, SimpleOptions,
    TransportErrorFn, ValueFn,
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::config::ClientConfig;
use crate::constants::protocol::DECODE_ERROR_TYPE;
use crate::errors::{ClientError, ShapeError, TransportError};
use crate::protocol::{
    parse_outcome, Attribute, ErrorResponse, JmxDomains, Outcome, PreparedRequest,
    ProcessingParams, Request, Response, Version,
};
use crate::transport::{HttpTransport, Transport};

/// Client for one agent. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Jolokia {
    transport: Arc<dyn Transport>,
    defaults: Arc<ProcessingParams>,
}

impl Jolokia {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            defaults: Arc::new(ProcessingParams::default()),
        }
    }

    /// Client over HTTP, configured from `main.toml` settings
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport)).with_defaults(config.params.clone()))
    }

    /// Processing parameters applied to every call unless overridden
    pub fn with_defaults(mut self, params: ProcessingParams) -> Self {
        self.defaults = Arc::new(params);
        self
    }

    pub fn defaults(&self) -> &ProcessingParams {
        &self.defaults
    }

    /// One transport call for the whole batch; replies come back in batch order.
    #[instrument(skip_all, fields(size = batch.len()))]
    pub(crate) async fn dispatch(
        &self,
        batch: Vec<PreparedRequest>,
        params: &ProcessingParams,
    ) -> Result<Vec<Outcome>, TransportError> {
        let params = self.defaults.overlay(params);
        let replies = self.transport.send(&batch, &params).await?;

        if replies.len() != batch.len() {
            return Err(TransportError::CountMismatch {
                expected: batch.len(),
                actual: replies.len(),
            });
        }

        // A bad element only fails its own request
        let outcomes = batch
            .into_iter()
            .zip(replies)
            .enumerate()
            .map(|(index, (prepared, raw))| {
                parse_outcome(raw, &prepared.request).unwrap_or_else(|e| {
                    warn!(
                        "Reply #{} to {} request is malformed: {}",
                        index,
                        prepared.request.kind(),
                        e
                    );
                    Err(ErrorResponse::malformed(e.to_string(), prepared.request))
                })
            })
            .collect();
        Ok(outcomes)
    }

    async fn dispatch_one(
        &self,
        request: Request,
        params: &ProcessingParams,
    ) -> Result<Outcome, TransportError> {
        let mut outcomes = self.dispatch(vec![request.into()], params).await?;
        outcomes.pop().ok_or(TransportError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    /// Send one request.
    ///
    /// Returns the response in sync mode when the agent answered with status
    /// 200, `None` otherwise (and always `None` in callback mode).
    pub async fn request(
        &self,
        request: Request,
        options: RequestOptions,
    ) -> Result<Option<Response>, ShapeError> {
        request.validate()?;

        let RequestOptions {
            params,
            completion,
            error,
            transport_error,
        } = options;
        let quiet = self.defaults.overlay(&params).ignores_errors();

        match completion {
            Completion::Sync => {
                let outcome = self.dispatch_one(request, &params).await;
                Ok(route_single(outcome, None, error.as_ref(), transport_error.as_ref(), quiet))
            }
            Completion::Callback(success) => {
                let client = self.clone();
                tokio::spawn(async move {
                    let outcome = client.dispatch_one(request, &params).await;
                    route_single(
                        outcome,
                        Some(&success),
                        error.as_ref(),
                        transport_error.as_ref(),
                        quiet,
                    );
                });
                Ok(None)
            }
        }
    }

    /// Send one request and surface every failure to the caller.
    pub async fn try_request(
        &self,
        request: Request,
        params: &ProcessingParams,
    ) -> Result<Response, ClientError> {
        request.validate()?;
        let response = self.dispatch_one(request, params).await??;
        Ok(response)
    }

    /// Send several requests in one transport call.
    ///
    /// In sync mode every outcome is returned in request order; failed
    /// outcomes are also handed to `error`. In callback mode the outcomes are
    /// routed by position to the success handlers.
    pub async fn bulk_request(
        &self,
        requests: Vec<Request>,
        options: BulkOptions,
    ) -> Result<Option<Vec<Outcome>>, ShapeError> {
        if requests.is_empty() {
            return Err(ShapeError::EmptyBatch);
        }
        for request in &requests {
            request.validate()?;
        }
        if let Completion::Callback(BulkSuccess::PerRequest(handlers)) = &options.completion {
            if handlers.is_empty() {
                return Err(ShapeError::NoCallbacks);
            }
        }

        let BulkOptions {
            params,
            completion,
            error,
            transport_error,
        } = options;
        let quiet = self.defaults.overlay(&params).ignores_errors();
        let batch: Vec<PreparedRequest> = requests.into_iter().map(PreparedRequest::from).collect();

        match completion {
            Completion::Sync => match self.dispatch(batch, &params).await {
                Ok(outcomes) => {
                    for failed in outcomes.iter().filter_map(|o| o.as_ref().err()) {
                        report_protocol_error(failed.clone(), error.as_ref(), quiet);
                    }
                    Ok(Some(outcomes))
                }
                Err(e) => {
                    report_transport_error(&e, transport_error.as_ref());
                    Ok(None)
                }
            },
            Completion::Callback(success) => {
                let client = self.clone();
                tokio::spawn(async move {
                    match client.dispatch(batch, &params).await {
                        Ok(outcomes) => {
                            for (index, outcome) in outcomes.into_iter().enumerate() {
                                match outcome {
                                    Ok(response) => {
                                        if let Some(handler) = success.for_index(index) {
                                            handler(response);
                                        }
                                    }
                                    Err(failed) => {
                                        report_protocol_error(failed, error.as_ref(), quiet)
                                    }
                                }
                            }
                        }
                        Err(e) => report_transport_error(&e, transport_error.as_ref()),
                    }
                });
                Ok(None)
            }
        }
    }

    // === Simple API ===

    async fn simple<T, F>(
        &self,
        request: Request,
        options: SimpleOptions<T>,
        extract: F,
    ) -> Result<Option<T>, ShapeError>
    where
        T: Send + 'static,
        F: Fn(Value) -> Result<Option<T>, ClientError> + Send + Sync + 'static,
    {
        let SimpleOptions {
            params,
            success,
            error,
            transport_error,
        } = options;
        let quiet = self.defaults.overlay(&params).ignores_errors();
        let extract = Arc::new(extract);

        let completion = match success {
            None => Completion::Sync,
            Some(on_value) => {
                let extract = extract.clone();
                let error = error.clone();
                let handler: ResponseFn = Arc::new(move |response: Response| {
                    if let Some(value) = extract_value(&*extract, response, error.as_ref(), quiet) {
                        on_value(value);
                    }
                });
                Completion::Callback(handler)
            }
        };

        let response = self
            .request(
                request,
                RequestOptions {
                    params,
                    completion,
                    error: error.clone(),
                    transport_error,
                },
            )
            .await?;

        Ok(response.and_then(|r| extract_value(&*extract, r, error.as_ref(), quiet)))
    }

    /// Value of an attribute; all attributes when `attribute` is `None`.
    pub async fn get_attribute(
        &self,
        mbean: &str,
        attribute: Option<Attribute>,
        path: Option<&str>,
        options: SimpleOptions<Value>,
    ) -> Result<Option<Value>, ShapeError> {
        let request = Request::Read {
            mbean: mbean.to_string(),
            attribute,
            path: path.map(str::to_string),
        };
        self.simple(request, options, |v| Ok(Some(v))).await
    }

    /// Set an attribute; yields the previous value.
    pub async fn set_attribute(
        &self,
        mbean: &str,
        attribute: &str,
        value: Value,
        path: Option<&str>,
        options: SimpleOptions<Value>,
    ) -> Result<Option<Value>, ShapeError> {
        let request = Request::Write {
            mbean: mbean.to_string(),
            attribute: attribute.to_string(),
            value,
            path: path.map(str::to_string),
        };
        self.simple(request, options, |v| Ok(Some(v))).await
    }

    /// Invoke an operation; yields its return value.
    pub async fn execute(
        &self,
        mbean: &str,
        operation: &str,
        arguments: Vec<Value>,
        options: SimpleOptions<Value>,
    ) -> Result<Option<Value>, ShapeError> {
        self.simple(Request::exec(mbean, operation, arguments), options, |v| {
            Ok(Some(v))
        })
        .await
    }

    /// Names of the MBeans matching a pattern; `None` when nothing matches.
    pub async fn search(
        &self,
        pattern: &str,
        options: SimpleOptions<Vec<String>>,
    ) -> Result<Option<Vec<String>>, ShapeError> {
        self.simple(Request::search(pattern), options, |value| {
            let names = decode::<Vec<String>>("search", value)?;
            Ok(Some(names).filter(|names| !names.is_empty()))
        })
        .await
    }

    /// Raw meta information, optionally narrowed by an inner path
    pub async fn list(
        &self,
        path: Option<&str>,
        options: SimpleOptions<Value>,
    ) -> Result<Option<Value>, ShapeError> {
        self.simple(Request::list(path), options, |v| Ok(Some(v)))
            .await
    }

    /// Complete meta information, typed
    pub async fn list_domains(
        &self,
        options: SimpleOptions<JmxDomains>,
    ) -> Result<Option<JmxDomains>, ShapeError> {
        self.simple(Request::list(None), options, |value| {
            decode::<JmxDomains>("list", value).map(Some)
        })
        .await
    }

    pub async fn version(
        &self,
        options: SimpleOptions<Version>,
    ) -> Result<Option<Version>, ShapeError> {
        self.simple(Request::version(), options, |value| {
            decode::<Version>("version", value).map(Some)
        })
        .await
    }
}

fn decode<T: DeserializeOwned>(kind: &'static str, value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode {
        kind,
        reason: e.to_string(),
    })
}

/// Pull the typed value out of a successful reply. Decode failures go to the
/// error handler like any other failed request.
fn extract_value<T>(
    extract: &dyn Fn(Value) -> Result<Option<T>, ClientError>,
    response: Response,
    error: Option<&ErrorFn>,
    quiet: bool,
) -> Option<T> {
    match extract(response.value) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!("{} request yielded no value", response.request.kind());
            None
        }
        Err(e) => {
            let failed = ErrorResponse::local(DECODE_ERROR_TYPE, e.to_string(), response.request);
            report_protocol_error(failed, error, quiet);
            None
        }
    }
}

fn route_single(
    outcome: Result<Outcome, TransportError>,
    success: Option<&ResponseFn>,
    error: Option<&ErrorFn>,
    transport_error: Option<&TransportErrorFn>,
    quiet: bool,
) -> Option<Response> {
    match outcome {
        Ok(Ok(response)) => match success {
            Some(handler) => {
                handler(response);
                None
            }
            None => Some(response),
        },
        Ok(Err(failed)) => {
            report_protocol_error(failed, error, quiet);
            None
        }
        Err(e) => {
            report_transport_error(&e, transport_error);
            None
        }
    }
}

pub(crate) fn report_protocol_error(failed: ErrorResponse, handler: Option<&ErrorFn>, quiet: bool) {
    match handler {
        Some(handler) => handler(failed),
        None if quiet => debug!("Ignoring failed {} request: {}", failed.request.kind(), failed),
        None => warn!("{}", failed),
    }
}

pub(crate) fn report_transport_error(err: &TransportError, handler: Option<&TransportErrorFn>) {
    match handler {
        Some(handler) => handler(err),
        None => error!("Transport failure: {}", err),
    }
}
