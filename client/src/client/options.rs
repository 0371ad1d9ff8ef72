//! Per-call options for the dispatcher.
//!
//! Whether a call waits for its reply or hands it to a callback is chosen by
//! [`Completion`], never by which fields happen to be filled in.

use std::sync::Arc;

use crate::errors::TransportError;
use crate::protocol::{ErrorResponse, ProcessingParams, Response};

pub type ResponseFn = Arc<dyn Fn(Response) + Send + Sync>;
pub type ErrorFn = Arc<dyn Fn(ErrorResponse) + Send + Sync>;
pub type TransportErrorFn = Arc<dyn Fn(&TransportError) + Send + Sync>;
pub type ValueFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// How a dispatched call completes
#[derive(Clone)]
pub enum Completion<S> {
    /// Await the reply and return it to the caller
    Sync,
    /// Return immediately; the reply goes to the success handler
    Callback(S),
}

impl<S> Default for Completion<S> {
    fn default() -> Self {
        Completion::Sync
    }
}

impl<S> Completion<S> {
    pub fn is_sync(&self) -> bool {
        matches!(self, Completion::Sync)
    }
}

/// Options of a single-request call
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub params: ProcessingParams,
    pub completion: Completion<ResponseFn>,
    pub error: Option<ErrorFn>,
    pub transport_error: Option<TransportErrorFn>,
}

impl RequestOptions {
    pub fn sync() -> Self {
        Self::default()
    }

    pub fn callback(success: impl Fn(Response) + Send + Sync + 'static) -> Self {
        Self {
            completion: Completion::Callback(Arc::new(success)),
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: ProcessingParams) -> Self {
        self.params = params;
        self
    }

    pub fn on_error(mut self, error: impl Fn(ErrorResponse) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(error));
        self
    }

    pub fn on_transport_error(
        mut self,
        handler: impl Fn(&TransportError) + Send + Sync + 'static,
    ) -> Self {
        self.transport_error = Some(Arc::new(handler));
        self
    }
}

/// Success handlers of a bulk call
#[derive(Clone)]
pub enum BulkSuccess {
    /// One handler receives every successful response
    Each(ResponseFn),
    /// Handlers matched to requests by position; a shorter list wraps around
    PerRequest(Vec<ResponseFn>),
}

impl BulkSuccess {
    pub(crate) fn for_index(&self, index: usize) -> Option<&ResponseFn> {
        match self {
            BulkSuccess::Each(handler) => Some(handler),
            BulkSuccess::PerRequest(handlers) if handlers.is_empty() => None,
            BulkSuccess::PerRequest(handlers) => handlers.get(index % handlers.len()),
        }
    }
}

/// Options of a bulk call; `error` and `transport_error` are shared by all requests
#[derive(Clone, Default)]
pub struct BulkOptions {
    pub params: ProcessingParams,
    pub completion: Completion<BulkSuccess>,
    pub error: Option<ErrorFn>,
    pub transport_error: Option<TransportErrorFn>,
}

impl BulkOptions {
    pub fn sync() -> Self {
        Self::default()
    }

    pub fn each(success: impl Fn(Response) + Send + Sync + 'static) -> Self {
        Self {
            completion: Completion::Callback(BulkSuccess::Each(Arc::new(success))),
            ..Self::default()
        }
    }

    pub fn per_request(handlers: Vec<ResponseFn>) -> Self {
        Self {
            completion: Completion::Callback(BulkSuccess::PerRequest(handlers)),
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: ProcessingParams) -> Self {
        self.params = params;
        self
    }

    pub fn on_error(mut self, error: impl Fn(ErrorResponse) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(error));
        self
    }

    pub fn on_transport_error(
        mut self,
        handler: impl Fn(&TransportError) + Send + Sync + 'static,
    ) -> Self {
        self.transport_error = Some(Arc::new(handler));
        self
    }
}

/// Options of the simple API; `success` receives the unwrapped value
pub struct SimpleOptions<T> {
    pub params: ProcessingParams,
    pub success: Option<ValueFn<T>>,
    pub error: Option<ErrorFn>,
    pub transport_error: Option<TransportErrorFn>,
}

impl<T> Default for SimpleOptions<T> {
    fn default() -> Self {
        Self {
            params: ProcessingParams::default(),
            success: None,
            error: None,
            transport_error: None,
        }
    }
}

impl<T> Clone for SimpleOptions<T> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            success: self.success.clone(),
            error: self.error.clone(),
            transport_error: self.transport_error.clone(),
        }
    }
}

impl<T> SimpleOptions<T> {
    pub fn callback(success: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            success: Some(Arc::new(success)),
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: ProcessingParams) -> Self {
        self.params = params;
        self
    }

    pub fn on_error(mut self, error: impl Fn(ErrorResponse) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(error));
        self
    }

    pub fn on_transport_error(
        mut self,
        handler: impl Fn(&TransportError) + Send + Sync + 'static,
    ) -> Self {
        self.transport_error = Some(Arc::new(handler));
        self
    }
}
