//! Transport layer between the dispatcher and the remote agent
//!
//! # Contract
//!
//! ```text
//! Dispatcher → send(batch, params) → Agent
//!     ↑                                 ↓
//!  demux by position ← Vec<Value> (one reply per request, same order)
//! ```
//!
//! A transport only moves JSON. It reports failures of the exchange itself
//! (connectivity, HTTP status, unparseable body) as [`TransportError`];
//! error statuses inside individual replies are left for the dispatcher.

pub mod http;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::TransportError;
use crate::protocol::{PreparedRequest, ProcessingParams};

pub use http::{HttpMethod, HttpTransport};

pub trait Transport: Send + Sync {
    /// Send one batch and return the raw replies in request order
    fn send<'a>(
        &'a self,
        batch: &'a [PreparedRequest],
        params: &'a ProcessingParams,
    ) -> BoxFuture<'a, Result<Vec<Value>, TransportError>>;
}
