//! In-process transport with scripted replies
//!
//! Records every batch it is handed. Replies come from the script when one
//! is queued, otherwise from the responder, which by default answers every
//! request with status 200.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use jolokia_client::protocol::{PreparedRequest, ProcessingParams, Request};
use jolokia_client::{Transport, TransportError};

use super::test_data::ok_reply;

type Responder = Box<dyn Fn(&Request) -> Value + Send + Sync>;

pub struct StubTransport {
    calls: Mutex<Vec<Vec<PreparedRequest>>>,
    params: Mutex<Vec<ProcessingParams>>,
    script: Mutex<VecDeque<Result<Vec<Value>, TransportError>>>,
    responder: Responder,
    gate: Option<Arc<Notify>>,
}

impl StubTransport {
    /// Every request succeeds with its MBean name (or kind) as value
    pub fn new() -> Self {
        Self::with_responder(|request| {
            ok_reply(Value::String(
                request.mbean().unwrap_or(request.kind()).to_string(),
            ))
        })
    }

    pub fn with_responder(responder: impl Fn(&Request) -> Value + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            params: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            responder: Box::new(responder),
            gate: None,
        }
    }

    /// Hold every call until the returned gate is notified
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// Queue the result of the next call
    pub fn push_result(&self, result: Result<Vec<Value>, TransportError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<Vec<PreparedRequest>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn seen_params(&self) -> Vec<ProcessingParams> {
        self.params.lock().unwrap().clone()
    }
}

impl Default for StubTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for StubTransport {
    fn send<'a>(
        &'a self,
        batch: &'a [PreparedRequest],
        params: &'a ProcessingParams,
    ) -> BoxFuture<'a, Result<Vec<Value>, TransportError>> {
        self.calls.lock().unwrap().push(batch.to_vec());
        self.params.lock().unwrap().push(params.clone());

        let scripted = self.script.lock().unwrap().pop_front();
        let result = scripted.unwrap_or_else(|| {
            Ok(batch
                .iter()
                .map(|prepared| (self.responder)(&prepared.request))
                .collect())
        });
        let gate = self.gate.clone();

        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            result
        }
        .boxed()
    }
}
