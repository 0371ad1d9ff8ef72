use std::sync::Arc;

use crate::client::{report_protocol_error, ErrorFn, ResponseFn};
use crate::errors::TransportError;
use crate::protocol::{ErrorResponse, Outcome, ProcessingParams, Request, Response};

/// Handle of a registered job; never reused by the scheduler that issued it
pub type JobHandle = u64;

pub type BatchFn = Arc<dyn Fn(Vec<Outcome>) + Send + Sync>;

/// Where a job's replies go
#[derive(Clone)]
pub enum JobCallback {
    /// Called once per poll with all of the job's outcomes, in request order
    Batch(BatchFn),
    /// Called once per outcome: successes to `success`, failures to `error`
    Handlers {
        success: Option<ResponseFn>,
        error: Option<ErrorFn>,
    },
}

impl JobCallback {
    pub fn batch(callback: impl Fn(Vec<Outcome>) + Send + Sync + 'static) -> Self {
        JobCallback::Batch(Arc::new(callback))
    }

    pub fn handlers(
        success: impl Fn(Response) + Send + Sync + 'static,
        error: impl Fn(ErrorResponse) + Send + Sync + 'static,
    ) -> Self {
        JobCallback::Handlers {
            success: Some(Arc::new(success)),
            error: Some(Arc::new(error)),
        }
    }

    pub fn on_success(success: impl Fn(Response) + Send + Sync + 'static) -> Self {
        JobCallback::Handlers {
            success: Some(Arc::new(success)),
            error: None,
        }
    }
}

pub(crate) struct Job {
    pub handle: JobHandle,
    pub requests: Vec<Request>,
    pub callback: JobCallback,
    pub params: ProcessingParams,
}

impl Job {
    /// Hand the job exactly its own outcomes
    pub fn deliver(&self, outcomes: Vec<Outcome>) {
        match &self.callback {
            JobCallback::Batch(callback) => callback(outcomes),
            JobCallback::Handlers { success, error } => {
                for outcome in outcomes {
                    match outcome {
                        Ok(response) => {
                            if let Some(success) = success {
                                success(response);
                            }
                        }
                        Err(failed) => {
                            report_protocol_error(failed, error.as_ref(), self.params.ignores_errors())
                        }
                    }
                }
            }
        }
    }

    /// The whole poll failed: one synthesized error for this job
    pub fn deliver_transport_failure(&self, err: &TransportError) {
        let Some(first) = self.requests.first() else {
            return;
        };
        let stand_in = ErrorResponse::transport(err, first.clone());

        match &self.callback {
            JobCallback::Batch(callback) => callback(vec![Err(stand_in)]),
            JobCallback::Handlers { error, .. } => report_protocol_error(stand_in, error.as_ref(), false),
        }
    }
}
