//! Polling scheduler
//!
//! Re-issues the requests of every registered job on a fixed period, using
//! one bulk dispatch per tick, and hands each job exactly its own replies.
//!
//! # Lifecycle
//!
//! ```text
//! stopped --start(period)--> running --stop()--> stopped
//!              running --start(p)--> running   (period update only)
//! ```
//!
//! # Guarantees
//!
//! - **One dispatch per tick**: all jobs share a single transport call
//! - **Backpressure**: a tick is skipped while the previous one is in flight
//! - **Isolation**: one job's failure or panic never affects its siblings
//! - **Snapshot**: jobs registered mid-tick join from the next tick on
//! - **Quiet stop**: after `stop()` or `unregister()`, in-flight replies are
//!   discarded instead of delivered

pub mod job;

pub use job::{BatchFn, JobCallback, JobHandle};

use std::collections::BTreeMap;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::client::Jolokia;
use crate::constants::scheduler::MIN_PERIOD;
use crate::errors::ShapeError;
use crate::protocol::{Outcome, PreparedRequest, ProcessingParams, Request};
use job::Job;

/// Polling scheduler bound to one client. Clones share the same job table
/// and timer.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    client: Jolokia,
    jobs: Mutex<BTreeMap<JobHandle, Arc<Job>>>,
    next_handle: AtomicU64,
    run: Mutex<RunState>,
    in_flight: AtomicBool,
}

#[derive(Default)]
struct RunState {
    epoch: u64,
    period: Duration,
    // Dropping the sender stops the ticker
    ticker: Option<watch::Sender<Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Scheduler {
    pub fn new(client: Jolokia) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                jobs: Mutex::new(BTreeMap::new()),
                next_handle: AtomicU64::new(1),
                run: Mutex::new(RunState::default()),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    pub fn client(&self) -> &Jolokia {
        &self.inner.client
    }

    /// Register a job; it is polled from the next tick on.
    pub fn register(
        &self,
        callback: JobCallback,
        requests: Vec<Request>,
    ) -> Result<JobHandle, ShapeError> {
        self.register_with_params(callback, requests, ProcessingParams::default())
    }

    /// Register a job whose requests carry their own processing parameters.
    pub fn register_with_params(
        &self,
        callback: JobCallback,
        requests: Vec<Request>,
        params: ProcessingParams,
    ) -> Result<JobHandle, ShapeError> {
        if requests.is_empty() {
            return Err(ShapeError::EmptyBatch);
        }
        for request in &requests {
            request.validate()?;
        }

        let handle = self.inner.next_handle.fetch_add(1, Ordering::SeqCst);
        let job = Job {
            handle,
            requests,
            callback,
            params,
        };
        let size = job.requests.len();
        lock(&self.inner.jobs).insert(handle, Arc::new(job));

        debug!("Registered job {} with {} requests", handle, size);
        Ok(handle)
    }

    /// Remove a job. Unknown handles are ignored.
    pub fn unregister(&self, handle: JobHandle) {
        if lock(&self.inner.jobs).remove(&handle).is_some() {
            debug!("Unregistered job {}", handle);
        }
    }

    /// Handles of the registered jobs, ascending
    pub fn jobs(&self) -> Vec<JobHandle> {
        lock(&self.inner.jobs).keys().copied().collect()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner.run).ticker.is_some()
    }

    /// Current period while running
    pub fn period(&self) -> Option<Duration> {
        let run = lock(&self.inner.run);
        run.ticker.as_ref().map(|_| run.period)
    }

    /// Start polling every `period`. While already running only the period
    /// changes; the next tick is due one new period after the last one.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&self, period: Duration) {
        let period = period.max(MIN_PERIOD);
        let mut run = lock(&self.inner.run);
        run.period = period;

        if let Some(ticker) = &run.ticker {
            ticker.send_replace(period);
            debug!("Scheduler period changed to {:?}", period);
            return;
        }

        run.epoch += 1;
        let epoch = run.epoch;
        let (period_tx, period_rx) = watch::channel(period);
        run.ticker = Some(period_tx);
        drop(run);

        tokio::spawn(run_ticker(Arc::downgrade(&self.inner), epoch, period_rx));
        info!(
            "Scheduler started with period {:?} and {} jobs",
            period,
            lock(&self.inner.jobs).len()
        );
    }

    /// Stop polling. Safe to call from a job callback; a no-op when stopped.
    pub fn stop(&self) {
        let ticker = lock(&self.inner.run).ticker.take();
        if ticker.is_some() {
            info!("Scheduler stopped");
        }
    }

    /// Run one tick right away, outside the timer.
    pub async fn poll_once(&self) {
        let epoch = {
            let run = lock(&self.inner.run);
            run.ticker.as_ref().map(|_| run.epoch)
        };
        self.inner.tick(epoch).await;
    }
}

impl Inner {
    fn is_current(&self, epoch: u64) -> bool {
        let run = lock(&self.run);
        run.ticker.is_some() && run.epoch == epoch
    }

    fn should_deliver(&self, epoch: Option<u64>, handle: JobHandle) -> bool {
        if let Some(epoch) = epoch {
            if !self.is_current(epoch) {
                return false;
            }
        }
        lock(&self.jobs).contains_key(&handle)
    }

    #[instrument(skip(self))]
    async fn tick(&self, epoch: Option<u64>) {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            debug!("Previous poll still in flight, skipping tick");
            return;
        };

        let snapshot: Vec<Arc<Job>> = lock(&self.jobs).values().cloned().collect();
        if snapshot.is_empty() {
            return;
        }

        // Each job's share of the concatenated batch
        let mut batch = Vec::new();
        let mut spans: Vec<Range<usize>> = Vec::with_capacity(snapshot.len());
        for job in &snapshot {
            let start = batch.len();
            batch.extend(
                job.requests
                    .iter()
                    .map(|request| PreparedRequest::new(request.clone(), job.params.clone())),
            );
            spans.push(start..batch.len());
        }

        debug!("Polling {} requests for {} jobs", batch.len(), snapshot.len());

        match self.client.dispatch(batch, &ProcessingParams::default()).await {
            Ok(outcomes) => {
                let mut outcomes = outcomes.into_iter();
                for (job, span) in snapshot.iter().zip(spans) {
                    let own: Vec<Outcome> = outcomes.by_ref().take(span.len()).collect();
                    if self.should_deliver(epoch, job.handle) {
                        guarded(job.handle, || job.deliver(own));
                    }
                }
            }
            Err(e) => {
                warn!("Poll of {} jobs failed: {}", snapshot.len(), e);
                for job in &snapshot {
                    if self.should_deliver(epoch, job.handle) {
                        guarded(job.handle, || job.deliver_transport_failure(&e));
                    }
                }
            }
        }
    }
}

async fn run_ticker(inner: Weak<Inner>, epoch: u64, mut period_rx: watch::Receiver<Duration>) {
    let mut period = *period_rx.borrow_and_update();
    let mut last = Instant::now();
    let mut deadline = last + period;

    loop {
        tokio::select! {
            _ = sleep_until(deadline) => {}
            changed = period_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                period = *period_rx.borrow_and_update();
                deadline = last + period;
                continue;
            }
        }

        let Some(scheduler) = inner.upgrade() else {
            break;
        };
        if !scheduler.is_current(epoch) {
            break;
        }

        last = deadline;
        scheduler.tick(Some(epoch)).await;
        drop(scheduler);

        // Deadlines that passed while the tick was in flight are skipped
        let now = Instant::now();
        deadline = last + period;
        let mut skipped = 0u32;
        while deadline <= now {
            last = deadline;
            deadline += period;
            skipped += 1;
        }
        if skipped > 0 {
            debug!("Skipped {} ticks while a poll was in flight", skipped);
        }
    }

    debug!("Ticker of epoch {} exited", epoch);
}

fn guarded(handle: JobHandle, deliver: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(deliver)).is_err() {
        error!("Callback of job {} panicked", handle);
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
