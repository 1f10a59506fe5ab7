//! The pool controller: configuration, lifecycle, and channel wiring.
//!
//! A [`WorkPool`] owns the bounded item queue, the worker group handle, and
//! the optional outcome sink. The lifecycle is linear: construct, attach a
//! processor (required) and an observer (optional), `start`, feed items,
//! `stop`, `wait`. All methods take `&self` and return `&Self`, so a
//! producer task can share the pool behind an [`Arc`] with the task that
//! waits on it.
//!
//! Lifecycle misuse — double stop, enqueue after stop, starting without a
//! processor — is a broken caller contract and panics loudly rather than
//! being masked. Only construction is fallible.

use crate::error::{Error, Result};
use crate::outcome::{Outcome, TaggedOutcome, TaskError};
use crate::worker::{Processor, run_group};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Registration and lifecycle state, guarded by one lock.
///
/// The lock is only ever held for pointer-sized bookkeeping; nothing awaits
/// while holding it.
struct State<I, R> {
    processor: Option<Processor<I, R>>,
    /// Send side of the outcome sink. Present only between `set_observer`
    /// and `start`, which moves it into the worker group.
    outcome_tx: Option<mpsc::Sender<TaggedOutcome<I, R>>>,
    observer_registered: bool,
    started: bool,
    /// Worker-group coordinator task; taken by `wait`.
    group: Option<JoinHandle<()>>,
    /// Outcome-sink consumer task; taken by `wait`.
    sink: Option<JoinHandle<()>>,
}

impl<I, R> Default for State<I, R> {
    fn default() -> Self {
        Self {
            processor: None,
            outcome_tx: None,
            observer_registered: false,
            started: false,
            group: None,
            sink: None,
        }
    }
}

/// A fixed-size pool of concurrent workers draining one bounded queue.
///
/// `I` is the item type fed in via [`enqueue`](Self::enqueue); `R` is the
/// value the processor produces per item. Neither needs to be `Clone`: the
/// worker borrows the item for the processor call and then moves it into
/// the tagged outcome.
///
/// Dropping a pool that was started but never stopped leaves the workers
/// parked on an open, empty queue until the runtime shuts down; call
/// [`stop`](Self::stop) and [`wait`](Self::wait) for a clean drain.
pub struct WorkPool<I, R> {
    concurrency: usize,
    buffer: usize,
    items_tx: async_channel::Sender<I>,
    items_rx: async_channel::Receiver<I>,
    state: Mutex<State<I, R>>,
}

impl<I, R> std::fmt::Debug for WorkPool<I, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkPool")
            .field("concurrency", &self.concurrency)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl<I, R> WorkPool<I, R>
where
    I: Send + 'static,
    R: Send + 'static,
{
    /// Creates a pool with `concurrency` workers and `buffer` capacity for
    /// both the item queue and the outcome sink.
    ///
    /// A zero buffer maps to channel capacity 1: async channels have no
    /// rendezvous mode, so "unbuffered" here means one item may be parked
    /// between producer and workers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConcurrency`] if `concurrency` is zero.
    pub fn new(concurrency: usize, buffer: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(Error::InvalidConcurrency { got: concurrency });
        }

        let (items_tx, items_rx) = async_channel::bounded(buffer.max(1));
        Ok(Self {
            concurrency,
            buffer,
            items_tx,
            items_rx,
            state: Mutex::new(State::default()),
        })
    }

    /// The configured worker count.
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// The configured buffer capacity.
    pub const fn buffer(&self) -> usize {
        self.buffer
    }

    /// Attaches the processing function. Required before [`start`](Self::start).
    ///
    /// The processor is invoked concurrently from every worker and must be
    /// safe under that concurrency. It has no cancellation hook: a call
    /// that never returns wedges its worker, and any deadline must be
    /// enforced inside the processor itself.
    ///
    /// # Panics
    ///
    /// Panics if the pool has already started or a processor is already
    /// attached.
    pub fn set_processor<F>(&self, processor: F) -> &Self
    where
        F: Fn(&I) -> Result<R, TaskError> + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        assert!(!state.started, "pool already started");
        assert!(state.processor.is_none(), "processor already set");
        state.processor = Some(Arc::new(processor));
        self
    }

    /// Attaches the observer and spawns the outcome-sink consumer.
    ///
    /// The consumer is spawned immediately so it is ready to receive before
    /// any worker can produce. It invokes the observer synchronously, once
    /// per processed item, in completion order. Without an observer workers
    /// skip outcome delivery entirely, so per-item failures are discarded —
    /// intentional, not a bug.
    ///
    /// # Panics
    ///
    /// Panics if the pool has already started or an observer is already
    /// registered. Must be called from within a tokio runtime.
    pub fn set_observer<F>(&self, mut observer: F) -> &Self
    where
        F: FnMut(I, Outcome<R>) + Send + 'static,
    {
        let mut state = self.state.lock();
        assert!(!state.started, "observer must be registered before start");
        assert!(!state.observer_registered, "observer already set");

        let (outcome_tx, mut outcome_rx) = mpsc::channel(self.buffer.max(1));
        let consumer = tokio::spawn(async move {
            while let Some(TaggedOutcome { item, outcome }) = outcome_rx.recv().await {
                observer(item, outcome);
            }
        });

        state.outcome_tx = Some(outcome_tx);
        state.observer_registered = true;
        state.sink = Some(consumer);
        self
    }

    /// Attaches a pair of callbacks instead of a unified observer.
    ///
    /// A thin adapter over [`set_observer`](Self::set_observer) for callers
    /// that want successes and failures routed to distinct sinks. Shares
    /// the single observer slot and its registration rules.
    pub fn set_split_observer<FR, FE>(&self, mut on_response: FR, mut on_error: FE) -> &Self
    where
        FR: FnMut(I, R) + Send + 'static,
        FE: FnMut(I, TaskError) + Send + 'static,
    {
        self.set_observer(move |item, outcome| match outcome {
            Outcome::Success(response) => on_response(item, response),
            Outcome::Failure(err) => on_error(item, err),
        })
    }

    /// Enqueues one item, suspending while the queue buffer is full.
    ///
    /// Legal from any task holding the pool, before or after
    /// [`start`](Self::start).
    ///
    /// # Panics
    ///
    /// Panics if the pool has been stopped.
    pub async fn enqueue(&self, item: I) -> &Self {
        self.items_tx
            .send(item)
            .await
            .expect("enqueue after stop");
        self
    }

    /// Spawns the worker group.
    ///
    /// The group's coordinator joins the workers and lets the outcome sink
    /// close once the last worker has exited, so no outcome is dropped and
    /// no send can hit a closed channel. Must be called from within a tokio
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics if no processor is attached or the pool has already started.
    pub fn start(&self) -> &Self {
        let mut state = self.state.lock();
        assert!(!state.started, "pool already started");
        let processor = state.processor.clone().expect("processor not set");
        let outcome_tx = state.outcome_tx.take();

        #[cfg(feature = "tracing")]
        tracing::debug!(concurrency = self.concurrency, "starting worker group");

        state.group = Some(tokio::spawn(run_group(
            self.concurrency,
            self.items_rx.clone(),
            processor,
            outcome_tx,
        )));
        state.started = true;
        self
    }

    /// Closes the item queue: no further items are accepted, and workers
    /// exit once the buffered remainder is drained.
    ///
    /// Call this only after all producers have finished enqueuing.
    ///
    /// # Panics
    ///
    /// Panics on a second call — a double close is a broken lifecycle
    /// contract.
    pub fn stop(&self) -> &Self {
        assert!(self.items_rx.close(), "pool already stopped");

        #[cfg(feature = "tracing")]
        tracing::debug!("item queue closed");
        self
    }

    /// Blocks until the queue is drained, every worker has exited, and (if
    /// an observer is registered) every observer callback has returned.
    ///
    /// A structured join on the background tasks spawned by
    /// [`start`](Self::start) and [`set_observer`](Self::set_observer).
    /// Calling `wait` without a preceding [`stop`](Self::stop) suspends
    /// forever — a caller error, not detected here.
    ///
    /// # Panics
    ///
    /// Panics if the pool was never started, on a second (or concurrent)
    /// call, or if a background task panicked — which only happens when an
    /// observer callback panics.
    pub async fn wait(&self) -> &Self {
        let (group, sink) = {
            let mut state = self.state.lock();
            assert!(state.started, "pool not started");
            assert!(
                state.group.is_some() || state.sink.is_some(),
                "wait called twice"
            );
            (state.group.take(), state.sink.take())
        };

        if let Some(group) = group {
            group.await.expect("worker group task panicked");
        }
        if let Some(sink) = sink {
            sink.await.expect("observer task panicked");
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("pool fully drained");
        self
    }
}
