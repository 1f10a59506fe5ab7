//! Worker tasks draining the item queue.
//!
//! Workers share one logical queue: each holds a cloned `async-channel`
//! [`Receiver`](async_channel::Receiver) and competes for items, so an item
//! is dequeued by exactly one worker. A cloned receiver (rather than a
//! mutex around a single-consumer receiver) keeps the drain lock-free and
//! lets a blocked worker leave the others runnable.

use crate::{Outcome, Result, TaggedOutcome, TaskError};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The user-supplied processing function.
///
/// Invoked concurrently from every worker, so it must be safe under that
/// concurrency; the borrow expresses that it must not retain the item
/// beyond the call.
pub(crate) type Processor<I, R> = Arc<dyn Fn(&I) -> Result<R, TaskError> + Send + Sync>;

/// Coordinator for the worker group.
///
/// Spawns `concurrency` workers and resolves once every one of them has
/// exited, i.e. once the item queue is closed and fully drained. The
/// workers' sender clones are the only live handles on the outcome sink, so
/// the sink closes exactly when the last worker exits — after that no
/// in-flight outcome can be dropped and no send can hit a closed channel.
pub(crate) async fn run_group<I, R>(
    concurrency: usize,
    items: async_channel::Receiver<I>,
    processor: Processor<I, R>,
    outcomes: Option<mpsc::Sender<TaggedOutcome<I, R>>>,
) where
    I: Send + 'static,
    R: Send + 'static,
{
    let workers: Vec<_> = (0..concurrency)
        .map(|worker_id| {
            tokio::spawn(worker_loop(
                worker_id,
                items.clone(),
                Arc::clone(&processor),
                outcomes.clone(),
            ))
        })
        .collect();

    // Release the coordinator's own handles; only the workers' clones
    // remain.
    drop(items);
    drop(outcomes);

    for worker in workers {
        if worker.await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::error!("worker task panicked");
        }
    }
}

/// One worker: take an item, process it, report the outcome, repeat until
/// the queue is closed and empty.
///
/// The outcome send suspends when the sink buffer is full; that is the only
/// backpressure a worker is subject to. If the sink's consumer is gone the
/// worker stops reporting but keeps draining, so every accepted item is
/// still processed exactly once.
async fn worker_loop<I, R>(
    _worker_id: usize,
    items: async_channel::Receiver<I>,
    processor: Processor<I, R>,
    mut outcomes: Option<mpsc::Sender<TaggedOutcome<I, R>>>,
) where
    I: Send + 'static,
    R: Send + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("worker {_worker_id} started");

    while let Ok(item) = items.recv().await {
        let outcome = match processor(&item) {
            Ok(response) => Outcome::Success(response),
            Err(err) => Outcome::Failure(err),
        };

        if let Some(sink) = &outcomes {
            if sink.send(TaggedOutcome { item, outcome }).await.is_err() {
                #[cfg(feature = "tracing")]
                tracing::warn!("worker {_worker_id} outcome sink closed; discarding outcomes");
                outcomes = None;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("worker {_worker_id} stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubler() -> Processor<i32, i32> {
        Arc::new(|n: &i32| {
            if *n == 7 {
                Err(TaskError::new("entry = 7"))
            } else {
                Ok(n * 2)
            }
        })
    }

    #[tokio::test]
    async fn group_exits_on_closed_empty_queue() {
        let (tx, rx) = async_channel::bounded::<i32>(1);
        tx.close();
        run_group(4, rx, doubler(), None).await;
    }

    #[tokio::test]
    async fn drains_buffered_items_after_close() {
        let (tx, rx) = async_channel::bounded(8);
        let (sink_tx, mut sink_rx) = mpsc::channel(8);
        for n in [1, 2, 7] {
            tx.send(n).await.unwrap();
        }
        tx.close();

        run_group(1, rx, doubler(), Some(sink_tx)).await;

        let mut outcomes = Vec::new();
        while let Some(tagged) = sink_rx.recv().await {
            outcomes.push(tagged);
        }
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].outcome, Outcome::Success(2));
        assert_eq!(outcomes[1].outcome, Outcome::Success(4));
        assert_eq!(outcomes[2].item, 7);
        assert!(
            matches!(&outcomes[2].outcome, Outcome::Failure(err) if err.message() == "entry = 7")
        );
    }

    #[tokio::test]
    async fn sink_closes_after_last_worker_exits() {
        let (tx, rx) = async_channel::bounded(4);
        let (sink_tx, mut sink_rx) = mpsc::channel(4);
        tx.send(1).await.unwrap();
        tx.close();

        run_group(2, rx, doubler(), Some(sink_tx)).await;

        assert!(sink_rx.recv().await.is_some());
        // Closed, not merely empty.
        assert!(sink_rx.recv().await.is_none());
    }
}
