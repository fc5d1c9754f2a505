//! Bounded worker pool pulling targets from a hand-off queue.
//!
//! All workers are spawned before the first target is enqueued. The queue has
//! a capacity of one, so the producer can only run ahead of the workers by a
//! single target and the number of targets in flight never exceeds the worker
//! count. Each worker assigns the next sequence index while it still holds the
//! queue, which makes indexes follow dequeue order.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::target::Target;
use crate::error::{Error, Result};

/// Work performed for every dequeued target.
///
/// Per-target command failures are data, not errors: an `Err` returned here
/// is fatal to the whole run and stops the pool.
#[async_trait]
pub trait TargetProcessor: Send + Sync + 'static {
    /// Process one target whose sequence index has been assigned.
    async fn process(&self, target: Target) -> Result<()>;
}

type SharedReceiver = Arc<Mutex<mpsc::Receiver<Target>>>;

/// Run `processor` over every target with at most `workers` running at once.
///
/// Returns the number of targets handed to a worker once every worker has
/// exited. The first fatal processor error is returned after the pool drains;
/// targets that were not dispatched yet are dropped.
pub async fn dispatch<P>(targets: Vec<Target>, workers: usize, processor: Arc<P>) -> Result<usize>
where
    P: TargetProcessor,
{
    if workers == 0 {
        return Err(Error::InvalidWorkerCount(workers));
    }

    let total = targets.len();
    info!(workers, targets = total, "Starting worker pool");

    let (sender, receiver) = mpsc::channel::<Target>(1);
    let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));
    let counter = Arc::new(AtomicUsize::new(0));
    let abort = Arc::new(AtomicBool::new(false));

    let mut pool = JoinSet::new();
    for worker_id in 0..workers {
        pool.spawn(worker_loop(
            worker_id,
            Arc::clone(&receiver),
            Arc::clone(&counter),
            Arc::clone(&abort),
            Arc::clone(&processor),
        ));
    }
    drop(receiver);

    for target in targets {
        if sender.send(target).await.is_err() {
            warn!("Worker pool stopped accepting targets");
            break;
        }
    }
    drop(sender);

    let mut first_error = None;
    while let Some(joined) = pool.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => Err(Error::Internal(format!("worker task failed: {}", e))),
        };
        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        }
    }

    let dispatched = counter.load(Ordering::SeqCst);
    info!(dispatched, total, "Worker pool drained");

    match first_error {
        Some(e) => Err(e),
        None => Ok(dispatched),
    }
}

async fn worker_loop<P>(
    worker_id: usize,
    receiver: SharedReceiver,
    counter: Arc<AtomicUsize>,
    abort: Arc<AtomicBool>,
    processor: Arc<P>,
) -> Result<()>
where
    P: TargetProcessor,
{
    loop {
        let target = {
            let mut queue = receiver.lock().await;
            match queue.recv().await {
                Some(_) if abort.load(Ordering::SeqCst) => break,
                Some(mut target) => {
                    target.index = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    target
                }
                None => break,
            }
        };

        debug!(worker = worker_id, target = %target.id, index = target.index, "Processing target");

        if let Err(e) = processor.process(target).await {
            abort.store(true, Ordering::SeqCst);
            receiver.lock().await.close();
            return Err(e);
        }
    }

    debug!(worker = worker_id, "Worker exiting");
    Ok(())
}
