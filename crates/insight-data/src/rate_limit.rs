//! Priority request queue with a sliding-window rate gate.
//!
//! A single dispatcher task hands out [`Permit`]s one at a time. A caller
//! performs its request while holding the permit; the next permit is only
//! issued after the previous one is dropped, at least `delay` after the
//! previous dispatch, and while fewer than `max_requests` permits were
//! issued during the trailing `window`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::Duration;

use insight_core::error::DataError;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Request priority; higher priorities are dispatched first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Rate limit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum dispatches within one window
    pub max_requests: usize,
    /// Sliding window length
    pub window: Duration,
    /// Minimum spacing between consecutive dispatches
    pub delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: 8,
            window: Duration::from_secs(60),
            delay: Duration::from_millis(250),
        }
    }
}

/// Grant to perform one request. Dropping it releases the queue.
#[derive(Debug)]
pub struct Permit {
    done: Option<oneshot::Sender<()>>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}

struct Ticket {
    priority: Priority,
    seq: u64,
    reply: oneshot::Sender<Permit>,
}

impl PartialEq for Ticket {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Ticket {}

impl PartialOrd for Ticket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ticket {
    // Max-heap: higher priority first, then lower sequence number (FIFO).
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Owned request queue with an explicit lifecycle.
///
/// Must be created inside a tokio runtime. Call [`RequestQueue::shutdown`]
/// (or drop the queue) to stop the dispatcher; pending and later
/// [`acquire`](RequestQueue::acquire) calls then fail with
/// [`DataError::QueueClosed`].
pub struct RequestQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<Ticket>>>,
    seq: AtomicU64,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    limit: RateLimit,
}

impl RequestQueue {
    /// Create a queue and spawn its dispatcher.
    pub fn new(limit: RateLimit) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(dispatch(rx, limit));
        info!(
            max_requests = limit.max_requests,
            window_ms = limit.window.as_millis() as u64,
            delay_ms = limit.delay.as_millis() as u64,
            "Request queue started"
        );
        Self {
            sender: Mutex::new(Some(tx)),
            seq: AtomicU64::new(0),
            dispatcher: Mutex::new(Some(dispatcher)),
            limit,
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Wait for a permit at the given priority.
    pub async fn acquire(&self, priority: Priority) -> Result<Permit, DataError> {
        let (reply, permit) = oneshot::channel();
        let ticket = Ticket {
            priority,
            seq: self.seq.fetch_add(1, AtomicOrdering::Relaxed),
            reply,
        };

        {
            let sender = self.sender.lock().map_err(|_| DataError::QueueClosed)?;
            sender
                .as_ref()
                .ok_or(DataError::QueueClosed)?
                .send(ticket)
                .map_err(|_| DataError::QueueClosed)?;
        }

        permit.await.map_err(|_| DataError::QueueClosed)
    }

    /// Stop dispatching and reject every pending request.
    pub fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        if let Ok(mut dispatcher) = self.dispatcher.lock() {
            if let Some(handle) = dispatcher.take() {
                handle.abort();
                info!("Request queue shut down");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().map(|s| s.is_none()).unwrap_or(true)
    }
}

impl Drop for RequestQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn dispatch(mut rx: mpsc::UnboundedReceiver<Ticket>, limit: RateLimit) {
    let mut pending = BinaryHeap::new();
    let mut issued: VecDeque<Instant> = VecDeque::new();
    let mut last_dispatch: Option<Instant> = None;

    loop {
        while let Ok(ticket) = rx.try_recv() {
            pending.push(ticket);
        }

        if pending.is_empty() {
            match rx.recv().await {
                Some(ticket) => pending.push(ticket),
                None => break,
            }
            continue;
        }

        let now = Instant::now();
        while issued
            .front()
            .is_some_and(|t| now.duration_since(*t) >= limit.window)
        {
            issued.pop_front();
        }
        if limit.max_requests > 0 && issued.len() >= limit.max_requests {
            if let Some(oldest) = issued.front() {
                debug!(queued = pending.len(), "Rate window full, waiting");
                sleep_until(*oldest + limit.window).await;
            }
            continue;
        }

        if let Some(last) = last_dispatch {
            sleep_until(last + limit.delay).await;
        }

        // Requests that arrived while waiting may outrank the current head.
        while let Ok(ticket) = rx.try_recv() {
            pending.push(ticket);
        }
        let Some(ticket) = pending.pop() else {
            continue;
        };

        let (done_tx, done_rx) = oneshot::channel();
        let permit = Permit {
            done: Some(done_tx),
        };
        if ticket.reply.send(permit).is_err() {
            // Caller gave up; its permit was dropped with the failed send.
            continue;
        }

        let dispatched_at = Instant::now();
        issued.push_back(dispatched_at);
        last_dispatch = Some(dispatched_at);
        debug!(priority = ?ticket.priority, seq = ticket.seq, "Permit issued");

        let _ = done_rx.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn unthrottled() -> RateLimit {
        RateLimit {
            max_requests: 100,
            window: Duration::from_secs(60),
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_priority_then_fifo_order() {
        let queue = Arc::new(RequestQueue::new(unthrottled()));
        let order = Arc::new(Mutex::new(Vec::new()));

        let gate = queue.acquire(Priority::Normal).await.unwrap();

        let mut handles = Vec::new();
        for (label, priority) in [
            ("low", Priority::Low),
            ("normal-1", Priority::Normal),
            ("high", Priority::High),
            ("normal-2", Priority::Normal),
        ] {
            let queue = Arc::clone(&queue);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let _permit = queue.acquire(priority).await.unwrap();
                order.lock().unwrap().push(label);
            }));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        drop(gate);
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            *order.lock().unwrap(),
            vec!["high", "normal-1", "normal-2", "low"]
        );
    }

    #[tokio::test]
    async fn test_next_permit_waits_for_release() {
        let queue = Arc::new(RequestQueue::new(unthrottled()));
        let first = queue.acquire(Priority::Normal).await.unwrap();

        let granted = Arc::new(AtomicBool::new(false));
        let waiter = {
            let queue = Arc::clone(&queue);
            let granted = Arc::clone(&granted);
            tokio::spawn(async move {
                let _permit = queue.acquire(Priority::High).await.unwrap();
                granted.store(true, AtomicOrdering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!granted.load(AtomicOrdering::SeqCst));

        drop(first);
        waiter.await.unwrap();
        assert!(granted.load(AtomicOrdering::SeqCst));
    }

    #[tokio::test]
    async fn test_window_gate_delays_excess_requests() {
        let queue = RequestQueue::new(RateLimit {
            max_requests: 2,
            window: Duration::from_millis(200),
            delay: Duration::ZERO,
        });

        let start = Instant::now();
        for _ in 0..3 {
            let _permit = queue.acquire(Priority::Normal).await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(190));
    }

    #[tokio::test]
    async fn test_fixed_delay_between_dispatches() {
        let queue = RequestQueue::new(RateLimit {
            max_requests: 10,
            window: Duration::from_secs(60),
            delay: Duration::from_millis(60),
        });

        let start = Instant::now();
        for _ in 0..3 {
            let _permit = queue.acquire(Priority::Normal).await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(110));
    }

    #[tokio::test]
    async fn test_shutdown_rejects_requests() {
        let queue = RequestQueue::new(unthrottled());
        queue.shutdown();

        assert!(queue.is_closed());
        assert!(matches!(
            queue.acquire(Priority::High).await,
            Err(DataError::QueueClosed)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_fails_pending_requests() {
        let queue = Arc::new(RequestQueue::new(unthrottled()));
        let held = queue.acquire(Priority::Normal).await.unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.acquire(Priority::Normal).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        queue.shutdown();
        assert!(matches!(waiter.await.unwrap(), Err(DataError::QueueClosed)));
        drop(held);
    }
}
