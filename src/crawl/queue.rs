// src/crawl/queue.rs
// =============================================================================
// This module implements the work queues the crawl pipeline runs on.
//
// How it works:
// 1. Producers put() URLs; the queue never blocks them (unbounded)
// 2. Consumers get() URLs in FIFO order, waiting while the queue is empty
// 3. After handling a URL the consumer calls task_done()
// 4. join() waits until every URL ever put has been marked done
//
// The "outstanding" counter behind join() goes up on put() and down on
// task_done(). It lives in a tokio watch channel so join() can sleep until
// it reaches zero instead of polling.
//
// Besides queued URLs, a producer that is still running can be counted as
// outstanding work with hold(). The returned guard keeps join() waiting
// until it is dropped, which is how a rescheduled pagination discoverer
// stops the listing queue from "draining" while it may still add pages.
//
// There is no deduplication: the same URL can be queued many times.
//
// Rust concepts:
// - mpsc channel: the FIFO itself
// - Mutex around the receiver: lets many consumers share one channel
// - Drop: PendingGuard releases its hold automatically
// =============================================================================

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};

pub struct WorkQueue {
    name: &'static str,
    sender: mpsc::UnboundedSender<String>,
    receiver: Mutex<mpsc::UnboundedReceiver<String>>,
    outstanding: watch::Sender<usize>,
}

impl WorkQueue {
    pub fn new(name: &'static str) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (outstanding, _) = watch::channel(0);

        Self {
            name,
            sender,
            receiver: Mutex::new(receiver),
            outstanding,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    // Adds a URL to the back of the queue
    pub fn put(&self, url: impl Into<String>) {
        self.outstanding.send_modify(|count| *count += 1);

        // The receiver lives inside self, so the channel can't be closed
        // while anyone can still call put(). Undo the count just in case.
        if self.sender.send(url.into()).is_err() {
            self.task_done();
        }
    }

    // Takes the URL at the front of the queue, waiting while it is empty
    //
    // Cancel safe: if this future is dropped before it returns, no URL is lost.
    pub async fn get(&self) -> Option<String> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    // Marks one previously taken URL as handled
    pub fn task_done(&self) {
        self.outstanding
            .send_modify(|count| *count = count.saturating_sub(1));
    }

    /// URLs put but not yet marked done, plus active holds
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    // Waits until outstanding() is zero
    pub async fn join(&self) {
        let mut watcher = self.outstanding.subscribe();
        // wait_for only fails once the sender is dropped, and self owns it
        let _ = watcher.wait_for(|count| *count == 0).await;
    }

    // Counts a running producer as outstanding work until the guard drops
    pub fn hold(self: &Arc<Self>) -> PendingGuard {
        self.outstanding.send_modify(|count| *count += 1);
        PendingGuard {
            queue: Arc::clone(self),
        }
    }
}

#[must_use = "the hold is released as soon as the guard is dropped"]
pub struct PendingGuard {
    queue: Arc<WorkQueue>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.queue.task_done();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not a VecDeque?
//    - Several tasks read and write the queue at the same time
//    - A channel already gives us a thread-safe FIFO and lets get()
//      sleep until something arrives
//
// 2. Why is the receiver inside a Mutex?
//    - tokio's mpsc allows many senders but only ONE receiver
//    - The product queue has several consumers, so they take turns
//      holding the receiver while they wait for the next URL
//
// 3. What is a watch channel?
//    - It holds a single value that can be observed for changes
//    - join() subscribes and sleeps until the count is zero
//
// 4. Why does PendingGuard implement Drop?
//    - Whatever happens to the task holding it (finishes, returns early,
//      panics), the hold is released exactly once
// -----------------------------------------------------------------------------
