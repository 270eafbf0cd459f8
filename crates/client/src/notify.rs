//! State-change notification for views.
//!
//! The controller publishes a snapshot after every transition. Each subscriber
//! receives its own copy (broadcast semantics); delivery is best-effort and a
//! subscriber that has been dropped is pruned on the next publish.

use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::sync::Mutex;
use std::time::Duration;

/// Receiving end handed to a view.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything published so far and return the most recent message.
    pub fn latest(&self) -> Option<M> {
        self.receiver.try_iter().last()
    }
}

/// In-process pub/sub fan-out. No IO, no async.
#[derive(Debug)]
pub struct StateBus<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> Default for StateBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M: Clone> StateBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, message: M) {
        let Ok(mut subs) = self.subscribers.lock() else {
            tracing::warn!("state bus lock poisoned; dropping notification");
            return;
        };

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());
    }

    pub fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just never fires.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}
