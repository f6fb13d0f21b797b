//! # Completion Tickets
//!
//! Single-slot rendezvous between a producer that inserted a blocking event
//! and the consumer that eventually acknowledges it.
//!
//! A ticket resolves exactly once. The first resolution wins: either the
//! consumer's `handled` flag, or `false` from a flush, unblock, or shutdown.
//! Later resolutions are ignored, so a producer is woken exactly once.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

/// Shared state behind a [`Ticket`].
#[derive(Debug, Default)]
pub(crate) struct Completion {
    result: Mutex<Option<bool>>,
    ready: Condvar,
}

impl Completion {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Resolves the ticket. Returns false if it was already resolved.
    pub(crate) fn resolve(&self, handled: bool) -> bool {
        let mut result = self.result.lock();
        if result.is_some() {
            return false;
        }
        *result = Some(handled);
        self.ready.notify_all();
        true
    }

    fn wait(&self) -> bool {
        let mut result = self.result.lock();
        loop {
            if let Some(handled) = *result {
                return handled;
            }
            self.ready.wait(&mut result);
        }
    }

    fn wait_timeout(&self, timeout: Duration) -> Option<bool> {
        let mut result = self.result.lock();
        if result.is_none() {
            // Spurious wakeups just end the wait early.
            self.ready.wait_for(&mut result, timeout);
        }
        *result
    }

    fn peek(&self) -> Option<bool> {
        *self.result.lock()
    }
}

/// Handle returned to a producer for tracking acknowledgement of its event.
#[derive(Debug)]
pub struct Ticket {
    completion: Arc<Completion>,
    /// Queue sequence number of the event.
    pub seq: u64,
}

impl Ticket {
    pub(crate) fn new(completion: Arc<Completion>, seq: u64) -> Self {
        Self { completion, seq }
    }

    /// Blocks until the event is acknowledged or abandoned.
    ///
    /// Returns the consumer's `handled` flag, or `false` if the event was
    /// flushed, the queue was unblocked, or the queue shut down.
    #[must_use]
    pub fn wait(&self) -> bool {
        self.completion.wait()
    }

    /// Waits up to `timeout`. `None` means still outstanding.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<bool> {
        self.completion.wait_timeout(timeout)
    }

    /// The result, if already resolved.
    #[must_use]
    pub fn try_result(&self) -> Option<bool> {
        self.completion.peek()
    }

    /// Returns true if already resolved.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.try_result().is_some()
    }
}
