//! # Event Queue
//!
//! Bounded, ordered, single-consumer queue between host callback threads and
//! the application thread.
//!
//! ## Architecture
//!
//! ```text
//!   Host thread A ──┐ insert / insert_blocking
//!   Host thread B ──┼──> [Mutex<VecDeque<Entry>>] ──> remove_oldest ──> app thread
//!   Host thread N ──┘          │                            │
//!        ▲                     │ flush / shutdown           │ done_with_event
//!        └──── Ticket::wait ◄──┴────────────────────────────┘
//! ```
//!
//! A blocking producer waits on its own [`Ticket`]. The consumer resolves the
//! ticket of the most recently dequeued event with `done_with_event`. Every
//! path that abandons an event (flush, unblock, detach, shutdown) resolves its
//! ticket with `false`, so no producer can be left waiting forever.

use crate::event::Event;
use crate::ticket::{Completion, Ticket};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of events the queue holds before refusing inserts.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Queue lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// Constructed, `init` not called yet.
    Idle,
    /// Accepting events.
    Open,
    /// `shutdown` was called. Inserts are dropped until the next `init`.
    Closed,
}

/// A queued event plus the ticket of its blocking producer, if any.
struct Entry {
    event: Event,
    completion: Option<Arc<Completion>>,
}

struct Inner {
    status: QueueStatus,
    pending: VecDeque<Entry>,
    /// Ticket of the most recently dequeued event, until acknowledged.
    in_flight: Option<Arc<Completion>>,
    /// One-shot request to return from `remove_oldest` without an event.
    consumer_wake: bool,
    /// The consumer has exited; blocking inserts fail immediately.
    consumer_detached: bool,
    next_seq: u64,
}

impl Inner {
    fn abandon_all(&mut self) -> usize {
        let mut woken = 0;
        if let Some(completion) = self.in_flight.take() {
            woken += usize::from(completion.resolve(false));
        }
        for entry in &self.pending {
            if let Some(completion) = &entry.completion {
                woken += usize::from(completion.resolve(false));
            }
        }
        woken
    }
}

/// Statistics for the event queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Events currently pending.
    pub pending: usize,
    /// Total events accepted since construction.
    pub total_inserted: u64,
    /// Whether a dequeued blocking event awaits acknowledgement.
    pub awaiting_ack: bool,
}

/// Single-consumer event queue with blocking-insert acknowledgement.
pub struct EventQueue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    capacity: usize,
}

impl EventQueue {
    /// Creates an idle queue. Call [`EventQueue::init`] before use.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "event queue capacity must be nonzero");
        Self {
            inner: Mutex::new(Inner {
                status: QueueStatus::Idle,
                pending: VecDeque::with_capacity(capacity),
                in_flight: None,
                consumer_wake: false,
                consumer_detached: false,
                next_seq: 0,
            }),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Opens the queue for a new producer/consumer session.
    pub fn init(&self) {
        let mut inner = self.inner.lock();
        let stale = inner.abandon_all();
        if stale > 0 || !inner.pending.is_empty() {
            tracing::warn!(stale, pending = inner.pending.len(), "event queue re-initialized with residual events");
        }
        inner.pending.clear();
        inner.status = QueueStatus::Open;
        inner.consumer_wake = false;
        inner.consumer_detached = false;
        tracing::debug!(capacity = self.capacity, "event queue open");
    }

    /// Closes the queue, abandoning every pending event.
    ///
    /// Outstanding tickets resolve with `false` and a waiting consumer wakes
    /// up empty-handed.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        let woken = inner.abandon_all();
        let dropped = inner.pending.len();
        inner.pending.clear();
        inner.status = QueueStatus::Closed;
        self.not_empty.notify_all();
        tracing::debug!(dropped, woken, "event queue shut down");
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> QueueStatus {
        self.inner.lock().status
    }

    /// Maximum number of pending events.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events waiting to be dequeued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Returns true if no events are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns current statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let inner = self.inner.lock();
        QueueStats {
            pending: inner.pending.len(),
            total_inserted: inner.next_seq,
            awaiting_ack: inner.in_flight.is_some(),
        }
    }

    fn push(&self, event: Event, completion: Option<Arc<Completion>>) -> Result<u64, Event> {
        let mut inner = self.inner.lock();
        if inner.status != QueueStatus::Open {
            tracing::debug!(kind = %event.kind(), status = ?inner.status, "event dropped, queue not open");
            return Err(event);
        }
        if completion.is_some() && inner.consumer_detached {
            tracing::debug!(kind = %event.kind(), "blocking event refused, consumer has exited");
            return Err(event);
        }
        if inner.pending.len() >= self.capacity {
            tracing::warn!(kind = %event.kind(), capacity = self.capacity, "event dropped, queue full");
            return Err(event);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        tracing::trace!(kind = %event.kind(), seq, blocking = completion.is_some(), "event queued");
        inner.pending.push_back(Entry { event, completion });
        self.not_empty.notify_one();
        Ok(seq)
    }

    /// Appends an event without waiting for it to be consumed.
    ///
    /// Returns false if the event was dropped (queue not open, or full).
    pub fn insert(&self, event: Event) -> bool {
        self.push(event, None).is_ok()
    }

    /// Appends an event and returns a ticket that resolves on acknowledgement.
    ///
    /// Returns `None` if the event was refused.
    pub fn submit(&self, event: Event) -> Option<Ticket> {
        let completion = Completion::new();
        let seq = self.push(event, Some(Arc::clone(&completion))).ok()?;
        Some(Ticket::new(completion, seq))
    }

    /// Appends an event and waits until the consumer is done with it.
    ///
    /// Returns the consumer's `handled` flag, or false if the event was
    /// refused, flushed, or abandoned during shutdown.
    pub fn insert_blocking(&self, event: Event) -> bool {
        match self.submit(event) {
            Some(ticket) => ticket.wait(),
            None => false,
        }
    }

    /// Takes the oldest pending event.
    ///
    /// Waits up to `wait` for one to arrive; `None` waits indefinitely.
    /// Returns `None` on timeout, after [`EventQueue::unblock_consumer`], or
    /// once the queue is not open.
    ///
    /// A previously dequeued blocking event that was never acknowledged is
    /// acknowledged with `false` first. Must only be called from the single
    /// consumer thread.
    pub fn remove_oldest(&self, wait: Option<Duration>) -> Option<Event> {
        let deadline = wait.map(|d| Instant::now() + d);
        let mut inner = self.inner.lock();

        if let Some(completion) = inner.in_flight.take() {
            if completion.resolve(false) {
                tracing::debug!("previous blocking event was not acknowledged, releasing producer");
            }
        }

        loop {
            if inner.status != QueueStatus::Open {
                return None;
            }
            if let Some(entry) = inner.pending.pop_front() {
                inner.in_flight = entry.completion;
                inner.consumer_wake = false;
                return Some(entry.event);
            }
            if inner.consumer_wake {
                inner.consumer_wake = false;
                return None;
            }
            match deadline {
                None => self.not_empty.wait(&mut inner),
                Some(deadline) => {
                    if self.not_empty.wait_until(&mut inner, deadline).timed_out() {
                        if inner.status != QueueStatus::Open {
                            return None;
                        }
                        let entry = inner.pending.pop_front()?;
                        inner.in_flight = entry.completion;
                        return Some(entry.event);
                    }
                }
            }
        }
    }

    /// Acknowledges the most recently dequeued event.
    ///
    /// If it was inserted blocking, its producer wakes with `handled`.
    /// Returns true if a producer was released; a second call without an
    /// intervening dequeue does nothing.
    pub fn done_with_event(&self, handled: bool) -> bool {
        let completion = self.inner.lock().in_flight.take();
        completion.is_some_and(|c| c.resolve(handled))
    }

    /// Discards every pending event.
    ///
    /// Blocking producers of discarded events receive `false`. The dequeued
    /// event awaiting acknowledgement is not affected. Returns the number of
    /// discarded events.
    pub fn flush(&self) -> usize {
        let mut inner = self.inner.lock();
        let dropped = inner.pending.len();
        for entry in inner.pending.drain(..) {
            if let Some(completion) = entry.completion {
                completion.resolve(false);
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "event queue flushed");
        }
        dropped
    }

    /// Wakes every producer waiting in `insert_blocking` with `false`.
    ///
    /// Their events stay queued; only the waits are abandoned.
    pub fn unblock_producer(&self) -> usize {
        let woken = self.inner.lock().abandon_all();
        if woken > 0 {
            tracing::debug!(woken, "blocked producers released");
        }
        woken
    }

    /// Makes the consumer return from `remove_oldest`, even without an event.
    pub fn unblock_consumer(&self) {
        let mut inner = self.inner.lock();
        inner.consumer_wake = true;
        self.not_empty.notify_all();
    }

    /// Marks the consumer as gone.
    ///
    /// Releases every blocked producer and refuses further blocking inserts
    /// until the next [`EventQueue::init`].
    pub fn detach_consumer(&self) {
        let mut inner = self.inner.lock();
        inner.consumer_detached = true;
        let woken = inner.abandon_all();
        tracing::debug!(woken, "consumer detached from event queue");
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EventQueue")
            .field("status", &inner.status)
            .field("pending", &inner.pending.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
