//! # TETHER Core
//!
//! The host-facing half of TETHER: which lifecycle phases are active, what an
//! event looks like, and the queue that carries events from host callback
//! threads to the single application thread.
//!
//! ## Architecture Rules
//!
//! 1. **Exactly one consumer** - only the application thread dequeues
//! 2. **No permanent waits** - every abandoned blocking insert resolves `false`
//! 3. **Readers never block** - lifecycle flags are a single atomic word
//!
//! ## Example
//!
//! ```rust,ignore
//! use tether_core::{Event, EventQueue};
//!
//! let queue = EventQueue::new(256);
//! queue.init();
//!
//! // Host thread
//! let handled = queue.insert_blocking(Event::Resume);
//!
//! // Application thread
//! if let Some(event) = queue.remove_oldest(None) {
//!     queue.done_with_event(true);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod event;
pub mod queue;
pub mod state;
pub mod ticket;

pub use event::{
    Callback, Event, EventKind, KeyAction, KeyCode, MultiTouch, PointerMask, SurfaceSize,
    TouchAction, UserPayload, EVENT_KIND_COUNT,
};
pub use queue::{EventQueue, QueueStats, QueueStatus, DEFAULT_QUEUE_CAPACITY};
pub use state::{LifecycleCell, LifecycleFlag, LifecycleState};
pub use ticket::Ticket;
