//! # Application Entry Points
//!
//! The application supplies an [`Application`]; the bridge calls `init` on
//! the host thread during creation and then runs `main` on a dedicated
//! thread. `main` pulls events through its [`AppContext`] until it sees
//! [`Event::Quit`] or decides to stop on its own.
//!
//! ## Main loop shape
//!
//! ```rust,ignore
//! fn main(&self, ctx: AppContext) {
//!     loop {
//!         while let Some(event) = ctx.next_event(Some(Duration::ZERO)) {
//!             let handled = self.handle(&event);
//!             ctx.done_with_event(handled);
//!             if matches!(event, Event::Quit) {
//!                 return;
//!             }
//!         }
//!         if ctx.is_interactable() && ctx.ready_to_render(true).is_ok() {
//!             self.draw();
//!             ctx.swap_buffers();
//!         }
//!     }
//! }
//! ```

use crate::error::AppInitError;
use crate::render::RenderFrameRequest;
use crate::shared::Shared;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tether_core::{Event, LifecycleFlag, LifecycleState, QueueStats};
use tether_graphics::{ContextPhase, GraphicsContext, GraphicsResult, GraphicsState};

/// The application driven by the bridge.
pub trait Application: Send + Sync + 'static {
    /// Runs on the host thread before the application thread starts.
    ///
    /// # Errors
    ///
    /// An error aborts creation; `main` is never called.
    fn init(&self) -> Result<(), AppInitError> {
        Ok(())
    }

    /// The application thread's body. Returning ends the thread.
    fn main(&self, ctx: AppContext);
}

/// The application thread's view of the bridge.
///
/// Owned by the application thread; events must only be taken there.
pub struct AppContext {
    shared: Arc<Shared>,
}

impl AppContext {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Takes the next event, waiting up to `wait` (`None` waits forever).
    ///
    /// Returns `None` on timeout or when the host wakes the thread without an
    /// event. With `release_surface_on_destroy` set, the graphics surface is
    /// already gone when a [`Event::SurfaceDestroyed`] is returned.
    ///
    /// The queue has a single consumer: call this only from the thread
    /// [`Application::main`] runs on.
    #[must_use]
    pub fn next_event(&self, wait: Option<Duration>) -> Option<Event> {
        let event = self.shared.queue.remove_oldest(wait)?;
        if matches!(event, Event::SurfaceDestroyed) && self.shared.config.release_surface_on_destroy {
            if let Err(err) = self.shared.graphics.destroy_surface() {
                tracing::warn!(error = %err, "surface release failed");
            }
        }
        tracing::trace!(kind = %event.kind(), "event delivered");
        Some(event)
    }

    /// Acknowledges the event last returned by [`AppContext::next_event`].
    ///
    /// Returns true if a blocked host call was released.
    pub fn done_with_event(&self, handled: bool) -> bool {
        self.shared.queue.done_with_event(handled)
    }

    /// Queue counters.
    #[must_use]
    pub fn queue_stats(&self) -> QueueStats {
        self.shared.queue.stats()
    }

    // =========================================================================
    // Lifecycle queries
    // =========================================================================

    /// All lifecycle flags.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleState {
        self.shared.lifecycle.snapshot()
    }

    /// Between create and destroy.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.lifecycle.is_set(LifecycleFlag::Running)
    }

    /// Between resume and pause.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared.lifecycle.is_set(LifecycleFlag::Active)
    }

    /// Has input focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.shared.lifecycle.is_set(LifecycleFlag::Focused)
    }

    /// Host surface exists with a nonzero extent.
    #[must_use]
    pub fn has_real_surface(&self) -> bool {
        self.shared.lifecycle.is_set(LifecycleFlag::HasRealSurface)
    }

    /// Running, active, focused, and backed by a real surface.
    #[must_use]
    pub fn is_interactable(&self) -> bool {
        self.shared.lifecycle.is_interactable()
    }

    // =========================================================================
    // Graphics
    // =========================================================================

    /// The graphics context state machine.
    #[must_use]
    pub fn graphics(&self) -> &GraphicsContext {
        &self.shared.graphics
    }

    /// See [`GraphicsContext::ready_to_render`].
    ///
    /// # Errors
    ///
    /// Propagates the graphics context's error.
    pub fn ready_to_render(&self, allocate_if_needed: bool) -> GraphicsResult<()> {
        self.shared.graphics.ready_to_render(allocate_if_needed)
    }

    /// Presents the back buffer.
    #[must_use]
    pub fn swap_buffers(&self) -> bool {
        self.shared.graphics.swap_buffers()
    }

    /// All graphics flags.
    #[must_use]
    pub fn graphics_state(&self) -> GraphicsState {
        self.shared.graphics.state()
    }

    /// Graphics phase.
    #[must_use]
    pub fn graphics_phase(&self) -> ContextPhase {
        self.shared.graphics.phase()
    }

    /// A graphics context exists.
    #[must_use]
    pub fn is_context_initialized(&self) -> bool {
        self.shared.graphics.is_context_initialized()
    }

    /// A graphics surface exists.
    #[must_use]
    pub fn has_surface(&self) -> bool {
        self.shared.graphics.has_surface()
    }

    /// Surface and context are bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.shared.graphics.is_bound()
    }

    // =========================================================================
    // Calls up to the host
    // =========================================================================

    /// Queues a repaint request for this thread to pick up.
    pub fn repaint(&self) -> bool {
        self.shared.insert(Event::repaint())
    }

    /// Stops rendering and tells the host the device cannot run the
    /// application.
    pub fn report_unsupported(&self) {
        self.shared.report_unsupported();
    }

    /// Tells the host the first frame is ready.
    pub fn notify_rendering_initialized(&self) {
        self.shared.notify_rendering_initialized();
    }

    /// Takes the pending render-frame request, if any.
    #[must_use]
    pub fn take_render_frame_request(&self) -> Option<RenderFrameRequest> {
        self.shared.render_frame.take()
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("lifecycle", &self.lifecycle())
            .field("graphics", &self.graphics_state())
            .finish_non_exhaustive()
    }
}
