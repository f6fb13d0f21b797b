//! State shared between the host-facing bridge and the application thread.

use crate::config::BridgeConfig;
use crate::input::KeyFilter;
use crate::render::RenderFrameSlot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tether_core::{Event, EventQueue, LifecycleCell, LifecycleFlag};
use tether_graphics::{GraphicsContext, GraphicsProvider};

pub(crate) struct Shared {
    pub(crate) config: BridgeConfig,
    pub(crate) lifecycle: LifecycleCell,
    pub(crate) graphics: GraphicsContext,
    pub(crate) queue: EventQueue,
    pub(crate) key_filter: KeyFilter,
    pub(crate) render_frame: RenderFrameSlot,
    /// The application thread has returned from main.
    exited: AtomicBool,
    /// Teardown posted the quit event.
    posted_quit: AtomicBool,
}

impl Shared {
    pub(crate) fn new(config: BridgeConfig, provider: Arc<dyn GraphicsProvider>) -> Self {
        let graphics = GraphicsContext::new(provider, config.surface_intent());
        let queue = EventQueue::new(config.queue_capacity);
        Self {
            config,
            lifecycle: LifecycleCell::new(),
            graphics,
            queue,
            key_filter: KeyFilter::new(),
            render_frame: RenderFrameSlot::default(),
            exited: AtomicBool::new(false),
            posted_quit: AtomicBool::new(false),
        }
    }

    /// Non-blocking insert, refused once the application thread exited.
    pub(crate) fn insert(&self, event: Event) -> bool {
        if self.has_exited() {
            tracing::debug!(kind = %event.kind(), "application thread exited, event dropped");
            return false;
        }
        self.queue.insert(event)
    }

    /// Blocking insert, refused once the application thread exited.
    pub(crate) fn insert_blocking(&self, event: Event) -> bool {
        if self.has_exited() {
            tracing::debug!(kind = %event.kind(), "application thread exited, event dropped");
            return false;
        }
        self.queue.insert_blocking(event)
    }

    pub(crate) fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    pub(crate) fn set_exited(&self, exited: bool) {
        self.exited.store(exited, Ordering::Release);
    }

    pub(crate) fn posted_quit(&self) -> bool {
        self.posted_quit.load(Ordering::Acquire)
    }

    pub(crate) fn set_posted_quit(&self, posted: bool) {
        self.posted_quit.store(posted, Ordering::Release);
    }

    /// Stops rendering and tells the host the device is unsupported.
    pub(crate) fn report_unsupported(&self) {
        self.lifecycle.clear(LifecycleFlag::Focused);
        tracing::warn!("device reported unsupported");
        self.graphics.provider().report_unsupported();
    }

    pub(crate) fn notify_rendering_initialized(&self) {
        self.graphics.provider().notify_rendering_initialized();
    }
}
