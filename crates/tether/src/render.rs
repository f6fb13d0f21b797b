//! Latest-wins slot for render-frame requests posted by the host.

use parking_lot::Mutex;

/// A request to render one frame of a given region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFrameRequest {
    /// Center X in world units.
    pub x: f64,
    /// Center Y in world units.
    pub y: f64,
    /// Zoom scale.
    pub scale: f64,
    /// Output width in pixels.
    pub width: usize,
    /// Output height in pixels.
    pub height: usize,
}

/// Holds at most one pending request. Posting overwrites, taking clears.
#[derive(Debug, Default)]
pub struct RenderFrameSlot {
    pending: Mutex<Option<RenderFrameRequest>>,
}

impl RenderFrameSlot {
    /// Stores `request`, replacing any pending one.
    pub fn post(&self, request: RenderFrameRequest) {
        if self.pending.lock().replace(request).is_some() {
            tracing::trace!("render-frame request superseded");
        }
    }

    /// Returns and clears the pending request.
    pub fn take(&self) -> Option<RenderFrameRequest> {
        self.pending.lock().take()
    }
}
