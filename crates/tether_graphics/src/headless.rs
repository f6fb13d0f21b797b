//! # Headless Provider
//!
//! A [`GraphicsProvider`] with no real graphics API behind it. Every call is
//! recorded in order and succeeds unless scripted to fail, which makes it the
//! provider of choice for servers, tools, and lifecycle tests.

use crate::provider::{GraphicsProvider, ProviderOp};
use parking_lot::Mutex;
use std::collections::HashSet;

/// A recorded provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCall {
    /// Which call.
    pub op: ProviderOp,
    /// Whether it reported success.
    pub ok: bool,
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<ProviderCall>,
    failing: HashSet<ProviderOp>,
    last_error: i32,
}

/// Records every call; succeeds unless told otherwise.
#[derive(Debug, Default)]
pub struct HeadlessProvider {
    script: Mutex<Script>,
}

impl HeadlessProvider {
    /// Creates a provider where everything succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `op` report failure until [`HeadlessProvider::succeed`].
    pub fn fail(&self, op: ProviderOp) {
        self.script.lock().failing.insert(op);
    }

    /// Makes `op` report success again.
    pub fn succeed(&self, op: ProviderOp) {
        self.script.lock().failing.remove(&op);
    }

    /// Sets the value returned by `last_error`.
    pub fn set_last_error(&self, code: i32) {
        self.script.lock().last_error = code;
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.script.lock().calls.clone()
    }

    /// Just the operations, oldest first.
    #[must_use]
    pub fn ops(&self) -> Vec<ProviderOp> {
        self.script.lock().calls.iter().map(|c| c.op).collect()
    }

    /// How many times `op` was called.
    #[must_use]
    pub fn count(&self, op: ProviderOp) -> usize {
        self.script.lock().calls.iter().filter(|c| c.op == op).count()
    }

    /// Forgets recorded calls. Scripted failures stay.
    pub fn clear(&self) {
        self.script.lock().calls.clear();
    }

    fn record(&self, op: ProviderOp) -> bool {
        let mut script = self.script.lock();
        let ok = !script.failing.contains(&op);
        script.calls.push(ProviderCall { op, ok });
        tracing::trace!(op = %op, ok, "headless provider call");
        ok
    }
}

impl GraphicsProvider for HeadlessProvider {
    fn init_context(&self) -> bool {
        self.record(ProviderOp::InitContext)
    }

    fn cleanup_context(&self) -> bool {
        self.record(ProviderOp::CleanupContext)
    }

    fn create_surface(&self) -> bool {
        self.record(ProviderOp::CreateSurface)
    }

    fn create_offscreen_surface(&self, width: i32, height: i32) -> bool {
        tracing::trace!(width, height, "headless offscreen surface");
        self.record(ProviderOp::CreateOffscreenSurface)
    }

    fn destroy_surface(&self) -> bool {
        self.record(ProviderOp::DestroySurface)
    }

    fn bind_surface_and_context(&self) -> bool {
        self.record(ProviderOp::Bind)
    }

    fn unbind_surface_and_context(&self) -> bool {
        self.record(ProviderOp::Unbind)
    }

    fn swap_buffers(&self) -> bool {
        self.record(ProviderOp::SwapBuffers)
    }

    fn last_error(&self) -> i32 {
        self.record(ProviderOp::LastError);
        self.script.lock().last_error
    }

    fn report_unsupported(&self) {
        self.record(ProviderOp::ReportUnsupported);
    }

    fn notify_rendering_initialized(&self) {
        self.record(ProviderOp::RenderingInitialized);
    }

    fn request_finish(&self) {
        self.record(ProviderOp::RequestFinish);
    }
}
