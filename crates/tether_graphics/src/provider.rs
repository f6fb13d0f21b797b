//! # Graphics Provider
//!
//! The capability TETHER calls into to actually create, bind, and tear down
//! graphics resources. The host integration layer implements it and injects
//! it once at construction; nothing is looked up at call time.
//!
//! Every method has a default body for a provider that is not wired up yet:
//! it logs a warning and reports failure (`false`, `0`, or nothing).

use std::fmt;

/// Identifies a provider call, for errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOp {
    /// `init_context`
    InitContext,
    /// `cleanup_context`
    CleanupContext,
    /// `create_surface`
    CreateSurface,
    /// `create_offscreen_surface`
    CreateOffscreenSurface,
    /// `destroy_surface`
    DestroySurface,
    /// `bind_surface_and_context`
    Bind,
    /// `unbind_surface_and_context`
    Unbind,
    /// `swap_buffers`
    SwapBuffers,
    /// `last_error`
    LastError,
    /// `report_unsupported`
    ReportUnsupported,
    /// `notify_rendering_initialized`
    RenderingInitialized,
    /// `request_finish`
    RequestFinish,
}

impl ProviderOp {
    /// Method name on [`GraphicsProvider`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InitContext => "init_context",
            Self::CleanupContext => "cleanup_context",
            Self::CreateSurface => "create_surface",
            Self::CreateOffscreenSurface => "create_offscreen_surface",
            Self::DestroySurface => "destroy_surface",
            Self::Bind => "bind_surface_and_context",
            Self::Unbind => "unbind_surface_and_context",
            Self::SwapBuffers => "swap_buffers",
            Self::LastError => "last_error",
            Self::ReportUnsupported => "report_unsupported",
            Self::RenderingInitialized => "notify_rendering_initialized",
            Self::RequestFinish => "request_finish",
        }
    }
}

impl fmt::Display for ProviderOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cold]
fn unavailable(op: ProviderOp) {
    tracing::warn!(op = %op, "graphics provider call is not wired up");
}

/// Host-side graphics operations.
///
/// Boolean methods return `true` on success. Implementations may be called
/// from the application thread and from host callback threads.
pub trait GraphicsProvider: Send + Sync {
    /// Initializes the display and rendering context.
    fn init_context(&self) -> bool {
        unavailable(ProviderOp::InitContext);
        false
    }

    /// Releases the display and rendering context.
    fn cleanup_context(&self) -> bool {
        unavailable(ProviderOp::CleanupContext);
        false
    }

    /// Creates a surface on the host window.
    fn create_surface(&self) -> bool {
        unavailable(ProviderOp::CreateSurface);
        false
    }

    /// Creates an offscreen surface of the given size.
    fn create_offscreen_surface(&self, width: i32, height: i32) -> bool {
        let _ = (width, height);
        unavailable(ProviderOp::CreateOffscreenSurface);
        false
    }

    /// Destroys the current surface.
    fn destroy_surface(&self) -> bool {
        unavailable(ProviderOp::DestroySurface);
        false
    }

    /// Makes the surface and context current for rendering.
    fn bind_surface_and_context(&self) -> bool {
        unavailable(ProviderOp::Bind);
        false
    }

    /// Releases the current surface and context binding.
    fn unbind_surface_and_context(&self) -> bool {
        unavailable(ProviderOp::Unbind);
        false
    }

    /// Presents the back buffer.
    fn swap_buffers(&self) -> bool {
        unavailable(ProviderOp::SwapBuffers);
        false
    }

    /// Last error code reported by the graphics API.
    fn last_error(&self) -> i32 {
        unavailable(ProviderOp::LastError);
        0
    }

    /// Tells the host the device cannot run the application.
    fn report_unsupported(&self) {
        unavailable(ProviderOp::ReportUnsupported);
    }

    /// Tells the host the first frame can be shown.
    fn notify_rendering_initialized(&self) {
        unavailable(ProviderOp::RenderingInitialized);
    }

    /// Asks the host to finish the application.
    fn request_finish(&self) {
        unavailable(ProviderOp::RequestFinish);
    }
}

/// Provider with nothing wired up. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProvider;

impl GraphicsProvider for UnavailableProvider {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_provider_fails_everything() {
        let provider = UnavailableProvider;
        assert!(!provider.init_context());
        assert!(!provider.create_surface());
        assert!(!provider.create_offscreen_surface(64, 64));
        assert!(!provider.bind_surface_and_context());
        assert!(!provider.swap_buffers());
        assert_eq!(provider.last_error(), 0);
        provider.request_finish();
    }

    #[test]
    fn test_op_names() {
        assert_eq!(ProviderOp::Bind.to_string(), "bind_surface_and_context");
        assert_eq!(ProviderOp::CreateOffscreenSurface.as_str(), "create_offscreen_surface");
    }
}
