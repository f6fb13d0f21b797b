//! # Graphics Context Lifecycle
//!
//! Sequences context and surface creation through the injected provider and
//! records what currently exists. Flags change only when the provider reports
//! success, with two exceptions: `unbind` and `cleanup_context` clear their
//! flags first, since a failed release still leaves nothing usable behind.
//!
//! ## Usage
//!
//! The application thread calls [`GraphicsContext::ready_to_render`] at the
//! top of every frame. The first call after a surface appears allocates
//! lazily; later calls are a flag check.

use crate::error::{GraphicsError, GraphicsResult};
use crate::provider::{GraphicsProvider, ProviderOp};
use crate::state::{ContextPhase, GraphicsCell, GraphicsState};
use crate::surface::SurfaceIntent;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Graphics context state machine.
pub struct GraphicsContext {
    provider: Arc<dyn GraphicsProvider>,
    state: GraphicsCell,
    intent: Mutex<SurfaceIntent>,
}

impl GraphicsContext {
    /// Creates a context with nothing allocated.
    #[must_use]
    pub fn new(provider: Arc<dyn GraphicsProvider>, intent: SurfaceIntent) -> Self {
        Self {
            provider,
            state: GraphicsCell::default(),
            intent: Mutex::new(intent),
        }
    }

    /// The injected provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn GraphicsProvider> {
        &self.provider
    }

    /// Which surface kind `ready_to_render` creates.
    #[must_use]
    pub fn surface_intent(&self) -> SurfaceIntent {
        *self.intent.lock()
    }

    /// Changes the surface kind for the next creation.
    ///
    /// An existing surface is left alone.
    pub fn set_surface_intent(&self, intent: SurfaceIntent) {
        *self.intent.lock() = intent;
    }

    /// Initializes the display and context.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Provider`] if the provider fails.
    pub fn init_context(&self) -> GraphicsResult<()> {
        check(self.provider.init_context(), ProviderOp::InitContext)?;
        self.state.set_context_initialized(true);
        tracing::debug!("graphics context initialized");
        Ok(())
    }

    /// Creates a window surface.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Provider`] if the provider fails.
    pub fn create_surface(&self) -> GraphicsResult<()> {
        check(self.provider.create_surface(), ProviderOp::CreateSurface)?;
        self.state.set_has_surface(true);
        tracing::debug!("window surface created");
        Ok(())
    }

    /// Creates an offscreen surface.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Provider`] if the provider fails.
    pub fn create_offscreen_surface(&self, width: i32, height: i32) -> GraphicsResult<()> {
        check(
            self.provider.create_offscreen_surface(width, height),
            ProviderOp::CreateOffscreenSurface,
        )?;
        self.state.set_has_surface(true);
        tracing::debug!(width, height, "offscreen surface created");
        Ok(())
    }

    /// Destroys the surface, unbinding first if bound.
    ///
    /// A no-op when there is no surface. The surface is considered gone even
    /// if the provider fails.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Provider`] if unbinding or destroying fails.
    pub fn destroy_surface(&self) -> GraphicsResult<()> {
        let state = self.state.snapshot();
        if !state.has_surface {
            return Ok(());
        }

        let unbound = if state.bound { self.unbind() } else { Ok(()) };

        self.state.set_has_surface(false);
        check(self.provider.destroy_surface(), ProviderOp::DestroySurface)?;
        tracing::debug!("surface destroyed");
        unbound
    }

    /// Makes the surface and context current.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Provider`] if the provider fails.
    pub fn bind(&self) -> GraphicsResult<()> {
        check(self.provider.bind_surface_and_context(), ProviderOp::Bind)?;
        self.state.set_bound(true);
        Ok(())
    }

    /// Releases the binding. Not bound afterwards, whatever the provider says.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Provider`] if the provider fails.
    pub fn unbind(&self) -> GraphicsResult<()> {
        self.state.set_bound(false);
        check(self.provider.unbind_surface_and_context(), ProviderOp::Unbind)
    }

    /// Releases everything. All flags are cleared before the provider runs.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Provider`] if the provider fails.
    pub fn cleanup_context(&self) -> GraphicsResult<()> {
        self.state.clear_all();
        check(self.provider.cleanup_context(), ProviderOp::CleanupContext)?;
        tracing::debug!("graphics context cleaned up");
        Ok(())
    }

    /// Forgets all graphics state without calling the provider.
    ///
    /// For a fresh application instance; whatever the previous one held is
    /// no longer current.
    pub fn reset_state(&self) {
        self.state.clear_all();
    }

    /// Ensures the surface and context are bound.
    ///
    /// Already bound returns immediately. Otherwise, with `allocate_if_needed`
    /// set, runs whatever remains of init, surface creation, and bind, in that
    /// order. The first failing step ends the attempt and earlier steps are
    /// kept, so the next call resumes where this one stopped.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::NotBound`] when not bound and allocation is not allowed
    /// - [`GraphicsError::Provider`] for the first failing step
    pub fn ready_to_render(&self, allocate_if_needed: bool) -> GraphicsResult<()> {
        let state = self.state.snapshot();
        if state.bound {
            return Ok(());
        }
        if !allocate_if_needed {
            return Err(GraphicsError::NotBound);
        }

        let result = self.allocate(state);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "not ready to render");
        }
        result
    }

    fn allocate(&self, state: GraphicsState) -> GraphicsResult<()> {
        if !state.context_initialized {
            self.init_context()?;
        }
        if !state.has_surface {
            match self.surface_intent() {
                SurfaceIntent::Window => self.create_surface()?,
                SurfaceIntent::Offscreen { width, height } => {
                    self.create_offscreen_surface(width, height)?;
                }
            }
        }
        self.bind()
    }

    /// Presents the back buffer.
    #[must_use]
    pub fn swap_buffers(&self) -> bool {
        self.provider.swap_buffers()
    }

    /// Provider's last error code.
    #[must_use]
    pub fn last_error(&self) -> i32 {
        self.provider.last_error()
    }

    /// Current flags.
    #[must_use]
    pub fn state(&self) -> GraphicsState {
        self.state.snapshot()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ContextPhase {
        self.state.snapshot().phase()
    }

    /// Display and context exist.
    #[must_use]
    pub fn is_context_initialized(&self) -> bool {
        self.state.snapshot().context_initialized
    }

    /// A surface exists.
    #[must_use]
    pub fn has_surface(&self) -> bool {
        self.state.snapshot().has_surface
    }

    /// Surface and context are current.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state.snapshot().bound
    }
}

impl fmt::Debug for GraphicsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("state", &self.state.snapshot())
            .field("intent", &self.surface_intent())
            .finish_non_exhaustive()
    }
}

#[inline]
fn check(ok: bool, op: ProviderOp) -> GraphicsResult<()> {
    if ok {
        Ok(())
    } else {
        Err(GraphicsError::provider(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessProvider;
    use crate::provider::UnavailableProvider;

    fn setup(intent: SurfaceIntent) -> (Arc<HeadlessProvider>, GraphicsContext) {
        let provider = Arc::new(HeadlessProvider::new());
        let context = GraphicsContext::new(provider.clone(), intent);
        (provider, context)
    }

    #[test]
    fn test_ready_to_render_without_allocation() {
        let (provider, context) = setup(SurfaceIntent::Window);

        assert_eq!(context.ready_to_render(false), Err(GraphicsError::NotBound));
        assert!(provider.calls().is_empty());
        assert_eq!(context.phase(), ContextPhase::Uninitialized);
    }

    #[test]
    fn test_ready_to_render_allocates_in_order() {
        let (provider, context) = setup(SurfaceIntent::Window);

        assert_eq!(context.ready_to_render(true), Ok(()));
        assert_eq!(
            provider.ops(),
            vec![ProviderOp::InitContext, ProviderOp::CreateSurface, ProviderOp::Bind]
        );
        assert_eq!(context.phase(), ContextPhase::Bound);

        // Bound: flag check only
        provider.clear();
        assert_eq!(context.ready_to_render(true), Ok(()));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_ready_to_render_offscreen_intent() {
        let (provider, context) = setup(SurfaceIntent::Offscreen { width: 320, height: 200 });

        assert_eq!(context.ready_to_render(true), Ok(()));
        assert_eq!(
            provider.ops(),
            vec![
                ProviderOp::InitContext,
                ProviderOp::CreateOffscreenSurface,
                ProviderOp::Bind
            ]
        );
    }

    #[test]
    fn test_ready_to_render_stops_at_first_failure_and_resumes() {
        let (provider, context) = setup(SurfaceIntent::Window);
        provider.fail(ProviderOp::CreateSurface);

        assert_eq!(
            context.ready_to_render(true),
            Err(GraphicsError::provider(ProviderOp::CreateSurface))
        );
        assert_eq!(provider.ops(), vec![ProviderOp::InitContext, ProviderOp::CreateSurface]);
        assert_eq!(context.phase(), ContextPhase::Initialized);

        provider.succeed(ProviderOp::CreateSurface);
        provider.clear();
        assert_eq!(context.ready_to_render(true), Ok(()));
        assert_eq!(provider.ops(), vec![ProviderOp::CreateSurface, ProviderOp::Bind]);
    }

    #[test]
    fn test_init_failure_changes_nothing() {
        let (provider, context) = setup(SurfaceIntent::Window);
        provider.fail(ProviderOp::InitContext);

        assert!(context.ready_to_render(true).is_err());
        assert_eq!(provider.ops(), vec![ProviderOp::InitContext]);
        assert_eq!(context.state(), GraphicsState::default());
    }

    #[test]
    fn test_destroy_surface_while_bound_unbinds_first() {
        let (provider, context) = setup(SurfaceIntent::Window);
        context.ready_to_render(true).unwrap();
        provider.clear();

        assert_eq!(context.destroy_surface(), Ok(()));
        assert_eq!(provider.ops(), vec![ProviderOp::Unbind, ProviderOp::DestroySurface]);
        assert!(!context.is_bound());
        assert!(!context.has_surface());
        assert!(context.is_context_initialized());
    }

    #[test]
    fn test_destroy_surface_without_surface_is_noop() {
        let (provider, context) = setup(SurfaceIntent::Window);
        context.init_context().unwrap();
        provider.clear();

        assert_eq!(context.destroy_surface(), Ok(()));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_destroy_surface_failure_still_clears() {
        let (provider, context) = setup(SurfaceIntent::Window);
        context.ready_to_render(true).unwrap();
        provider.fail(ProviderOp::DestroySurface);

        assert_eq!(
            context.destroy_surface(),
            Err(GraphicsError::provider(ProviderOp::DestroySurface))
        );
        assert!(!context.has_surface());
    }

    #[test]
    fn test_unbind_clears_eagerly() {
        let (provider, context) = setup(SurfaceIntent::Window);
        context.ready_to_render(true).unwrap();
        provider.fail(ProviderOp::Unbind);

        assert!(context.unbind().is_err());
        assert!(!context.is_bound());
        assert_eq!(context.phase(), ContextPhase::SurfaceReady);
    }

    #[test]
    fn test_cleanup_clears_flags_before_provider() {
        let (provider, context) = setup(SurfaceIntent::Window);
        context.ready_to_render(true).unwrap();
        provider.fail(ProviderOp::CleanupContext);

        assert!(context.cleanup_context().is_err());
        assert_eq!(context.state(), GraphicsState::default());
    }

    #[test]
    fn test_reset_state_skips_provider() {
        let (provider, context) = setup(SurfaceIntent::Window);
        context.ready_to_render(true).unwrap();
        provider.clear();

        context.reset_state();
        assert_eq!(context.phase(), ContextPhase::Uninitialized);
        assert!(provider.ops().is_empty());

        context.ready_to_render(true).unwrap();
        assert_eq!(
            provider.ops(),
            vec![ProviderOp::InitContext, ProviderOp::CreateSurface, ProviderOp::Bind]
        );
    }

    #[test]
    fn test_intent_change_applies_to_next_surface() {
        let (provider, context) = setup(SurfaceIntent::Window);
        context.ready_to_render(true).unwrap();

        context.set_surface_intent(SurfaceIntent::Offscreen { width: 8, height: 8 });
        assert!(context.is_bound());

        context.destroy_surface().unwrap();
        provider.clear();
        context.ready_to_render(true).unwrap();
        assert_eq!(
            provider.ops(),
            vec![ProviderOp::CreateOffscreenSurface, ProviderOp::Bind]
        );
    }

    #[test]
    fn test_unavailable_provider_never_binds() {
        let context = GraphicsContext::new(Arc::new(UnavailableProvider), SurfaceIntent::Window);
        assert_eq!(
            context.ready_to_render(true),
            Err(GraphicsError::provider(ProviderOp::InitContext))
        );
        assert!(!context.swap_buffers());
    }
}
