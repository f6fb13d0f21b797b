//! # Lifecycle Bridge
//!
//! The host-facing half of TETHER. Every host notification lands here on a
//! host thread, updates the lifecycle flags, and becomes an event for the
//! application thread.
//!
//! ## Architecture
//!
//! ```text
//! host threads                           application thread
//! ────────────                           ──────────────────
//! on_resume ─┐                           ┌─▶ AppContext::next_event
//! on_pause  ─┼─▶ flags ─▶ EventQueue ────┤
//! on_key    ─┘              ▲            └─▶ AppContext::done_with_event
//!                           │                        │
//!                           └─── ticket resolved ◀───┘
//! ```
//!
//! Lifecycle notifications insert blocking: the host call returns only after
//! the application acknowledged the event, so the host never races ahead of
//! the application (a surface is not torn down while still in use).
//!
//! ## Creation and teardown
//!
//! `create` and `destroy` are reference counted and serialized by one lock.
//! The first create initializes the application and starts its thread; the
//! last destroy posts [`Event::Quit`], wakes the thread, and joins it.

use crate::app::{AppContext, Application};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::input::{translate_multi_touch, IdentityKeyMapper, KeyMapper};
use crate::render::RenderFrameRequest;
use crate::shared::Shared;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tether_core::{
    Callback, Event, LifecycleFlag, LifecycleState, PointerMask, QueueStats, SurfaceSize,
    UserPayload,
};
use tether_graphics::{GraphicsContext, GraphicsProvider, GraphicsState};

/// Result of [`LifecycleBridge::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// First reference: the application was initialized and started.
    Created,
    /// Already running; only the reference count changed.
    AlreadyCreated {
        /// References after this call.
        ref_count: usize,
    },
}

/// Result of [`LifecycleBridge::destroy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// Last reference: the application thread was stopped and joined.
    Destroyed,
    /// Other references remain; nothing was torn down.
    StillReferenced {
        /// References after this call.
        ref_count: usize,
    },
}

#[derive(Default)]
struct Construction {
    ref_count: usize,
    thread: Option<JoinHandle<()>>,
}

/// Marks the application thread as finished however `main` ends.
struct ExitGuard {
    shared: Arc<Shared>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::error!("application main panicked");
        } else {
            tracing::debug!("application main returned");
        }

        // Release a host thread blocked in a lifecycle call.
        self.shared.queue.detach_consumer();
        self.shared.set_exited(true);

        if !self.shared.posted_quit() {
            tracing::info!("application finished on its own, requesting host finish");
            self.shared.graphics.provider().request_finish();
        }
    }
}

/// Bridges host lifecycle notifications to one application thread.
pub struct LifecycleBridge {
    shared: Arc<Shared>,
    app: Arc<dyn Application>,
    key_mapper: Box<dyn KeyMapper>,
    construction: Mutex<Construction>,
}

impl LifecycleBridge {
    /// Creates an idle bridge. Nothing runs until [`LifecycleBridge::create`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if `config` does not validate.
    pub fn new(
        config: BridgeConfig,
        app: Arc<dyn Application>,
        provider: Arc<dyn GraphicsProvider>,
    ) -> BridgeResult<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config, provider)),
            app,
            key_mapper: Box::new(IdentityKeyMapper),
            construction: Mutex::new(Construction::default()),
        })
    }

    /// Replaces the key mapper.
    #[must_use]
    pub fn with_key_mapper(mut self, mapper: impl KeyMapper + 'static) -> Self {
        self.key_mapper = Box::new(mapper);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    // =========================================================================
    // Creation and teardown
    // =========================================================================

    /// Adds a reference, starting the application on the first one.
    ///
    /// On the first reference: clears the lifecycle and graphics flags, opens
    /// the queue, runs [`Application::init`], sets Running, and spawns the
    /// application thread.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::AppInit`] if the application refused to start
    /// - [`BridgeError::Spawn`] if the thread could not be started
    ///
    /// Either way the reference count stays at zero.
    pub fn create(&self) -> BridgeResult<CreateOutcome> {
        let mut construction = self.construction.lock();

        if construction.ref_count != 0 {
            construction.ref_count += 1;
            tracing::info!(ref_count = construction.ref_count, "bridge already created");
            return Ok(CreateOutcome::AlreadyCreated {
                ref_count: construction.ref_count,
            });
        }

        let shared = &self.shared;
        shared.lifecycle.reset();
        shared.graphics.reset_state();
        shared.key_filter.reset();
        shared.queue.init();
        shared.set_posted_quit(false);

        tracing::debug!("initializing application");
        if let Err(err) = self.app.init() {
            tracing::error!(code = err.code, "application init failed");
            shared.queue.shutdown();
            return Err(err.into());
        }

        shared.set_exited(false);
        shared.lifecycle.set(LifecycleFlag::Running);

        let thread_shared = Arc::clone(shared);
        let app = Arc::clone(&self.app);
        let spawned = thread::Builder::new()
            .name(shared.config.consumer_thread_name.clone())
            .spawn(move || {
                let ctx = AppContext::new(Arc::clone(&thread_shared));
                let _guard = ExitGuard {
                    shared: thread_shared,
                };
                app.main(ctx);
            });

        match spawned {
            Ok(handle) => {
                construction.thread = Some(handle);
                construction.ref_count = 1;
                tracing::info!(
                    thread = %shared.config.consumer_thread_name,
                    "bridge created, application thread started"
                );
                Ok(CreateOutcome::Created)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn application thread");
                shared.lifecycle.clear(LifecycleFlag::Running);
                shared.set_exited(true);
                shared.queue.shutdown();
                Err(BridgeError::Spawn(e.to_string()))
            }
        }
    }

    /// Drops a reference, stopping the application on the last one.
    ///
    /// On the last reference, if the application thread is still running:
    /// flushes pending events, clears Running, posts [`Event::Quit`], wakes
    /// the thread, and joins it. A graphics context the application left
    /// initialized is cleaned up, and the queue is shut down.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotCreated`] without a matching create.
    pub fn destroy(&self) -> BridgeResult<DestroyOutcome> {
        let mut construction = self.construction.lock();

        if construction.ref_count == 0 {
            tracing::warn!("destroy without create");
            return Err(BridgeError::NotCreated);
        }

        construction.ref_count -= 1;
        if construction.ref_count != 0 {
            tracing::info!(ref_count = construction.ref_count, "bridge still referenced");
            return Ok(DestroyOutcome::StillReferenced {
                ref_count: construction.ref_count,
            });
        }

        self.teardown(&mut construction);
        Ok(DestroyOutcome::Destroyed)
    }

    fn teardown(&self, construction: &mut Construction) {
        let shared = &self.shared;
        let thread = construction.thread.take();

        if !shared.has_exited() {
            tracing::debug!("posting quit");
            shared.queue.flush();
            shared.lifecycle.clear(LifecycleFlag::Running);
            shared.set_posted_quit(true);
            shared.insert(Event::Quit);
            shared.queue.unblock_consumer();
        }

        if let Some(handle) = thread {
            tracing::debug!("waiting for application thread");
            join_application(handle);
        }

        shared.lifecycle.clear(LifecycleFlag::Running);
        if shared.graphics.is_context_initialized() {
            if let Err(err) = shared.graphics.cleanup_context() {
                tracing::warn!(error = %err, "graphics cleanup failed at teardown");
            }
        }
        shared.queue.shutdown();
        tracing::info!("bridge destroyed");
    }

    /// Current reference count.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.construction.lock().ref_count
    }

    /// True once the application thread has returned from main.
    #[must_use]
    pub fn has_exited(&self) -> bool {
        self.shared.has_exited()
    }

    // =========================================================================
    // Lifecycle notifications (blocking)
    // =========================================================================

    /// Host started.
    pub fn on_start(&self) -> bool {
        tracing::debug!("start");
        self.shared.insert_blocking(Event::Start)
    }

    /// Host restarted.
    pub fn on_restart(&self) -> bool {
        tracing::debug!("restart");
        self.shared.insert_blocking(Event::Restart)
    }

    /// Host resumed. Sets Active.
    pub fn on_resume(&self) -> bool {
        tracing::debug!("resume");
        self.shared.lifecycle.set(LifecycleFlag::Active);
        self.shared.insert_blocking(Event::Resume)
    }

    /// Surface created. HasRealSurface follows whether both sides are positive.
    pub fn on_surface_created(&self, width: i32, height: i32, density: i32) -> bool {
        let size = SurfaceSize::new(width, height, density);
        tracing::debug!(width, height, density, "surface created");
        self.shared
            .lifecycle
            .assign(LifecycleFlag::HasRealSurface, size.is_real());
        self.shared.insert_blocking(Event::SurfaceCreated(size))
    }

    /// Focus changed. Focused follows `focused`.
    pub fn on_focus_changed(&self, focused: bool) -> bool {
        tracing::debug!(focused, "focus changed");
        self.shared.lifecycle.assign(LifecycleFlag::Focused, focused);
        let event = if focused {
            Event::FocusGained
        } else {
            Event::FocusLost
        };
        self.shared.insert_blocking(event)
    }

    /// Surface resized. HasRealSurface follows whether the area is nonzero.
    pub fn on_surface_changed(&self, width: i32, height: i32, density: i32) -> bool {
        tracing::debug!(width, height, density, "surface changed");
        let has_area = width != 0 && height != 0;
        self.shared
            .lifecycle
            .assign(LifecycleFlag::HasRealSurface, has_area);
        self.shared
            .insert_blocking(Event::SurfaceResized(SurfaceSize::new(width, height, density)))
    }

    /// Surface destroyed. Clears HasRealSurface.
    pub fn on_surface_destroyed(&self) -> bool {
        tracing::debug!("surface destroyed");
        self.shared.lifecycle.clear(LifecycleFlag::HasRealSurface);
        self.shared.insert_blocking(Event::SurfaceDestroyed)
    }

    /// Host paused. Drops pending events and clears Active.
    pub fn on_pause(&self) -> bool {
        tracing::debug!("pause");
        self.shared.queue.flush();
        self.shared.lifecycle.clear(LifecycleFlag::Active);
        self.shared.insert_blocking(Event::Pause)
    }

    /// Host stopped.
    pub fn on_stop(&self) -> bool {
        tracing::debug!("stop");
        self.shared.insert_blocking(Event::Stop)
    }

    /// [`LifecycleBridge::create`] for hosts that only understand `bool`.
    pub fn on_create(&self) -> bool {
        match self.create() {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, "create failed");
                false
            }
        }
    }

    /// [`LifecycleBridge::destroy`] for hosts that only understand `bool`.
    pub fn on_destroy(&self) -> bool {
        match self.destroy() {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, "destroy failed");
                false
            }
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Key notification.
    ///
    /// A mapped key that differs from the previous key is inserted blocking
    /// and its result returned. A nonzero character on anything but a key-up
    /// is additionally inserted as [`Event::Char`].
    pub fn on_key(&self, host_action: i32, host_code: i32, unichar: u32) -> bool {
        let input = &self.shared.config.input;
        let mut handled = false;

        if let Some(code) = self.key_mapper.map_key(host_code) {
            if self.shared.key_filter.admit(code, host_action) {
                let action = input.key_action(host_action);
                handled = self.shared.insert_blocking(Event::Key { action, code });
            }
        }

        if unichar != 0 && host_action != input.key_action_up {
            self.shared.insert(Event::Char { unichar });
        }

        handled
    }

    /// Single-pointer touch.
    pub fn on_touch(&self, host_action: i32, x: i32, y: i32) -> bool {
        let action = self.shared.config.input.touch_action(host_action);
        self.shared.insert(Event::Touch { action, x, y });
        true
    }

    /// Two-pointer touch. Pointer presence becomes a [`PointerMask`].
    pub fn on_multi_touch(
        &self,
        host_action: i32,
        has_first: bool,
        has_second: bool,
        first: (i32, i32),
        second: (i32, i32),
    ) -> bool {
        let input = &self.shared.config.input;
        let touch = translate_multi_touch(
            input,
            host_action,
            PointerMask::new(has_first, has_second),
            first,
            second,
        );
        tracing::trace!(
            action = ?touch.action,
            pointer = input.pointer_index(host_action),
            "multi-touch"
        );
        self.shared.insert(Event::MultiTouch(touch));
        true
    }

    /// Accelerometer sample.
    pub fn on_accelerometer(&self, x: f32, y: f32, z: f32) -> bool {
        self.shared.insert(Event::Accelerometer { x, y, z });
        true
    }

    /// Long click.
    pub fn on_long_click(&self, x: i32, y: i32) -> bool {
        self.shared.insert(Event::LongClick { x, y });
        true
    }

    // =========================================================================
    // Application-defined events
    // =========================================================================

    /// Posts four integers. Blocking returns the application's result.
    pub fn post_user_event(&self, payload: UserPayload, blocking: bool) -> bool {
        if blocking {
            self.shared.insert_blocking(Event::User(payload))
        } else {
            self.shared.insert(Event::User(payload));
            true
        }
    }

    /// Posts a closure for the application thread to run.
    pub fn post_callback(&self, callback: Callback, blocking: bool) -> bool {
        if blocking {
            self.shared.insert_blocking(Event::Callback(callback))
        } else {
            self.shared.insert(Event::Callback(callback));
            true
        }
    }

    /// Queues a repaint request.
    pub fn repaint(&self) -> bool {
        self.shared.insert(Event::repaint());
        true
    }

    /// Stores a render-frame request, replacing any pending one.
    pub fn post_render_frame_request(
        &self,
        x: f64,
        y: f64,
        scale: f64,
        width: usize,
        height: usize,
    ) {
        self.shared.render_frame.post(RenderFrameRequest {
            x,
            y,
            scale,
            width,
            height,
        });
    }

    /// Takes the pending render-frame request, if any.
    #[must_use]
    pub fn take_render_frame_request(&self) -> Option<RenderFrameRequest> {
        self.shared.render_frame.take()
    }

    // =========================================================================
    // Calls up to the host
    // =========================================================================

    /// Clears Focused and reports the device as unsupported.
    pub fn report_unsupported(&self) {
        self.shared.report_unsupported();
    }

    /// Tells the host the first frame is ready.
    pub fn notify_rendering_initialized(&self) {
        self.shared.notify_rendering_initialized();
    }

    // =========================================================================
    // Queries
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

    /// Masked lifecycle query. See [`tether_core::LifecycleCell::query_masked`].
    #[must_use]
    pub fn query_lifecycle(&self, mask: LifecycleState, expected: LifecycleState) -> bool {
        self.shared.lifecycle.query_masked(mask, expected)
    }

    /// The graphics context state machine.
    #[must_use]
    pub fn graphics(&self) -> &GraphicsContext {
        &self.shared.graphics
    }

    /// All graphics flags.
    #[must_use]
    pub fn graphics_state(&self) -> GraphicsState {
        self.shared.graphics.state()
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

    /// Queue counters.
    #[must_use]
    pub fn queue_stats(&self) -> QueueStats {
        self.shared.queue.stats()
    }
}

impl Drop for LifecycleBridge {
    fn drop(&mut self) {
        let mut construction = self.construction.lock();
        if construction.ref_count != 0 {
            tracing::warn!(
                ref_count = construction.ref_count,
                "bridge dropped while created, tearing down"
            );
            construction.ref_count = 0;
            self.teardown(&mut construction);
        }
    }
}

impl fmt::Debug for LifecycleBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleBridge")
            .field("ref_count", &self.ref_count())
            .field("lifecycle", &self.lifecycle())
            .field("graphics", &self.graphics_state())
            .field("queue", &self.queue_stats())
            .finish_non_exhaustive()
    }
}

fn join_application(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        tracing::error!("application thread panicked");
    } else {
        tracing::debug!("application thread joined");
    }
}
