//! Scripted application and helpers shared by the integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tether::{
    AppContext, AppInitError, Application, BridgeConfig, Event, EventKind, LifecycleBridge,
    LifecycleState,
};
use tether_graphics::{GraphicsState, HeadlessProvider};

/// What the application saw when an event arrived.
#[derive(Debug, Clone)]
pub struct Seen {
    pub event: Event,
    pub lifecycle: LifecycleState,
    pub graphics: GraphicsState,
}

impl Seen {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

/// Records every event and answers according to a small script.
#[derive(Debug, Default)]
pub struct ScriptedApp {
    seen: Mutex<Vec<Seen>>,
    pub inits: AtomicUsize,
    pub mains: AtomicUsize,
    init_error: Option<AppInitError>,
    rejected: Vec<EventKind>,
    render_on_surface: bool,
    stop_after: Option<usize>,
}

impl ScriptedApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `false` for events of this kind.
    pub fn rejecting(mut self, kind: EventKind) -> Self {
        self.rejected.push(kind);
        self
    }

    /// Allocate graphics as soon as a surface is created.
    pub fn rendering(mut self) -> Self {
        self.render_on_surface = true;
        self
    }

    /// Refuse to initialize.
    pub fn failing_init(mut self, code: i32) -> Self {
        self.init_error = Some(AppInitError::new(code));
        self
    }

    /// Return from main after this many events.
    pub fn stopping_after(mut self, events: usize) -> Self {
        self.stop_after = Some(events);
        self
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.seen.lock().iter().map(Seen::kind).collect()
    }

    pub fn last(&self, kind: EventKind) -> Option<Seen> {
        self.seen.lock().iter().rev().find(|s| s.kind() == kind).cloned()
    }
}

impl Application for ScriptedApp {
    fn init(&self) -> Result<(), AppInitError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        match self.init_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn main(&self, ctx: AppContext) {
        self.mains.fetch_add(1, Ordering::SeqCst);
        let mut handled_count = 0;

        while let Some(event) = ctx.next_event(None) {
            let kind = event.kind();

            if self.render_on_surface && kind == EventKind::SurfaceCreated {
                ctx.ready_to_render(true).unwrap();
            }
            if let Event::Callback(callback) = &event {
                callback.invoke();
            }

            self.seen.lock().push(Seen {
                event,
                lifecycle: ctx.lifecycle(),
                graphics: ctx.graphics_state(),
            });
            ctx.done_with_event(!self.rejected.contains(&kind));

            handled_count += 1;
            if kind == EventKind::Quit || self.stop_after == Some(handled_count) {
                return;
            }
        }
    }
}

/// A bridge around a scripted app and a headless provider.
pub fn bridge_with(
    app: ScriptedApp,
    config: BridgeConfig,
) -> (LifecycleBridge, Arc<ScriptedApp>, Arc<HeadlessProvider>) {
    let app = Arc::new(app);
    let provider = Arc::new(HeadlessProvider::new());
    let bridge = LifecycleBridge::new(config, app.clone(), provider.clone()).unwrap();
    (bridge, app, provider)
}

pub fn bridge(app: ScriptedApp) -> (LifecycleBridge, Arc<ScriptedApp>, Arc<HeadlessProvider>) {
    bridge_with(app, BridgeConfig::default())
}

/// Polls `condition` until it holds or two seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
