//! # TETHER Demo Host
//!
//! Plays the host's part of a full application lifecycle against a headless
//! graphics provider and a small scripted application, logging what each
//! side sees.
//!
//! ```bash
//! # Default config, info logs
//! ./tether_demo
//!
//! # Custom config, everything
//! RUST_LOG=trace ./tether_demo demo.toml
//! ```

use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tether::{
    AppContext, Application, BridgeConfig, BridgeError, Event, LifecycleBridge, UserPayload,
};
use tether_graphics::HeadlessProvider;
use tracing_subscriber::EnvFilter;

/// Frame period of the demo application.
const FRAME: Duration = Duration::from_millis(4);

/// Renders whenever interactable, answers user events, quits on request.
#[derive(Default)]
struct DemoApp {
    frames: AtomicUsize,
    events: AtomicUsize,
}

impl DemoApp {
    fn handle(&self, ctx: &AppContext, event: &Event) -> bool {
        self.events.fetch_add(1, Ordering::Relaxed);
        match event {
            Event::User(payload) if payload.u0 == 1 => {
                tracing::info!("repaint requested");
                true
            }
            Event::User(payload) => {
                tracing::info!(?payload, "user event");
                payload.u1 > 0
            }
            Event::Callback(callback) => {
                callback.invoke();
                true
            }
            Event::SurfaceDestroyed => {
                tracing::info!(bound = ctx.is_bound(), "surface gone");
                true
            }
            other => {
                tracing::info!(kind = %other.kind(), "event");
                true
            }
        }
    }
}

impl Application for DemoApp {
    fn main(&self, ctx: AppContext) {
        let mut announced = false;
        loop {
            while let Some(event) = ctx.next_event(Some(FRAME)) {
                let quit = matches!(event, Event::Quit);
                let handled = self.handle(&ctx, &event);
                ctx.done_with_event(handled);
                if quit {
                    return;
                }
            }

            if !ctx.is_interactable() {
                continue;
            }
            if let Err(err) = ctx.ready_to_render(true) {
                tracing::debug!(error = %err, "skipping frame");
                continue;
            }
            if !announced {
                ctx.notify_rendering_initialized();
                announced = true;
            }
            if let Some(request) = ctx.take_render_frame_request() {
                tracing::info!(?request, "rendering requested region");
            }
            if !ctx.swap_buffers() {
                tracing::debug!(error = ctx.graphics().last_error(), "swap failed");
                continue;
            }
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Drives one lifecycle and returns the number of frames presented.
fn run(config: BridgeConfig, provider: Arc<HeadlessProvider>) -> Result<usize, BridgeError> {
    let app = Arc::new(DemoApp::default());
    let bridge = LifecycleBridge::new(config, app.clone(), provider.clone())?;

    bridge.create()?;
    bridge.on_start();
    bridge.on_resume();
    bridge.on_surface_created(1080, 1920, 420);
    bridge.on_focus_changed(true);
    tracing::info!(interactable = bridge.is_interactable(), "host visible");

    thread::sleep(FRAME * 5);

    bridge.on_key(0, 4, 0);
    bridge.on_key(1, 4, 0);
    bridge.on_touch(0, 540, 960);
    bridge.on_multi_touch(2, true, true, (500, 900), (580, 1020));
    bridge.on_accelerometer(0.0, 9.81, 0.0);
    bridge.post_render_frame_request(37.6, 55.7, 2.0, 512, 512);
    bridge.repaint();

    let accepted = bridge.post_user_event(
        UserPayload {
            u0: 7,
            u1: 1,
            u2: 0,
            u3: 0,
        },
        true,
    );
    tracing::info!(accepted, "blocking user event answered");

    thread::sleep(FRAME * 5);

    bridge.on_focus_changed(false);
    bridge.on_pause();
    bridge.on_surface_destroyed();
    bridge.on_stop();
    bridge.destroy()?;

    let frames = app.frames.load(Ordering::Relaxed);
    tracing::info!(
        frames,
        events = app.events.load(Ordering::Relaxed),
        provider_calls = provider.calls().len(),
        "demo finished"
    );
    Ok(frames)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "tether.toml".to_string());
    let config = match BridgeConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "bad configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(config, Arc::new(HeadlessProvider::new())) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "demo failed");
            ExitCode::FAILURE
        }
    }
}
