//! # TETHER
//!
//! Bridges an OS-driven sequence of application lifecycle notifications,
//! delivered on arbitrary host threads, into one ordered event stream
//! consumed by a dedicated application thread running a synchronous loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        LifecycleBridge                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  on_* notifications ─▶ LifecycleCell ─▶ EventQueue            │
//! │  create / destroy   ─▶ ref count, application thread          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                        AppContext                             │
//! │  next_event / done_with_event / ready_to_render               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  tether_core (flags, events, queue)  tether_graphics (context)│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tether::{BridgeConfig, LifecycleBridge};
//! use tether_graphics::HeadlessProvider;
//!
//! let bridge = LifecycleBridge::new(
//!     BridgeConfig::load("tether.toml")?,
//!     Arc::new(MyApp::default()),
//!     Arc::new(HeadlessProvider::new()),
//! )?;
//!
//! bridge.create()?;
//! bridge.on_start();
//! bridge.on_resume();
//! bridge.on_surface_created(1080, 1920, 420);
//! bridge.on_focus_changed(true);
//! // ...
//! bridge.destroy()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
mod shared;

pub use app::{AppContext, Application};
pub use bridge::{CreateOutcome, DestroyOutcome, LifecycleBridge};
pub use config::{BridgeConfig, InputConfig, SurfaceConfig};
pub use error::{AppInitError, BridgeError, BridgeResult};
pub use input::{translate_multi_touch, IdentityKeyMapper, KeyFilter, KeyMapper};
pub use render::{RenderFrameRequest, RenderFrameSlot};

pub use tether_core::{
    Callback, Event, EventKind, KeyAction, KeyCode, LifecycleFlag, LifecycleState, MultiTouch,
    PointerMask, SurfaceSize, TouchAction, UserPayload,
};
pub use tether_graphics::{GraphicsError, GraphicsProvider, GraphicsResult, SurfaceIntent};
