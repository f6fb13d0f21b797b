//! # TETHER Graphics
//!
//! Tracks whether a rendering context and surface exist and are bound, and
//! sequences their creation through a host-supplied [`GraphicsProvider`].
//! Nothing here renders; it only decides *whether* rendering resources may be
//! created and remembers what was created.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ready_to_render   ┌──────────────────────┐
//! │ Application loop │ ──────────────────▶ │   GraphicsContext    │
//! └──────────────────┘                     │ (flags + intent)     │
//!                                          └──────────┬───────────┘
//!                                                     │ init / surface / bind
//!                                                     ▼
//!                                          ┌──────────────────────┐
//!                                          │ dyn GraphicsProvider │
//!                                          └──────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod context;
pub mod error;
pub mod headless;
pub mod provider;
pub mod state;
pub mod surface;

pub use context::GraphicsContext;
pub use error::{GraphicsError, GraphicsResult};
pub use headless::{HeadlessProvider, ProviderCall};
pub use provider::{GraphicsProvider, ProviderOp, UnavailableProvider};
pub use state::{ContextPhase, GraphicsState};
pub use surface::SurfaceIntent;
