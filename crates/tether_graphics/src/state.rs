//! # Graphics Context State
//!
//! Three flags tracking what graphics resources currently exist:
//!
//! ```text
//!   Uninitialized ──init──▶ Initialized ──surface──▶ SurfaceReady ──bind──▶ Bound
//!         ▲                      ▲                        ▲                   │
//!         │                      └────destroy surface─────┼───────────────────┤
//!         │                                               └──────unbind───────┤
//!         └─────────────────────────cleanup───────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

const CONTEXT_INITIALIZED: u8 = 0b001;
const HAS_SURFACE: u8 = 0b010;
const BOUND: u8 = 0b100;

/// Point-in-time view of the graphics flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GraphicsState {
    /// Display and context exist.
    pub context_initialized: bool,
    /// A surface exists.
    pub has_surface: bool,
    /// Surface and context are current.
    pub bound: bool,
}

impl GraphicsState {
    /// The phase these flags correspond to.
    #[must_use]
    pub const fn phase(&self) -> ContextPhase {
        if self.bound {
            ContextPhase::Bound
        } else if self.has_surface {
            ContextPhase::SurfaceReady
        } else if self.context_initialized {
            ContextPhase::Initialized
        } else {
            ContextPhase::Uninitialized
        }
    }

    const fn from_bits(bits: u8) -> Self {
        Self {
            context_initialized: bits & CONTEXT_INITIALIZED != 0,
            has_surface: bits & HAS_SURFACE != 0,
            bound: bits & BOUND != 0,
        }
    }
}

/// Coarse phase of the graphics context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContextPhase {
    /// Nothing allocated.
    #[default]
    Uninitialized,
    /// Context exists, no surface.
    Initialized,
    /// Surface exists, not bound.
    SurfaceReady,
    /// Ready to render.
    Bound,
}

/// Atomic storage for the graphics flags.
#[derive(Debug, Default)]
pub(crate) struct GraphicsCell {
    bits: AtomicU8,
}

impl GraphicsCell {
    pub(crate) fn set_context_initialized(&self, value: bool) {
        self.assign(CONTEXT_INITIALIZED, value);
    }

    pub(crate) fn set_has_surface(&self, value: bool) {
        self.assign(HAS_SURFACE, value);
    }

    pub(crate) fn set_bound(&self, value: bool) {
        self.assign(BOUND, value);
    }

    pub(crate) fn clear_all(&self) {
        self.bits.store(0, Ordering::Release);
    }

    pub(crate) fn snapshot(&self) -> GraphicsState {
        GraphicsState::from_bits(self.bits.load(Ordering::Acquire))
    }

    fn assign(&self, bit: u8, value: bool) {
        if value {
            self.bits.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.bits.fetch_and(!bit, Ordering::AcqRel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_follows_highest_flag() {
        let cell = GraphicsCell::default();
        assert_eq!(cell.snapshot().phase(), ContextPhase::Uninitialized);

        cell.set_context_initialized(true);
        assert_eq!(cell.snapshot().phase(), ContextPhase::Initialized);

        cell.set_has_surface(true);
        assert_eq!(cell.snapshot().phase(), ContextPhase::SurfaceReady);

        cell.set_bound(true);
        assert_eq!(cell.snapshot().phase(), ContextPhase::Bound);

        cell.set_bound(false);
        assert_eq!(cell.snapshot().phase(), ContextPhase::SurfaceReady);

        cell.clear_all();
        assert_eq!(cell.snapshot(), GraphicsState::default());
    }
}
