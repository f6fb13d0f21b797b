//! # Lifecycle State
//!
//! Which host lifecycle phases are currently active.
//!
//! ```text
//!   create ──────────────────────────────────────────── destroy   Running
//!        resume ─────────────────────────────── pause             Active
//!            focus(true) ──────────────── focus(false)            Focused
//!               surface(w>0,h>0) ──── surface destroyed           HasRealSurface
//!               ├──── Interactable ────┤
//! ```
//!
//! The flags live in one atomic word. Writers are the lifecycle notification
//! handlers (the host delivers those in a non-overlapping sequence); readers
//! may sit on any thread and never block. A reader racing a writer sees
//! either the old or the new value of each flag.

use std::sync::atomic::{AtomicU8, Ordering};

/// A single lifecycle flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LifecycleFlag {
    /// Set between create and destroy.
    Running = 0b0001,
    /// Set between resume and pause.
    Active = 0b0010,
    /// Set between focus-gained and focus-lost.
    Focused = 0b0100,
    /// Set while the host surface exists with a nonzero extent.
    HasRealSurface = 0b1000,
}

impl LifecycleFlag {
    /// Every flag, in bit order.
    pub const ALL: [Self; 4] = [
        Self::Running,
        Self::Active,
        Self::Focused,
        Self::HasRealSurface,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        self as u8
    }
}

/// Point-in-time view of the lifecycle flags.
///
/// Also used as a flag set for [`LifecycleCell::query_masked`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LifecycleState {
    /// Between create and destroy.
    pub running: bool,
    /// Between resume and pause.
    pub active: bool,
    /// Between focus-gained and focus-lost.
    pub focused: bool,
    /// The host surface exists and has a nonzero extent.
    pub has_real_surface: bool,
}

impl LifecycleState {
    /// All four flags set.
    pub const INTERACTABLE: Self = Self {
        running: true,
        active: true,
        focused: true,
        has_real_surface: true,
    };

    /// Running, active, focused, and backed by a real surface.
    ///
    /// This is the gate for starting real-time rendering.
    #[inline]
    #[must_use]
    pub const fn interactable(&self) -> bool {
        self.running && self.active && self.focused && self.has_real_surface
    }

    /// Returns the value of one flag.
    #[inline]
    #[must_use]
    pub const fn get(&self, flag: LifecycleFlag) -> bool {
        match flag {
            LifecycleFlag::Running => self.running,
            LifecycleFlag::Active => self.active,
            LifecycleFlag::Focused => self.focused,
            LifecycleFlag::HasRealSurface => self.has_real_surface,
        }
    }

    /// Returns a copy with one flag changed.
    #[inline]
    #[must_use]
    pub const fn with(mut self, flag: LifecycleFlag, value: bool) -> Self {
        match flag {
            LifecycleFlag::Running => self.running = value,
            LifecycleFlag::Active => self.active = value,
            LifecycleFlag::Focused => self.focused = value,
            LifecycleFlag::HasRealSurface => self.has_real_surface = value,
        }
        self
    }

    const fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.running {
            bits |= LifecycleFlag::Running.bit();
        }
        if self.active {
            bits |= LifecycleFlag::Active.bit();
        }
        if self.focused {
            bits |= LifecycleFlag::Focused.bit();
        }
        if self.has_real_surface {
            bits |= LifecycleFlag::HasRealSurface.bit();
        }
        bits
    }

    const fn from_bits(bits: u8) -> Self {
        Self {
            running: bits & LifecycleFlag::Running.bit() != 0,
            active: bits & LifecycleFlag::Active.bit() != 0,
            focused: bits & LifecycleFlag::Focused.bit() != 0,
            has_real_surface: bits & LifecycleFlag::HasRealSurface.bit() != 0,
        }
    }
}

/// Shared, lock-free storage for the lifecycle flags.
#[derive(Debug, Default)]
pub struct LifecycleCell {
    bits: AtomicU8,
}

impl LifecycleCell {
    /// Creates a cell with every flag cleared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
        }
    }

    /// Sets a flag.
    #[inline]
    pub fn set(&self, flag: LifecycleFlag) {
        self.bits.fetch_or(flag.bit(), Ordering::AcqRel);
    }

    /// Clears a flag.
    #[inline]
    pub fn clear(&self, flag: LifecycleFlag) {
        self.bits.fetch_and(!flag.bit(), Ordering::AcqRel);
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn assign(&self, flag: LifecycleFlag, value: bool) {
        if value {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub fn is_set(&self, flag: LifecycleFlag) -> bool {
        self.bits.load(Ordering::Acquire) & flag.bit() != 0
    }

    /// Among the flags selected by `mask`, true iff exactly the flags in
    /// `expected` are set.
    ///
    /// Flags outside `mask` are ignored, and so are flags of `expected` that
    /// are outside `mask`.
    #[inline]
    #[must_use]
    pub fn query_masked(&self, mask: LifecycleState, expected: LifecycleState) -> bool {
        let mask = mask.to_bits();
        self.bits.load(Ordering::Acquire) & mask == expected.to_bits() & mask
    }

    /// Clears every flag.
    #[inline]
    pub fn reset(&self) {
        self.bits.store(0, Ordering::Release);
    }

    /// Reads all flags at once.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> LifecycleState {
        LifecycleState::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Shorthand for `snapshot().interactable()`.
    #[inline]
    #[must_use]
    pub fn is_interactable(&self) -> bool {
        self.query_masked(LifecycleState::INTERACTABLE, LifecycleState::INTERACTABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_starts_zeroed() {
        let cell = LifecycleCell::new();
        assert_eq!(cell.snapshot(), LifecycleState::default());
        assert!(!cell.is_interactable());
    }

    #[test]
    fn test_set_and_clear_are_independent() {
        let cell = LifecycleCell::new();
        cell.set(LifecycleFlag::Running);
        cell.set(LifecycleFlag::Focused);
        cell.clear(LifecycleFlag::Running);

        assert!(!cell.is_set(LifecycleFlag::Running));
        assert!(cell.is_set(LifecycleFlag::Focused));
        assert!(!cell.is_set(LifecycleFlag::Active));
    }

    #[test]
    fn test_query_masked() {
        let cell = LifecycleCell::new();
        cell.set(LifecycleFlag::Running);
        cell.set(LifecycleFlag::Active);

        let mask = LifecycleState {
            running: true,
            active: true,
            focused: true,
            ..LifecycleState::default()
        };
        let running_and_active = LifecycleState {
            running: true,
            active: true,
            ..LifecycleState::default()
        };

        assert!(cell.query_masked(mask, running_and_active));
        assert!(!cell.query_masked(mask, LifecycleState::INTERACTABLE));

        // Flags outside the mask do not matter.
        cell.set(LifecycleFlag::HasRealSurface);
        assert!(cell.query_masked(mask, running_and_active));
    }

    #[test]
    fn test_reset_clears_everything() {
        let cell = LifecycleCell::new();
        for flag in LifecycleFlag::ALL {
            cell.set(flag);
        }
        assert!(cell.is_interactable());

        cell.reset();
        assert_eq!(cell.snapshot(), LifecycleState::default());
    }

    #[test]
    fn test_interactable_tracks_random_toggles() {
        let mut rng = StdRng::seed_from_u64(0x7e7e_7e7e);
        let cell = LifecycleCell::new();
        let mut model = LifecycleState::default();

        for _ in 0..10_000 {
            let flag = LifecycleFlag::ALL[rng.gen_range(0..LifecycleFlag::ALL.len())];
            let value = rng.gen_bool(0.6);
            cell.assign(flag, value);
            model = model.with(flag, value);

            let snapshot = cell.snapshot();
            assert_eq!(snapshot, model);
            assert_eq!(
                cell.is_interactable(),
                model.running && model.active && model.focused && model.has_real_surface
            );
            assert_eq!(snapshot.interactable(), cell.is_interactable());
        }
    }
}
