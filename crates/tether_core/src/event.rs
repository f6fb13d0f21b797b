//! # Events
//!
//! Everything the host tells the application thread arrives as one [`Event`].
//!
//! ## Event Flow
//!
//! ```text
//! Host lifecycle ──► Start/Resume/Pause/... ──┐
//! Host surface   ──► SurfaceCreated/...     ──┼──► EventQueue ──► app main loop
//! Host input     ──► Key/Touch/Accel/...    ──┤
//! Other threads  ──► User/Callback          ──┘
//! ```

use std::fmt;
use std::sync::Arc;

/// Number of distinct event kinds.
pub const EVENT_KIND_COUNT: usize = 19;

/// Discriminant of an [`Event`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Key press or release.
    Key = 0,
    /// Character input.
    Char = 1,
    /// Single-pointer touch.
    Touch = 2,
    /// Up to two pointers.
    MultiTouch = 3,
    /// Accelerometer sample.
    Accelerometer = 4,
    /// Host start.
    Start = 5,
    /// Host restart.
    Restart = 6,
    /// Host resume.
    Resume = 7,
    /// Window focus gained.
    FocusGained = 8,
    /// Host surface created.
    SurfaceCreated = 9,
    /// Host surface resized.
    SurfaceResized = 10,
    /// Host surface destroyed.
    SurfaceDestroyed = 11,
    /// Window focus lost.
    FocusLost = 12,
    /// Host pause.
    Pause = 13,
    /// Host stop.
    Stop = 14,
    /// The bridge asks the main loop to exit.
    Quit = 15,
    /// Application-defined payload.
    User = 16,
    /// Long click.
    LongClick = 17,
    /// Run a closure on the application thread.
    Callback = 18,
}

impl EventKind {
    /// Every kind, in discriminant order.
    pub const ALL: [Self; EVENT_KIND_COUNT] = [
        Self::Key,
        Self::Char,
        Self::Touch,
        Self::MultiTouch,
        Self::Accelerometer,
        Self::Start,
        Self::Restart,
        Self::Resume,
        Self::FocusGained,
        Self::SurfaceCreated,
        Self::SurfaceResized,
        Self::SurfaceDestroyed,
        Self::FocusLost,
        Self::Pause,
        Self::Stop,
        Self::Quit,
        Self::User,
        Self::LongClick,
        Self::Callback,
    ];

    /// Stable diagnostic name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key => "KEY",
            Self::Char => "CHAR",
            Self::Touch => "TOUCH",
            Self::MultiTouch => "MULTITOUCH",
            Self::Accelerometer => "ACCEL",
            Self::Start => "START",
            Self::Restart => "RESTART",
            Self::Resume => "RESUME",
            Self::FocusGained => "FOCUS_GAINED",
            Self::SurfaceCreated => "SURFACE_CREATED",
            Self::SurfaceResized => "SURFACE_SIZE",
            Self::SurfaceDestroyed => "SURFACE_DESTROYED",
            Self::FocusLost => "FOCUS_LOST",
            Self::Pause => "PAUSE",
            Self::Stop => "STOP",
            Self::Quit => "QUIT",
            Self::User => "USER",
            Self::LongClick => "LONG_CLICK",
            Self::Callback => "CALLBACK",
        }
    }

    /// True for kinds that mark a lifecycle transition rather than input.
    #[must_use]
    pub const fn is_lifecycle(self) -> bool {
        matches!(
            self,
            Self::Start
                | Self::Restart
                | Self::Resume
                | Self::FocusGained
                | Self::SurfaceCreated
                | Self::SurfaceResized
                | Self::SurfaceDestroyed
                | Self::FocusLost
                | Self::Pause
                | Self::Stop
                | Self::Quit
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Pressed.
    Down,
    /// Released.
    Up,
}

/// Application-side key code, produced by the host's key mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

/// Touch transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchAction {
    /// Pointer went down.
    Down,
    /// Pointer went up.
    Up,
    /// Pointer moved.
    Move,
    /// Gesture cancelled by the host.
    Cancel,
}

/// Which of the two multi-touch pointers are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointerMask(u8);

impl PointerMask {
    /// First pointer bit.
    pub const FIRST: u8 = 0b01;
    /// Second pointer bit.
    pub const SECOND: u8 = 0b10;

    /// Builds a mask from presence flags.
    #[must_use]
    pub const fn new(has_first: bool, has_second: bool) -> Self {
        let mut bits = 0;
        if has_first {
            bits |= Self::FIRST;
        }
        if has_second {
            bits |= Self::SECOND;
        }
        Self(bits)
    }

    /// Raw bits (bit 0 = first pointer, bit 1 = second).
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// First pointer present.
    #[must_use]
    pub const fn has_first(self) -> bool {
        self.0 & Self::FIRST != 0
    }

    /// Second pointer present.
    #[must_use]
    pub const fn has_second(self) -> bool {
        self.0 & Self::SECOND != 0
    }
}

/// Host surface extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Screen density reported by the host.
    pub density: i32,
}

impl SurfaceSize {
    /// Creates a surface size.
    #[must_use]
    pub const fn new(width: i32, height: i32, density: i32) -> Self {
        Self {
            width,
            height,
            density,
        }
    }

    /// Both dimensions are positive.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Two-pointer touch sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiTouch {
    /// What happened.
    pub action: TouchAction,
    /// Which pointers carry valid positions.
    pub pointers: PointerMask,
    /// First pointer position.
    pub first: (i32, i32),
    /// Second pointer position.
    pub second: (i32, i32),
}

/// Application-defined integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UserPayload {
    /// Slot 0. `repaint` uses 1 here.
    pub u0: i32,
    /// Slot 1.
    pub u1: i32,
    /// Slot 2.
    pub u2: i32,
    /// Slot 3.
    pub u3: i32,
}

/// A closure shipped to the application thread.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    /// Wraps a closure.
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the closure on the calling thread.
    pub fn invoke(&self) {
        (self.0)();
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

/// One host notification, as seen by the application thread.
#[derive(Debug, Clone)]
pub enum Event {
    // =========================================================================
    // Input (non-blocking unless noted)
    // =========================================================================
    /// Mapped key press or release (blocking).
    Key {
        /// Press or release.
        action: KeyAction,
        /// Mapped key code.
        code: KeyCode,
    },
    /// Character produced by a key press.
    Char {
        /// Unicode scalar value as reported by the host.
        unichar: u32,
    },
    /// Single-pointer touch.
    Touch {
        /// What happened.
        action: TouchAction,
        /// X position.
        x: i32,
        /// Y position.
        y: i32,
    },
    /// Up to two pointers.
    MultiTouch(MultiTouch),
    /// Accelerometer sample.
    Accelerometer {
        /// X axis.
        x: f32,
        /// Y axis.
        y: f32,
        /// Z axis.
        z: f32,
    },
    /// Long click.
    LongClick {
        /// X position.
        x: i32,
        /// Y position.
        y: i32,
    },

    // =========================================================================
    // Lifecycle (blocking)
    // =========================================================================
    /// Host start.
    Start,
    /// Host restart.
    Restart,
    /// Host resume.
    Resume,
    /// Focus gained.
    FocusGained,
    /// Surface created.
    SurfaceCreated(SurfaceSize),
    /// Surface resized.
    SurfaceResized(SurfaceSize),
    /// Surface destroyed.
    SurfaceDestroyed,
    /// Focus lost.
    FocusLost,
    /// Host pause.
    Pause,
    /// Host stop.
    Stop,
    /// Exit the main loop. Posted non-blocking during teardown.
    Quit,

    // =========================================================================
    // Application-defined
    // =========================================================================
    /// Four integers.
    User(UserPayload),
    /// Closure to run on the application thread.
    Callback(Callback),
}

impl Event {
    /// Discriminant of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Key { .. } => EventKind::Key,
            Self::Char { .. } => EventKind::Char,
            Self::Touch { .. } => EventKind::Touch,
            Self::MultiTouch(_) => EventKind::MultiTouch,
            Self::Accelerometer { .. } => EventKind::Accelerometer,
            Self::LongClick { .. } => EventKind::LongClick,
            Self::Start => EventKind::Start,
            Self::Restart => EventKind::Restart,
            Self::Resume => EventKind::Resume,
            Self::FocusGained => EventKind::FocusGained,
            Self::SurfaceCreated(_) => EventKind::SurfaceCreated,
            Self::SurfaceResized(_) => EventKind::SurfaceResized,
            Self::SurfaceDestroyed => EventKind::SurfaceDestroyed,
            Self::FocusLost => EventKind::FocusLost,
            Self::Pause => EventKind::Pause,
            Self::Stop => EventKind::Stop,
            Self::Quit => EventKind::Quit,
            Self::User(_) => EventKind::User,
            Self::Callback(_) => EventKind::Callback,
        }
    }

    /// The repaint request: a user event with `u0 == 1`.
    #[must_use]
    pub const fn repaint() -> Self {
        Self::User(UserPayload {
            u0: 1,
            u1: 0,
            u2: 0,
            u3: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_kind_names_are_unique() {
        let names: HashSet<_> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), EVENT_KIND_COUNT);
    }

    #[test]
    fn test_kind_discriminants_match_table() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
        }
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::SurfaceCreated(SurfaceSize::new(1, 2, 3)).kind(), EventKind::SurfaceCreated);
        assert_eq!(Event::repaint().kind(), EventKind::User);
        assert!(EventKind::Pause.is_lifecycle());
        assert!(!EventKind::Touch.is_lifecycle());
    }

    #[test]
    fn test_pointer_mask() {
        let both = PointerMask::new(true, true);
        assert_eq!(both.bits(), 0b11);
        assert!(both.has_first() && both.has_second());

        let second = PointerMask::new(false, true);
        assert!(!second.has_first());
        assert!(second.has_second());
    }

    #[test]
    fn test_callback_clones_share_closure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let event = Event::Callback(Callback::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        let copy = event.clone();
        for e in [event, copy] {
            if let Event::Callback(cb) = e {
                cb.invoke();
            }
        }
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_surface_size_is_real() {
        assert!(SurfaceSize::new(640, 480, 160).is_real());
        assert!(!SurfaceSize::new(0, 480, 160).is_real());
        assert!(!SurfaceSize::new(640, -1, 160).is_real());
    }
}
