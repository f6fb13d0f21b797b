//! Which kind of surface `ready_to_render` creates.

/// Surface kind selected at configuration time.
///
/// Windowed unless both offscreen dimensions are nonzero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SurfaceIntent {
    /// Render into the host window.
    #[default]
    Window,
    /// Render into an offscreen surface of fixed size.
    Offscreen {
        /// Width in pixels.
        width: i32,
        /// Height in pixels.
        height: i32,
    },
}

impl SurfaceIntent {
    /// Offscreen if both dimensions are nonzero, windowed otherwise.
    #[must_use]
    pub const fn from_dimensions(width: i32, height: i32) -> Self {
        if width != 0 && height != 0 {
            Self::Offscreen { width, height }
        } else {
            Self::Window
        }
    }

    /// True for [`SurfaceIntent::Offscreen`].
    #[must_use]
    pub const fn is_offscreen(&self) -> bool {
        matches!(self, Self::Offscreen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dimensions() {
        assert_eq!(SurfaceIntent::from_dimensions(0, 0), SurfaceIntent::Window);
        assert_eq!(SurfaceIntent::from_dimensions(640, 0), SurfaceIntent::Window);
        assert_eq!(
            SurfaceIntent::from_dimensions(640, 480),
            SurfaceIntent::Offscreen { width: 640, height: 480 }
        );
        assert!(SurfaceIntent::from_dimensions(1, 1).is_offscreen());
    }
}
