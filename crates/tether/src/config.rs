//! # Bridge Configuration
//!
//! Loaded once, before the bridge is constructed. Every field has a default,
//! so an empty file (or no file at all) yields a working configuration.
//!
//! ```toml
//! queue_capacity = 256
//! consumer_thread_name = "tether-main"
//! release_surface_on_destroy = true
//!
//! [surface]
//! offscreen_width = 0
//! offscreen_height = 0
//!
//! [input]
//! action_down = 0
//! action_up = 1
//! action_cancel = 3
//! pointer_index_mask = 0xff00
//! pointer_index_shift = 8
//! key_action_up = 1
//! ```

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tether_core::{KeyAction, TouchAction, DEFAULT_QUEUE_CAPACITY};
use tether_graphics::SurfaceIntent;

/// Top-level bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum number of pending events.
    pub queue_capacity: usize,
    /// Name of the application thread.
    pub consumer_thread_name: String,
    /// Release the graphics surface before the application sees a
    /// surface-destroyed event.
    pub release_surface_on_destroy: bool,
    /// Surface selection.
    pub surface: SurfaceConfig,
    /// Host input constants.
    pub input: InputConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            consumer_thread_name: "tether-main".to_string(),
            release_surface_on_destroy: true,
            surface: SurfaceConfig::default(),
            input: InputConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] on a parse or validation failure.
    pub fn from_toml_str(source: &str) -> BridgeResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| BridgeError::Config(format!("parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from a file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source)
                .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(BridgeError::Config(format!("read {}: {e}", path.display()))),
        }
    }

    /// Checks values the types cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] for a zero queue capacity, an empty
    /// thread name, or offscreen dimensions where only one is set or either
    /// is negative.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.queue_capacity == 0 {
            return Err(BridgeError::Config("queue_capacity must be nonzero".into()));
        }
        if self.consumer_thread_name.is_empty() {
            return Err(BridgeError::Config("consumer_thread_name must not be empty".into()));
        }
        self.surface.validate()?;
        self.input.validate()
    }

    /// Surface kind the graphics context should create.
    #[must_use]
    pub const fn surface_intent(&self) -> SurfaceIntent {
        SurfaceIntent::from_dimensions(self.surface.offscreen_width, self.surface.offscreen_height)
    }
}

/// Surface selection. Both dimensions zero means a window surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Offscreen width in pixels.
    pub offscreen_width: i32,
    /// Offscreen height in pixels.
    pub offscreen_height: i32,
}

impl SurfaceConfig {
    fn validate(self) -> BridgeResult<()> {
        let (w, h) = (self.offscreen_width, self.offscreen_height);
        if w < 0 || h < 0 {
            return Err(BridgeError::Config(format!("negative offscreen size {w}x{h}")));
        }
        if (w == 0) != (h == 0) {
            return Err(BridgeError::Config(format!(
                "offscreen size {w}x{h}: set both dimensions or neither"
            )));
        }
        Ok(())
    }
}

/// Host input constants.
///
/// Defaults match the Android `MotionEvent` and `KeyEvent` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Touch down.
    pub action_down: i32,
    /// Touch up.
    pub action_up: i32,
    /// Touch cancelled.
    pub action_cancel: i32,
    /// Bits of a touch action holding the pointer index.
    pub pointer_index_mask: i32,
    /// Shift applied after masking out the pointer index.
    pub pointer_index_shift: u32,
    /// Key released.
    pub key_action_up: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            action_down: 0,
            action_up: 1,
            action_cancel: 3,
            pointer_index_mask: 0xff00,
            pointer_index_shift: 8,
            key_action_up: 1,
        }
    }
}

impl InputConfig {
    fn validate(self) -> BridgeResult<()> {
        if self.pointer_index_shift >= i32::BITS {
            return Err(BridgeError::Config(format!(
                "pointer_index_shift {} must be below {}",
                self.pointer_index_shift,
                i32::BITS
            )));
        }
        Ok(())
    }

    /// Classifies a host touch action, ignoring the pointer index bits.
    ///
    /// Anything that is not down, up, or cancel is a move.
    #[must_use]
    pub const fn touch_action(&self, host_action: i32) -> TouchAction {
        let action = host_action & !self.pointer_index_mask;
        if action == self.action_up {
            TouchAction::Up
        } else if action == self.action_down {
            TouchAction::Down
        } else if action == self.action_cancel {
            TouchAction::Cancel
        } else {
            TouchAction::Move
        }
    }

    /// Pointer index encoded in a host touch action. Zero for an
    /// out-of-range shift.
    #[must_use]
    pub const fn pointer_index(&self, host_action: i32) -> i32 {
        match (host_action & self.pointer_index_mask).checked_shr(self.pointer_index_shift) {
            Some(index) => index,
            None => 0,
        }
    }

    /// Classifies a host key action.
    #[must_use]
    pub const fn key_action(&self, host_action: i32) -> KeyAction {
        if host_action == self.key_action_up {
            KeyAction::Up
        } else {
            KeyAction::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.consumer_thread_name, "tether-main");
        assert_eq!(config.surface_intent(), SurfaceIntent::Window);
    }

    #[test]
    fn test_partial_document() {
        let config = BridgeConfig::from_toml_str(
            r#"
            queue_capacity = 32

            [surface]
            offscreen_width = 640
            offscreen_height = 480

            [input]
            key_action_up = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.queue_capacity, 32);
        assert!(config.release_surface_on_destroy);
        assert_eq!(
            config.surface_intent(),
            SurfaceIntent::Offscreen { width: 640, height: 480 }
        );
        assert_eq!(config.input.key_action_up, 7);
        assert_eq!(config.input.action_cancel, 3);
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            BridgeConfig::from_toml_str("queue_capacity = 0"),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_toml_str("[surface]\noffscreen_width = 10"),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_toml_str("queue_capacity = \"lots\""),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_toml_str("[input]\npointer_index_shift = 32"),
            Err(BridgeError::Config(_))
        ));
        assert!(BridgeConfig::from_toml_str("[input]\npointer_index_shift = 31").is_ok());
    }

    #[test]
    fn test_pointer_index_with_oversized_shift() {
        let input = InputConfig {
            pointer_index_shift: 40,
            ..InputConfig::default()
        };
        assert_eq!(input.pointer_index(0x0101), 0);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("tether_config_that_does_not_exist.toml");
        assert_eq!(BridgeConfig::load(&path).unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("tether_config_{id}.toml"));
        std::fs::write(&path, "consumer_thread_name = \"render\"").unwrap();

        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.consumer_thread_name, "render");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_touch_action_ignores_pointer_index() {
        let input = InputConfig::default();
        assert_eq!(input.touch_action(0), TouchAction::Down);
        assert_eq!(input.touch_action(1), TouchAction::Up);
        assert_eq!(input.touch_action(3), TouchAction::Cancel);
        assert_eq!(input.touch_action(2), TouchAction::Move);
        // ACTION_POINTER_UP for pointer 1
        assert_eq!(input.touch_action(0x0106), TouchAction::Move);
        assert_eq!(input.touch_action(0x0101), TouchAction::Up);
        assert_eq!(input.pointer_index(0x0101), 1);
    }

    #[test]
    fn test_key_action() {
        let input = InputConfig::default();
        assert_eq!(input.key_action(1), KeyAction::Up);
        assert_eq!(input.key_action(0), KeyAction::Down);
        assert_eq!(input.key_action(2), KeyAction::Down);
    }
}
