//! # Input Translation
//!
//! Host key codes go through a [`KeyMapper`] and a [`KeyFilter`] before they
//! become key events; multi-touch actions are classified with the configured
//! host constants.

use crate::config::InputConfig;
use parking_lot::Mutex;
use tether_core::{KeyCode, MultiTouch, PointerMask};

/// Translates host key codes into application key codes.
///
/// `None` means the key is not of interest and produces no key event.
pub trait KeyMapper: Send + Sync {
    /// Maps one host key code.
    fn map_key(&self, host_code: i32) -> Option<KeyCode>;
}

/// Passes every non-negative host code through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityKeyMapper;

impl KeyMapper for IdentityKeyMapper {
    fn map_key(&self, host_code: i32) -> Option<KeyCode> {
        u32::try_from(host_code).ok().map(KeyCode)
    }
}

impl<F> KeyMapper for F
where
    F: Fn(i32) -> Option<KeyCode> + Send + Sync,
{
    fn map_key(&self, host_code: i32) -> Option<KeyCode> {
        self(host_code)
    }
}

/// Suppresses a key notification identical to the previous one.
///
/// Hosts repeat the last key state on auto-repeat and on some focus changes;
/// the application only needs transitions.
#[derive(Debug, Default)]
pub struct KeyFilter {
    last: Mutex<Option<(KeyCode, i32)>>,
}

impl KeyFilter {
    /// Creates a filter with no memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the key and returns true if it differs from the previous one.
    pub fn admit(&self, code: KeyCode, host_action: i32) -> bool {
        let mut last = self.last.lock();
        let fresh = *last != Some((code, host_action));
        *last = Some((code, host_action));
        fresh
    }

    /// Forgets the previous key.
    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

/// Builds a multi-touch event from raw host values.
#[must_use]
pub fn translate_multi_touch(
    input: &InputConfig,
    host_action: i32,
    pointers: PointerMask,
    first: (i32, i32),
    second: (i32, i32),
) -> MultiTouch {
    MultiTouch {
        action: input.touch_action(host_action),
        pointers,
        first,
        second,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::TouchAction;

    #[test]
    fn test_identity_mapper() {
        assert_eq!(IdentityKeyMapper.map_key(4), Some(KeyCode(4)));
        assert_eq!(IdentityKeyMapper.map_key(-1), None);
    }

    #[test]
    fn test_closure_mapper() {
        let mapper = |code: i32| (code == 82).then_some(KeyCode(1));
        assert_eq!(mapper.map_key(82), Some(KeyCode(1)));
        assert_eq!(mapper.map_key(83), None);
    }

    #[test]
    fn test_filter_suppresses_repeats() {
        let filter = KeyFilter::new();
        assert!(filter.admit(KeyCode(4), 0));
        assert!(!filter.admit(KeyCode(4), 0));
        assert!(filter.admit(KeyCode(4), 1));
        assert!(filter.admit(KeyCode(5), 1));
        assert!(!filter.admit(KeyCode(5), 1));

        filter.reset();
        assert!(filter.admit(KeyCode(5), 1));
    }

    #[test]
    fn test_multi_touch_translation() {
        let input = InputConfig::default();
        let touch = translate_multi_touch(
            &input,
            0x0101,
            PointerMask::new(true, true),
            (10, 20),
            (30, 40),
        );
        assert_eq!(touch.action, TouchAction::Up);
        assert!(touch.pointers.has_second());
        assert_eq!(touch.pointers.bits(), 0b11);
        assert_eq!(touch.second, (30, 40));
    }
}
