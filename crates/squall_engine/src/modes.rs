//! Mode registry: current values as a dense bitset plus a per-mode stack of
//! saved values for XTSAVE/XTRESTORE.

use fnv::FnvHashMap;
use squall_parser_core::Mode;

/// Modes that start enabled on a fresh terminal.
const DEFAULT_ENABLED: [Mode; 4] = [Mode::Wraparound, Mode::Autorepeat, Mode::CursorVisible, Mode::CursorBlinking];

#[derive(Debug, Clone)]
pub struct ModeRegistry {
    bits: u64,
    saved: FnvHashMap<Mode, Vec<bool>>,
}

impl Default for ModeRegistry {
    fn default() -> Self {
        let mut registry = ModeRegistry {
            bits: 0,
            saved: FnvHashMap::default(),
        };
        for mode in DEFAULT_ENABLED {
            registry.set(mode, true);
        }
        registry
    }
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mode: Mode) -> bool {
        self.bits & (1 << mode.index()) != 0
    }

    pub fn set(&mut self, mode: Mode, enabled: bool) {
        if enabled {
            self.bits |= 1 << mode.index();
        } else {
            self.bits &= !(1 << mode.index());
        }
    }

    /// Push the current value of `mode` onto its save stack.
    pub fn save(&mut self, mode: Mode) {
        let value = self.get(mode);
        self.saved.entry(mode).or_default().push(value);
    }

    /// Pop the most recently saved value of `mode`. Returns `None` when
    /// nothing was saved; the caller then leaves the mode untouched.
    pub fn restore(&mut self, mode: Mode) -> Option<bool> {
        self.saved.get_mut(&mode)?.pop()
    }

    /// Back to power-on defaults, dropping all saved values.
    pub fn reset(&mut self) {
        *self = ModeRegistry::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let modes = ModeRegistry::new();
        assert!(modes.get(Mode::Wraparound));
        assert!(modes.get(Mode::CursorVisible));
        assert!(!modes.get(Mode::Origin));
        assert!(!modes.get(Mode::Insert));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut modes = ModeRegistry::new();
        for mode in [Mode::Origin, Mode::Wraparound, Mode::EnableLeftAndRightMargin, Mode::InBandSizeReports] {
            for value in [true, false, true] {
                modes.set(mode, value);
                assert_eq!(value, modes.get(mode));
            }
        }
    }

    #[test]
    fn save_restore_is_a_stack() {
        let mut modes = ModeRegistry::new();
        modes.set(Mode::Origin, true);
        modes.save(Mode::Origin);
        modes.set(Mode::Origin, false);
        modes.save(Mode::Origin);
        modes.set(Mode::Origin, true);

        assert_eq!(Some(false), modes.restore(Mode::Origin));
        assert_eq!(Some(true), modes.restore(Mode::Origin));
        assert_eq!(None, modes.restore(Mode::Origin));
    }

    #[test]
    fn restore_without_save_is_none() {
        let mut modes = ModeRegistry::new();
        assert_eq!(None, modes.restore(Mode::FocusEvent));
    }
}
