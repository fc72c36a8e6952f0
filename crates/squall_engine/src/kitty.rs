//! Flag stack for the kitty keyboard protocol.

use squall_parser_core::{KittyKeyboardFlags, KittySetMode};

/// Maximum stack depth; pushing beyond it evicts the oldest entry, matching
/// the protocol's bounded-stack behavior.
pub const KITTY_KEYBOARD_STACK_LIMIT: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct KittyKeyboardStack {
    stack: Vec<KittyKeyboardFlags>,
}

impl KittyKeyboardStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active flag set: the top of the stack, or empty flags when
    /// nothing was ever pushed.
    pub fn current(&self) -> KittyKeyboardFlags {
        self.stack.last().copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, flags: KittyKeyboardFlags) {
        if self.stack.len() == KITTY_KEYBOARD_STACK_LIMIT {
            self.stack.remove(0);
        }
        self.stack.push(flags);
    }

    /// Pop up to `n` entries.
    pub fn pop(&mut self, n: u16) {
        let keep = self.stack.len().saturating_sub(n as usize);
        self.stack.truncate(keep);
    }

    /// Mutate the top frame in place. With an empty stack the result becomes
    /// the sole frame.
    pub fn apply(&mut self, mode: KittySetMode, flags: KittyKeyboardFlags) {
        let updated = match mode {
            KittySetMode::Set => flags,
            KittySetMode::Or => self.current() | flags,
            KittySetMode::Not => self.current() & !flags,
        };
        match self.stack.last_mut() {
            Some(top) => *top = updated,
            None => self.stack.push(updated),
        }
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop() {
        let mut stack = KittyKeyboardStack::new();
        assert_eq!(KittyKeyboardFlags::empty(), stack.current());

        stack.push(KittyKeyboardFlags::DISAMBIGUATE);
        stack.push(KittyKeyboardFlags::REPORT_EVENTS);
        assert_eq!(KittyKeyboardFlags::REPORT_EVENTS, stack.current());

        stack.pop(1);
        assert_eq!(KittyKeyboardFlags::DISAMBIGUATE, stack.current());
        // popping more than the depth empties the stack
        stack.pop(10);
        assert_eq!(KittyKeyboardFlags::empty(), stack.current());
    }

    #[test]
    fn set_or_not() {
        let mut stack = KittyKeyboardStack::new();
        stack.apply(KittySetMode::Set, KittyKeyboardFlags::DISAMBIGUATE);
        assert_eq!(KittyKeyboardFlags::DISAMBIGUATE, stack.current());

        stack.apply(KittySetMode::Or, KittyKeyboardFlags::REPORT_ALL);
        assert_eq!(KittyKeyboardFlags::DISAMBIGUATE | KittyKeyboardFlags::REPORT_ALL, stack.current());

        stack.apply(KittySetMode::Not, KittyKeyboardFlags::DISAMBIGUATE);
        assert_eq!(KittyKeyboardFlags::REPORT_ALL, stack.current());
    }

    #[test]
    fn apply_only_touches_the_top_frame() {
        let mut stack = KittyKeyboardStack::new();
        stack.push(KittyKeyboardFlags::DISAMBIGUATE);
        stack.push(KittyKeyboardFlags::empty());
        stack.apply(KittySetMode::Set, KittyKeyboardFlags::REPORT_ALL);
        assert_eq!(KittyKeyboardFlags::REPORT_ALL, stack.current());

        stack.pop(1);
        assert_eq!(KittyKeyboardFlags::DISAMBIGUATE, stack.current());
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut stack = KittyKeyboardStack::new();
        for _ in 0..KITTY_KEYBOARD_STACK_LIMIT {
            stack.push(KittyKeyboardFlags::DISAMBIGUATE);
        }
        stack.push(KittyKeyboardFlags::REPORT_EVENTS);
        assert_eq!(KITTY_KEYBOARD_STACK_LIMIT, stack.depth());
        assert_eq!(KittyKeyboardFlags::REPORT_EVENTS, stack.current());
    }
}
