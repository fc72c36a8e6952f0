use squall_parser_core::{MouseShape, StatusDisplay};

use crate::{KittyKeyboardStack, ModeRegistry, Size};

/// Which mouse events get reported to the host.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvents {
    #[default]
    None,
    X10,
    Normal,
    Button,
    Any,
}

/// Encoding for reported mouse coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MouseFormat {
    #[default]
    X10,
    Utf8,
    Sgr,
    Urxvt,
    SgrPixels,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ActiveScreen {
    #[default]
    Primary,
    Alternate,
}

/// Row-level shell integration tag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SemanticTag {
    #[default]
    None,
    Prompt,
    PromptContinuation,
    Input,
    Command,
}

/// Where the stream currently sits relative to the shell prompt cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SemanticPhase {
    #[default]
    Output,
    Input,
    Command,
}

/// Shell integration mark being applied to the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticPromptPhase {
    PromptStart,
    PromptContinuation,
    PromptEnd,
    EndOfInput,
    EndOfCommand,
}

/// Loose terminal flags without mode numbers of their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerminalFlags {
    pub mouse_event: MouseEvents,
    pub mouse_format: MouseFormat,
    /// Tri-state: stays unset until the host takes a side.
    pub mouse_shift_capture: Option<bool>,
    pub modify_other_keys_2: bool,
    pub shell_redraws_prompt: bool,
}

#[derive(Debug, Clone)]
pub struct TerminalState {
    size: Size,
    margins_top_bottom: Option<(i32, i32)>,
    margins_left_right: Option<(i32, i32)>,
    tab_stops: Vec<i32>,

    pub modes: ModeRegistry,
    pub kitty_keyboard: KittyKeyboardStack,
    pub flags: TerminalFlags,
    pub status_display: StatusDisplay,
    pub mouse_shape: MouseShape,
    pub active_screen: ActiveScreen,
    pub semantic_phase: SemanticPhase,

    /// Partial UTF-8 sequence carried between print calls.
    pub(crate) utf8_buffer: Vec<u8>,
}

impl TerminalState {
    pub fn from(size: impl Into<Size>) -> Self {
        let mut state = TerminalState {
            size: size.into(),
            margins_top_bottom: None,
            margins_left_right: None,
            tab_stops: vec![],
            modes: ModeRegistry::default(),
            kitty_keyboard: KittyKeyboardStack::default(),
            flags: TerminalFlags::default(),
            status_display: StatusDisplay::default(),
            mouse_shape: MouseShape::default(),
            active_screen: ActiveScreen::default(),
            semantic_phase: SemanticPhase::default(),
            utf8_buffer: Vec::new(),
        };
        state.reset_tabs();
        state
    }

    pub fn get_width(&self) -> i32 {
        self.size.width
    }

    pub fn set_width(&mut self, width: i32) {
        self.size.width = width;
        self.reset_tabs();
    }

    pub fn get_height(&self) -> i32 {
        self.size.height
    }

    pub fn set_height(&mut self, height: i32) {
        self.size.height = height;
    }

    pub fn get_size(&self) -> Size {
        self.size
    }

    // === Margins ===

    pub fn get_margins_top_bottom(&self) -> Option<(i32, i32)> {
        self.margins_top_bottom
    }

    pub fn get_margins_left_right(&self) -> Option<(i32, i32)> {
        self.margins_left_right
    }

    pub fn set_margins_top_bottom(&mut self, top: i32, bottom: i32) {
        self.margins_top_bottom = if top > bottom { None } else { Some((top, bottom)) };
    }

    pub fn set_margins_left_right(&mut self, left: i32, right: i32) {
        self.margins_left_right = if left > right { None } else { Some((left, right)) };
    }

    pub fn clear_margins_top_bottom(&mut self) {
        self.margins_top_bottom = None;
    }

    pub fn clear_margins_left_right(&mut self) {
        self.margins_left_right = None;
    }

    /// Scroll region resolved against the screen extent:
    /// `(top, bottom, left, right)`, all inclusive.
    pub fn scroll_region(&self) -> (i32, i32, i32, i32) {
        let (top, bottom) = self.margins_top_bottom.unwrap_or((0, self.size.height - 1));
        let (left, right) = self.margins_left_right.unwrap_or((0, self.size.width - 1));
        (
            top.clamp(0, self.size.height - 1),
            bottom.clamp(0, self.size.height - 1),
            left.clamp(0, self.size.width - 1),
            right.clamp(0, self.size.width - 1),
        )
    }

    // === Tab stops ===

    pub fn get_tabs(&self) -> &[i32] {
        &self.tab_stops
    }

    pub fn clear_tab_stops(&mut self) {
        self.tab_stops.clear();
    }

    pub fn remove_tab_stop(&mut self, x: i32) {
        self.tab_stops.retain(|&t| t != x);
    }

    pub fn set_tab_at(&mut self, x: i32) {
        if !self.tab_stops.contains(&x) {
            self.tab_stops.push(x);
            self.tab_stops.sort_unstable();
        }
    }

    pub fn reset_tabs(&mut self) {
        self.tab_stops.clear();
        let mut i = 0;
        while i < self.size.width {
            self.tab_stops.push(i);
            i += 8;
        }
    }

    pub fn next_tab_stop(&self, x: i32) -> i32 {
        let mut i = 0;
        while i < self.tab_stops.len() && self.tab_stops[i] <= x {
            i += 1;
        }
        if i < self.tab_stops.len() { self.tab_stops[i] } else { self.size.width - 1 }
    }

    pub fn prev_tab_stop(&self, x: i32) -> i32 {
        let mut i = self.tab_stops.len() as i32 - 1;
        while i >= 0 && self.tab_stops[i as usize] >= x {
            i -= 1;
        }
        if i >= 0 { self.tab_stops[i as usize] } else { 0 }
    }

    /// Back to power-on state at the given size.
    pub fn reset_terminal(&mut self, size: Size) {
        *self = TerminalState::from(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tabs_every_eight() {
        let state = TerminalState::from((80, 24));
        assert_eq!(8, state.next_tab_stop(0));
        assert_eq!(8, state.next_tab_stop(7));
        assert_eq!(16, state.next_tab_stop(8));
        assert_eq!(72, state.prev_tab_stop(75));
        // past the last stop the cursor pins to the right edge
        assert_eq!(79, state.next_tab_stop(78));
        assert_eq!(0, state.prev_tab_stop(3));
    }

    #[test]
    fn custom_tab_stops() {
        let mut state = TerminalState::from((80, 24));
        state.clear_tab_stops();
        state.set_tab_at(10);
        state.set_tab_at(4);
        assert_eq!(&[4, 10], state.get_tabs());
        assert_eq!(4, state.next_tab_stop(0));
        state.remove_tab_stop(4);
        assert_eq!(10, state.next_tab_stop(0));
    }

    #[test]
    fn scroll_region_defaults_to_full_screen() {
        let mut state = TerminalState::from((80, 24));
        assert_eq!((0, 23, 0, 79), state.scroll_region());
        state.set_margins_top_bottom(4, 19);
        assert_eq!((4, 19, 0, 79), state.scroll_region());
        state.set_margins_left_right(2, 40);
        assert_eq!((4, 19, 2, 40), state.scroll_region());
    }

    #[test]
    fn inverted_margins_are_rejected() {
        let mut state = TerminalState::from((80, 24));
        state.set_margins_top_bottom(10, 5);
        assert_eq!(None, state.get_margins_top_bottom());
    }
}
