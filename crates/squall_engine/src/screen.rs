//! The operation contract a screen model offers to an action sink.
//!
//! The sink drives everything through this trait, so the grid storage can be
//! swapped without touching dispatch. [`crate::TextScreen`] is the in-memory
//! implementation.

use squall_parser_core::{ActiveCharset, Charset, CharsetSlot, EraseDisplayMode, EraseLineMode, Mode, ProtectedMode, TabClear};

use crate::{Caret, EngineResult, Palette, Position, SemanticPromptPhase, Style, StyleId, StyleSet, TerminalState};

pub trait TerminalScreen {
    // === State access ===

    fn terminal_state(&self) -> &TerminalState;
    fn terminal_state_mut(&mut self) -> &mut TerminalState;
    fn caret(&self) -> &Caret;
    fn caret_mut(&mut self) -> &mut Caret;
    fn palette(&self) -> &Palette;
    fn palette_mut(&mut self) -> &mut Palette;
    fn styles(&self) -> &StyleSet;

    fn get_width(&self) -> i32 {
        self.terminal_state().get_width()
    }

    fn get_height(&self) -> i32 {
        self.terminal_state().get_height()
    }

    fn caret_position(&self) -> Position {
        self.caret().position()
    }

    // === Cell inspection ===

    fn get_char(&self, pos: Position) -> char;
    fn get_style_id(&self, pos: Position) -> StyleId;
    fn get_style(&self, pos: Position) -> Style;

    // === Printing ===

    /// Print one character at the cursor and advance it, honoring autowrap,
    /// insert mode, margins, and the active charset.
    fn print_char(&mut self, ch: char) -> EngineResult<()>;

    /// Repeat the most recently printed character. A count of zero behaves
    /// as one.
    fn print_repeat(&mut self, count: u16) -> EngineResult<()>;

    // === Simple motion ===

    fn backspace(&mut self);
    fn carriage_return(&mut self);
    fn linefeed(&mut self) -> EngineResult<()>;
    fn index(&mut self) -> EngineResult<()>;
    fn reverse_index(&mut self) -> EngineResult<()>;

    // === Cursor ===

    fn cursor_up(&mut self, count: i32);
    fn cursor_down(&mut self, count: i32);
    fn cursor_left(&mut self, count: i32);
    fn cursor_right(&mut self, count: i32);

    /// Absolute placement with 1-based coordinates, clamped to the screen
    /// (or to the margins in origin mode).
    fn set_cursor_pos(&mut self, row: i32, col: i32);

    fn save_cursor(&mut self);
    fn restore_cursor(&mut self);

    // === Erase ===

    fn erase_display(&mut self, mode: EraseDisplayMode, selective: bool) -> EngineResult<()>;
    fn erase_line(&mut self, mode: EraseLineMode, selective: bool) -> EngineResult<()>;

    // === Line and character editing ===

    fn delete_chars(&mut self, count: i32) -> EngineResult<()>;
    fn erase_chars(&mut self, count: i32) -> EngineResult<()>;
    fn insert_blanks(&mut self, count: i32) -> EngineResult<()>;
    fn insert_lines(&mut self, count: i32) -> EngineResult<()>;
    fn delete_lines(&mut self, count: i32) -> EngineResult<()>;
    fn scroll_up(&mut self, count: i32) -> EngineResult<()>;
    fn scroll_down(&mut self, count: i32) -> EngineResult<()>;

    // === Tabs ===

    /// One forward tab step. Callers iterate counts and stop early when the
    /// cursor no longer moves.
    fn horizontal_tab(&mut self);
    fn horizontal_tab_back(&mut self);
    fn tab_clear(&mut self, scope: TabClear);
    fn tab_set(&mut self);
    fn tab_reset(&mut self);

    // === Margins ===

    /// 1-based bounds; 0 selects the screen edge.
    fn set_top_and_bottom_margin(&mut self, top: i32, bottom: i32);
    fn set_left_and_right_margin(&mut self, left: i32, right: i32);

    // === Character sets ===

    fn configure_charset(&mut self, slot: CharsetSlot, charset: Charset);
    fn invoke_charset(&mut self, bank: ActiveCharset, slot: CharsetSlot, locking: bool);

    // === Whole-screen operations ===

    fn set_protected_mode(&mut self, mode: ProtectedMode);
    fn decaln(&mut self) -> EngineResult<()>;
    fn full_reset(&mut self);

    /// Enter or leave the alternate screen; `mode` is one of the three
    /// alternate-screen flavors and selects the entry side effects.
    fn switch_screen_mode(&mut self, mode: Mode, enabled: bool) -> EngineResult<()>;

    /// Switch between 80 and 132 columns: resize, clear, reset margins,
    /// cursor home.
    fn deccolm(&mut self, columns: i32) -> EngineResult<()>;

    // === Shell integration ===

    fn mark_semantic_prompt(&mut self, phase: SemanticPromptPhase);

    // === Hyperlinks ===

    fn start_hyperlink(&mut self, uri: &str, id: Option<&str>);
    fn end_hyperlink(&mut self);
}
