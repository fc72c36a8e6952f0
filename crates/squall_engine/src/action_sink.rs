//! Sink that applies parsed actions to a screen.
//!
//! `ReadonlySink` adapts any [`TerminalScreen`] to the
//! [`squall_parser_core::ActionSink`] trait. It is "readonly" toward the
//! host: actions that would require writing a reply (device attributes,
//! status reports, queries, clipboard) are accepted and dropped, so a
//! stream stays consumable end-to-end without a transport.
//!
//! # Example
//!
//! ```no_run
//! use squall_engine::{ReadonlySink, TextScreen};
//! use squall_parser_core::{ActionParser, AnsiParser};
//!
//! let mut screen = TextScreen::new((80, 25));
//! let mut sink = ReadonlySink::new(&mut screen);
//! let mut parser = AnsiParser::new();
//!
//! parser.parse(b"\x1b[1;32mHello, World!\x1b[0m", &mut sink);
//! ```

use squall_parser_core::{
    Action, ActionSink, ColorRequest, ColorTarget, Intensity, Mode, ModifyKeyFormat, ParseError, SgrAttribute, SgrColor,
};

use crate::{EngineResult, MouseEvents, MouseFormat, SemanticPromptPhase, Style, StyleColor, TerminalScreen};

pub struct ReadonlySink<'a> {
    screen: &'a mut dyn TerminalScreen,
    /// First failure; once set the sink stops consuming.
    error: Option<anyhow::Error>,
}

impl<'a> ReadonlySink<'a> {
    pub fn new(screen: &'a mut dyn TerminalScreen) -> Self {
        Self { screen, error: None }
    }

    pub fn screen(&self) -> &dyn TerminalScreen {
        &*self.screen
    }

    pub fn screen_mut(&mut self) -> &mut dyn TerminalScreen {
        self.screen
    }

    /// The failure that halted the stream, if any. The screen stays
    /// consistent up to the last successful action.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    /// Apply a single action. Report-requesting actions return `Ok` without
    /// touching the screen.
    pub fn dispatch(&mut self, action: Action<'_>) -> EngineResult<()> {
        match action {
            Action::PrintRepeat(count) => self.screen.print_repeat(count)?,

            // C0 controls
            Action::Backspace => self.screen.backspace(),
            Action::CarriageReturn => self.screen.carriage_return(),
            Action::LineFeed => self.screen.linefeed()?,
            Action::HorizontalTab(count) => self.tab_forward(count),

            // Cursor motion
            Action::CursorUp(count) => self.screen.cursor_up(count as i32),
            Action::CursorDown(count) => self.screen.cursor_down(count as i32),
            Action::CursorLeft(count) => self.screen.cursor_left(count as i32),
            Action::CursorRight(count) => self.screen.cursor_right(count as i32),
            Action::CursorPos { row, col } => self.screen.set_cursor_pos(row as i32, col as i32),
            Action::CursorCol(col) => {
                let row = self.cursor_row_param();
                self.screen.set_cursor_pos(row, col as i32);
            }
            Action::CursorColRelative(count) => {
                let row = self.cursor_row_param();
                let col = self.cursor_col_param().saturating_add(count as i32);
                self.screen.set_cursor_pos(row, col);
            }
            Action::CursorRow(row) => {
                let col = self.cursor_col_param();
                self.screen.set_cursor_pos(row as i32, col);
            }
            Action::CursorRowRelative(count) => {
                let row = self.cursor_row_param().saturating_add(count as i32);
                let col = self.cursor_col_param();
                self.screen.set_cursor_pos(row, col);
            }
            Action::Index => self.screen.index()?,
            Action::ReverseIndex => self.screen.reverse_index()?,
            Action::NextLine => {
                self.screen.index()?;
                self.screen.carriage_return();
            }
            Action::SetCursorStyle(style) => {
                self.screen.caret_mut().shape = style.shape();
                self.set_mode(Mode::CursorBlinking, style.blinking())?;
            }
            Action::SaveCursor => self.screen.save_cursor(),
            Action::RestoreCursor => self.screen.restore_cursor(),

            // Erase
            Action::EraseDisplay { mode, selective } => self.screen.erase_display(mode, selective)?,
            Action::EraseLine { mode, selective } => self.screen.erase_line(mode, selective)?,

            // Line and character editing
            Action::DeleteChars(count) => self.screen.delete_chars(count as i32)?,
            Action::EraseChars(count) => self.screen.erase_chars(count as i32)?,
            Action::InsertBlanks(count) => self.screen.insert_blanks(count as i32)?,
            Action::InsertLines(count) => self.screen.insert_lines(count as i32)?,
            Action::DeleteLines(count) => self.screen.delete_lines(count as i32)?,
            Action::ScrollUp(count) => self.screen.scroll_up(count as i32)?,
            Action::ScrollDown(count) => self.screen.scroll_down(count as i32)?,

            // Tabs
            Action::HorizontalTabBack(count) => self.tab_back(count),
            Action::TabClear(scope) => self.screen.tab_clear(scope),
            Action::TabSet => self.screen.tab_set(),
            Action::TabReset => self.screen.tab_reset(),

            // Modes
            Action::SetMode(mode) => self.set_mode(mode, true)?,
            Action::ResetMode(mode) => self.set_mode(mode, false)?,
            Action::SaveMode(mode) => self.screen.terminal_state_mut().modes.save(mode),
            Action::RestoreMode(mode) => {
                // The bit is written first; the side-effect handler then
                // observes the restored value.
                if let Some(value) = self.screen.terminal_state_mut().modes.restore(mode) {
                    self.set_mode(mode, value)?;
                }
            }

            // Margins
            Action::TopAndBottomMargin { top, bottom } => self.screen.set_top_and_bottom_margin(top as i32, bottom as i32),
            Action::LeftAndRightMargin { left, right } => self.screen.set_left_and_right_margin(left as i32, right as i32),
            Action::LeftAndRightMarginAmbiguous => {
                // DECSLRM and SCOSC share a final byte; the margin mode bit
                // decides which one was meant.
                if self.screen.terminal_state().modes.get(Mode::EnableLeftAndRightMargin) {
                    self.screen.set_left_and_right_margin(0, 0);
                } else {
                    self.screen.save_cursor();
                }
            }

            // Character sets
            Action::ConfigureCharset { slot, charset } => self.screen.configure_charset(slot, charset),
            Action::InvokeCharset { bank, slot, locking } => self.screen.invoke_charset(bank, slot, locking),

            // Attributes
            Action::SetAttribute(attr) => self.apply_sgr(attr),

            Action::SetProtectedMode(mode) => self.screen.set_protected_mode(mode),

            // Mouse
            Action::MouseShiftCapture(capture) => self.screen.terminal_state_mut().flags.mouse_shift_capture = Some(capture),
            Action::SetMouseShape(shape) => self.screen.terminal_state_mut().mouse_shape = shape,

            // Kitty keyboard
            Action::KittyKeyboardPush(flags) => self.screen.terminal_state_mut().kitty_keyboard.push(flags),
            Action::KittyKeyboardPop(count) => self.screen.terminal_state_mut().kitty_keyboard.pop(count),
            Action::KittyKeyboardSet(mode, flags) => self.screen.terminal_state_mut().kitty_keyboard.apply(mode, flags),

            Action::ModifyKeyFormat(format) => {
                let flags = &mut self.screen.terminal_state_mut().flags;
                flags.modify_other_keys_2 = matches!(format, ModifyKeyFormat::OtherKeysNumeric);
            }

            Action::ActiveStatusDisplay(display) => self.screen.terminal_state_mut().status_display = display,

            Action::Decaln => self.screen.decaln()?,
            Action::FullReset => self.screen.full_reset(),

            // Hyperlinks
            Action::StartHyperlink { uri, id } => {
                let uri = String::from_utf8_lossy(uri);
                let id = id.map(String::from_utf8_lossy);
                self.screen.start_hyperlink(&uri, id.as_deref());
            }
            Action::EndHyperlink => self.screen.end_hyperlink(),

            // Shell integration
            Action::PromptStart { redraw } => {
                self.screen.terminal_state_mut().flags.shell_redraws_prompt = redraw;
                self.screen.mark_semantic_prompt(SemanticPromptPhase::PromptStart);
            }
            Action::PromptContinuation => self.screen.mark_semantic_prompt(SemanticPromptPhase::PromptContinuation),
            Action::PromptEnd => self.screen.mark_semantic_prompt(SemanticPromptPhase::PromptEnd),
            Action::EndOfInput => self.screen.mark_semantic_prompt(SemanticPromptPhase::EndOfInput),
            Action::EndOfCommand => self.screen.mark_semantic_prompt(SemanticPromptPhase::EndOfCommand),

            // Color operations
            Action::ColorOperation { kind: _, requests } => self.apply_color_requests(&requests),

            // Report-requesting and outward-facing actions: accepted, dropped.
            Action::Bell
            | Action::Enquiry
            | Action::RequestMode { .. }
            | Action::DeviceAttributes(_)
            | Action::DeviceStatusReport { .. }
            | Action::KittyKeyboardQuery
            | Action::SizeReport(_)
            | Action::WindowTitleQuery
            | Action::TitlePush
            | Action::TitlePop
            | Action::XtVersion
            | Action::SetWindowTitle(_)
            | Action::SetIconName(_)
            | Action::ReportPwd(_)
            | Action::ShowDesktopNotification { .. }
            | Action::ProgressReport { .. }
            | Action::ClipboardContents { .. }
            | Action::KittyColorReport
            | Action::DeviceControl(_)
            | Action::ApplicationProgram(_) => {}
        }
        Ok(())
    }

    /// 1-based row parameter that reproduces the caret's current row through
    /// `set_cursor_pos`, accounting for origin mode.
    fn cursor_row_param(&self) -> i32 {
        let (top, _, _, _) = self.screen.terminal_state().scroll_region();
        let y = self.screen.caret_position().y;
        if self.screen.terminal_state().modes.get(Mode::Origin) {
            y - top + 1
        } else {
            y + 1
        }
    }

    fn cursor_col_param(&self) -> i32 {
        let (_, _, left, _) = self.screen.terminal_state().scroll_region();
        let x = self.screen.caret_position().x;
        if self.screen.terminal_state().modes.get(Mode::Origin) {
            x - left + 1
        } else {
            x + 1
        }
    }

    fn tab_forward(&mut self, count: u16) {
        for _ in 0..count.max(1) {
            let before = self.screen.caret_position().x;
            self.screen.horizontal_tab();
            if self.screen.caret_position().x == before {
                break;
            }
        }
    }

    fn tab_back(&mut self, count: u16) {
        for _ in 0..count.max(1) {
            let before = self.screen.caret_position().x;
            self.screen.horizontal_tab_back();
            if self.screen.caret_position().x == before {
                break;
            }
        }
    }

    /// Write the mode bit, then run the mode's side effects. Handlers read
    /// the freshly written value, which matters for restores.
    fn set_mode(&mut self, mode: Mode, enabled: bool) -> EngineResult<()> {
        self.screen.terminal_state_mut().modes.set(mode, enabled);
        match mode {
            Mode::Origin => self.screen.set_cursor_pos(1, 1),
            Mode::EnableLeftAndRightMargin => {
                if !enabled {
                    self.screen.terminal_state_mut().clear_margins_left_right();
                }
            }
            Mode::AltScreenLegacy | Mode::AltScreen | Mode::AltScreenSaveCursorClearEnter => {
                self.screen.switch_screen_mode(mode, enabled)?;
            }
            Mode::SaveCursor => {
                if enabled {
                    self.screen.save_cursor();
                } else {
                    self.screen.restore_cursor();
                }
            }
            Mode::Column132 => self.screen.deccolm(if enabled { 132 } else { 80 })?,
            Mode::CursorVisible => self.screen.caret_mut().visible = enabled,
            Mode::CursorBlinking => self.screen.caret_mut().blinking = enabled,
            Mode::MouseEventX10 => self.set_mouse_event(MouseEvents::X10, enabled),
            Mode::MouseEventNormal => self.set_mouse_event(MouseEvents::Normal, enabled),
            Mode::MouseEventButton => self.set_mouse_event(MouseEvents::Button, enabled),
            Mode::MouseEventAny => self.set_mouse_event(MouseEvents::Any, enabled),
            Mode::MouseFormatUtf8 => self.set_mouse_format(MouseFormat::Utf8, enabled),
            Mode::MouseFormatSgr => self.set_mouse_format(MouseFormat::Sgr, enabled),
            Mode::MouseFormatUrxvt => self.set_mouse_format(MouseFormat::Urxvt, enabled),
            Mode::MouseFormatSgrPixels => self.set_mouse_format(MouseFormat::SgrPixels, enabled),
            // The registry bit is the whole effect for everything else.
            _ => {}
        }
        Ok(())
    }

    fn set_mouse_event(&mut self, events: MouseEvents, enabled: bool) {
        self.screen.terminal_state_mut().flags.mouse_event = if enabled { events } else { MouseEvents::None };
    }

    fn set_mouse_format(&mut self, format: MouseFormat, enabled: bool) {
        self.screen.terminal_state_mut().flags.mouse_format = if enabled { format } else { MouseFormat::X10 };
    }

    /// Fold one SGR attribute into the caret style. Unknown attributes are
    /// dropped so hostile parameter soup cannot stall the stream.
    fn apply_sgr(&mut self, attr: SgrAttribute) {
        let style = self.screen.caret_mut().style_mut();
        match attr {
            SgrAttribute::Reset => *style = Style::default(),
            SgrAttribute::Intensity(intensity) => match intensity {
                Intensity::Normal => {
                    style.set_is_bold(false);
                    style.set_is_faint(false);
                }
                Intensity::Bold => {
                    style.set_is_bold(true);
                    style.set_is_faint(false);
                }
                Intensity::Faint => {
                    style.set_is_bold(false);
                    style.set_is_faint(true);
                }
            },
            SgrAttribute::Italic(on) => style.set_is_italic(on),
            SgrAttribute::Underline(underline) => style.set_underline(underline),
            SgrAttribute::Blink(on) => style.set_is_blinking(on),
            SgrAttribute::Inverse(on) => style.set_is_inverse(on),
            SgrAttribute::Invisible(on) => style.set_is_invisible(on),
            SgrAttribute::Strikethrough(on) => style.set_is_strikethrough(on),
            SgrAttribute::Overline(on) => style.set_is_overlined(on),
            SgrAttribute::Foreground(color) => style.fg_color = style_color(color),
            SgrAttribute::Background(color) => style.bg_color = style_color(color),
            SgrAttribute::UnderlineColor(color) => style.underline_color = style_color(color),
            SgrAttribute::Unknown(code) => log::debug!("ignoring SGR parameter {code}"),
        }
    }

    fn apply_color_requests(&mut self, requests: &[ColorRequest]) {
        if requests.is_empty() {
            return;
        }
        for request in requests {
            match *request {
                ColorRequest::Set {
                    target: ColorTarget::Palette(index),
                    color,
                } => self.screen.palette_mut().set_color(index, color),
                ColorRequest::Reset(ColorTarget::Palette(index)) => self.screen.palette_mut().reset_color(index),
                ColorRequest::ResetPalette => self.screen.palette_mut().reset_overridden(),
                // Dynamic and special targets are owned by the renderer;
                // queries would require a reply.
                ColorRequest::Set { .. } | ColorRequest::Reset(_) | ColorRequest::ResetSpecial | ColorRequest::Query(_) => {}
            }
        }
    }

    /// Decode a printable run, carrying partial UTF-8 sequences across
    /// calls, and print every complete character.
    fn print_text(&mut self, text: &[u8]) -> EngineResult<()> {
        let mut buffer = std::mem::take(&mut self.screen.terminal_state_mut().utf8_buffer);
        buffer.extend_from_slice(text);

        let mut decoded = String::new();
        let mut consumed = 0;
        while consumed < buffer.len() {
            match std::str::from_utf8(&buffer[consumed..]) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    consumed = buffer.len();
                }
                Err(error) => {
                    let valid_up_to = error.valid_up_to();
                    if valid_up_to > 0 {
                        decoded.push_str(std::str::from_utf8(&buffer[consumed..consumed + valid_up_to]).unwrap());
                        consumed += valid_up_to;
                    }
                    match error.error_len() {
                        Some(invalid) => {
                            decoded.push('\u{FFFD}');
                            consumed += invalid;
                        }
                        // Incomplete sequence at the end: keep for the next
                        // call.
                        None => break,
                    }
                }
            }
        }

        // Stash the remainder before printing so a failed print cannot lose
        // input.
        self.screen.terminal_state_mut().utf8_buffer = buffer[consumed..].to_vec();
        for ch in decoded.chars() {
            self.screen.print_char(ch)?;
        }
        Ok(())
    }
}

fn style_color(color: SgrColor) -> StyleColor {
    match color {
        SgrColor::Default => StyleColor::None,
        SgrColor::Palette(index) => StyleColor::Palette(index),
        SgrColor::Rgb(rgb) => StyleColor::Rgb(rgb),
    }
}

impl ActionSink for ReadonlySink<'_> {
    fn print(&mut self, text: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.print_text(text) {
            self.error = Some(error);
        }
    }

    fn emit(&mut self, action: Action<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.dispatch(action) {
            self.error = Some(error);
        }
    }

    fn report_error(&mut self, error: ParseError) {
        log::debug!("parse error: {error}");
    }
}
