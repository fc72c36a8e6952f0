//! In-memory screen: a grid of style-referencing cells plus the primary /
//! alternate buffer pair and a bounded scrollback.
//!
//! Cells hold a [`StyleId`] into the screen's [`StyleSet`]; every cell write
//! interns the style and releases the overwritten cell's reference, so the
//! set's counts track exactly the cells referencing each style.

use squall_parser_core::{ActiveCharset, Charset, CharsetSlot, EraseDisplayMode, EraseLineMode, Mode, ProtectedMode, TabClear};

use crate::{
    ActiveScreen, Caret, CharsetState, EngineError, EngineResult, Layout, Palette, Position, SavedCaretState, SemanticPromptPhase, SemanticTag, Size, Style,
    StyleId, StyleSet, TerminalScreen, TerminalState, DEFAULT_STYLE_ID,
};

/// Distinct styles a screen can reference at once.
const STYLE_CAPACITY: u16 = 16_384;

/// Rows kept above the visible screen on the primary buffer.
const SCROLLBACK_LIMIT: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell {
    ch: char,
    style: StyleId,
    protected: bool,
    /// 1-based index into the link table; 0 means no link.
    hyperlink: u16,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: DEFAULT_STYLE_ID,
            protected: false,
            hyperlink: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Row {
    cells: Vec<Cell>,
    semantic: SemanticTag,
}

impl Row {
    fn blank(width: i32) -> Self {
        Row {
            cells: vec![Cell::default(); width.max(0) as usize],
            semantic: SemanticTag::None,
        }
    }
}

/// A hyperlink opened through OSC 8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperLink {
    pub url: String,
    pub id: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct TextScreen {
    state: TerminalState,
    caret: Caret,
    saved_caret: Option<SavedCaretState>,
    charsets: CharsetState,
    palette: Palette,
    styles: StyleSet,
    rows: Vec<Row>,
    /// The buffer of whichever screen is not active.
    inactive_rows: Option<Vec<Row>>,
    scrollback: Vec<Row>,
    links: Vec<HyperLink>,
    /// 1-based index into `links` applied to printed cells; 0 when closed.
    active_link: u16,
    last_printed: Option<char>,
}

impl TextScreen {
    /// # Panics
    ///
    /// Panics if either dimension is not positive.
    pub fn new(size: impl Into<Size>) -> Self {
        let size = size.into();
        assert!(size.width > 0 && size.height > 0, "bad screen size {size}");
        TextScreen {
            state: TerminalState::from(size),
            caret: Caret::default(),
            saved_caret: None,
            charsets: CharsetState::default(),
            palette: Palette::default(),
            styles: StyleSet::new(Layout::new(STYLE_CAPACITY)),
            rows: (0..size.height).map(|_| Row::blank(size.width)).collect(),
            inactive_rows: None,
            scrollback: Vec::new(),
            links: Vec::new(),
            active_link: 0,
            last_printed: None,
        }
    }

    /// Rendered text of the visible screen: rows with trailing blanks
    /// removed, joined by newlines, trailing empty rows dropped.
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let text: String = row.cells.iter().map(|cell| cell.ch).collect();
                text.trim_end().to_string()
            })
            .collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines.join("\n")
    }

    pub fn hyperlinks(&self) -> &[HyperLink] {
        &self.links
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    pub fn row_semantic_tag(&self, y: i32) -> SemanticTag {
        self.rows.get(y as usize).map_or(SemanticTag::None, |row| row.semantic)
    }

    /// Hyperlink attached to the cell, if any.
    pub fn cell_hyperlink(&self, pos: Position) -> Option<&HyperLink> {
        let index = self.cell(pos).hyperlink;
        if index == 0 { None } else { self.links.get(index as usize - 1) }
    }

    // === Cell plumbing ===

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.get_width() && pos.y < self.get_height()
    }

    fn cell(&self, pos: Position) -> Cell {
        if self.in_bounds(pos) {
            self.rows[pos.y as usize].cells[pos.x as usize]
        } else {
            Cell::default()
        }
    }

    /// Intern `style`, write the cell, release the overwritten reference.
    fn write_cell(&mut self, pos: Position, ch: char, style: Style, protected: bool, hyperlink: u16) -> EngineResult<()> {
        if !self.in_bounds(pos) {
            return Ok(());
        }
        let id = self.styles.add(style)?;
        let cell = Cell {
            ch,
            style: id,
            protected,
            hyperlink,
        };
        let old = std::mem::replace(&mut self.rows[pos.y as usize].cells[pos.x as usize], cell);
        self.styles.release(old.style);
        Ok(())
    }

    /// Move a cell, carrying its style reference along. The source becomes a
    /// default blank.
    fn move_cell(&mut self, from: Position, to: Position) {
        let src = std::mem::take(&mut self.rows[from.y as usize].cells[from.x as usize]);
        let old = std::mem::replace(&mut self.rows[to.y as usize].cells[to.x as usize], src);
        self.styles.release(old.style);
    }

    /// Erased cells keep the caret's background, nothing else.
    fn blank_style(&self) -> Style {
        Style {
            bg_color: self.caret.style.bg_color,
            ..Style::default()
        }
    }

    fn fill_blank(&mut self, y: i32, x_range: std::ops::RangeInclusive<i32>, selective: bool) -> EngineResult<()> {
        let style = self.blank_style();
        for x in x_range {
            let pos = Position::new(x, y);
            if selective && self.cell(pos).protected {
                continue;
            }
            self.write_cell(pos, ' ', style, false, 0)?;
        }
        Ok(())
    }

    fn release_row(styles: &mut StyleSet, row: &Row) {
        for cell in &row.cells {
            styles.release(cell.style);
        }
    }

    fn push_scrollback(&mut self, row: Row) {
        self.scrollback.push(row);
        if self.scrollback.len() > SCROLLBACK_LIMIT {
            let evicted = self.scrollback.remove(0);
            Self::release_row(&mut self.styles, &evicted);
        }
    }

    // === Region shifting ===

    /// Move the region's contents up by `count`, blanking the vacated rows
    /// at the bottom. No scrollback interaction.
    fn shift_up(&mut self, top: i32, bottom: i32, left: i32, right: i32, count: i32) -> EngineResult<()> {
        let count = count.min(bottom - top + 1);
        if count <= 0 {
            return Ok(());
        }
        let full_width = left == 0 && right == self.get_width() - 1;
        for y in top..=bottom - count {
            for x in left..=right {
                self.move_cell(Position::new(x, y + count), Position::new(x, y));
            }
            if full_width {
                let tag = self.rows[(y + count) as usize].semantic;
                self.rows[y as usize].semantic = tag;
            }
        }
        for y in bottom - count + 1..=bottom {
            self.fill_blank(y, left..=right, false)?;
            if full_width {
                self.rows[y as usize].semantic = SemanticTag::None;
            }
        }
        Ok(())
    }

    /// Move the region's contents down by `count`, blanking the vacated rows
    /// at the top.
    fn shift_down(&mut self, top: i32, bottom: i32, left: i32, right: i32, count: i32) -> EngineResult<()> {
        let count = count.min(bottom - top + 1);
        if count <= 0 {
            return Ok(());
        }
        let full_width = left == 0 && right == self.get_width() - 1;
        for y in (top + count..=bottom).rev() {
            for x in left..=right {
                self.move_cell(Position::new(x, y - count), Position::new(x, y));
            }
            if full_width {
                let tag = self.rows[(y - count) as usize].semantic;
                self.rows[y as usize].semantic = tag;
            }
        }
        for y in top..top + count {
            self.fill_blank(y, left..=right, false)?;
            if full_width {
                self.rows[y as usize].semantic = SemanticTag::None;
            }
        }
        Ok(())
    }

    fn scroll_region_up(&mut self, count: i32) -> EngineResult<()> {
        let (top, bottom, left, right) = self.state.scroll_region();
        let full_screen = top == 0 && bottom == self.get_height() - 1 && left == 0 && right == self.get_width() - 1;
        if full_screen && self.state.active_screen == ActiveScreen::Primary {
            // Rows leave through the top into scrollback.
            let width = self.get_width();
            for _ in 0..count.min(self.get_height()) {
                let evicted = self.rows.remove(0);
                self.push_scrollback(evicted);
                self.rows.push(Row::blank(width));
            }
            // Freshly scrolled-in rows still take the caret background.
            let style = self.blank_style();
            if !style.is_default() {
                for y in self.get_height() - count.min(self.get_height())..self.get_height() {
                    self.fill_blank(y, 0..=width - 1, false)?;
                }
            }
            Ok(())
        } else {
            self.shift_up(top, bottom, left, right, count)
        }
    }

    fn scroll_region_down(&mut self, count: i32) -> EngineResult<()> {
        let (top, bottom, left, right) = self.state.scroll_region();
        self.shift_down(top, bottom, left, right, count)
    }

    /// Print one already-translated character.
    fn print_cell(&mut self, ch: char) -> EngineResult<()> {
        if self.caret.pending_wrap {
            self.caret.pending_wrap = false;
            if self.state.modes.get(Mode::Wraparound) {
                self.carriage_return();
                self.index()?;
            }
        }
        if self.state.modes.get(Mode::Insert) {
            self.insert_blanks(1)?;
        }

        let pos = self.caret.pos;
        let style = self.caret.style;
        let protected = self.caret.protected != ProtectedMode::Off;
        let link = self.active_link;
        self.write_cell(pos, ch, style, protected, link)?;
        self.caret.style_id = self.cell(pos).style;
        self.last_printed = Some(ch);

        let (_, _, _, right) = self.state.scroll_region();
        let last_col = if pos.x <= right { right } else { self.get_width() - 1 };
        if pos.x < last_col {
            self.caret.pos.x += 1;
        } else if self.state.modes.get(Mode::Wraparound) {
            self.caret.pending_wrap = true;
        }
        Ok(())
    }

    fn resize(&mut self, width: i32, height: i32) -> EngineResult<()> {
        if width <= 0 || height <= 0 {
            return Err(EngineError::InvalidDimensions { width, height }.into());
        }
        for row in &self.rows {
            Self::release_row(&mut self.styles, row);
        }
        if let Some(inactive) = self.inactive_rows.take() {
            for row in &inactive {
                Self::release_row(&mut self.styles, row);
            }
        }
        self.rows = (0..height).map(|_| Row::blank(width)).collect();
        self.state.set_width(width);
        self.state.set_height(height);
        Ok(())
    }

    fn enter_alt_screen(&mut self) {
        if self.state.active_screen == ActiveScreen::Alternate {
            return;
        }
        let width = self.get_width();
        let height = self.get_height();
        let alt = self
            .inactive_rows
            .take()
            .unwrap_or_else(|| (0..height).map(|_| Row::blank(width)).collect());
        let primary = std::mem::replace(&mut self.rows, alt);
        self.inactive_rows = Some(primary);
        self.state.active_screen = ActiveScreen::Alternate;
    }

    fn leave_alt_screen(&mut self) {
        if self.state.active_screen == ActiveScreen::Primary {
            return;
        }
        let primary = self.inactive_rows.take().unwrap_or_else(|| {
            let width = self.get_width();
            (0..self.get_height()).map(|_| Row::blank(width)).collect()
        });
        let alt = std::mem::replace(&mut self.rows, primary);
        self.inactive_rows = Some(alt);
        self.state.active_screen = ActiveScreen::Primary;
    }

    fn clear_active_screen(&mut self) -> EngineResult<()> {
        for y in 0..self.get_height() {
            self.fill_blank(y, 0..=self.get_width() - 1, false)?;
            self.rows[y as usize].semantic = SemanticTag::None;
        }
        Ok(())
    }
}

impl TerminalScreen for TextScreen {
    fn terminal_state(&self) -> &TerminalState {
        &self.state
    }

    fn terminal_state_mut(&mut self) -> &mut TerminalState {
        &mut self.state
    }

    fn caret(&self) -> &Caret {
        &self.caret
    }

    fn caret_mut(&mut self) -> &mut Caret {
        &mut self.caret
    }

    fn palette(&self) -> &Palette {
        &self.palette
    }

    fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    fn styles(&self) -> &StyleSet {
        &self.styles
    }

    fn get_char(&self, pos: Position) -> char {
        self.cell(pos).ch
    }

    fn get_style_id(&self, pos: Position) -> StyleId {
        self.cell(pos).style
    }

    fn get_style(&self, pos: Position) -> Style {
        self.styles.get(self.cell(pos).style)
    }

    fn print_char(&mut self, ch: char) -> EngineResult<()> {
        let ch = self.charsets.map(ch);
        self.print_cell(ch)
    }

    fn print_repeat(&mut self, count: u16) -> EngineResult<()> {
        // A repeat count of zero behaves as one.
        let Some(ch) = self.last_printed else {
            return Ok(());
        };
        for _ in 0..count.max(1) {
            self.print_cell(ch)?;
        }
        Ok(())
    }

    fn backspace(&mut self) {
        self.caret.pending_wrap = false;
        let (_, _, left, _) = self.state.scroll_region();
        let limit = if self.caret.pos.x >= left { left } else { 0 };
        if self.caret.pos.x > limit {
            self.caret.pos.x -= 1;
        }
    }

    fn carriage_return(&mut self) {
        self.caret.pending_wrap = false;
        let (_, _, left, _) = self.state.scroll_region();
        self.caret.pos.x = if self.caret.pos.x >= left { left } else { 0 };
    }

    fn linefeed(&mut self) -> EngineResult<()> {
        self.index()?;
        if self.state.modes.get(Mode::Linefeed) {
            self.carriage_return();
        }
        Ok(())
    }

    fn index(&mut self) -> EngineResult<()> {
        self.caret.pending_wrap = false;
        let (_, bottom, left, right) = self.state.scroll_region();
        if self.caret.pos.y == bottom && self.caret.pos.x >= left && self.caret.pos.x <= right {
            self.scroll_region_up(1)
        } else {
            if self.caret.pos.y < self.get_height() - 1 {
                self.caret.pos.y += 1;
            }
            Ok(())
        }
    }

    fn reverse_index(&mut self) -> EngineResult<()> {
        self.caret.pending_wrap = false;
        let (top, _, left, right) = self.state.scroll_region();
        if self.caret.pos.y == top && self.caret.pos.x >= left && self.caret.pos.x <= right {
            self.scroll_region_down(1)
        } else {
            if self.caret.pos.y > 0 {
                self.caret.pos.y -= 1;
            }
            Ok(())
        }
    }

    fn cursor_up(&mut self, count: i32) {
        self.caret.pending_wrap = false;
        let (top, _, _, _) = self.state.scroll_region();
        let limit = if self.caret.pos.y >= top { top } else { 0 };
        self.caret.pos.y = (self.caret.pos.y - count.max(1)).max(limit);
    }

    fn cursor_down(&mut self, count: i32) {
        self.caret.pending_wrap = false;
        let (_, bottom, _, _) = self.state.scroll_region();
        let limit = if self.caret.pos.y <= bottom { bottom } else { self.get_height() - 1 };
        self.caret.pos.y = (self.caret.pos.y + count.max(1)).min(limit);
    }

    fn cursor_left(&mut self, count: i32) {
        self.caret.pending_wrap = false;
        let (_, _, left, _) = self.state.scroll_region();
        let limit = if self.caret.pos.x >= left { left } else { 0 };
        self.caret.pos.x = (self.caret.pos.x - count.max(1)).max(limit);
    }

    fn cursor_right(&mut self, count: i32) {
        self.caret.pending_wrap = false;
        let (_, _, _, right) = self.state.scroll_region();
        let limit = if self.caret.pos.x <= right { right } else { self.get_width() - 1 };
        self.caret.pos.x = (self.caret.pos.x + count.max(1)).min(limit);
    }

    fn set_cursor_pos(&mut self, row: i32, col: i32) {
        self.caret.pending_wrap = false;
        let (top, bottom, left, right) = self.state.scroll_region();
        let origin = self.state.modes.get(Mode::Origin);
        let (y_base, y_max) = if origin { (top, bottom) } else { (0, self.get_height() - 1) };
        let (x_base, x_max) = if origin { (left, right) } else { (0, self.get_width() - 1) };
        self.caret.pos.y = (y_base + row.max(1) - 1).clamp(y_base, y_max);
        self.caret.pos.x = (x_base + col.max(1) - 1).clamp(x_base, x_max);
    }

    fn save_cursor(&mut self) {
        self.saved_caret = Some(SavedCaretState {
            caret: self.caret.clone(),
            charsets: self.charsets.clone(),
            origin_mode: self.state.modes.get(Mode::Origin),
        });
    }

    fn restore_cursor(&mut self) {
        // Restoring without a prior save brings back the power-on state.
        let saved = self.saved_caret.clone().unwrap_or(SavedCaretState {
            caret: Caret::default(),
            charsets: CharsetState::default(),
            origin_mode: false,
        });
        self.state.modes.set(Mode::Origin, saved.origin_mode);
        self.charsets = saved.charsets;
        self.caret = saved.caret;
        self.caret.pos.x = self.caret.pos.x.clamp(0, self.get_width() - 1);
        self.caret.pos.y = self.caret.pos.y.clamp(0, self.get_height() - 1);
    }

    fn erase_display(&mut self, mode: EraseDisplayMode, selective: bool) -> EngineResult<()> {
        let width = self.get_width();
        let height = self.get_height();
        let pos = self.caret.pos;
        match mode {
            EraseDisplayMode::Below => {
                self.fill_blank(pos.y, pos.x..=width - 1, selective)?;
                for y in pos.y + 1..height {
                    self.fill_blank(y, 0..=width - 1, selective)?;
                }
            }
            EraseDisplayMode::Above => {
                for y in 0..pos.y {
                    self.fill_blank(y, 0..=width - 1, selective)?;
                }
                self.fill_blank(pos.y, 0..=pos.x, selective)?;
            }
            EraseDisplayMode::Complete => {
                self.caret.pending_wrap = false;
                for y in 0..height {
                    self.fill_blank(y, 0..=width - 1, selective)?;
                }
            }
            EraseDisplayMode::Scrollback => {
                for row in std::mem::take(&mut self.scrollback) {
                    Self::release_row(&mut self.styles, &row);
                }
            }
            EraseDisplayMode::ScrollComplete => {
                if self.state.active_screen == ActiveScreen::Primary {
                    let rows = std::mem::replace(&mut self.rows, (0..height).map(|_| Row::blank(width)).collect());
                    for row in rows {
                        self.push_scrollback(row);
                    }
                } else {
                    self.clear_active_screen()?;
                }
            }
        }
        Ok(())
    }

    fn erase_line(&mut self, mode: EraseLineMode, selective: bool) -> EngineResult<()> {
        let width = self.get_width();
        let pos = self.caret.pos;
        match mode {
            EraseLineMode::Right => self.fill_blank(pos.y, pos.x..=width - 1, selective)?,
            EraseLineMode::Left => self.fill_blank(pos.y, 0..=pos.x, selective)?,
            EraseLineMode::Complete => self.fill_blank(pos.y, 0..=width - 1, selective)?,
            EraseLineMode::RightUnlessPendingWrap => {
                if !self.caret.pending_wrap {
                    self.fill_blank(pos.y, pos.x..=width - 1, selective)?;
                }
            }
        }
        Ok(())
    }

    fn delete_chars(&mut self, count: i32) -> EngineResult<()> {
        self.caret.pending_wrap = false;
        let (_, _, left, right) = self.state.scroll_region();
        let pos = self.caret.pos;
        if pos.x < left || pos.x > right {
            return Ok(());
        }
        let count = count.max(1).min(right - pos.x + 1);
        for x in pos.x..=right - count {
            self.move_cell(Position::new(x + count, pos.y), Position::new(x, pos.y));
        }
        self.fill_blank(pos.y, right - count + 1..=right, false)
    }

    fn erase_chars(&mut self, count: i32) -> EngineResult<()> {
        self.caret.pending_wrap = false;
        let pos = self.caret.pos;
        let end = (pos.x + count.max(1) - 1).min(self.get_width() - 1);
        self.fill_blank(pos.y, pos.x..=end, false)
    }

    fn insert_blanks(&mut self, count: i32) -> EngineResult<()> {
        self.caret.pending_wrap = false;
        let (_, _, left, right) = self.state.scroll_region();
        let pos = self.caret.pos;
        if pos.x < left || pos.x > right {
            return Ok(());
        }
        let count = count.max(1).min(right - pos.x + 1);
        for x in (pos.x + count..=right).rev() {
            self.move_cell(Position::new(x - count, pos.y), Position::new(x, pos.y));
        }
        self.fill_blank(pos.y, pos.x..=pos.x + count - 1, false)
    }

    fn insert_lines(&mut self, count: i32) -> EngineResult<()> {
        let (top, bottom, left, right) = self.state.scroll_region();
        let pos = self.caret.pos;
        if pos.y < top || pos.y > bottom || pos.x < left || pos.x > right {
            return Ok(());
        }
        self.caret.pending_wrap = false;
        self.shift_down(pos.y, bottom, left, right, count.max(1))?;
        self.caret.pos.x = left;
        Ok(())
    }

    fn delete_lines(&mut self, count: i32) -> EngineResult<()> {
        let (top, bottom, left, right) = self.state.scroll_region();
        let pos = self.caret.pos;
        if pos.y < top || pos.y > bottom || pos.x < left || pos.x > right {
            return Ok(());
        }
        self.caret.pending_wrap = false;
        self.shift_up(pos.y, bottom, left, right, count.max(1))?;
        self.caret.pos.x = left;
        Ok(())
    }

    fn scroll_up(&mut self, count: i32) -> EngineResult<()> {
        self.scroll_region_up(count.max(1))
    }

    fn scroll_down(&mut self, count: i32) -> EngineResult<()> {
        self.scroll_region_down(count.max(1))
    }

    fn horizontal_tab(&mut self) {
        self.caret.pending_wrap = false;
        let (_, _, _, right) = self.state.scroll_region();
        let limit = if self.caret.pos.x <= right { right } else { self.get_width() - 1 };
        let next = self.state.next_tab_stop(self.caret.pos.x);
        self.caret.pos.x = next.min(limit);
    }

    fn horizontal_tab_back(&mut self) {
        self.caret.pending_wrap = false;
        let (_, _, left, _) = self.state.scroll_region();
        let limit = if self.caret.pos.x >= left { left } else { 0 };
        let prev = self.state.prev_tab_stop(self.caret.pos.x);
        self.caret.pos.x = prev.max(limit);
    }

    fn tab_clear(&mut self, scope: TabClear) {
        match scope {
            TabClear::Current => {
                let x = self.caret.pos.x;
                self.state.remove_tab_stop(x);
            }
            TabClear::All => self.state.clear_tab_stops(),
        }
    }

    fn tab_set(&mut self) {
        let x = self.caret.pos.x;
        self.state.set_tab_at(x);
    }

    fn tab_reset(&mut self) {
        self.state.reset_tabs();
    }

    fn set_top_and_bottom_margin(&mut self, top: i32, bottom: i32) {
        let height = self.get_height();
        let top = if top <= 0 { 1 } else { top };
        let bottom = if bottom <= 0 { height } else { bottom.min(height) };
        if top >= bottom {
            return;
        }
        self.state.set_margins_top_bottom(top - 1, bottom - 1);
        self.set_cursor_pos(1, 1);
    }

    fn set_left_and_right_margin(&mut self, left: i32, right: i32) {
        let width = self.get_width();
        let left = if left <= 0 { 1 } else { left };
        let right = if right <= 0 { width } else { right.min(width) };
        if left >= right {
            return;
        }
        self.state.set_margins_left_right(left - 1, right - 1);
        self.set_cursor_pos(1, 1);
    }

    fn configure_charset(&mut self, slot: CharsetSlot, charset: Charset) {
        self.charsets.configure(slot, charset);
    }

    fn invoke_charset(&mut self, bank: ActiveCharset, slot: CharsetSlot, locking: bool) {
        self.charsets.invoke(bank, slot, locking);
    }

    fn set_protected_mode(&mut self, mode: ProtectedMode) {
        self.caret.protected = mode;
    }

    fn decaln(&mut self) -> EngineResult<()> {
        self.state.clear_margins_top_bottom();
        self.state.clear_margins_left_right();
        self.caret.pending_wrap = false;
        self.caret.pos = Position::default();
        for y in 0..self.get_height() {
            for x in 0..self.get_width() {
                self.write_cell(Position::new(x, y), 'E', Style::default(), false, 0)?;
            }
        }
        Ok(())
    }

    fn full_reset(&mut self) {
        let size = self.state.get_size();
        self.state.reset_terminal(size);
        self.caret.reset();
        self.saved_caret = None;
        self.charsets.reset();
        self.palette.reset();
        self.styles.reset();
        self.rows = (0..size.height).map(|_| Row::blank(size.width)).collect();
        self.inactive_rows = None;
        self.scrollback.clear();
        self.links.clear();
        self.active_link = 0;
        self.last_printed = None;
    }

    fn switch_screen_mode(&mut self, mode: Mode, enabled: bool) -> EngineResult<()> {
        match mode {
            Mode::AltScreenLegacy => {
                if enabled {
                    self.enter_alt_screen();
                } else {
                    self.leave_alt_screen();
                }
            }
            Mode::AltScreen => {
                if enabled {
                    self.enter_alt_screen();
                } else {
                    // 1047 clears the alternate screen on the way out.
                    if self.state.active_screen == ActiveScreen::Alternate {
                        self.clear_active_screen()?;
                    }
                    self.leave_alt_screen();
                }
            }
            Mode::AltScreenSaveCursorClearEnter => {
                if enabled {
                    self.save_cursor();
                    self.enter_alt_screen();
                    self.clear_active_screen()?;
                } else {
                    self.leave_alt_screen();
                    self.restore_cursor();
                }
            }
            _ => log::debug!("not an alternate-screen mode: {mode:?}"),
        }
        Ok(())
    }

    fn deccolm(&mut self, columns: i32) -> EngineResult<()> {
        self.resize(columns, self.get_height())?;
        self.state.clear_margins_top_bottom();
        self.state.clear_margins_left_right();
        self.caret.pending_wrap = false;
        self.caret.pos = Position::default();
        Ok(())
    }

    fn mark_semantic_prompt(&mut self, phase: SemanticPromptPhase) {
        let y = self.caret.pos.y as usize;
        match phase {
            SemanticPromptPhase::PromptStart => {
                if let Some(row) = self.rows.get_mut(y) {
                    row.semantic = SemanticTag::Prompt;
                }
            }
            SemanticPromptPhase::PromptContinuation => {
                if let Some(row) = self.rows.get_mut(y) {
                    row.semantic = SemanticTag::PromptContinuation;
                }
            }
            SemanticPromptPhase::PromptEnd => {
                self.state.semantic_phase = crate::SemanticPhase::Input;
            }
            SemanticPromptPhase::EndOfInput => {
                self.state.semantic_phase = crate::SemanticPhase::Command;
            }
            SemanticPromptPhase::EndOfCommand => {
                if let Some(row) = self.rows.get_mut(y) {
                    row.semantic = SemanticTag::Input;
                }
            }
        }
    }

    fn start_hyperlink(&mut self, uri: &str, id: Option<&str>) {
        self.links.push(HyperLink {
            url: uri.to_string(),
            id: id.map(str::to_string),
            position: self.caret.pos,
        });
        self.active_link = self.links.len() as u16;
    }

    fn end_hyperlink(&mut self) {
        self.active_link = 0;
    }
}
