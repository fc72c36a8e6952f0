use squall_parser_core::{CursorShape, ProtectedMode};

use crate::{CharsetState, Position, Style, StyleId, DEFAULT_STYLE_ID};

#[derive(Clone, PartialEq)]
pub struct Caret {
    pub(crate) pos: Position,
    pub(crate) style: Style,
    pub(crate) style_id: StyleId,
    /// Set after printing into the last column: the next print wraps first.
    pub pending_wrap: bool,
    pub visible: bool,
    pub blinking: bool,
    pub shape: CursorShape,
    pub protected: ProtectedMode,
}

impl Caret {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn set_position(&mut self, pos: Position) {
        self.pos = pos;
    }

    pub fn x(&self) -> i32 {
        self.pos.x
    }

    pub fn y(&self) -> i32 {
        self.pos.y
    }

    /// The style applied to subsequently printed cells.
    pub fn style(&self) -> Style {
        self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    /// Id of the most recently interned caret style. Maintained by the
    /// screen when cells are written.
    pub fn style_id(&self) -> StyleId {
        self.style_id
    }

    pub(crate) fn reset(&mut self) {
        *self = Caret::default();
    }
}

impl Default for Caret {
    fn default() -> Self {
        Caret {
            pos: Position::default(),
            style: Style::default(),
            style_id: DEFAULT_STYLE_ID,
            pending_wrap: false,
            visible: true,
            blinking: true,
            shape: CursorShape::Block,
            protected: ProtectedMode::Off,
        }
    }
}

impl std::fmt::Debug for Caret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caret")
            .field("pos", &self.pos)
            .field("style", &self.style)
            .field("pending_wrap", &self.pending_wrap)
            .finish_non_exhaustive()
    }
}

/// Everything DECSC captures so DECRC can bring it back.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCaretState {
    pub caret: Caret,
    pub charsets: CharsetState,
    pub origin_mode: bool,
}
