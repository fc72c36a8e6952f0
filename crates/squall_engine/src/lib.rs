#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::module_name_repetitions
)]

//! Terminal state engine: a screen model plus a sink that applies parsed
//! terminal actions to it. The sink never produces bytes back toward the
//! host; report-requesting actions are accepted and dropped.

mod error;
pub use error::*;

mod position;
pub use position::*;

mod style;
pub use style::*;

mod style_set;
pub use style_set::*;

mod palette;
pub use palette::*;

mod modes;
pub use modes::*;

mod kitty;
pub use kitty::*;

mod charset;
pub use charset::*;

mod caret;
pub use caret::*;

mod terminal_state;
pub use terminal_state::*;

pub mod screen;
pub use screen::*;

mod text_screen;
pub use text_screen::*;

mod action_sink;
pub use action_sink::*;

pub type EngineResult<T> = anyhow::Result<T>;

#[derive(Copy, Clone, Debug, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(width: {}, height: {})", self.width, self.height)
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Size) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }
}

impl From<(i32, i32)> for Size {
    fn from(value: (i32, i32)) -> Self {
        Size {
            width: value.0,
            height: value.1,
        }
    }
}

impl From<(usize, usize)> for Size {
    fn from(value: (usize, usize)) -> Self {
        Size {
            width: value.0 as i32,
            height: value.1 as i32,
        }
    }
}
