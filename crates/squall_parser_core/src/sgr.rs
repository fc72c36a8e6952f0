//! SGR (Select Graphic Rendition) handling
//!
//! Decodes the parameter list of `CSI ... m` into [`SgrAttribute`] values,
//! one per attribute. Extended colors accept both the `;`-separated and the
//! `:`-sub-parameter forms, and underline accepts the `4:n` style selector.

use crate::Rgb;

/// Intensity level for text display
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    /// Normal intensity (default)
    Normal,
    /// Bold or increased intensity
    Bold,
    /// Faint, decreased intensity
    Faint,
}

/// Underline style for text, including the extended `4:n` selections
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UnderlineStyle {
    #[default]
    None = 0,
    Single = 1,
    Double = 2,
    Curly = 3,
    Dotted = 4,
    Dashed = 5,
}

impl UnderlineStyle {
    pub fn from_u16(n: u16) -> Option<Self> {
        match n {
            0 => Some(Self::None),
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Curly),
            4 => Some(Self::Dotted),
            5 => Some(Self::Dashed),
            _ => None,
        }
    }
}

/// Color payload of an SGR color attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrColor {
    /// Return to the terminal default
    Default,
    /// 256-color palette index
    Palette(u8),
    /// Direct RGB color
    Rgb(Rgb),
}

/// A single decoded SGR attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrAttribute {
    /// Reset all attributes to default
    Reset,
    Intensity(Intensity),
    Italic(bool),
    Underline(UnderlineStyle),
    Blink(bool),
    Inverse(bool),
    Invisible(bool),
    Strikethrough(bool),
    Overline(bool),
    Foreground(SgrColor),
    Background(SgrColor),
    UnderlineColor(SgrColor),
    /// Unsupported parameter, to be dropped by the consumer
    Unknown(u16),
}

/// A CSI parameter together with whether it was attached to its predecessor
/// by a colon.
pub(crate) type Param = (u16, bool);

/// Decode an SGR parameter list, invoking `emit` once per attribute.
pub(crate) fn parse_sgr(params: &[Param], emit: &mut dyn FnMut(SgrAttribute)) {
    // Empty CSI m means reset.
    if params.is_empty() {
        emit(SgrAttribute::Reset);
        return;
    }

    let mut i = 0;
    while i < params.len() {
        let (value, _) = params[i];
        let consumed = match value {
            0 => {
                emit(SgrAttribute::Reset);
                1
            }
            1 => {
                emit(SgrAttribute::Intensity(Intensity::Bold));
                1
            }
            2 => {
                emit(SgrAttribute::Intensity(Intensity::Faint));
                1
            }
            3 => {
                emit(SgrAttribute::Italic(true));
                1
            }
            4 => {
                // 4:n selects an underline style; plain 4 is single.
                if let Some(&(style, true)) = params.get(i + 1) {
                    match UnderlineStyle::from_u16(style) {
                        Some(style) => emit(SgrAttribute::Underline(style)),
                        None => emit(SgrAttribute::Unknown(value)),
                    }
                    2
                } else {
                    emit(SgrAttribute::Underline(UnderlineStyle::Single));
                    1
                }
            }
            5 | 6 => {
                emit(SgrAttribute::Blink(true));
                1
            }
            7 => {
                emit(SgrAttribute::Inverse(true));
                1
            }
            8 => {
                emit(SgrAttribute::Invisible(true));
                1
            }
            9 => {
                emit(SgrAttribute::Strikethrough(true));
                1
            }
            21 => {
                emit(SgrAttribute::Underline(UnderlineStyle::Double));
                1
            }
            22 => {
                emit(SgrAttribute::Intensity(Intensity::Normal));
                1
            }
            23 => {
                emit(SgrAttribute::Italic(false));
                1
            }
            24 => {
                emit(SgrAttribute::Underline(UnderlineStyle::None));
                1
            }
            25 => {
                emit(SgrAttribute::Blink(false));
                1
            }
            27 => {
                emit(SgrAttribute::Inverse(false));
                1
            }
            28 => {
                emit(SgrAttribute::Invisible(false));
                1
            }
            29 => {
                emit(SgrAttribute::Strikethrough(false));
                1
            }
            30..=37 => {
                emit(SgrAttribute::Foreground(SgrColor::Palette((value - 30) as u8)));
                1
            }
            38 => extended_color(params, i, emit, SgrAttribute::Foreground),
            39 => {
                emit(SgrAttribute::Foreground(SgrColor::Default));
                1
            }
            40..=47 => {
                emit(SgrAttribute::Background(SgrColor::Palette((value - 40) as u8)));
                1
            }
            48 => extended_color(params, i, emit, SgrAttribute::Background),
            49 => {
                emit(SgrAttribute::Background(SgrColor::Default));
                1
            }
            53 => {
                emit(SgrAttribute::Overline(true));
                1
            }
            55 => {
                emit(SgrAttribute::Overline(false));
                1
            }
            58 => extended_color(params, i, emit, SgrAttribute::UnderlineColor),
            59 => {
                emit(SgrAttribute::UnderlineColor(SgrColor::Default));
                1
            }
            90..=97 => {
                emit(SgrAttribute::Foreground(SgrColor::Palette((value - 90 + 8) as u8)));
                1
            }
            100..=107 => {
                emit(SgrAttribute::Background(SgrColor::Palette((value - 100 + 8) as u8)));
                1
            }
            other => {
                emit(SgrAttribute::Unknown(other));
                1
            }
        };
        i += consumed;
    }
}

/// Decode an extended color introducer (38/48/58) starting at `start`.
/// Returns the number of parameters consumed, including the introducer.
fn extended_color(params: &[Param], start: usize, emit: &mut dyn FnMut(SgrAttribute), wrap: fn(SgrColor) -> SgrAttribute) -> usize {
    let introducer = params[start].0;

    // Colon form: every sub-parameter is flagged. Collect the run so a
    // malformed group is skipped as a whole.
    if params.get(start + 1).is_some_and(|&(_, colon)| colon) {
        let mut end = start + 1;
        while end < params.len() && params[end].1 {
            end += 1;
        }
        let sub: Vec<u16> = params[start + 1..end].iter().map(|&(v, _)| v).collect();
        match sub.first() {
            Some(5) if sub.len() >= 2 => emit(wrap(SgrColor::Palette(sub[1] as u8))),
            // 2:r:g:b, or 2:cs:r:g:b with a color-space id to skip
            Some(2) if sub.len() == 4 => emit(wrap(SgrColor::Rgb(Rgb::new(sub[1] as u8, sub[2] as u8, sub[3] as u8)))),
            Some(2) if sub.len() >= 5 => emit(wrap(SgrColor::Rgb(Rgb::new(sub[2] as u8, sub[3] as u8, sub[4] as u8)))),
            _ => emit(SgrAttribute::Unknown(introducer)),
        }
        return end - start;
    }

    // Semicolon form: 38;5;n or 38;2;r;g;b.
    match params.get(start + 1).map(|&(v, _)| v) {
        Some(5) => {
            if let Some(&(n, _)) = params.get(start + 2) {
                emit(wrap(SgrColor::Palette(n as u8)));
                3
            } else {
                emit(SgrAttribute::Unknown(introducer));
                2
            }
        }
        Some(2) => {
            if start + 4 < params.len() {
                let r = params[start + 2].0 as u8;
                let g = params[start + 3].0 as u8;
                let b = params[start + 4].0 as u8;
                emit(wrap(SgrColor::Rgb(Rgb::new(r, g, b))));
                5
            } else {
                emit(SgrAttribute::Unknown(introducer));
                params.len() - start
            }
        }
        _ => {
            emit(SgrAttribute::Unknown(introducer));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(params: &[Param]) -> Vec<SgrAttribute> {
        let mut out = Vec::new();
        parse_sgr(params, &mut |attr| out.push(attr));
        out
    }

    #[test]
    fn empty_is_reset() {
        assert_eq!(vec![SgrAttribute::Reset], decode(&[]));
    }

    #[test]
    fn basic_attributes() {
        assert_eq!(
            vec![
                SgrAttribute::Intensity(Intensity::Bold),
                SgrAttribute::Foreground(SgrColor::Palette(1)),
                SgrAttribute::Background(SgrColor::Palette(12)),
            ],
            decode(&[(1, false), (31, false), (104, false)])
        );
    }

    #[test]
    fn extended_semicolon_colors() {
        assert_eq!(vec![SgrAttribute::Foreground(SgrColor::Palette(123))], decode(&[(38, false), (5, false), (123, false)]));
        assert_eq!(
            vec![SgrAttribute::Background(SgrColor::Rgb(Rgb::new(1, 2, 3)))],
            decode(&[(48, false), (2, false), (1, false), (2, false), (3, false)])
        );
    }

    #[test]
    fn extended_colon_colors() {
        assert_eq!(vec![SgrAttribute::Foreground(SgrColor::Palette(99))], decode(&[(38, false), (5, true), (99, true)]));
        // with colorspace id
        assert_eq!(
            vec![SgrAttribute::UnderlineColor(SgrColor::Rgb(Rgb::new(10, 20, 30)))],
            decode(&[(58, false), (2, true), (0, true), (10, true), (20, true), (30, true)])
        );
    }

    #[test]
    fn underline_sub_parameter() {
        assert_eq!(vec![SgrAttribute::Underline(UnderlineStyle::Curly)], decode(&[(4, false), (3, true)]));
        assert_eq!(vec![SgrAttribute::Underline(UnderlineStyle::Single)], decode(&[(4, false)]));
        assert_eq!(vec![SgrAttribute::Underline(UnderlineStyle::None)], decode(&[(4, false), (0, true)]));
    }

    #[test]
    fn attributes_continue_after_extended_color() {
        assert_eq!(
            vec![
                SgrAttribute::Foreground(SgrColor::Rgb(Rgb::new(255, 0, 0))),
                SgrAttribute::Intensity(Intensity::Bold),
            ],
            decode(&[(38, false), (2, false), (255, false), (0, false), (0, false), (1, false)])
        );
    }

    #[test]
    fn unknown_parameters_are_flagged() {
        assert_eq!(vec![SgrAttribute::Unknown(26)], decode(&[(26, false)]));
    }
}
