//! Per-cell visual style: three colors plus a 16-bit flag word.
//!
//! The flag word packs the boolean attributes into the low bits and the
//! underline style into a three-bit field. A style also has a canonical
//! 16-byte packed form used for content hashing; the packed form is built
//! explicitly byte-by-byte so it never depends on struct layout.

use squall_parser_core::{Rgb, UnderlineStyle};

/// Flag bits for [`Style::flags`]. The underline style occupies a three-bit
/// field; remaining high bits stay zero.
pub mod style_flags {
    pub const NONE: u16 = 0;
    pub const BOLD: u16 = 0b0000_0000_0000_0001;
    pub const ITALIC: u16 = 0b0000_0000_0000_0010;
    pub const FAINT: u16 = 0b0000_0000_0000_0100;
    pub const BLINK: u16 = 0b0000_0000_0000_1000;
    pub const INVERSE: u16 = 0b0000_0000_0001_0000;
    pub const INVISIBLE: u16 = 0b0000_0000_0010_0000;
    pub const STRIKETHROUGH: u16 = 0b0000_0000_0100_0000;
    pub const OVERLINE: u16 = 0b0000_0000_1000_0000;

    pub const UNDERLINE_MASK: u16 = 0b0000_0111_0000_0000;
    pub const UNDERLINE_SHIFT: u32 = 8;
}

/// Color of one style channel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StyleColor {
    /// The terminal default for this channel
    #[default]
    None,
    /// 256-color palette index
    Palette(u8),
    /// Direct RGB color
    Rgb(Rgb),
}

impl StyleColor {
    /// Discriminant used by the packed form.
    fn tag(self) -> u8 {
        match self {
            StyleColor::None => 0,
            StyleColor::Palette(_) => 1,
            StyleColor::Rgb(_) => 2,
        }
    }

    /// 24-bit payload used by the packed form. Every arm fills the same
    /// three bytes so distinct colors always pack differently.
    fn payload(self) -> [u8; 3] {
        match self {
            StyleColor::None => [0, 0, 0],
            StyleColor::Palette(index) => [0, 0, index],
            StyleColor::Rgb(rgb) => [rgb.r, rgb.g, rgb.b],
        }
    }
}

/// Number of bytes in the packed style representation.
pub const PACKED_STYLE_LEN: usize = 16;

// The packed form must stay exactly 128 bits: 3 color tags + 3x3 payload
// bytes + 2 flag bytes + 2 zero bytes.
const _: () = assert!(3 + 3 * 3 + 2 + 2 == PACKED_STYLE_LEN);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg_color: StyleColor,
    pub bg_color: StyleColor,
    pub underline_color: StyleColor,
    pub flags: u16,
}

impl Style {
    pub fn is_default(&self) -> bool {
        *self == Style::default()
    }

    // === Flag accessors ===

    pub fn is_bold(&self) -> bool {
        (self.flags & style_flags::BOLD) != 0
    }

    pub fn set_is_bold(&mut self, bold: bool) {
        if bold {
            self.flags |= style_flags::BOLD;
        } else {
            self.flags &= !style_flags::BOLD;
        }
    }

    pub fn is_italic(&self) -> bool {
        (self.flags & style_flags::ITALIC) != 0
    }

    pub fn set_is_italic(&mut self, italic: bool) {
        if italic {
            self.flags |= style_flags::ITALIC;
        } else {
            self.flags &= !style_flags::ITALIC;
        }
    }

    pub fn is_faint(&self) -> bool {
        (self.flags & style_flags::FAINT) != 0
    }

    pub fn set_is_faint(&mut self, faint: bool) {
        if faint {
            self.flags |= style_flags::FAINT;
        } else {
            self.flags &= !style_flags::FAINT;
        }
    }

    pub fn is_blinking(&self) -> bool {
        (self.flags & style_flags::BLINK) != 0
    }

    pub fn set_is_blinking(&mut self, blink: bool) {
        if blink {
            self.flags |= style_flags::BLINK;
        } else {
            self.flags &= !style_flags::BLINK;
        }
    }

    pub fn is_inverse(&self) -> bool {
        (self.flags & style_flags::INVERSE) != 0
    }

    pub fn set_is_inverse(&mut self, inverse: bool) {
        if inverse {
            self.flags |= style_flags::INVERSE;
        } else {
            self.flags &= !style_flags::INVERSE;
        }
    }

    pub fn is_invisible(&self) -> bool {
        (self.flags & style_flags::INVISIBLE) != 0
    }

    pub fn set_is_invisible(&mut self, invisible: bool) {
        if invisible {
            self.flags |= style_flags::INVISIBLE;
        } else {
            self.flags &= !style_flags::INVISIBLE;
        }
    }

    pub fn is_strikethrough(&self) -> bool {
        (self.flags & style_flags::STRIKETHROUGH) != 0
    }

    pub fn set_is_strikethrough(&mut self, strikethrough: bool) {
        if strikethrough {
            self.flags |= style_flags::STRIKETHROUGH;
        } else {
            self.flags &= !style_flags::STRIKETHROUGH;
        }
    }

    pub fn is_overlined(&self) -> bool {
        (self.flags & style_flags::OVERLINE) != 0
    }

    pub fn set_is_overlined(&mut self, overline: bool) {
        if overline {
            self.flags |= style_flags::OVERLINE;
        } else {
            self.flags &= !style_flags::OVERLINE;
        }
    }

    pub fn underline(&self) -> UnderlineStyle {
        let bits = (self.flags & style_flags::UNDERLINE_MASK) >> style_flags::UNDERLINE_SHIFT;
        UnderlineStyle::from_u16(bits).unwrap_or(UnderlineStyle::None)
    }

    pub fn set_underline(&mut self, style: UnderlineStyle) {
        self.flags = (self.flags & !style_flags::UNDERLINE_MASK) | ((style as u16) << style_flags::UNDERLINE_SHIFT);
    }

    // === Packed form ===

    /// Canonical 16-byte representation: the three color tags, the three
    /// 24-bit color payloads, the flag word, then zero padding. Equal styles
    /// pack bytewise equal and distinct styles pack differently, which makes
    /// the content hash reproducible.
    pub fn packed(&self) -> [u8; PACKED_STYLE_LEN] {
        let mut out = [0u8; PACKED_STYLE_LEN];
        out[0] = self.fg_color.tag();
        out[1] = self.bg_color.tag();
        out[2] = self.underline_color.tag();
        out[3..6].copy_from_slice(&self.fg_color.payload());
        out[6..9].copy_from_slice(&self.bg_color.payload());
        out[9..12].copy_from_slice(&self.underline_color.payload());
        out[12..14].copy_from_slice(&self.flags.to_le_bytes());
        out
    }

    // === VT serialization ===

    /// Render this style as a self-contained SGR sequence, starting from a
    /// full reset. Every attribute is emitted as its own sequence: combined
    /// forms that mix `;` and `:` separators confuse some terminals.
    pub fn to_escape_sequence(&self) -> String {
        use std::fmt::Write;

        let mut out = String::from("\x1b[0m");
        if self.is_bold() {
            out.push_str("\x1b[1m");
        }
        if self.is_faint() {
            out.push_str("\x1b[2m");
        }
        if self.is_italic() {
            out.push_str("\x1b[3m");
        }
        if self.is_blinking() {
            out.push_str("\x1b[5m");
        }
        if self.is_inverse() {
            out.push_str("\x1b[7m");
        }
        if self.is_invisible() {
            out.push_str("\x1b[8m");
        }
        if self.is_strikethrough() {
            out.push_str("\x1b[9m");
        }
        if self.is_overlined() {
            out.push_str("\x1b[53m");
        }
        match self.underline() {
            UnderlineStyle::None => {}
            UnderlineStyle::Single => out.push_str("\x1b[4m"),
            other => {
                let _ = write!(out, "\x1b[4:{}m", other as u8);
            }
        }
        write_color(&mut out, 38, self.fg_color);
        write_color(&mut out, 48, self.bg_color);
        write_color(&mut out, 58, self.underline_color);
        out
    }
}

fn write_color(out: &mut String, prefix: u8, color: StyleColor) {
    use std::fmt::Write;

    match color {
        StyleColor::None => {}
        StyleColor::Palette(index) => {
            let _ = write!(out, "\x1b[{prefix};5;{index}m");
        }
        StyleColor::Rgb(rgb) => {
            let _ = write!(out, "\x1b[{prefix};2;{};{};{}m", rgb.r, rgb.g, rgb.b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_packs_to_zero() {
        assert_eq!([0u8; PACKED_STYLE_LEN], Style::default().packed());
    }

    #[test]
    fn distinct_styles_pack_differently() {
        let mut styles = Vec::new();
        styles.push(Style::default());
        styles.push(Style {
            fg_color: StyleColor::Palette(0),
            ..Default::default()
        });
        styles.push(Style {
            fg_color: StyleColor::Rgb(Rgb::new(0, 0, 0)),
            ..Default::default()
        });
        styles.push(Style {
            bg_color: StyleColor::Palette(0),
            ..Default::default()
        });
        styles.push(Style {
            underline_color: StyleColor::Palette(0),
            ..Default::default()
        });
        let mut bold = Style::default();
        bold.set_is_bold(true);
        styles.push(bold);
        let mut underlined = Style::default();
        underlined.set_underline(UnderlineStyle::Curly);
        styles.push(underlined);

        for (i, a) in styles.iter().enumerate() {
            for (j, b) in styles.iter().enumerate() {
                if i != j {
                    assert_ne!(a.packed(), b.packed(), "{a:?} vs {b:?}");
                }
            }
        }
    }

    #[test]
    fn equal_styles_pack_equal() {
        let mut a = Style::default();
        a.set_is_bold(true);
        a.set_underline(UnderlineStyle::Double);
        a.fg_color = StyleColor::Rgb(Rgb::new(1, 2, 3));

        let mut b = Style::default();
        b.fg_color = StyleColor::Rgb(Rgb::new(1, 2, 3));
        b.set_underline(UnderlineStyle::Double);
        b.set_is_bold(true);

        assert_eq!(a, b);
        assert_eq!(a.packed(), b.packed());
    }

    #[test]
    fn underline_field_round_trips() {
        let mut style = Style::default();
        for underline in [
            UnderlineStyle::None,
            UnderlineStyle::Single,
            UnderlineStyle::Double,
            UnderlineStyle::Curly,
            UnderlineStyle::Dotted,
            UnderlineStyle::Dashed,
        ] {
            style.set_underline(underline);
            assert_eq!(underline, style.underline());
        }
        // Underline must not disturb the boolean flags.
        style.set_is_bold(true);
        style.set_underline(UnderlineStyle::Dotted);
        assert!(style.is_bold());
    }

    #[test]
    fn escape_sequence_for_default_is_reset_only() {
        assert_eq!("\x1b[0m", Style::default().to_escape_sequence());
    }

    #[test]
    fn escape_sequence_attribute_order() {
        let mut style = Style {
            fg_color: StyleColor::Palette(1),
            bg_color: StyleColor::Rgb(Rgb::new(10, 20, 30)),
            underline_color: StyleColor::Palette(99),
            flags: 0,
        };
        style.set_is_bold(true);
        style.set_underline(UnderlineStyle::Curly);

        assert_eq!(
            "\x1b[0m\x1b[1m\x1b[4:3m\x1b[38;5;1m\x1b[48;2;10;20;30m\x1b[58;5;99m",
            style.to_escape_sequence()
        );
    }

    #[test]
    fn single_underline_uses_plain_form() {
        let mut style = Style::default();
        style.set_underline(UnderlineStyle::Single);
        assert_eq!("\x1b[0m\x1b[4m", style.to_escape_sequence());
    }
}
