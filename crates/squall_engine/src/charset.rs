//! Character set banks: four designatable slots, GL/GR invocation, and the
//! DEC special graphics translation applied at print time.

use squall_parser_core::{ActiveCharset, Charset, CharsetSlot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharsetState {
    slots: [Charset; 4],
    gl: CharsetSlot,
    gr: CharsetSlot,
    single_shift: Option<CharsetSlot>,
}

impl Default for CharsetState {
    fn default() -> Self {
        CharsetState {
            slots: [Charset::Ascii; 4],
            gl: CharsetSlot::G0,
            gr: CharsetSlot::G2,
            single_shift: None,
        }
    }
}

impl CharsetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, slot: CharsetSlot, charset: Charset) {
        self.slots[slot as usize] = charset;
    }

    pub fn invoke(&mut self, bank: ActiveCharset, slot: CharsetSlot, locking: bool) {
        if locking {
            match bank {
                ActiveCharset::GL => self.gl = slot,
                ActiveCharset::GR => self.gr = slot,
            }
        } else {
            self.single_shift = Some(slot);
        }
    }

    pub fn charset(&self, slot: CharsetSlot) -> Charset {
        self.slots[slot as usize]
    }

    /// Translate one printed character through the active set. A pending
    /// single shift applies to this character only.
    ///
    /// The input arrives already decoded, so the classic byte-level GL/GR
    /// split maps onto code points: characters in the GR code positions
    /// (U+00A0..U+00FF) are looked up in the GR bank at their stripped
    /// column. With the default ASCII bank they pass through unchanged, so
    /// ordinary Latin-1 text is not disturbed until a program designates a
    /// translating set and locking-shifts it into GR.
    pub fn map(&mut self, ch: char) -> char {
        if let Some(slot) = self.single_shift.take() {
            return translate(self.slots[slot as usize], ch);
        }
        if ('\u{a0}'..='\u{ff}').contains(&ch) {
            let charset = self.slots[self.gr as usize];
            if charset == Charset::Ascii {
                return ch;
            }
            return translate(charset, char::from((ch as u32 as u8) & 0x7f));
        }
        translate(self.slots[self.gl as usize], ch)
    }

    pub fn reset(&mut self) {
        *self = CharsetState::default();
    }
}

fn translate(charset: Charset, ch: char) -> char {
    match charset {
        Charset::Ascii => ch,
        Charset::British => if ch == '#' { '£' } else { ch },
        Charset::DecSpecialGraphics => dec_special_graphics(ch),
    }
}

/// DEC special graphics, the line-drawing set designated with `ESC ( 0`.
fn dec_special_graphics(ch: char) -> char {
    match ch {
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        '_' => ' ',
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut charsets = CharsetState::new();
        assert_eq!('q', charsets.map('q'));
    }

    #[test]
    fn locking_shift_translates_until_shifted_back() {
        let mut charsets = CharsetState::new();
        charsets.configure(CharsetSlot::G1, Charset::DecSpecialGraphics);
        charsets.invoke(ActiveCharset::GL, CharsetSlot::G1, true);
        assert_eq!('─', charsets.map('q'));
        assert_eq!('│', charsets.map('x'));

        charsets.invoke(ActiveCharset::GL, CharsetSlot::G0, true);
        assert_eq!('q', charsets.map('q'));
    }

    #[test]
    fn single_shift_applies_once() {
        let mut charsets = CharsetState::new();
        charsets.configure(CharsetSlot::G2, Charset::DecSpecialGraphics);
        charsets.invoke(ActiveCharset::GL, CharsetSlot::G2, false);
        assert_eq!('┘', charsets.map('j'));
        assert_eq!('j', charsets.map('j'));
    }

    #[test]
    fn gr_locking_shift_translates_high_code_points() {
        let mut charsets = CharsetState::new();
        charsets.configure(CharsetSlot::G1, Charset::DecSpecialGraphics);
        charsets.invoke(ActiveCharset::GR, CharsetSlot::G1, true);
        // U+00F1 sits in the GR column of 'q'
        assert_eq!('─', charsets.map('\u{f1}'));
        // GL is unaffected
        assert_eq!('q', charsets.map('q'));

        charsets.invoke(ActiveCharset::GR, CharsetSlot::G2, true);
        assert_eq!('\u{f1}', charsets.map('\u{f1}'));
    }

    #[test]
    fn default_gr_bank_passes_latin1_through() {
        let mut charsets = CharsetState::new();
        assert_eq!('é', charsets.map('é'));
        assert_eq!('ÿ', charsets.map('ÿ'));
    }

    #[test]
    fn british_pound() {
        let mut charsets = CharsetState::new();
        charsets.configure(CharsetSlot::G0, Charset::British);
        assert_eq!('£', charsets.map('#'));
        assert_eq!('a', charsets.map('a'));
    }
}
