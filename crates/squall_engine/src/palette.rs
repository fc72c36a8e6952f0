//! The 256-entry color palette and its override tracking.
//!
//! Entries changed through the OSC color operations are flagged in a dirty
//! mask so a palette reset only has to restore what actually changed.

use squall_parser_core::Rgb;

/// The standard 16 ANSI colors (xterm values).
pub const ANSI_DEFAULT_PALETTE: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00), // black
    Rgb::new(0xcd, 0x00, 0x00), // red
    Rgb::new(0x00, 0xcd, 0x00), // green
    Rgb::new(0xcd, 0xcd, 0x00), // yellow
    Rgb::new(0x00, 0x00, 0xee), // blue
    Rgb::new(0xcd, 0x00, 0xcd), // magenta
    Rgb::new(0x00, 0xcd, 0xcd), // cyan
    Rgb::new(0xe5, 0xe5, 0xe5), // white
    Rgb::new(0x7f, 0x7f, 0x7f), // bright black
    Rgb::new(0xff, 0x00, 0x00), // bright red
    Rgb::new(0x00, 0xff, 0x00), // bright green
    Rgb::new(0xff, 0xff, 0x00), // bright yellow
    Rgb::new(0x5c, 0x5c, 0xff), // bright blue
    Rgb::new(0xff, 0x00, 0xff), // bright magenta
    Rgb::new(0x00, 0xff, 0xff), // bright cyan
    Rgb::new(0xff, 0xff, 0xff), // bright white
];

/// Build the standard 256-color table: 16 ANSI colors, the 6x6x6 color
/// cube, then the 24-step grayscale ramp.
pub fn xterm_256_palette() -> [Rgb; 256] {
    let mut colors = [Rgb::default(); 256];
    colors[..16].copy_from_slice(&ANSI_DEFAULT_PALETTE);

    const CUBE: [u8; 6] = [0, 95, 135, 175, 215, 255];
    for r in 0..6 {
        for g in 0..6 {
            for b in 0..6 {
                colors[16 + 36 * r + 6 * g + b] = Rgb::new(CUBE[r], CUBE[g], CUBE[b]);
            }
        }
    }
    for i in 0..24 {
        let level = (8 + 10 * i) as u8;
        colors[232 + i] = Rgb::new(level, level, level);
    }
    colors
}

/// Bitset over the 256 palette indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorMask {
    bits: [u64; 4],
}

impl ColorMask {
    pub fn set(&mut self, index: u8) {
        self.bits[index as usize / 64] |= 1 << (index % 64);
    }

    pub fn clear(&mut self, index: u8) {
        self.bits[index as usize / 64] &= !(1 << (index % 64));
    }

    pub fn contains(&self, index: u8) -> bool {
        self.bits[index as usize / 64] & (1 << (index % 64)) != 0
    }

    pub fn clear_all(&mut self) {
        self.bits = [0; 4];
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&word| word == 0)
    }

    /// Iterate the set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.bits.iter().enumerate().flat_map(|(word_index, &word)| {
            (0..64).filter_map(move |bit| {
                if word & (1 << bit) != 0 {
                    Some((word_index * 64 + bit) as u8)
                } else {
                    None
                }
            })
        })
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    colors: [Rgb; 256],
    default_colors: [Rgb; 256],
    mask: ColorMask,
}

impl Default for Palette {
    fn default() -> Self {
        Self::with_default(xterm_256_palette())
    }
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct with a caller-supplied default table.
    pub fn with_default(default_colors: [Rgb; 256]) -> Self {
        Palette {
            colors: default_colors,
            default_colors,
            mask: ColorMask::default(),
        }
    }

    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    pub fn default_color(&self, index: u8) -> Rgb {
        self.default_colors[index as usize]
    }

    /// Whether `index` has been overridden since the last reset.
    pub fn is_overridden(&self, index: u8) -> bool {
        self.mask.contains(index)
    }

    /// Whether no entry is currently overridden.
    pub fn mask_is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn set_color(&mut self, index: u8, color: Rgb) {
        self.colors[index as usize] = color;
        self.mask.set(index);
    }

    /// Restore one entry to its default and drop its override flag.
    pub fn reset_color(&mut self, index: u8) {
        self.colors[index as usize] = self.default_colors[index as usize];
        self.mask.clear(index);
    }

    /// Restore every overridden entry, leaving the mask empty.
    pub fn reset_overridden(&mut self) {
        let mask = self.mask;
        for index in mask.iter() {
            self.colors[index as usize] = self.default_colors[index as usize];
        }
        self.mask.clear_all();
    }

    pub fn reset(&mut self) {
        self.colors = self.default_colors;
        self.mask.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn xterm_table_spot_checks() {
        let colors = xterm_256_palette();
        assert_eq!(Rgb::new(0, 0, 0), colors[0]);
        assert_eq!(Rgb::new(0xff, 0xff, 0xff), colors[15]);
        assert_eq!(Rgb::new(0, 0, 0), colors[16]);
        assert_eq!(Rgb::new(255, 255, 255), colors[231]);
        assert_eq!(Rgb::new(8, 8, 8), colors[232]);
        assert_eq!(Rgb::new(238, 238, 238), colors[255]);
        // cube arithmetic: 16 + 36*1 + 6*2 + 3
        assert_eq!(Rgb::new(95, 135, 175), colors[67]);
    }

    #[test]
    fn set_marks_and_reset_restores() {
        let mut palette = Palette::new();
        let default0 = palette.color(0);

        palette.set_color(0, Rgb::new(0xff, 0, 0));
        assert_eq!(Rgb::new(0xff, 0, 0), palette.color(0));
        assert!(palette.is_overridden(0));

        palette.reset_color(0);
        assert_eq!(default0, palette.color(0));
        assert!(!palette.is_overridden(0));
    }

    #[test]
    fn reset_overridden_only_touches_marked_entries() {
        let mut palette = Palette::new();
        palette.set_color(3, Rgb::new(1, 1, 1));
        palette.set_color(250, Rgb::new(2, 2, 2));

        palette.reset_overridden();
        assert!(!palette.is_overridden(3));
        assert!(!palette.is_overridden(250));
        assert_eq!(palette.default_color(3), palette.color(3));
        assert_eq!(palette.default_color(250), palette.color(250));
        assert!(palette.mask_is_empty());
    }

    #[test]
    fn mask_iterates_in_order() {
        let mut mask = ColorMask::default();
        mask.set(200);
        mask.set(0);
        mask.set(63);
        mask.set(64);
        assert_eq!(vec![0u8, 63, 64, 200], mask.iter().collect::<Vec<_>>());
    }
}
