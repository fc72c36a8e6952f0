//! Core action infrastructure: the typed terminal action taxonomy, the sink
//! traits consumers implement, and the VT/ANSI byte-stream parser.

use bitflags::bitflags;
use thiserror::Error;

mod action;
pub use action::Action;

mod parser;
pub use parser::AnsiParser;

mod sgr;
pub use sgr::{Intensity, SgrAttribute, SgrColor, UnderlineStyle};

/// Erase in Display mode for ED (`ESC[nJ` / `ESC[?nJ`)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseDisplayMode {
    /// Clear from cursor to end of display
    Below = 0,
    /// Clear from start of display to cursor
    Above = 1,
    /// Clear entire display
    Complete = 2,
    /// Clear the scrollback buffer only
    Scrollback = 3,
    /// Push the visible screen into scrollback, then clear it (kitty 22)
    ScrollComplete = 22,
}

impl EraseDisplayMode {
    fn from_u16(n: u16) -> Option<Self> {
        match n {
            0 => Some(Self::Below),
            1 => Some(Self::Above),
            2 => Some(Self::Complete),
            3 => Some(Self::Scrollback),
            22 => Some(Self::ScrollComplete),
            _ => None,
        }
    }
}

/// Erase in Line mode for EL (`ESC[nK` / `ESC[?nK`)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseLineMode {
    /// Clear from cursor to end of line
    Right = 0,
    /// Clear from start of line to cursor
    Left = 1,
    /// Clear entire line
    Complete = 2,
    /// Clear to end of line unless the cursor sits in the autowrap-pending
    /// position. Never produced by the byte parser; used by callers that
    /// construct actions directly.
    RightUnlessPendingWrap = 4,
}

impl EraseLineMode {
    fn from_u16(n: u16) -> Option<Self> {
        match n {
            0 => Some(Self::Right),
            1 => Some(Self::Left),
            2 => Some(Self::Complete),
            _ => None,
        }
    }
}

/// Tabulation clear scope for TBC (`ESC[ng`)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabClear {
    /// Clear the tab stop under the cursor
    Current = 0,
    /// Clear all tab stops
    All = 3,
}

/// Cursor shape as displayed by the renderer
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    #[default]
    Block,
    Underline,
    Bar,
}

/// Cursor style encoding for DECSCUSR (`ESC[n SP q`)
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    /// Terminal default: steady block
    #[default]
    Default = 0,
    BlinkingBlock = 1,
    SteadyBlock = 2,
    BlinkingUnderline = 3,
    SteadyUnderline = 4,
    BlinkingBar = 5,
    SteadyBar = 6,
}

impl CursorStyle {
    fn from_u16(n: u16) -> Option<Self> {
        match n {
            0 => Some(Self::Default),
            1 => Some(Self::BlinkingBlock),
            2 => Some(Self::SteadyBlock),
            3 => Some(Self::BlinkingUnderline),
            4 => Some(Self::SteadyUnderline),
            5 => Some(Self::BlinkingBar),
            6 => Some(Self::SteadyBar),
            _ => None,
        }
    }

    pub fn shape(self) -> CursorShape {
        match self {
            Self::Default | Self::BlinkingBlock | Self::SteadyBlock => CursorShape::Block,
            Self::BlinkingUnderline | Self::SteadyUnderline => CursorShape::Underline,
            Self::BlinkingBar | Self::SteadyBar => CursorShape::Bar,
        }
    }

    pub fn blinking(self) -> bool {
        matches!(self, Self::BlinkingBlock | Self::BlinkingUnderline | Self::BlinkingBar)
    }
}

/// Terminal modes settable through SM/RM (`ESC[nh` / `ESC[nl`) and the DEC
/// private variants (`ESC[?nh` / `ESC[?nl`).
///
/// The enum is dense (sequential discriminants) so state trackers can back it
/// with a plain bitset; the wire numbers live in `from_number`/`number`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    // ANSI modes
    /// IRM - typed characters push existing cells right instead of replacing
    Insert,
    /// LNM - linefeed also performs a carriage return
    Linefeed,

    // DEC private modes
    /// DECCKM - cursor keys send application sequences
    CursorKeys,
    /// DECCOLM - 132 column mode
    Column132,
    /// DECSCLM - smooth scroll
    SlowScroll,
    /// DECSCNM - reverse video for the whole screen
    ReverseColors,
    /// DECOM - cursor addressing relative to the scroll region
    Origin,
    /// DECAWM - autowrap at the right margin
    Wraparound,
    /// DECARM - keyboard autorepeat
    Autorepeat,
    /// X10 mouse click reporting
    MouseEventX10,
    /// ATT610 - cursor blinking
    CursorBlinking,
    /// DECTCEM - cursor visible
    CursorVisible,
    /// xterm: permit switching to 132 column mode via DECCOLM
    EnableMode3,
    /// Reverse wraparound for backspace at the left margin
    ReverseWraparound,
    /// DECNKM - application keypad
    KeypadKeys,
    /// DECLRMM - enable the left/right margin pair
    EnableLeftAndRightMargin,
    /// VT200 mouse press/release reporting
    MouseEventNormal,
    /// Mouse press/release/drag reporting
    MouseEventButton,
    /// All mouse motion reporting
    MouseEventAny,
    /// Focus in/out reporting
    FocusEvent,
    /// UTF-8 mouse coordinate encoding
    MouseFormatUtf8,
    /// SGR mouse coordinate encoding
    MouseFormatSgr,
    /// Scroll wheel sends cursor keys on the alternate screen
    MouseAlternateScroll,
    /// urxvt mouse coordinate encoding
    MouseFormatUrxvt,
    /// SGR mouse encoding with pixel coordinates
    MouseFormatSgrPixels,
    /// Legacy alternate screen (47)
    AltScreenLegacy,
    /// Alternate screen (1047)
    AltScreen,
    /// Save/restore cursor as a mode (1048)
    SaveCursor,
    /// Alternate screen with cursor save and clear (1049)
    AltScreenSaveCursorClearEnter,
    /// Bracketed paste
    BracketedPaste,
    /// Synchronized output batching
    SynchronizedOutput,
    /// Grapheme cluster wide-character handling
    GraphemeCluster,
    /// In-band window size reports
    InBandSizeReports,
}

impl Mode {
    pub const COUNT: usize = 33;

    /// Dense index for bitset-backed registries.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve a wire number to a mode. `ansi` selects the SM/RM namespace,
    /// otherwise the DEC private namespace is used.
    pub fn from_number(ansi: bool, n: u16) -> Option<Self> {
        if ansi {
            match n {
                4 => Some(Self::Insert),
                20 => Some(Self::Linefeed),
                _ => None,
            }
        } else {
            match n {
                1 => Some(Self::CursorKeys),
                3 => Some(Self::Column132),
                4 => Some(Self::SlowScroll),
                5 => Some(Self::ReverseColors),
                6 => Some(Self::Origin),
                7 => Some(Self::Wraparound),
                8 => Some(Self::Autorepeat),
                9 => Some(Self::MouseEventX10),
                12 => Some(Self::CursorBlinking),
                25 => Some(Self::CursorVisible),
                40 => Some(Self::EnableMode3),
                45 => Some(Self::ReverseWraparound),
                66 => Some(Self::KeypadKeys),
                69 => Some(Self::EnableLeftAndRightMargin),
                47 => Some(Self::AltScreenLegacy),
                1000 => Some(Self::MouseEventNormal),
                1002 => Some(Self::MouseEventButton),
                1003 => Some(Self::MouseEventAny),
                1004 => Some(Self::FocusEvent),
                1005 => Some(Self::MouseFormatUtf8),
                1006 => Some(Self::MouseFormatSgr),
                1007 => Some(Self::MouseAlternateScroll),
                1015 => Some(Self::MouseFormatUrxvt),
                1016 => Some(Self::MouseFormatSgrPixels),
                1047 => Some(Self::AltScreen),
                1048 => Some(Self::SaveCursor),
                1049 => Some(Self::AltScreenSaveCursorClearEnter),
                2004 => Some(Self::BracketedPaste),
                2026 => Some(Self::SynchronizedOutput),
                2027 => Some(Self::GraphemeCluster),
                2048 => Some(Self::InBandSizeReports),
                _ => None,
            }
        }
    }

    /// Wire encoding: `(ansi, number)`.
    pub fn number(self) -> (bool, u16) {
        match self {
            Self::Insert => (true, 4),
            Self::Linefeed => (true, 20),
            Self::CursorKeys => (false, 1),
            Self::Column132 => (false, 3),
            Self::SlowScroll => (false, 4),
            Self::ReverseColors => (false, 5),
            Self::Origin => (false, 6),
            Self::Wraparound => (false, 7),
            Self::Autorepeat => (false, 8),
            Self::MouseEventX10 => (false, 9),
            Self::CursorBlinking => (false, 12),
            Self::CursorVisible => (false, 25),
            Self::EnableMode3 => (false, 40),
            Self::ReverseWraparound => (false, 45),
            Self::KeypadKeys => (false, 66),
            Self::EnableLeftAndRightMargin => (false, 69),
            Self::AltScreenLegacy => (false, 47),
            Self::MouseEventNormal => (false, 1000),
            Self::MouseEventButton => (false, 1002),
            Self::MouseEventAny => (false, 1003),
            Self::FocusEvent => (false, 1004),
            Self::MouseFormatUtf8 => (false, 1005),
            Self::MouseFormatSgr => (false, 1006),
            Self::MouseAlternateScroll => (false, 1007),
            Self::MouseFormatUrxvt => (false, 1015),
            Self::MouseFormatSgrPixels => (false, 1016),
            Self::AltScreen => (false, 1047),
            Self::SaveCursor => (false, 1048),
            Self::AltScreenSaveCursorClearEnter => (false, 1049),
            Self::BracketedPaste => (false, 2004),
            Self::SynchronizedOutput => (false, 2026),
            Self::GraphemeCluster => (false, 2027),
            Self::InBandSizeReports => (false, 2048),
        }
    }
}

/// Keyboard modifier reporting format selected through XTMODKEYS
/// (`ESC[>p;vm`)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyKeyFormat {
    Legacy,
    CursorKeys,
    FunctionKeys,
    OtherKeysNone,
    OtherKeysNumericExcept,
    OtherKeysNumeric,
}

/// Target for DECSASD (`ESC[n$}`)
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StatusDisplay {
    #[default]
    Main = 0,
    StatusLine = 1,
}

impl StatusDisplay {
    fn from_u16(n: u16) -> Option<Self> {
        match n {
            0 => Some(Self::Main),
            1 => Some(Self::StatusLine),
            _ => None,
        }
    }
}

/// Pointer shape requested through OSC 22. Names follow the CSS cursor
/// keywords; unknown names are dropped by the parser.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MouseShape {
    #[default]
    Default,
    Text,
    Pointer,
    Help,
    Progress,
    Wait,
    Cell,
    Crosshair,
    VerticalText,
    Alias,
    Copy,
    Move,
    NotAllowed,
    Grab,
    Grabbing,
    ColResize,
    RowResize,
    EwResize,
    NsResize,
    NeswResize,
    NwseResize,
    ZoomIn,
    ZoomOut,
}

impl MouseShape {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"default" => Some(Self::Default),
            b"text" => Some(Self::Text),
            b"pointer" => Some(Self::Pointer),
            b"help" => Some(Self::Help),
            b"progress" => Some(Self::Progress),
            b"wait" => Some(Self::Wait),
            b"cell" => Some(Self::Cell),
            b"crosshair" => Some(Self::Crosshair),
            b"vertical-text" => Some(Self::VerticalText),
            b"alias" => Some(Self::Alias),
            b"copy" => Some(Self::Copy),
            b"move" => Some(Self::Move),
            b"not-allowed" => Some(Self::NotAllowed),
            b"grab" => Some(Self::Grab),
            b"grabbing" => Some(Self::Grabbing),
            b"col-resize" => Some(Self::ColResize),
            b"row-resize" => Some(Self::RowResize),
            b"ew-resize" => Some(Self::EwResize),
            b"ns-resize" => Some(Self::NsResize),
            b"nesw-resize" => Some(Self::NeswResize),
            b"nwse-resize" => Some(Self::NwseResize),
            b"zoom-in" => Some(Self::ZoomIn),
            b"zoom-out" => Some(Self::ZoomOut),
            _ => None,
        }
    }
}

/// Character protection flavor set by SPA/EPA (ISO) and DECSCA (DEC)
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedMode {
    #[default]
    Off,
    Iso,
    Dec,
}

/// One of the four designatable character set slots
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetSlot {
    G0 = 0,
    G1 = 1,
    G2 = 2,
    G3 = 3,
}

/// The two active charset banks a slot can be shifted into
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveCharset {
    GL,
    GR,
}

/// Designatable character sets
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Ascii,
    British,
    DecSpecialGraphics,
}

bitflags! {
    /// Flag set for the kitty keyboard protocol (`CSI > flags u` family)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KittyKeyboardFlags: u8 {
        const DISAMBIGUATE = 0b0000_0001;
        const REPORT_EVENTS = 0b0000_0010;
        const REPORT_ALTERNATES = 0b0000_0100;
        const REPORT_ALL = 0b0000_1000;
        const REPORT_ASSOCIATED = 0b0001_0000;
    }
}

/// How `CSI = flags ; mode u` combines the given flags into the top stack
/// entry
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KittySetMode {
    /// Replace the current flags
    Set = 1,
    /// Bitwise OR into the current flags
    Or = 2,
    /// Bitwise AND of the complement (clear the given flags)
    Not = 3,
}

impl KittySetMode {
    fn from_u16(n: u16) -> Option<Self> {
        match n {
            1 => Some(Self::Set),
            2 => Some(Self::Or),
            3 => Some(Self::Not),
            _ => None,
        }
    }
}

/// Device attribute request flavor (all answered elsewhere, never here)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAttributeReq {
    Primary,
    Secondary,
    Tertiary,
}

/// A 24-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse an X11 color specification as used by the OSC color operations:
    /// `rgb:R/G/B` with 1-4 hex digits per channel, or `#RRGGBB`.
    pub fn parse_x11(spec: &[u8]) -> Option<Self> {
        if let Some(hex) = spec.strip_prefix(b"#") {
            if hex.len() != 6 {
                return None;
            }
            let r = hex_byte(&hex[0..2])?;
            let g = hex_byte(&hex[2..4])?;
            let b = hex_byte(&hex[4..6])?;
            return Some(Rgb::new(r, g, b));
        }

        let rest = spec.strip_prefix(b"rgb:")?;
        let mut parts = rest.split(|&b| b == b'/');
        let r = scaled_channel(parts.next()?)?;
        let g = scaled_channel(parts.next()?)?;
        let b = scaled_channel(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Rgb::new(r, g, b))
    }
}

fn hex_byte(digits: &[u8]) -> Option<u8> {
    let hi = hex_digit(digits[0])?;
    let lo = hex_digit(digits[1])?;
    Some((hi << 4) | lo)
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// An X11 channel is 1-4 hex digits interpreted as a fraction of the full
/// scale, so `f` == `ff` == `fff` == `ffff` == 255.
fn scaled_channel(digits: &[u8]) -> Option<u8> {
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let mut value: u32 = 0;
    for &d in digits {
        value = (value << 4) | u32::from(hex_digit(d)?);
    }
    let max = (1u32 << (4 * digits.len() as u32)) - 1;
    Some(((value * 255 + max / 2) / max) as u8)
}

/// Target of an OSC color request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    /// One of the 256 palette entries
    Palette(u8),
    /// Dynamic foreground (OSC 10)
    Foreground,
    /// Dynamic background (OSC 11)
    Background,
    /// Dynamic cursor color (OSC 12)
    Cursor,
}

/// A single request inside an OSC color operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRequest {
    Set { target: ColorTarget, color: Rgb },
    Reset(ColorTarget),
    /// Restore every overridden palette entry (bare OSC 104)
    ResetPalette,
    /// Restore the special color set (OSC 105)
    ResetSpecial,
    Query(ColorTarget),
}

/// Which OSC introduced a color operation. State sinks treat all kinds
/// alike; responders need the distinction to phrase replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOperationKind {
    Palette,
    ResetPalette,
    DynamicForeground,
    DynamicBackground,
    DynamicCursor,
    Special,
}

/// Parser error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Invalid parameter value for a recognized sequence
    #[error("invalid parameter {value} for {command}")]
    InvalidParameter { command: &'static str, value: u16 },
    /// Unrecognized or malformed escape sequence
    #[error("malformed sequence: {description}")]
    MalformedSequence { description: &'static str },
}

/// Consumer of parsed terminal actions.
pub trait ActionSink {
    /// A run of printable bytes (UTF-8 in the host encoding).
    fn print(&mut self, text: &[u8]);

    fn emit(&mut self, action: Action<'_>);

    /// Report a parsing error. Default implementation does nothing.
    fn report_error(&mut self, _error: ParseError) {}
}

pub trait ActionParser {
    fn parse(&mut self, input: &[u8], sink: &mut dyn ActionSink);
    fn flush(&mut self, _sink: &mut dyn ActionSink) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_numbers_round_trip() {
        let modes = [
            Mode::Insert,
            Mode::Linefeed,
            Mode::Origin,
            Mode::Wraparound,
            Mode::EnableLeftAndRightMargin,
            Mode::MouseEventAny,
            Mode::MouseFormatSgrPixels,
            Mode::AltScreenSaveCursorClearEnter,
            Mode::InBandSizeReports,
        ];
        for mode in modes {
            let (ansi, n) = mode.number();
            assert_eq!(Some(mode), Mode::from_number(ansi, n));
        }
    }

    #[test]
    fn mode_indices_are_dense() {
        assert!(Mode::InBandSizeReports.index() < Mode::COUNT);
        assert_eq!(Mode::Insert.index(), 0);
    }

    #[test]
    fn x11_color_forms() {
        assert_eq!(Some(Rgb::new(0xff, 0, 0)), Rgb::parse_x11(b"rgb:ff/00/00"));
        assert_eq!(Some(Rgb::new(0xff, 0xff, 0xff)), Rgb::parse_x11(b"rgb:f/f/f"));
        assert_eq!(Some(Rgb::new(0x12, 0x34, 0x56)), Rgb::parse_x11(b"#123456"));
        assert_eq!(Some(Rgb::new(0xab, 0xcd, 0xef)), Rgb::parse_x11(b"rgb:abab/cdcd/efef"));
        assert_eq!(None, Rgb::parse_x11(b"rgb:gg/00/00"));
        assert_eq!(None, Rgb::parse_x11(b"#12345"));
    }

    #[test]
    fn cursor_style_mapping() {
        assert_eq!(CursorShape::Block, CursorStyle::Default.shape());
        assert!(!CursorStyle::Default.blinking());
        assert!(CursorStyle::BlinkingUnderline.blinking());
        assert_eq!(CursorShape::Bar, CursorStyle::SteadyBar.shape());
    }
}
