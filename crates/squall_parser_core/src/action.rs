use crate::{
    ActiveCharset, Charset, CharsetSlot, ColorOperationKind, ColorRequest, CursorStyle, DeviceAttributeReq, EraseDisplayMode, EraseLineMode,
    KittyKeyboardFlags, KittySetMode, Mode, ModifyKeyFormat, MouseShape, ProtectedMode, SgrAttribute, StatusDisplay, TabClear,
};

/// A parsed terminal action.
///
/// Printable text travels through [`crate::ActionSink::print`]; everything
/// else is one of these variants. Sinks must route every tag, including the
/// report-requesting family at the bottom, which state-only sinks accept and
/// drop so a stream stays consumable end-to-end.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<'a> {
    /// REP - repeat the preceding graphic character: `ESC[{n}b`
    PrintRepeat(u16),

    // C0 controls
    Bell,
    Backspace,
    /// HT / CHT - forward tab, possibly repeated: `ESC[{n}I`
    HorizontalTab(u16),
    LineFeed,
    CarriageReturn,
    /// ENQ - answerback request (answered elsewhere)
    Enquiry,

    // Cursor motion
    /// CUU - Cursor Up: `ESC[{n}A`
    CursorUp(u16),
    /// CUD - Cursor Down: `ESC[{n}B`
    CursorDown(u16),
    /// CUB - Cursor Back: `ESC[{n}D`
    CursorLeft(u16),
    /// CUF - Cursor Forward: `ESC[{n}C`
    CursorRight(u16),
    /// CUP - Cursor Position (1-based): `ESC[{row};{col}H`
    CursorPos { row: u16, col: u16 },
    /// CHA - Cursor Horizontal Absolute: `ESC[{n}G`
    CursorCol(u16),
    /// HPR - Character Position Relative: `ESC[{n}a`
    CursorColRelative(u16),
    /// VPA - Line Position Absolute: `ESC[{n}d`
    CursorRow(u16),
    /// VPR - Line Position Relative: `ESC[{n}e`
    CursorRowRelative(u16),
    /// IND - Index: `ESC D`
    Index,
    /// RI - Reverse Index: `ESC M`
    ReverseIndex,
    /// NEL - Next Line: `ESC E`
    NextLine,
    /// DECSCUSR - Set Cursor Style: `ESC[{n} q`
    SetCursorStyle(CursorStyle),
    /// DECSC - Save Cursor: `ESC 7`
    SaveCursor,
    /// DECRC - Restore Cursor: `ESC 8`
    RestoreCursor,

    // Erase
    /// ED / DECSED - Erase in Display: `ESC[{n}J` / `ESC[?{n}J`
    EraseDisplay { mode: EraseDisplayMode, selective: bool },
    /// EL / DECSEL - Erase in Line: `ESC[{n}K` / `ESC[?{n}K`
    EraseLine { mode: EraseLineMode, selective: bool },

    // Line and character editing
    /// DCH - Delete Character: `ESC[{n}P`
    DeleteChars(u16),
    /// ECH - Erase Character: `ESC[{n}X`
    EraseChars(u16),
    /// ICH - Insert Blank Character: `ESC[{n}@`
    InsertBlanks(u16),
    /// IL - Insert Line: `ESC[{n}L`
    InsertLines(u16),
    /// DL - Delete Line: `ESC[{n}M`
    DeleteLines(u16),
    /// SU - Scroll Up: `ESC[{n}S`
    ScrollUp(u16),
    /// SD - Scroll Down: `ESC[{n}T`
    ScrollDown(u16),

    // Tabs
    /// CBT - Cursor Backward Tabulation: `ESC[{n}Z`
    HorizontalTabBack(u16),
    /// TBC - Tabulation Clear: `ESC[{n}g`
    TabClear(TabClear),
    /// HTS - Horizontal Tab Set: `ESC H`
    TabSet,
    /// DECST8C - reset tab stops to every eight columns: `ESC[?5W`
    TabReset,

    // Modes
    SetMode(Mode),
    ResetMode(Mode),
    /// XTSAVE - push the current mode value: `ESC[?{n}s`
    SaveMode(Mode),
    /// XTRESTORE - pop a saved mode value: `ESC[?{n}r`
    RestoreMode(Mode),
    /// DECRQM - mode report request (answered elsewhere)
    RequestMode { ansi: bool, number: u16 },

    // Margins
    /// DECSTBM - Set Top and Bottom Margins: `ESC[{t};{b}r`
    TopAndBottomMargin { top: u16, bottom: u16 },
    /// DECSLRM - Set Left and Right Margins: `ESC[{l};{r}s`
    LeftAndRightMargin { left: u16, right: u16 },
    /// Bare `ESC[s`: DECSLRM over the full width when the left/right margin
    /// mode is enabled, SCOSC (save cursor) otherwise. The receiver owns the
    /// mode bit, so it resolves the split.
    LeftAndRightMarginAmbiguous,

    // Character sets
    /// SCS - designate a character set into a slot: `ESC ( B` etc.
    ConfigureCharset { slot: CharsetSlot, charset: Charset },
    /// Shift a slot into GL or GR, as a locking shift or for one character
    InvokeCharset { bank: ActiveCharset, slot: CharsetSlot, locking: bool },

    // Attributes
    /// SGR - Select Graphic Rendition: `ESC[{params}m`, one action per
    /// attribute
    SetAttribute(SgrAttribute),

    // Character protection
    /// SPA / EPA / DECSCA
    SetProtectedMode(ProtectedMode),

    // Mouse
    /// XTSHIFTESCAPE - whether shift-clicks are captured: `ESC[>{n}s`
    MouseShiftCapture(bool),
    /// OSC 22 - pointer shape
    SetMouseShape(MouseShape),

    // Kitty keyboard protocol
    /// `ESC[>{flags}u`
    KittyKeyboardPush(KittyKeyboardFlags),
    /// `ESC[<{n}u`
    KittyKeyboardPop(u16),
    /// `ESC[={flags};{mode}u`
    KittyKeyboardSet(KittySetMode, KittyKeyboardFlags),
    /// `ESC[?u` - flag query (answered elsewhere)
    KittyKeyboardQuery,

    /// XTMODKEYS - `ESC[>{p};{v}m`
    ModifyKeyFormat(ModifyKeyFormat),

    /// DECSASD - Select Active Status Display: `ESC[{n}$}`
    ActiveStatusDisplay(StatusDisplay),

    /// DECALN - fill the screen with 'E': `ESC # 8`
    Decaln,
    /// RIS / DECSTR - full reset
    FullReset,

    // Hyperlinks (OSC 8)
    StartHyperlink { uri: &'a [u8], id: Option<&'a [u8]> },
    EndHyperlink,

    // Shell integration marks (OSC 133)
    PromptStart { redraw: bool },
    PromptContinuation,
    PromptEnd,
    EndOfInput,
    EndOfCommand,

    /// OSC 4 / 10 / 11 / 12 / 104 / 105 - palette and dynamic color
    /// operations, already split into individual requests
    ColorOperation { kind: ColorOperationKind, requests: Vec<ColorRequest> },

    // Report-requesting and outward-facing actions. State-only sinks accept
    // these and drop them.
    /// DA1 / DA2 / DA3: `ESC[c`, `ESC[>c`, `ESC[=c`
    DeviceAttributes(DeviceAttributeReq),
    /// DSR - Device Status Report: `ESC[{n}n`
    DeviceStatusReport { number: u16 },
    /// XTWINOPS size / position reports: `ESC[{n}t` with n in {13,14,16,18,19}
    SizeReport(u16),
    /// XTWINOPS 21 - window title query
    WindowTitleQuery,
    /// XTWINOPS 22 - push title onto the title stack
    TitlePush,
    /// XTWINOPS 23 - pop title from the title stack
    TitlePop,
    /// XTVERSION - `ESC[>q`
    XtVersion,
    /// OSC 0 / 2
    SetWindowTitle(&'a [u8]),
    /// OSC 1
    SetIconName(&'a [u8]),
    /// OSC 7 - working directory report from the shell
    ReportPwd(&'a [u8]),
    /// OSC 9 (plain) / OSC 777;notify
    ShowDesktopNotification { title: &'a [u8], body: &'a [u8] },
    /// OSC 9;4 - ConEmu-style progress
    ProgressReport { state: u16, progress: Option<u16> },
    /// OSC 52 - clipboard read/write
    ClipboardContents { clipboard: u8, data: &'a [u8] },
    /// OSC 21 - kitty color protocol report
    KittyColorReport,

    // String payload boundaries. The payloads are delimited but not
    // interpreted; room is reserved for graphics protocols.
    /// DCS payload (`ESC P ... ST`)
    DeviceControl(&'a [u8]),
    /// APC payload (`ESC _ ... ST`)
    ApplicationProgram(&'a [u8]),
}
