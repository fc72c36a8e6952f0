//! VT/ANSI escape sequence parser
//!
//! Turns a byte stream into [`Action`] values. Supports CSI with prefix and
//! intermediate bytes, ESC sequences, OSC, and delimited DCS/APC payloads.
//! Incomplete sequences carry over between `parse` calls.

use crate::sgr::{self, Param};
use crate::{
    Action, ActionParser, ActionSink, ActiveCharset, Charset, CharsetSlot, ColorOperationKind, ColorRequest, ColorTarget, CursorStyle, DeviceAttributeReq,
    EraseDisplayMode, EraseLineMode, KittyKeyboardFlags, KittySetMode, Mode, ModifyKeyFormat, MouseShape, ProtectedMode, Rgb, StatusDisplay, TabClear,
    ParseError,
};

#[derive(Default)]
pub struct AnsiParser {
    state: ParserState,
    params: Vec<Param>,
    parse_buffer: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum ParserState {
    #[default]
    Ground,
    Escape,
    /// ESC ( ) * + - designate a charset into the captured slot
    EscCharset(CharsetSlot),
    /// ESC # - line size / alignment commands
    EscHash,
    CsiEntry,
    CsiParam,
    // CSI with prefix or intermediate bytes
    CsiDecPrivate,       // CSI ? ...
    CsiDecPrivateDollar, // CSI ? ... $
    CsiGreater,          // CSI > ...
    CsiLess,             // CSI < ...
    CsiEquals,           // CSI = ...
    CsiSpace,            // CSI ... SP
    CsiQuote,            // CSI ... "
    CsiDollar,           // CSI ... $
    CsiExclaim,          // CSI ! ...
    /// Unsupported intermediate: consume to the final byte, then report
    CsiIgnore,
    // String states
    OscString,
    OscEscape,
    DcsString,
    DcsEscape,
    ApcString,
    ApcEscape,
}

impl AnsiParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.params.clear();
        self.state = ParserState::Ground;
    }

    fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).map_or(default, |&(v, _)| v)
    }

    /// Count parameter: absent and 0 both mean 1.
    fn count_param(&self, index: usize) -> u16 {
        self.param(index, 1).max(1)
    }

    fn push_digit(&mut self, byte: u8) {
        let digit = u16::from(byte - b'0');
        match self.params.last_mut() {
            Some((value, _)) => *value = value.wrapping_mul(10).wrapping_add(digit),
            None => self.params.push((digit, false)),
        }
    }

    fn next_param(&mut self, colon: bool) {
        // An empty leading parameter still counts.
        if self.params.is_empty() {
            self.params.push((0, false));
        }
        self.params.push((0, colon));
    }
}

impl ActionParser for AnsiParser {
    fn parse(&mut self, input: &[u8], sink: &mut dyn ActionSink) {
        let mut i = 0;
        let mut printable_start = 0;

        while i < input.len() {
            let byte = input[i];

            match self.state {
                ParserState::Ground => {
                    if byte >= 0x20 && byte != 0x7F {
                        // Printable run; skip ahead to the next byte that
                        // needs handling.
                        i += 1;
                        while i < input.len() && input[i] >= 0x20 && input[i] != 0x7F {
                            i += 1;
                        }
                        continue;
                    }
                    if i > printable_start {
                        sink.print(&input[printable_start..i]);
                    }
                    match byte {
                        0x1B => self.state = ParserState::Escape,
                        0x05 => sink.emit(Action::Enquiry),
                        0x07 => sink.emit(Action::Bell),
                        0x08 => sink.emit(Action::Backspace),
                        0x09 => sink.emit(Action::HorizontalTab(1)),
                        // VT and FF behave as LF
                        0x0A | 0x0B | 0x0C => sink.emit(Action::LineFeed),
                        0x0D => sink.emit(Action::CarriageReturn),
                        // SO / SI - locking shifts
                        0x0E => sink.emit(Action::InvokeCharset {
                            bank: ActiveCharset::GL,
                            slot: CharsetSlot::G1,
                            locking: true,
                        }),
                        0x0F => sink.emit(Action::InvokeCharset {
                            bank: ActiveCharset::GL,
                            slot: CharsetSlot::G0,
                            locking: true,
                        }),
                        // Remaining C0 bytes and DEL are dropped
                        _ => {}
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::Escape => {
                    match byte {
                        b'[' => {
                            self.params.clear();
                            self.state = ParserState::CsiEntry;
                        }
                        b']' => {
                            self.parse_buffer.clear();
                            self.state = ParserState::OscString;
                        }
                        b'P' => {
                            self.parse_buffer.clear();
                            self.state = ParserState::DcsString;
                        }
                        b'_' => {
                            self.parse_buffer.clear();
                            self.state = ParserState::ApcString;
                        }
                        b'(' => self.state = ParserState::EscCharset(CharsetSlot::G0),
                        b')' => self.state = ParserState::EscCharset(CharsetSlot::G1),
                        b'*' => self.state = ParserState::EscCharset(CharsetSlot::G2),
                        b'+' => self.state = ParserState::EscCharset(CharsetSlot::G3),
                        b'#' => self.state = ParserState::EscHash,
                        b'7' => {
                            sink.emit(Action::SaveCursor);
                            self.reset();
                        }
                        b'8' => {
                            sink.emit(Action::RestoreCursor);
                            self.reset();
                        }
                        b'D' => {
                            sink.emit(Action::Index);
                            self.reset();
                        }
                        b'E' => {
                            sink.emit(Action::NextLine);
                            self.reset();
                        }
                        b'H' => {
                            sink.emit(Action::TabSet);
                            self.reset();
                        }
                        b'M' => {
                            sink.emit(Action::ReverseIndex);
                            self.reset();
                        }
                        b'c' => {
                            sink.emit(Action::FullReset);
                            self.reset();
                        }
                        b'V' => {
                            sink.emit(Action::SetProtectedMode(ProtectedMode::Iso));
                            self.reset();
                        }
                        b'W' => {
                            sink.emit(Action::SetProtectedMode(ProtectedMode::Off));
                            self.reset();
                        }
                        // Locking and single shifts
                        b'n' => {
                            sink.emit(Action::InvokeCharset {
                                bank: ActiveCharset::GL,
                                slot: CharsetSlot::G2,
                                locking: true,
                            });
                            self.reset();
                        }
                        b'o' => {
                            sink.emit(Action::InvokeCharset {
                                bank: ActiveCharset::GL,
                                slot: CharsetSlot::G3,
                                locking: true,
                            });
                            self.reset();
                        }
                        b'N' => {
                            sink.emit(Action::InvokeCharset {
                                bank: ActiveCharset::GL,
                                slot: CharsetSlot::G2,
                                locking: false,
                            });
                            self.reset();
                        }
                        b'O' => {
                            sink.emit(Action::InvokeCharset {
                                bank: ActiveCharset::GL,
                                slot: CharsetSlot::G3,
                                locking: false,
                            });
                            self.reset();
                        }
                        b'~' => {
                            sink.emit(Action::InvokeCharset {
                                bank: ActiveCharset::GR,
                                slot: CharsetSlot::G1,
                                locking: true,
                            });
                            self.reset();
                        }
                        b'}' => {
                            sink.emit(Action::InvokeCharset {
                                bank: ActiveCharset::GR,
                                slot: CharsetSlot::G2,
                                locking: true,
                            });
                            self.reset();
                        }
                        b'|' => {
                            sink.emit(Action::InvokeCharset {
                                bank: ActiveCharset::GR,
                                slot: CharsetSlot::G3,
                                locking: true,
                            });
                            self.reset();
                        }
                        // DECKPAM / DECKPNM and ST are dropped
                        b'=' | b'>' | b'\\' => self.reset(),
                        _ => {
                            sink.report_error(ParseError::MalformedSequence {
                                description: "unknown escape sequence",
                            });
                            self.reset();
                        }
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::EscCharset(slot) => {
                    let charset = match byte {
                        b'B' => Some(Charset::Ascii),
                        b'A' => Some(Charset::British),
                        b'0' => Some(Charset::DecSpecialGraphics),
                        _ => None,
                    };
                    match charset {
                        Some(charset) => sink.emit(Action::ConfigureCharset { slot, charset }),
                        None => sink.report_error(ParseError::MalformedSequence {
                            description: "unsupported character set designation",
                        }),
                    }
                    self.reset();
                    i += 1;
                    printable_start = i;
                }

                ParserState::EscHash => {
                    match byte {
                        b'8' => sink.emit(Action::Decaln),
                        _ => sink.report_error(ParseError::MalformedSequence {
                            description: "unsupported ESC # sequence",
                        }),
                    }
                    self.reset();
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiEntry => {
                    match byte {
                        b'0'..=b'9' => {
                            self.params.push((u16::from(byte - b'0'), false));
                            self.state = ParserState::CsiParam;
                        }
                        b';' => self.next_param(false),
                        b':' => self.next_param(true),
                        b'?' => self.state = ParserState::CsiDecPrivate,
                        b'>' => self.state = ParserState::CsiGreater,
                        b'<' => self.state = ParserState::CsiLess,
                        b'=' => self.state = ParserState::CsiEquals,
                        b'!' => self.state = ParserState::CsiExclaim,
                        b' ' => self.state = ParserState::CsiSpace,
                        b'"' => self.state = ParserState::CsiQuote,
                        b'$' => self.state = ParserState::CsiDollar,
                        b'@'..=b'~' => {
                            self.handle_csi_final(byte, sink);
                            self.reset();
                        }
                        _ => self.reset(),
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiParam => {
                    match byte {
                        b'0'..=b'9' => self.push_digit(byte),
                        b';' => self.next_param(false),
                        b':' => self.next_param(true),
                        b' ' => self.state = ParserState::CsiSpace,
                        b'"' => self.state = ParserState::CsiQuote,
                        b'$' => self.state = ParserState::CsiDollar,
                        b'@'..=b'~' => {
                            self.handle_csi_final(byte, sink);
                            self.reset();
                        }
                        // Unsupported intermediate byte
                        0x20..=0x2F => self.state = ParserState::CsiIgnore,
                        _ => self.reset(),
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiDecPrivate => {
                    match byte {
                        b'0'..=b'9' => self.push_digit(byte),
                        b';' => self.next_param(false),
                        b'$' => self.state = ParserState::CsiDecPrivateDollar,
                        b'@'..=b'~' => {
                            self.handle_dec_private_final(byte, sink);
                            self.reset();
                        }
                        _ => self.reset(),
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiDecPrivateDollar => {
                    match byte {
                        b'p' => sink.emit(Action::RequestMode {
                            ansi: false,
                            number: self.param(0, 0),
                        }),
                        _ => sink.report_error(ParseError::MalformedSequence {
                            description: "unsupported CSI ? $ sequence",
                        }),
                    }
                    self.reset();
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiGreater => {
                    match byte {
                        b'0'..=b'9' => self.push_digit(byte),
                        b';' => self.next_param(false),
                        b'u' => {
                            let flags = KittyKeyboardFlags::from_bits_truncate(self.param(0, 0) as u8);
                            sink.emit(Action::KittyKeyboardPush(flags));
                            self.reset();
                        }
                        b'm' => {
                            self.handle_modify_keys(sink);
                            self.reset();
                        }
                        b'q' => {
                            sink.emit(Action::XtVersion);
                            self.reset();
                        }
                        b'c' => {
                            sink.emit(Action::DeviceAttributes(DeviceAttributeReq::Secondary));
                            self.reset();
                        }
                        b's' => {
                            sink.emit(Action::MouseShiftCapture(self.param(0, 0) == 1));
                            self.reset();
                        }
                        _ => {
                            sink.report_error(ParseError::MalformedSequence {
                                description: "unsupported CSI > sequence",
                            });
                            self.reset();
                        }
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiLess => {
                    match byte {
                        b'0'..=b'9' => self.push_digit(byte),
                        b';' => self.next_param(false),
                        b'u' => {
                            sink.emit(Action::KittyKeyboardPop(self.count_param(0)));
                            self.reset();
                        }
                        _ => {
                            sink.report_error(ParseError::MalformedSequence {
                                description: "unsupported CSI < sequence",
                            });
                            self.reset();
                        }
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiEquals => {
                    match byte {
                        b'0'..=b'9' => self.push_digit(byte),
                        b';' => self.next_param(false),
                        b'u' => {
                            let flags = KittyKeyboardFlags::from_bits_truncate(self.param(0, 0) as u8);
                            let mode = KittySetMode::from_u16(self.param(1, 1)).unwrap_or(KittySetMode::Set);
                            sink.emit(Action::KittyKeyboardSet(mode, flags));
                            self.reset();
                        }
                        b'c' => {
                            sink.emit(Action::DeviceAttributes(DeviceAttributeReq::Tertiary));
                            self.reset();
                        }
                        _ => {
                            sink.report_error(ParseError::MalformedSequence {
                                description: "unsupported CSI = sequence",
                            });
                            self.reset();
                        }
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiSpace => {
                    match byte {
                        b'0'..=b'9' => {
                            // Space is a trailing intermediate; digits after
                            // it are malformed.
                            self.state = ParserState::CsiIgnore;
                        }
                        b'q' => {
                            let style = self.param(0, 0);
                            match CursorStyle::from_u16(style) {
                                Some(style) => sink.emit(Action::SetCursorStyle(style)),
                                None => sink.report_error(ParseError::InvalidParameter {
                                    command: "SetCursorStyle",
                                    value: style,
                                }),
                            }
                            self.reset();
                        }
                        _ => {
                            sink.report_error(ParseError::MalformedSequence {
                                description: "unsupported CSI SP sequence",
                            });
                            self.reset();
                        }
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiQuote => {
                    match byte {
                        b'q' => {
                            // DECSCA
                            let value = self.param(0, 0);
                            match value {
                                1 => sink.emit(Action::SetProtectedMode(ProtectedMode::Dec)),
                                0 | 2 => sink.emit(Action::SetProtectedMode(ProtectedMode::Off)),
                                _ => sink.report_error(ParseError::InvalidParameter {
                                    command: "SetProtectedMode",
                                    value,
                                }),
                            }
                        }
                        _ => sink.report_error(ParseError::MalformedSequence {
                            description: "unsupported CSI \" sequence",
                        }),
                    }
                    self.reset();
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiDollar => {
                    match byte {
                        b'}' => {
                            let value = self.param(0, 0);
                            match StatusDisplay::from_u16(value) {
                                Some(display) => sink.emit(Action::ActiveStatusDisplay(display)),
                                None => sink.report_error(ParseError::InvalidParameter {
                                    command: "ActiveStatusDisplay",
                                    value,
                                }),
                            }
                        }
                        b'p' => sink.emit(Action::RequestMode {
                            ansi: true,
                            number: self.param(0, 0),
                        }),
                        _ => sink.report_error(ParseError::MalformedSequence {
                            description: "unsupported CSI $ sequence",
                        }),
                    }
                    self.reset();
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiExclaim => {
                    match byte {
                        // DECSTR folds into the full reset pathway
                        b'p' => sink.emit(Action::FullReset),
                        _ => sink.report_error(ParseError::MalformedSequence {
                            description: "unsupported CSI ! sequence",
                        }),
                    }
                    self.reset();
                    i += 1;
                    printable_start = i;
                }

                ParserState::CsiIgnore => {
                    if let b'@'..=b'~' = byte {
                        sink.report_error(ParseError::MalformedSequence {
                            description: "unsupported control sequence",
                        });
                        self.reset();
                        i += 1;
                        printable_start = i;
                    } else {
                        i += 1;
                    }
                }

                ParserState::OscString => match memchr::memchr2(0x07, 0x1B, &input[i..]) {
                    Some(offset) => {
                        self.parse_buffer.extend_from_slice(&input[i..i + offset]);
                        i += offset;
                        if input[i] == 0x07 {
                            self.emit_osc_sequence(sink);
                            self.reset();
                            i += 1;
                            printable_start = i;
                        } else {
                            self.state = ParserState::OscEscape;
                            i += 1;
                        }
                    }
                    None => {
                        self.parse_buffer.extend_from_slice(&input[i..]);
                        i = input.len();
                    }
                },

                ParserState::OscEscape => {
                    if byte == b'\\' {
                        self.emit_osc_sequence(sink);
                        self.reset();
                    } else {
                        // ESC was part of the OSC payload
                        self.parse_buffer.push(0x1B);
                        self.parse_buffer.push(byte);
                        self.state = ParserState::OscString;
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::DcsString => match memchr::memchr(0x1B, &input[i..]) {
                    Some(offset) => {
                        self.parse_buffer.extend_from_slice(&input[i..i + offset]);
                        i += offset + 1;
                        self.state = ParserState::DcsEscape;
                    }
                    None => {
                        self.parse_buffer.extend_from_slice(&input[i..]);
                        i = input.len();
                    }
                },

                ParserState::DcsEscape => {
                    if byte == b'\\' {
                        sink.emit(Action::DeviceControl(&self.parse_buffer));
                        self.reset();
                    } else {
                        self.parse_buffer.push(0x1B);
                        self.parse_buffer.push(byte);
                        self.state = ParserState::DcsString;
                    }
                    i += 1;
                    printable_start = i;
                }

                ParserState::ApcString => match memchr::memchr(0x1B, &input[i..]) {
                    Some(offset) => {
                        self.parse_buffer.extend_from_slice(&input[i..i + offset]);
                        i += offset + 1;
                        self.state = ParserState::ApcEscape;
                    }
                    None => {
                        self.parse_buffer.extend_from_slice(&input[i..]);
                        i = input.len();
                    }
                },

                ParserState::ApcEscape => {
                    if byte == b'\\' {
                        sink.emit(Action::ApplicationProgram(&self.parse_buffer));
                        self.reset();
                    } else {
                        self.parse_buffer.push(0x1B);
                        self.parse_buffer.push(byte);
                        self.state = ParserState::ApcString;
                    }
                    i += 1;
                    printable_start = i;
                }
            }
        }

        // Emit any remaining printable bytes
        if self.state == ParserState::Ground && i > printable_start {
            sink.print(&input[printable_start..i]);
        }
    }

    fn flush(&mut self, _sink: &mut dyn ActionSink) {
        self.reset();
    }
}

impl AnsiParser {
    fn handle_csi_final(&mut self, final_byte: u8, sink: &mut dyn ActionSink) {
        match final_byte {
            b'A' => sink.emit(Action::CursorUp(self.count_param(0))),
            b'B' => sink.emit(Action::CursorDown(self.count_param(0))),
            b'C' => sink.emit(Action::CursorRight(self.count_param(0))),
            b'D' => sink.emit(Action::CursorLeft(self.count_param(0))),
            b'E' => {
                // CNL - down and to the first column
                sink.emit(Action::CursorDown(self.count_param(0)));
                sink.emit(Action::CarriageReturn);
            }
            b'F' => {
                // CPL - up and to the first column
                sink.emit(Action::CursorUp(self.count_param(0)));
                sink.emit(Action::CarriageReturn);
            }
            b'G' | b'`' => sink.emit(Action::CursorCol(self.count_param(0))),
            b'H' | b'f' => sink.emit(Action::CursorPos {
                row: self.count_param(0),
                col: self.count_param(1),
            }),
            b'a' => sink.emit(Action::CursorColRelative(self.count_param(0))),
            b'd' => sink.emit(Action::CursorRow(self.count_param(0))),
            b'e' => sink.emit(Action::CursorRowRelative(self.count_param(0))),
            b'J' => {
                let n = self.param(0, 0);
                match EraseDisplayMode::from_u16(n) {
                    Some(mode) => sink.emit(Action::EraseDisplay { mode, selective: false }),
                    None => sink.report_error(ParseError::InvalidParameter {
                        command: "EraseDisplay",
                        value: n,
                    }),
                }
            }
            b'K' => {
                let n = self.param(0, 0);
                match EraseLineMode::from_u16(n) {
                    Some(mode) => sink.emit(Action::EraseLine { mode, selective: false }),
                    None => sink.report_error(ParseError::InvalidParameter {
                        command: "EraseLine",
                        value: n,
                    }),
                }
            }
            b'@' => sink.emit(Action::InsertBlanks(self.count_param(0))),
            b'P' => sink.emit(Action::DeleteChars(self.count_param(0))),
            b'X' => sink.emit(Action::EraseChars(self.count_param(0))),
            b'L' => sink.emit(Action::InsertLines(self.count_param(0))),
            b'M' => sink.emit(Action::DeleteLines(self.count_param(0))),
            b'S' => sink.emit(Action::ScrollUp(self.count_param(0))),
            b'T' => sink.emit(Action::ScrollDown(self.count_param(0))),
            b'b' => sink.emit(Action::PrintRepeat(self.count_param(0))),
            b'I' => sink.emit(Action::HorizontalTab(self.count_param(0))),
            b'Z' => sink.emit(Action::HorizontalTabBack(self.count_param(0))),
            b'g' => {
                let n = self.param(0, 0);
                match n {
                    0 => sink.emit(Action::TabClear(TabClear::Current)),
                    3 => sink.emit(Action::TabClear(TabClear::All)),
                    _ => sink.report_error(ParseError::InvalidParameter { command: "TabClear", value: n }),
                }
            }
            b'h' | b'l' => {
                let enable = final_byte == b'h';
                for index in 0..self.params.len().max(1) {
                    let number = self.param(index, 0);
                    match Mode::from_number(true, number) {
                        Some(mode) if enable => sink.emit(Action::SetMode(mode)),
                        Some(mode) => sink.emit(Action::ResetMode(mode)),
                        None => log::debug!("ignoring unknown ANSI mode {number}"),
                    }
                }
            }
            b'm' => sgr::parse_sgr(&self.params, &mut |attr| sink.emit(Action::SetAttribute(attr))),
            b'n' => sink.emit(Action::DeviceStatusReport { number: self.param(0, 0) }),
            b'c' => sink.emit(Action::DeviceAttributes(DeviceAttributeReq::Primary)),
            b'r' => sink.emit(Action::TopAndBottomMargin {
                top: self.param(0, 0),
                bottom: self.param(1, 0),
            }),
            b's' => {
                if self.params.is_empty() {
                    sink.emit(Action::LeftAndRightMarginAmbiguous);
                } else {
                    sink.emit(Action::LeftAndRightMargin {
                        left: self.param(0, 0),
                        right: self.param(1, 0),
                    });
                }
            }
            b't' => {
                let op = self.param(0, 0);
                match op {
                    13 | 14 | 16 | 18 | 19 => sink.emit(Action::SizeReport(op)),
                    21 => sink.emit(Action::WindowTitleQuery),
                    22 => sink.emit(Action::TitlePush),
                    23 => sink.emit(Action::TitlePop),
                    _ => log::debug!("ignoring window operation {op}"),
                }
            }
            b'u' => sink.emit(Action::RestoreCursor),
            // DECLL - keyboard LEDs
            b'q' => log::debug!("ignoring DECLL"),
            _ => sink.report_error(ParseError::MalformedSequence {
                description: "unknown control sequence",
            }),
        }
    }

    fn handle_dec_private_final(&mut self, final_byte: u8, sink: &mut dyn ActionSink) {
        match final_byte {
            b'h' | b'l' => {
                let enable = final_byte == b'h';
                for index in 0..self.params.len().max(1) {
                    let number = self.param(index, 0);
                    match Mode::from_number(false, number) {
                        Some(mode) if enable => sink.emit(Action::SetMode(mode)),
                        Some(mode) => sink.emit(Action::ResetMode(mode)),
                        None => log::debug!("ignoring unknown private mode {number}"),
                    }
                }
            }
            b's' => {
                for index in 0..self.params.len().max(1) {
                    let number = self.param(index, 0);
                    match Mode::from_number(false, number) {
                        Some(mode) => sink.emit(Action::SaveMode(mode)),
                        None => log::debug!("ignoring save of unknown private mode {number}"),
                    }
                }
            }
            b'r' => {
                for index in 0..self.params.len().max(1) {
                    let number = self.param(index, 0);
                    match Mode::from_number(false, number) {
                        Some(mode) => sink.emit(Action::RestoreMode(mode)),
                        None => log::debug!("ignoring restore of unknown private mode {number}"),
                    }
                }
            }
            b'J' => {
                let n = self.param(0, 0);
                match EraseDisplayMode::from_u16(n) {
                    Some(mode) => sink.emit(Action::EraseDisplay { mode, selective: true }),
                    None => sink.report_error(ParseError::InvalidParameter {
                        command: "EraseDisplay",
                        value: n,
                    }),
                }
            }
            b'K' => {
                let n = self.param(0, 0);
                match EraseLineMode::from_u16(n) {
                    Some(mode) => sink.emit(Action::EraseLine { mode, selective: true }),
                    None => sink.report_error(ParseError::InvalidParameter {
                        command: "EraseLine",
                        value: n,
                    }),
                }
            }
            b'n' => sink.emit(Action::DeviceStatusReport { number: self.param(0, 0) }),
            b'u' => sink.emit(Action::KittyKeyboardQuery),
            b'W' => {
                let n = self.param(0, 0);
                if n == 5 {
                    sink.emit(Action::TabReset);
                } else {
                    sink.report_error(ParseError::InvalidParameter { command: "TabReset", value: n });
                }
            }
            _ => sink.report_error(ParseError::MalformedSequence {
                description: "unknown DEC private sequence",
            }),
        }
    }

    fn handle_modify_keys(&mut self, sink: &mut dyn ActionSink) {
        let resource = self.param(0, 0);
        let value = self.param(1, 0);
        let format = match (resource, value) {
            (0, _) => Some(ModifyKeyFormat::Legacy),
            (1, _) => Some(ModifyKeyFormat::CursorKeys),
            (2, _) => Some(ModifyKeyFormat::FunctionKeys),
            (4, 0) => Some(ModifyKeyFormat::OtherKeysNone),
            (4, 1) => Some(ModifyKeyFormat::OtherKeysNumericExcept),
            (4, 2) => Some(ModifyKeyFormat::OtherKeysNumeric),
            _ => None,
        };
        match format {
            Some(format) => sink.emit(Action::ModifyKeyFormat(format)),
            None => log::debug!("ignoring key modifier resource {resource}={value}"),
        }
    }

    fn emit_osc_sequence(&mut self, sink: &mut dyn ActionSink) {
        if self.parse_buffer.is_empty() {
            return;
        }

        let (number, payload) = match self.parse_buffer.iter().position(|&b| b == b';') {
            Some(pos) => (&self.parse_buffer[..pos], Some(&self.parse_buffer[pos + 1..])),
            None => (&self.parse_buffer[..], None),
        };
        let Some(number) = parse_number(number) else {
            sink.report_error(ParseError::MalformedSequence {
                description: "malformed operating system command",
            });
            return;
        };

        match number {
            0 | 2 => sink.emit(Action::SetWindowTitle(payload.unwrap_or_default())),
            1 => sink.emit(Action::SetIconName(payload.unwrap_or_default())),
            4 => {
                let mut requests = Vec::new();
                let mut parts = payload.unwrap_or_default().split(|&b| b == b';');
                while let Some(index) = parts.next() {
                    let Some(spec) = parts.next() else { break };
                    let Some(index) = parse_number(index).filter(|&i| i < 256) else {
                        sink.report_error(ParseError::MalformedSequence {
                            description: "palette index out of range",
                        });
                        continue;
                    };
                    let target = ColorTarget::Palette(index as u8);
                    if spec == b"?" {
                        requests.push(ColorRequest::Query(target));
                    } else if let Some(color) = Rgb::parse_x11(spec) {
                        requests.push(ColorRequest::Set { target, color });
                    } else {
                        sink.report_error(ParseError::MalformedSequence {
                            description: "unparseable color specification",
                        });
                    }
                }
                sink.emit(Action::ColorOperation {
                    kind: ColorOperationKind::Palette,
                    requests,
                });
            }
            104 => {
                let mut requests = Vec::new();
                match payload {
                    None => requests.push(ColorRequest::ResetPalette),
                    Some(payload) if payload.is_empty() => requests.push(ColorRequest::ResetPalette),
                    Some(payload) => {
                        for index in payload.split(|&b| b == b';') {
                            match parse_number(index).filter(|&i| i < 256) {
                                Some(index) => requests.push(ColorRequest::Reset(ColorTarget::Palette(index as u8))),
                                None => sink.report_error(ParseError::MalformedSequence {
                                    description: "palette index out of range",
                                }),
                            }
                        }
                    }
                }
                sink.emit(Action::ColorOperation {
                    kind: ColorOperationKind::ResetPalette,
                    requests,
                });
            }
            105 => sink.emit(Action::ColorOperation {
                kind: ColorOperationKind::Special,
                requests: vec![ColorRequest::ResetSpecial],
            }),
            10 | 11 | 12 => {
                let (kind, target) = dynamic_color(number);
                let payload = payload.unwrap_or_default();
                let request = if payload == b"?" {
                    Some(ColorRequest::Query(target))
                } else {
                    Rgb::parse_x11(payload).map(|color| ColorRequest::Set { target, color })
                };
                match request {
                    Some(request) => sink.emit(Action::ColorOperation {
                        kind,
                        requests: vec![request],
                    }),
                    None => sink.report_error(ParseError::MalformedSequence {
                        description: "unparseable color specification",
                    }),
                }
            }
            110 | 111 | 112 => {
                let (kind, target) = dynamic_color(number - 100);
                sink.emit(Action::ColorOperation {
                    kind,
                    requests: vec![ColorRequest::Reset(target)],
                });
            }
            7 => sink.emit(Action::ReportPwd(payload.unwrap_or_default())),
            8 => {
                let payload = payload.unwrap_or_default();
                let Some(pos) = payload.iter().position(|&b| b == b';') else {
                    sink.report_error(ParseError::MalformedSequence {
                        description: "malformed hyperlink",
                    });
                    return;
                };
                let params = &payload[..pos];
                let uri = &payload[pos + 1..];
                if uri.is_empty() {
                    sink.emit(Action::EndHyperlink);
                } else {
                    let id = params
                        .split(|&b| b == b':')
                        .find_map(|kv| kv.strip_prefix(b"id="))
                        .filter(|id| !id.is_empty());
                    sink.emit(Action::StartHyperlink { uri, id });
                }
            }
            9 => {
                let payload = payload.unwrap_or_default();
                if let Some(progress) = payload.strip_prefix(b"4;") {
                    let mut parts = progress.split(|&b| b == b';');
                    let state = parts.next().and_then(parse_number).unwrap_or(0);
                    let progress = parts.next().and_then(parse_number);
                    sink.emit(Action::ProgressReport { state, progress });
                } else {
                    sink.emit(Action::ShowDesktopNotification { title: b"", body: payload });
                }
            }
            777 => {
                let payload = payload.unwrap_or_default();
                let mut parts = payload.splitn(3, |&b| b == b';');
                if parts.next().is_some_and(|kind| kind == b"notify") {
                    let title = parts.next().unwrap_or_default();
                    let body = parts.next().unwrap_or_default();
                    sink.emit(Action::ShowDesktopNotification { title, body });
                } else {
                    sink.report_error(ParseError::MalformedSequence {
                        description: "unknown OSC 777 command",
                    });
                }
            }
            21 => sink.emit(Action::KittyColorReport),
            22 => {
                let name = payload.unwrap_or_default();
                match MouseShape::from_name(name) {
                    Some(shape) => sink.emit(Action::SetMouseShape(shape)),
                    None => sink.report_error(ParseError::MalformedSequence {
                        description: "unknown mouse shape",
                    }),
                }
            }
            52 => {
                let payload = payload.unwrap_or_default();
                let Some(pos) = payload.iter().position(|&b| b == b';') else {
                    sink.report_error(ParseError::MalformedSequence {
                        description: "malformed clipboard command",
                    });
                    return;
                };
                let clipboard = if pos > 0 { payload[0] } else { b'c' };
                sink.emit(Action::ClipboardContents {
                    clipboard,
                    data: &payload[pos + 1..],
                });
            }
            133 => {
                let payload = payload.unwrap_or_default();
                let mut parts = payload.split(|&b| b == b';');
                let mark = parts.next().unwrap_or_default();
                match mark {
                    b"A" => {
                        let mut redraw = true;
                        let mut continuation = false;
                        for option in parts {
                            if option == b"redraw=0" {
                                redraw = false;
                            } else if option == b"k=c" {
                                continuation = true;
                            }
                        }
                        if continuation {
                            sink.emit(Action::PromptContinuation);
                        } else {
                            sink.emit(Action::PromptStart { redraw });
                        }
                    }
                    b"B" => sink.emit(Action::PromptEnd),
                    b"C" => sink.emit(Action::EndOfInput),
                    b"D" => sink.emit(Action::EndOfCommand),
                    _ => sink.report_error(ParseError::MalformedSequence {
                        description: "unknown shell integration mark",
                    }),
                }
            }
            _ => sink.report_error(ParseError::MalformedSequence {
                description: "unknown operating system command",
            }),
        }
    }
}

fn dynamic_color(number: u16) -> (ColorOperationKind, ColorTarget) {
    match number {
        10 => (ColorOperationKind::DynamicForeground, ColorTarget::Foreground),
        11 => (ColorOperationKind::DynamicBackground, ColorTarget::Background),
        _ => (ColorOperationKind::DynamicCursor, ColorTarget::Cursor),
    }
}

fn parse_number(bytes: &[u8]) -> Option<u16> {
    if bytes.is_empty() || bytes.len() > 5 {
        return None;
    }
    let mut value: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + u32::from(b - b'0');
    }
    u16::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Sink that records prints and actions as owned values.
    #[derive(Default)]
    struct Recorder {
        printed: Vec<u8>,
        actions: Vec<String>,
        errors: Vec<ParseError>,
    }

    impl ActionSink for Recorder {
        fn print(&mut self, text: &[u8]) {
            self.printed.extend_from_slice(text);
        }

        fn emit(&mut self, action: Action<'_>) {
            self.actions.push(format!("{action:?}"));
        }

        fn report_error(&mut self, error: ParseError) {
            self.errors.push(error);
        }
    }

    fn run(input: &[u8]) -> Recorder {
        let mut parser = AnsiParser::new();
        let mut recorder = Recorder::default();
        parser.parse(input, &mut recorder);
        recorder
    }

    fn actions(input: &[u8]) -> Vec<String> {
        run(input).actions
    }

    #[test]
    fn plain_text_prints() {
        let r = run(b"Hello");
        assert_eq!(b"Hello".to_vec(), r.printed);
        assert!(r.actions.is_empty());
    }

    #[test]
    fn text_split_around_controls() {
        let r = run(b"ab\x0dcd");
        assert_eq!(b"abcd".to_vec(), r.printed);
        assert_eq!(vec!["CarriageReturn".to_string()], r.actions);
    }

    #[test]
    fn cursor_motion() {
        assert_eq!(vec!["CursorUp(3)"], actions(b"\x1b[3A"));
        assert_eq!(vec!["CursorDown(1)"], actions(b"\x1b[B"));
        // 0 saturates to 1
        assert_eq!(vec!["CursorRight(1)"], actions(b"\x1b[0C"));
        assert_eq!(vec!["CursorPos { row: 5, col: 20 }"], actions(b"\x1b[5;20H"));
        assert_eq!(vec!["CursorPos { row: 1, col: 1 }"], actions(b"\x1b[H"));
    }

    #[test]
    fn erase_selective_flag() {
        assert_eq!(vec!["EraseDisplay { mode: Complete, selective: false }"], actions(b"\x1b[2J"));
        assert_eq!(vec!["EraseLine { mode: Right, selective: true }"], actions(b"\x1b[?K"));
    }

    #[test]
    fn modes_fan_out() {
        assert_eq!(
            vec!["SetMode(CursorVisible)", "SetMode(MouseEventNormal)"],
            actions(b"\x1b[?25;1000h")
        );
        assert_eq!(vec!["ResetMode(Wraparound)"], actions(b"\x1b[?7l"));
        assert_eq!(vec!["SaveMode(Origin)"], actions(b"\x1b[?6s"));
        assert_eq!(vec!["RestoreMode(Origin)"], actions(b"\x1b[?6r"));
    }

    #[test]
    fn margins_and_the_ambiguous_save() {
        assert_eq!(vec!["TopAndBottomMargin { top: 5, bottom: 20 }"], actions(b"\x1b[5;20r"));
        assert_eq!(vec!["LeftAndRightMarginAmbiguous"], actions(b"\x1b[s"));
        assert_eq!(vec!["LeftAndRightMargin { left: 2, right: 40 }"], actions(b"\x1b[2;40s"));
    }

    #[test]
    fn sgr_attributes() {
        assert_eq!(
            vec![
                "SetAttribute(Intensity(Bold))",
                "SetAttribute(Foreground(Palette(2)))",
            ],
            actions(b"\x1b[1;32m")
        );
        assert_eq!(vec!["SetAttribute(Underline(Curly))"], actions(b"\x1b[4:3m"));
    }

    #[test]
    fn kitty_keyboard_family() {
        assert_eq!(
            vec!["KittyKeyboardPush(KittyKeyboardFlags(DISAMBIGUATE | REPORT_EVENTS))"],
            actions(b"\x1b[>3u")
        );
        assert_eq!(vec!["KittyKeyboardPop(2)"], actions(b"\x1b[<2u"));
        assert_eq!(
            vec!["KittyKeyboardSet(Or, KittyKeyboardFlags(DISAMBIGUATE))"],
            actions(b"\x1b[=1;2u")
        );
        assert_eq!(vec!["KittyKeyboardQuery"], actions(b"\x1b[?u"));
    }

    #[test]
    fn esc_sequences() {
        assert_eq!(vec!["SaveCursor"], actions(b"\x1b7"));
        assert_eq!(vec!["RestoreCursor"], actions(b"\x1b8"));
        assert_eq!(vec!["Decaln"], actions(b"\x1b#8"));
        assert_eq!(vec!["FullReset"], actions(b"\x1bc"));
        assert_eq!(
            vec!["ConfigureCharset { slot: G0, charset: DecSpecialGraphics }"],
            actions(b"\x1b(0")
        );
        assert_eq!(
            vec!["InvokeCharset { bank: GL, slot: G1, locking: true }"],
            actions(b"\x0e")
        );
    }

    #[test]
    fn osc_palette_set() {
        assert_eq!(
            vec!["ColorOperation { kind: Palette, requests: [Set { target: Palette(0), color: Rgb { r: 255, g: 0, b: 0 } }] }"],
            actions(b"\x1b]4;0;rgb:ff/00/00\x1b\\")
        );
    }

    #[test]
    fn osc_palette_reset() {
        assert_eq!(
            vec!["ColorOperation { kind: ResetPalette, requests: [Reset(Palette(0))] }"],
            actions(b"\x1b]104;0\x07")
        );
        assert_eq!(
            vec!["ColorOperation { kind: ResetPalette, requests: [ResetPalette] }"],
            actions(b"\x1b]104\x1b\\")
        );
    }

    #[test]
    fn osc_hyperlinks() {
        assert_eq!(
            vec!["StartHyperlink { uri: [104, 116, 116, 112, 58, 47, 47, 97], id: Some([120]) }"],
            actions(b"\x1b]8;id=x;http://a\x1b\\")
        );
        assert_eq!(vec!["EndHyperlink"], actions(b"\x1b]8;;\x1b\\"));
    }

    #[test]
    fn osc_shell_integration() {
        assert_eq!(vec!["PromptStart { redraw: true }"], actions(b"\x1b]133;A\x07"));
        assert_eq!(vec!["PromptStart { redraw: false }"], actions(b"\x1b]133;A;redraw=0\x07"));
        assert_eq!(vec!["PromptContinuation"], actions(b"\x1b]133;A;k=c\x07"));
        assert_eq!(vec!["PromptEnd"], actions(b"\x1b]133;B\x07"));
        assert_eq!(vec!["EndOfInput"], actions(b"\x1b]133;C\x07"));
        assert_eq!(vec!["EndOfCommand"], actions(b"\x1b]133;D;0\x07"));
    }

    #[test]
    fn dcs_payload_is_delimited() {
        assert_eq!(vec!["DeviceControl([113, 100, 97, 116, 97])"], actions(b"\x1bPqdata\x1b\\"));
    }

    #[test]
    fn sequences_split_across_chunks() {
        let mut parser = AnsiParser::new();
        let mut recorder = Recorder::default();
        parser.parse(b"\x1b[5;", &mut recorder);
        parser.parse(b"20r", &mut recorder);
        assert_eq!(vec!["TopAndBottomMargin { top: 5, bottom: 20 }"], recorder.actions);
    }

    #[test]
    fn report_requests_become_actions() {
        assert_eq!(vec!["DeviceAttributes(Primary)"], actions(b"\x1b[c"));
        assert_eq!(vec!["DeviceStatusReport { number: 6 }"], actions(b"\x1b[6n"));
        assert_eq!(vec!["SizeReport(14)"], actions(b"\x1b[14t"));
        assert_eq!(vec!["TitlePush"], actions(b"\x1b[22t"));
    }

    #[test]
    fn malformed_sequences_report_and_recover() {
        let r = run(b"\x1b[999Xyz");
        // X is EraseChars; the trailing yz prints
        assert_eq!(vec!["EraseChars(999)"], r.actions);
        assert_eq!(b"yz".to_vec(), r.printed);

        let r = run(b"\x1bZok");
        assert_eq!(1, r.errors.len());
        assert_eq!(b"ok".to_vec(), r.printed);
    }
}
