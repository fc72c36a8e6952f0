//! Dispatcher-level invariants, driven through [`ReadonlySink::dispatch`]
//! with constructed actions and through the parser where byte-level behavior
//! matters.

use pretty_assertions::assert_eq;
use squall_engine::{
    MouseEvents, MouseFormat, Position, ReadonlySink, StyleId, TerminalScreen, TextScreen,
};
use squall_parser_core::{
    Action, ActionParser, AnsiParser, DeviceAttributeReq, KittyKeyboardFlags, Mode, MouseShape, Rgb,
};

fn feed(screen: &mut TextScreen, bytes: &[u8]) {
    let mut sink = ReadonlySink::new(screen);
    let mut parser = AnsiParser::new();
    parser.parse(bytes, &mut sink);
    assert!(sink.take_error().is_none(), "stream failed");
}

fn dispatch(screen: &mut TextScreen, action: Action<'_>) {
    let mut sink = ReadonlySink::new(screen);
    sink.dispatch(action).unwrap();
}

/// Everything a report-style action could possibly disturb.
fn observe(screen: &TextScreen) -> (String, Position, usize, Vec<bool>, Rgb, MouseEvents, usize) {
    let state = screen.terminal_state();
    (
        screen.plain_text(),
        screen.caret_position(),
        screen.styles().len(),
        vec![
            state.modes.get(Mode::Wraparound),
            state.modes.get(Mode::Origin),
            state.modes.get(Mode::Insert),
            state.modes.get(Mode::EnableLeftAndRightMargin),
        ],
        screen.palette().color(1),
        state.flags.mouse_event,
        state.kitty_keyboard.depth(),
    )
}

#[test]
fn report_requesting_actions_change_nothing() {
    let mut screen = TextScreen::new((20, 5));
    feed(&mut screen, b"some \x1b[1mcontent\x1b[5;10r\x1b[2;2H");
    let before = observe(&screen);

    let noops: Vec<Action<'_>> = vec![
        Action::Bell,
        Action::Enquiry,
        Action::RequestMode { ansi: false, number: 2026 },
        Action::DeviceAttributes(DeviceAttributeReq::Primary),
        Action::DeviceAttributes(DeviceAttributeReq::Secondary),
        Action::DeviceStatusReport { number: 6 },
        Action::KittyKeyboardQuery,
        Action::SizeReport(14),
        Action::WindowTitleQuery,
        Action::TitlePush,
        Action::TitlePop,
        Action::XtVersion,
        Action::SetWindowTitle(b"title"),
        Action::SetIconName(b"icon"),
        Action::ReportPwd(b"file:///tmp"),
        Action::ShowDesktopNotification { title: b"", body: b"hello" },
        Action::ProgressReport {
            state: 1,
            progress: Some(50),
        },
        Action::ClipboardContents {
            clipboard: b'c',
            data: b"Zm9v",
        },
        Action::KittyColorReport,
        Action::DeviceControl(b"qPayload"),
        Action::ApplicationProgram(b"Gkitty"),
    ];
    for action in noops {
        let label = format!("{action:?}");
        dispatch(&mut screen, action);
        assert_eq!(before, observe(&screen), "{label} mutated the screen");
    }
}

#[test]
fn mode_round_trip() {
    let mut screen = TextScreen::new((80, 24));
    let modes = [
        Mode::Insert,
        Mode::Linefeed,
        Mode::CursorKeys,
        Mode::ReverseColors,
        Mode::Origin,
        Mode::Wraparound,
        Mode::Autorepeat,
        Mode::FocusEvent,
        Mode::BracketedPaste,
        Mode::SynchronizedOutput,
        Mode::GraphemeCluster,
        Mode::InBandSizeReports,
        Mode::EnableMode3,
        Mode::ReverseWraparound,
        Mode::KeypadKeys,
    ];
    for mode in modes {
        for value in [true, false, true] {
            let action = if value { Action::SetMode(mode) } else { Action::ResetMode(mode) };
            dispatch(&mut screen, action);
            assert_eq!(value, screen.terminal_state().modes.get(mode), "{mode:?}");
        }
        // save, flip, restore
        dispatch(&mut screen, Action::SaveMode(mode));
        dispatch(&mut screen, Action::ResetMode(mode));
        dispatch(&mut screen, Action::RestoreMode(mode));
        assert!(screen.terminal_state().modes.get(mode), "{mode:?} did not restore");
    }
}

#[test]
fn restore_mode_reapplies_side_effects() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[?69h\x1b[10;40s");
    assert_eq!(Some((9, 39)), screen.terminal_state().get_margins_left_right());

    // save while enabled, disable (margins reset), restore
    feed(&mut screen, b"\x1b[?69s\x1b[?69l");
    assert!(!screen.terminal_state().modes.get(Mode::EnableLeftAndRightMargin));
    assert_eq!(None, screen.terminal_state().get_margins_left_right());

    feed(&mut screen, b"\x1b[?69r");
    assert!(screen.terminal_state().modes.get(Mode::EnableLeftAndRightMargin));
}

#[test]
fn ambiguous_csi_s_saves_cursor_when_margin_mode_is_off() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[5;7H\x1b[s\x1b[1;1H\x1b[u");
    assert_eq!(Position::new(6, 4), screen.caret_position());
    assert_eq!(None, screen.terminal_state().get_margins_left_right());
}

#[test]
fn ambiguous_csi_s_sets_margins_when_margin_mode_is_on() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[?69h\x1b[10;40s");
    assert_eq!(Some((9, 39)), screen.terminal_state().get_margins_left_right());

    feed(&mut screen, b"\x1b[s");
    // full width again
    assert_eq!(Some((0, 79)), screen.terminal_state().get_margins_left_right());
}

#[test]
fn cursor_stays_in_bounds_under_saturating_motion() {
    let mut screen = TextScreen::new((80, 24));
    let motions: Vec<Action<'_>> = vec![
        Action::CursorUp(9999),
        Action::CursorLeft(9999),
        Action::CursorDown(65535),
        Action::CursorRight(65535),
        Action::CursorPos { row: 9999, col: 9999 },
        Action::CursorColRelative(65535),
        Action::CursorRowRelative(65535),
        Action::CursorCol(65535),
        Action::CursorRow(65535),
        Action::CursorPos { row: 0, col: 0 },
    ];
    for action in motions {
        let label = format!("{action:?}");
        dispatch(&mut screen, action);
        let pos = screen.caret_position();
        assert!(pos.x >= 0 && pos.x < 80, "{label}: x = {}", pos.x);
        assert!(pos.y >= 0 && pos.y < 24, "{label}: y = {}", pos.y);
    }
}

#[test]
fn relative_cursor_motion_is_origin_aware() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[5;20r\x1b[?6h");
    // origin mode homes to the region top
    assert_eq!(Position::new(0, 4), screen.caret_position());

    feed(&mut screen, b"\x1b[3d");
    assert_eq!(Position::new(0, 6), screen.caret_position());
    feed(&mut screen, b"\x1b[10G\x1b[5a");
    assert_eq!(Position::new(14, 6), screen.caret_position());
}

#[test]
fn kitty_keyboard_stack_through_the_wire() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[>1u");
    assert_eq!(
        KittyKeyboardFlags::DISAMBIGUATE,
        screen.terminal_state().kitty_keyboard.current()
    );

    feed(&mut screen, b"\x1b[=8;2u");
    assert_eq!(
        KittyKeyboardFlags::DISAMBIGUATE | KittyKeyboardFlags::REPORT_ALL,
        screen.terminal_state().kitty_keyboard.current()
    );

    feed(&mut screen, b"\x1b[=1;3u");
    assert_eq!(KittyKeyboardFlags::REPORT_ALL, screen.terminal_state().kitty_keyboard.current());

    feed(&mut screen, b"\x1b[>16u\x1b[<1u");
    assert_eq!(KittyKeyboardFlags::REPORT_ALL, screen.terminal_state().kitty_keyboard.current());

    feed(&mut screen, b"\x1b[<99u");
    assert_eq!(KittyKeyboardFlags::empty(), screen.terminal_state().kitty_keyboard.current());
}

#[test]
fn mouse_reporting_flags() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[?1000h\x1b[?1006h");
    assert_eq!(MouseEvents::Normal, screen.terminal_state().flags.mouse_event);
    assert_eq!(MouseFormat::Sgr, screen.terminal_state().flags.mouse_format);

    feed(&mut screen, b"\x1b[?1003h");
    assert_eq!(MouseEvents::Any, screen.terminal_state().flags.mouse_event);

    feed(&mut screen, b"\x1b[?1003l\x1b[?1006l");
    assert_eq!(MouseEvents::None, screen.terminal_state().flags.mouse_event);
    assert_eq!(MouseFormat::X10, screen.terminal_state().flags.mouse_format);
}

#[test]
fn mouse_shift_capture_is_tristate() {
    let mut screen = TextScreen::new((80, 24));
    assert_eq!(None, screen.terminal_state().flags.mouse_shift_capture);
    feed(&mut screen, b"\x1b[>1s");
    assert_eq!(Some(true), screen.terminal_state().flags.mouse_shift_capture);
    feed(&mut screen, b"\x1b[>0s");
    assert_eq!(Some(false), screen.terminal_state().flags.mouse_shift_capture);
}

#[test]
fn modify_other_keys_follows_the_numeric_format() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[>4;2m");
    assert!(screen.terminal_state().flags.modify_other_keys_2);
    feed(&mut screen, b"\x1b[>4;1m");
    assert!(!screen.terminal_state().flags.modify_other_keys_2);
}

#[test]
fn mouse_shape_from_osc_22() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b]22;pointer\x07");
    assert_eq!(MouseShape::Pointer, screen.terminal_state().mouse_shape);
}

#[test]
fn cursor_style_sets_shape_and_blink_mode() {
    use squall_parser_core::CursorShape;

    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[4 q");
    assert_eq!(CursorShape::Underline, screen.caret().shape);
    assert!(!screen.terminal_state().modes.get(Mode::CursorBlinking));
    assert!(!screen.caret().blinking);

    feed(&mut screen, b"\x1b[5 q");
    assert_eq!(CursorShape::Bar, screen.caret().shape);
    assert!(screen.terminal_state().modes.get(Mode::CursorBlinking));

    // default is a steady block
    feed(&mut screen, b"\x1b[0 q");
    assert_eq!(CursorShape::Block, screen.caret().shape);
    assert!(!screen.caret().blinking);
}

#[test]
fn cursor_visibility_mode_drives_the_caret() {
    let mut screen = TextScreen::new((80, 24));
    feed(&mut screen, b"\x1b[?25l");
    assert!(!screen.caret().visible);
    feed(&mut screen, b"\x1b[?25h");
    assert!(screen.caret().visible);
}

#[test]
fn prompt_marks_tag_rows_and_set_the_redraw_flag() {
    use squall_engine::{SemanticPhase, SemanticTag};

    let mut screen = TextScreen::new((40, 5));
    feed(&mut screen, b"\x1b]133;A;redraw=0\x07$ ");
    assert_eq!(SemanticTag::Prompt, screen.row_semantic_tag(0));
    assert!(!screen.terminal_state().flags.shell_redraws_prompt);

    feed(&mut screen, b"\x1b]133;B\x07");
    assert_eq!(SemanticPhase::Input, screen.terminal_state().semantic_phase);

    feed(&mut screen, b"ls\r\n\x1b]133;C\x07");
    assert_eq!(SemanticPhase::Command, screen.terminal_state().semantic_phase);

    feed(&mut screen, b"\x1b]133;D\x07");
    assert_eq!(SemanticTag::Input, screen.row_semantic_tag(1));
}

#[test]
fn tab_iteration_stops_at_the_margin() {
    let mut screen = TextScreen::new((20, 2));
    // plenty of tabs; the cursor pins to the right edge instead of spinning
    feed(&mut screen, b"\t\t\t\t\t\t\t\t");
    assert_eq!(19, screen.caret_position().x);

    feed(&mut screen, b"\x1b[99Z");
    assert_eq!(0, screen.caret_position().x);
}

#[test]
fn tab_stops_can_be_reprogrammed() {
    let mut screen = TextScreen::new((40, 2));
    feed(&mut screen, b"\x1b[3g");
    feed(&mut screen, b"\x1b[1;5H\x1bH\x1b[1;9H\x1bH\x1b[1;1H");
    feed(&mut screen, b"\t");
    assert_eq!(4, screen.caret_position().x);
    feed(&mut screen, b"\t");
    assert_eq!(8, screen.caret_position().x);

    // clear the stop under the cursor
    feed(&mut screen, b"\x1b[0g\x1b[1;1H\t");
    assert_eq!(4, screen.caret_position().x);

    feed(&mut screen, b"\x1b[?5W\x1b[1;1H\t");
    assert_eq!(8, screen.caret_position().x);
}

#[test]
fn erase_line_spares_the_pending_wrap_cell_when_asked() {
    use squall_parser_core::EraseLineMode;

    let mut screen = TextScreen::new((5, 2));
    feed(&mut screen, b"abcde");
    assert!(screen.caret().pending_wrap);

    dispatch(
        &mut screen,
        Action::EraseLine {
            mode: EraseLineMode::RightUnlessPendingWrap,
            selective: false,
        },
    );
    assert_eq!("abcde", screen.plain_text());

    dispatch(
        &mut screen,
        Action::EraseLine {
            mode: EraseLineMode::Right,
            selective: false,
        },
    );
    assert_eq!("abcd", screen.plain_text());
}

#[test]
fn insert_mode_shifts_existing_text() {
    let mut screen = TextScreen::new((20, 2));
    feed(&mut screen, b"world\x1b[1;1H\x1b[4hhello \x1b[4l");
    assert_eq!("hello world", screen.plain_text());
}

#[test]
fn styles_deduplicate_across_the_screen() {
    let mut screen = TextScreen::new((40, 4));
    feed(&mut screen, b"\x1b[31mred\r\n\x1b[31mred again");
    let first: StyleId = screen.get_style_id(Position::new(0, 0));
    let second = screen.get_style_id(Position::new(0, 1));
    assert_eq!(first, second);
    assert_eq!(1, screen.styles().len());
    // three cells on row 0, nine on row 1 (the reset rewrites nothing)
    assert_eq!(12, screen.styles().ref_count(first));
}

#[test]
fn scrollback_grows_and_erases() {
    let mut screen = TextScreen::new((10, 2));
    feed(&mut screen, b"a\r\nb\r\nc\r\nd");
    assert_eq!(2, screen.scrollback_len());

    feed(&mut screen, b"\x1b[3J");
    assert_eq!(0, screen.scrollback_len());
    assert_eq!("c\nd", screen.plain_text());
}

#[test]
fn scroll_complete_pushes_the_screen_away() {
    use squall_parser_core::EraseDisplayMode;

    let mut screen = TextScreen::new((10, 3));
    feed(&mut screen, b"one\r\ntwo");
    dispatch(
        &mut screen,
        Action::EraseDisplay {
            mode: EraseDisplayMode::ScrollComplete,
            selective: false,
        },
    );
    assert_eq!("", screen.plain_text());
    assert_eq!(3, screen.scrollback_len());
}

#[test]
fn reverse_index_scrolls_at_the_top_margin() {
    let mut screen = TextScreen::new((10, 3));
    feed(&mut screen, b"one\r\ntwo\r\ntri\x1b[1;1H\x1bM");
    assert_eq!("\none\ntwo", screen.plain_text());
}

#[test]
fn next_line_is_index_plus_return() {
    let mut screen = TextScreen::new((10, 3));
    feed(&mut screen, b"ab\x1bE");
    assert_eq!(Position::new(0, 1), screen.caret_position());
}
