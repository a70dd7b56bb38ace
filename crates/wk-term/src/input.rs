// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. Handles everything a plain
// terminal sends for keyboard input:
//
// - Legacy CSI sequences (arrows, Home/End, Delete, Shift+Tab,
//   modifier-annotated forms like `ESC [ 1 ; 9 D`)
// - SS3 sequences (arrow/Home/End alternate encoding from some terminals)
// - Alt+key (ESC followed by a printable character — also how vim-style
//   `ESC u` / `ESC b` chords arrive)
// - Control characters (Ctrl+letter)
// - UTF-8 multi-byte characters
//
// # Design
//
// The parser maintains a small internal byte buffer because escape
// sequences can span multiple `read()` calls. Feed bytes with
// [`Parser::advance`], retrieve events from the returned `Vec`.
//
// A bare `ESC` byte is ambiguous: it could be the Escape key or the start
// of an escape sequence. The parser holds it as pending; after a timeout
// with no new bytes the caller invokes [`Parser::flush`], which resolves
// the pending ESC to a real Escape keypress. That flush is the system's
// only timeout-based disambiguation.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl, Super).
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A plain keypress with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A keypress with the given modifiers.
    #[must_use]
    pub const fn with(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the xterm CSI modifier encoding (`param = 1 + bitmask`).
    /// `SUPER` is what macOS terminals report for Option+Arrow word jumps
    /// (`ESC [ 1 ; 9 D` → modifier 9 → bitmask 8).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect
/// [`KeyEvent`]s. The parser buffers incomplete sequences internally and
/// resumes when more bytes arrive.
///
/// # Escape vs escape-sequence ambiguity
///
/// A lone `ESC` byte (0x1B) could be either a standalone Escape keypress
/// or the start of a multi-byte sequence. The parser keeps it pending.
/// The caller should wait a short timeout (~10ms) and then call
/// [`flush`](Parser::flush) to emit the pending ESC as a real Escape key.
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes from stdin and return all events that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept in the internal
    /// buffer and combined with future calls. Call
    /// [`flush`](Parser::flush) after a timeout to resolve a pending
    /// lone ESC.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf, pos) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(0) => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        // Compact: drop consumed bytes, keep the unconsumed remainder.
        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// Called after a timeout to resolve the ESC ambiguity: a lone ESC
    /// byte becomes an Escape key event, and any other leftover bytes
    /// become their literal key events.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        for &byte in &self.buf {
            let code = match byte {
                0x1B => KeyCode::Escape,
                b @ 0x01..=0x1A => KeyCode::Char((b + b'a' - 1) as char),
                0x7F => KeyCode::Backspace,
                b @ 0x20..=0x7E => KeyCode::Char(b as char),
                _ => continue,
            };
            let modifiers = match byte {
                0x01..=0x1A => Modifiers::CTRL,
                _ => Modifiers::empty(),
            };
            events.push(KeyEvent { code, modifiers });
        }
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions are pure — they read from `buf[pos..]` and return
// what they found plus how many bytes to consume.

/// Result of trying to parse one event from the buffer.
enum Parsed {
    /// Successfully parsed an event, consuming `usize` bytes.
    Event(KeyEvent, usize),
    /// Sequence is incomplete — need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

/// Try to parse a single event starting at `buf[pos]`.
fn try_parse(buf: &[u8], pos: usize) -> Parsed {
    let remaining = &buf[pos..];
    if remaining.is_empty() {
        return Parsed::Skip(0);
    }

    match remaining[0] {
        // ESC — could be an escape sequence or a standalone Escape key.
        0x1B => parse_escape(remaining),
        // Control characters (Ctrl+letter), minus the ones with names.
        b @ (0x01..=0x07 | 0x0B..=0x0C | 0x0E..=0x1A) => Parsed::Event(
            KeyEvent::with(KeyCode::Char((b + b'a' - 1) as char), Modifiers::CTRL),
            1,
        ),
        0x08 | 0x7F => Parsed::Event(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(KeyEvent::plain(KeyCode::Enter), 1),
        // ASCII printable.
        b @ 0x20..=0x7E => Parsed::Event(KeyEvent::plain(KeyCode::Char(b as char)), 1),
        // UTF-8 multi-byte.
        0xC0..=0xFF => parse_utf8(remaining),
        // NUL and bare continuation bytes — nothing useful, skip.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        // CSI: ESC [
        b'[' => parse_csi(buf),
        // SS3: ESC O
        b'O' => parse_ss3(buf),
        // Alt+ESC.
        0x1B => Parsed::Event(
            KeyEvent::with(KeyCode::Escape, Modifiers::ALT),
            2,
        ),
        // Alt+printable character (covers the ESC u / ESC b chords).
        b @ 0x20..=0x7E => Parsed::Event(
            KeyEvent::with(KeyCode::Char(b as char), Modifiers::ALT),
            2,
        ),
        // Unknown byte after ESC — emit standalone Escape.
        _ => Parsed::Event(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    // Scan for the final byte (0x40..=0x7E).
    // CSI parameter bytes are in 0x30..=0x3F, intermediate in 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            // Invalid byte in CSI sequence — abort.
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;

    // ── Tilde-terminated sequences (editing keys) ────────────────────
    if final_byte == b'~' {
        let first = params.first().copied().unwrap_or(0);
        let modifiers = params
            .get(1)
            .copied()
            .map_or_else(Modifiers::empty, decode_modifiers);

        return match first {
            1 | 7 => Parsed::Event(KeyEvent::with(KeyCode::Home, modifiers), consumed),
            3 => Parsed::Event(KeyEvent::with(KeyCode::Delete, modifiers), consumed),
            4 | 8 => Parsed::Event(KeyEvent::with(KeyCode::End, modifiers), consumed),
            _ => Parsed::Skip(consumed),
        };
    }

    // ── Letter-terminated sequences ──────────────────────────────────
    let modifiers = params
        .get(1)
        .copied()
        .map_or_else(Modifiers::empty, decode_modifiers);

    let event = match final_byte {
        b'A' => KeyEvent::with(KeyCode::Up, modifiers),
        b'B' => KeyEvent::with(KeyCode::Down, modifiers),
        b'C' => KeyEvent::with(KeyCode::Right, modifiers),
        b'D' => KeyEvent::with(KeyCode::Left, modifiers),
        b'H' => KeyEvent::with(KeyCode::Home, modifiers),
        b'F' => KeyEvent::with(KeyCode::End, modifiers),
        b'Z' => KeyEvent::with(KeyCode::Tab, Modifiers::SHIFT),
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Event(event, consumed)
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let event = match buf[2] {
        b'A' => KeyEvent::plain(KeyCode::Up),
        b'B' => KeyEvent::plain(KeyCode::Down),
        b'C' => KeyEvent::plain(KeyCode::Right),
        b'D' => KeyEvent::plain(KeyCode::Left),
        b'H' => KeyEvent::plain(KeyCode::Home),
        b'F' => KeyEvent::plain(KeyCode::End),
        _ => return Parsed::Skip(3),
    };

    Parsed::Event(event, 3)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);

    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    // Validate continuation bytes (must start with 0b10xxxxxx).
    for &b in &buf[1..expected] {
        if b & 0xC0 != 0x80 {
            return Parsed::Skip(1);
        }
    }

    std::str::from_utf8(&buf[..expected]).map_or(Parsed::Skip(1), |s| {
        s.chars().next().map_or(Parsed::Skip(expected), |ch| {
            Parsed::Event(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
    })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Parse semicolon-separated numeric CSI parameters.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut params = Vec::with_capacity(4);
    let mut val: u16 = 0;

    for &b in raw {
        match b {
            b'0'..=b'9' => {
                val = val.saturating_mul(10).saturating_add(u16::from(b - b'0'));
            }
            b';' => {
                params.push(val);
                val = 0;
            }
            // Colon sub-parameters and intermediates are not produced by
            // the sequences we recognize — ignore them.
            _ => {}
        }
    }
    params.push(val);

    params
}

/// Decode a CSI modifier parameter into `Modifiers` bitflags.
///
/// The encoding is `1 + bitmask` (xterm). A parameter of 0 or 1 means no
/// modifiers. Only the low 4 bits carry flags we care about.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes, 0xFE, 0xFF).
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
