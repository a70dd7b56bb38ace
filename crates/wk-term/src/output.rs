// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell emission.
//
// `OutputBuffer` accumulates a whole frame of ANSI bytes so the terminal
// sees a single `write()` per frame. `CellWriter` is the stateful half:
// it remembers the last cursor position, colors, and attributes it emitted
// and skips every escape sequence that would change nothing.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell, CellColor};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// Accumulates ANSI output for one frame.
///
/// Backed by a `Vec<u8>` that is reused across frames — zero allocation in
/// steady state. Writing into it cannot fail.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty output buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(4096),
        }
    }

    /// Number of buffered bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The buffered bytes (for tests and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a single character, UTF-8 encoded.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    /// Discard all buffered bytes, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write everything to stdout in one syscall and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(&self.buf)?;
        lock.flush()?;
        self.buf.clear();
        Ok(())
    }

    /// Write everything to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.buf)?;
        w.flush()?;
        self.buf.clear();
        Ok(())
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell renderer that tracks terminal state to skip redundant escapes.
///
/// - **Cursor**: skipped when the next cell is at `(last_x + 1, last_y)` —
///   the terminal auto-advances after character output.
/// - **Attributes**: on change, reset (SGR 0) then re-emit. The reset
///   invalidates color tracking, forcing colors to re-emit too. Going from
///   no-attrs to attrs skips the reset (nothing to clear).
/// - **Colors**: skipped when unchanged since the last emit.
#[allow(clippy::struct_field_names)] // The `last_` prefix IS the semantic grouping.
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<CellColor>,
    last_bg: Option<CellColor>,
    last_attrs: Attr,
}

impl CellWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    /// Reset all tracked state. Call after a terminal reset or screen clear.
    #[allow(clippy::missing_const_for_fn)] // *self = Self::new() isn't const-evaluable.
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Render a single cell, emitting only the escape sequences needed.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        // Skip the cursor move if the terminal cursor is already here.
        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        // Attributes changed: reset if old attrs existed, then emit new ones.
        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                // SGR 0 clears everything — invalidate color tracking.
                ansi::reset(out).ok();
                self.last_fg = None;
                self.last_bg = None;
            }
            self.last_attrs = cell.attrs;
            if !cell.attrs.is_empty() {
                ansi::attrs(out, cell.attrs).ok();
            }
        }

        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }

        if self.last_bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.last_bg = Some(cell.bg);
        }

        out.push_char(cell.ch);

        self.last_x = xi;
        self.last_y = yi;
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
