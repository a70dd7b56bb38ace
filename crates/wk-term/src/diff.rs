// SPDX-License-Identifier: MIT
//
// Differential renderer — only changed cells reach the terminal.
//
// Instead of redrawing the whole screen each frame, the current FrameBuffer
// is compared against the previous one and ANSI is emitted only for cells
// that differ. A keystroke on the board typically touches one or two rows
// out of 24+; the diff turns a full repaint into a surgical update.
//
// Per frame:
//
//   1. The application paints into a FrameBuffer.
//   2. `render()` diffs it against the stored previous frame.
//   3. Changed cells go through `CellWriter` (minimal escapes).
//   4. Everything lands in `OutputBuffer` — no terminal writes yet.
//   5. `flush()` issues one write() syscall.
//
// Unchanged rows are detected with a single slice comparison and skipped
// without touching individual cells. Synchronized output (DEC 2026) wraps
// the frame so partial updates never flicker.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for profiling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were rendered.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// Total bytes of ANSI output generated.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Total cells processed (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Differential renderer that emits ANSI only for changed cells.
///
/// Holds the previous frame for comparison and a [`CellWriter`] for
/// stateful output minimization. All output is buffered for a single
/// `write()` per frame.
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// Create a renderer with no previous frame (first render draws everything).
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff the current frame against the previous and generate ANSI output.
    ///
    /// Follow with [`flush`](Self::flush) or [`flush_to`](Self::flush_to) to
    /// write to the terminal, or [`output_bytes`](Self::output_bytes) to
    /// inspect the output in tests.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        // Full redraw on first render or size change.
        let size_matches = self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.width() == width && prev.height() == height);
        let full_redraw = !size_matches;

        if full_redraw {
            ansi::clear_screen(&mut self.output).ok();
            ansi::cursor_to(&mut self.output, 0, 0).ok();
        }

        for y in 0..height {
            // Row-skip: unchanged rows cost one slice comparison.
            if !full_redraw {
                if let Some(prev) = &self.previous {
                    if let (Some(curr_row), Some(prev_row)) = (current.row(y), prev.row(y)) {
                        if curr_row == prev_row {
                            stats.cells_skipped += usize::from(width);
                            continue;
                        }
                    }
                }
            }

            for x in 0..width {
                // x < width and y < height, so the cell exists.
                let Some(cell) = current.get(x, y) else {
                    continue;
                };

                let changed = full_redraw
                    || self.previous.as_ref().and_then(|p| p.get(x, y)) != Some(cell);

                if changed {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                } else {
                    stats.cells_skipped += 1;
                }
            }
        }

        // Reset SGR at frame end so styling never leaks into the terminal's
        // own rendering (cursor line, shell prompt after exit).
        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// The raw ANSI bytes from the last render (for tests and debugging).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Discard the previous frame so the next render draws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// Store the current frame for the next comparison.
    ///
    /// Reuses the existing allocation when dimensions match — zero alloc
    /// in steady state.
    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev)
                if prev.width() == current.width() && prev.height() == current.height() =>
            {
                prev.copy_from(current);
            }
            _ => {
                self.previous = Some(current.clone());
            }
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Style;

    fn frame_with(text: &str) -> FrameBuffer {
        let mut buf = FrameBuffer::new(10, 3);
        buf.paint_text(0, 0, text, Style::PLAIN);
        buf
    }

    #[test]
    fn first_render_draws_everything() {
        let mut r = DiffRenderer::new();
        let stats = r.render(&frame_with("hello"));
        assert_eq!(stats.cells_rendered, 30);
        assert_eq!(stats.cells_skipped, 0);
    }

    #[test]
    fn identical_frame_renders_nothing() {
        let mut r = DiffRenderer::new();
        let frame = frame_with("hello");
        r.render(&frame);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 30);
    }

    #[test]
    fn changed_cells_rendered() {
        let mut r = DiffRenderer::new();
        r.render(&frame_with("hello"));
        let stats = r.render(&frame_with("hallo"));
        assert_eq!(stats.cells_rendered, 1);
    }

    #[test]
    fn unchanged_rows_skipped_wholesale() {
        let mut r = DiffRenderer::new();
        let mut a = FrameBuffer::new(10, 3);
        a.paint_text(0, 0, "top", Style::PLAIN);
        a.paint_text(0, 2, "bottom", Style::PLAIN);
        r.render(&a);

        let mut b = a.clone();
        b.paint_text(0, 2, "changed", Style::PLAIN);
        let stats = r.render(&b);
        // Rows 0 and 1 skipped as whole slices; only row 2 cells diffed.
        assert!(stats.cells_rendered <= 10);
        assert!(stats.cells_skipped >= 20);
    }

    #[test]
    fn size_change_forces_full_redraw() {
        let mut r = DiffRenderer::new();
        r.render(&frame_with("hello"));
        let bigger = FrameBuffer::new(12, 4);
        let stats = r.render(&bigger);
        assert_eq!(stats.cells_rendered, 48);
    }

    #[test]
    fn force_redraw_discards_previous() {
        let mut r = DiffRenderer::new();
        let frame = frame_with("hello");
        r.render(&frame);
        r.force_redraw();
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 30);
    }

    #[test]
    fn output_wrapped_in_sync_markers() {
        let mut r = DiffRenderer::new();
        r.render(&frame_with("x"));
        let s = String::from_utf8(r.output_bytes().to_vec()).unwrap();
        assert!(s.starts_with("\x1b[?2026h"));
        assert!(s.ends_with("\x1b[?2026l"));
    }

    #[test]
    fn output_resets_sgr_before_sync_end() {
        let mut r = DiffRenderer::new();
        r.render(&frame_with("x"));
        let s = String::from_utf8(r.output_bytes().to_vec()).unwrap();
        assert!(s.contains("\x1b[0m\x1b[?2026l"));
    }

    #[test]
    fn zero_size_frame_is_harmless() {
        let mut r = DiffRenderer::new();
        let stats = r.render(&FrameBuffer::new(0, 0));
        assert_eq!(stats.total_cells(), 0);
        assert!(r.output_bytes().is_empty());
    }

    #[test]
    fn flush_to_empties_buffer() {
        let mut r = DiffRenderer::new();
        r.render(&frame_with("x"));
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output_bytes().is_empty());
    }
}
