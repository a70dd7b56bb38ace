// SPDX-License-Identifier: MIT
//
// FrameBuffer — the in-memory grid of cells that one frame paints into.
//
// The render layer paints whole rows of text into this grid; the diff
// renderer compares it against the previous frame and emits ANSI only
// for what changed.
//
// All paint operations are clipped: a write outside the grid is silently
// dropped, never an error. That single property is what lets the render
// layer draw an arbitrary layout into an arbitrarily small terminal
// without a bounds check at every call site.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A width × height grid of [`Cell`]s, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer of the given size, filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// The cell at `(x, y)`, or `None` when out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&self.cells[idx])
        } else {
            None
        }
    }

    /// One full row of cells, or `None` when `y` is out of bounds.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            let end = start + usize::from(self.width);
            Some(&self.cells[start..end])
        } else {
            None
        }
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the grid, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy another buffer's cells into this one.
    ///
    /// Used by the diff renderer to retain the previous frame without
    /// reallocating. Both buffers must have the same dimensions.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.width, other.width);
        assert_eq!(self.height, other.height);
        self.cells.copy_from_slice(&other.cells);
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Write a single cell. Out-of-bounds writes are dropped.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Paint a text string left-to-right starting at `(x, y)`.
    ///
    /// Characters past the right edge are clipped. Control and zero-width
    /// characters are skipped; wide characters are replaced by `?` since
    /// this application never renders them (single-column model).
    ///
    /// Returns the number of columns consumed.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        if y >= self.height {
            return 0;
        }

        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let ch = match ch.width().unwrap_or(0) {
                0 => continue,
                1 => ch,
                _ => '?',
            };
            self.set(col, y, Cell::styled(ch, style));
            col += 1;
        }

        col.saturating_sub(x)
    }

    /// Fill an entire row with a styled repeat of one character.
    ///
    /// The horizontal rules between week sections use this. Out-of-bounds
    /// rows are dropped.
    pub fn fill_row(&mut self, y: u16, ch: char, style: Style) {
        if y >= self.height {
            return;
        }
        for x in 0..self.width {
            self.set(x, y, Cell::styled(ch, style));
        }
    }

    /// Apply a style to a span of existing cells, keeping their characters.
    ///
    /// Used to reverse-video the selected row after its text is painted.
    pub fn restyle_span(&mut self, x: u16, y: u16, len: u16, style: Style) {
        if y >= self.height {
            return;
        }
        for col in x..x.saturating_add(len).min(self.width) {
            let idx = self.index(col, y);
            let ch = self.cells[idx].ch;
            self.cells[idx] = Cell::styled(ch, style);
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width ──────────────────────────────────────────────────────────────

/// Display width of a string in terminal columns.
///
/// Wide characters count as 2 even though this application renders them as
/// `?` — truncation decisions must match what the terminal would show.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(|ch| ch.width().unwrap_or(0)).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, CellColor};
    use pretty_assertions::assert_eq;

    fn text_at(buf: &FrameBuffer, y: u16) -> String {
        buf.row(y)
            .unwrap()
            .iter()
            .map(|c| c.ch)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_empty() {
        let buf = FrameBuffer::new(10, 4);
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.height(), 4);
        assert!(buf.row(0).unwrap().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn zero_size_buffer() {
        let buf = FrameBuffer::new(0, 0);
        assert!(buf.get(0, 0).is_none());
        assert!(buf.row(0).is_none());
    }

    // ── Bounds ──────────────────────────────────────────────────────────

    #[test]
    fn get_out_of_bounds_is_none() {
        let buf = FrameBuffer::new(10, 4);
        assert!(buf.get(10, 0).is_none());
        assert!(buf.get(0, 4).is_none());
    }

    #[test]
    fn set_out_of_bounds_is_dropped() {
        let mut buf = FrameBuffer::new(10, 4);
        assert!(!buf.set(10, 0, Cell::new('x')));
        assert!(!buf.set(0, 4, Cell::new('x')));
    }

    #[test]
    fn set_in_bounds() {
        let mut buf = FrameBuffer::new(10, 4);
        assert!(buf.set(3, 2, Cell::new('x')));
        assert_eq!(buf.get(3, 2).unwrap().ch, 'x');
    }

    // ── paint_text ──────────────────────────────────────────────────────

    #[test]
    fn paint_text_simple() {
        let mut buf = FrameBuffer::new(10, 2);
        let consumed = buf.paint_text(0, 0, "hello", Style::PLAIN);
        assert_eq!(consumed, 5);
        assert_eq!(text_at(&buf, 0), "hello");
    }

    #[test]
    fn paint_text_offset() {
        let mut buf = FrameBuffer::new(10, 2);
        buf.paint_text(2, 1, "hi", Style::PLAIN);
        assert_eq!(text_at(&buf, 1), "  hi");
    }

    #[test]
    fn paint_text_clips_at_right_edge() {
        let mut buf = FrameBuffer::new(5, 1);
        let consumed = buf.paint_text(3, 0, "hello", Style::PLAIN);
        assert_eq!(consumed, 2);
        assert_eq!(text_at(&buf, 0), "   he");
    }

    #[test]
    fn paint_text_below_buffer_is_dropped() {
        let mut buf = FrameBuffer::new(5, 1);
        assert_eq!(buf.paint_text(0, 5, "hello", Style::PLAIN), 0);
    }

    #[test]
    fn paint_text_applies_style() {
        let mut buf = FrameBuffer::new(10, 1);
        let style = Style::fg(CellColor::Ansi(1)).with_attrs(Attr::BOLD);
        buf.paint_text(0, 0, "x", style);
        let cell = buf.get(0, 0).unwrap();
        assert_eq!(cell.fg, CellColor::Ansi(1));
        assert_eq!(cell.attrs, Attr::BOLD);
    }

    #[test]
    fn paint_text_skips_control_chars() {
        let mut buf = FrameBuffer::new(10, 1);
        let consumed = buf.paint_text(0, 0, "a\tb", Style::PLAIN);
        assert_eq!(consumed, 2);
        assert_eq!(text_at(&buf, 0), "ab");
    }

    #[test]
    fn paint_text_replaces_wide_chars() {
        let mut buf = FrameBuffer::new(10, 1);
        buf.paint_text(0, 0, "中", Style::PLAIN);
        assert_eq!(buf.get(0, 0).unwrap().ch, '?');
    }

    // ── fill_row / restyle_span ─────────────────────────────────────────

    #[test]
    fn fill_row_covers_width() {
        let mut buf = FrameBuffer::new(6, 2);
        buf.fill_row(0, '─', Style::PLAIN.with_attrs(Attr::DIM));
        assert_eq!(text_at(&buf, 0), "──────");
        assert_eq!(buf.get(5, 0).unwrap().attrs, Attr::DIM);
    }

    #[test]
    fn fill_row_out_of_bounds_is_dropped() {
        let mut buf = FrameBuffer::new(6, 2);
        buf.fill_row(2, '─', Style::PLAIN); // Must not panic.
    }

    #[test]
    fn restyle_span_keeps_characters() {
        let mut buf = FrameBuffer::new(10, 1);
        buf.paint_text(0, 0, "hello", Style::PLAIN);
        buf.restyle_span(0, 0, 5, Style::PLAIN.with_attrs(Attr::REVERSE));
        assert_eq!(text_at(&buf, 0), "hello");
        assert_eq!(buf.get(2, 0).unwrap().attrs, Attr::REVERSE);
    }

    #[test]
    fn restyle_span_clips_at_edge() {
        let mut buf = FrameBuffer::new(5, 1);
        buf.restyle_span(3, 0, 10, Style::PLAIN.with_attrs(Attr::DIM));
        assert_eq!(buf.get(4, 0).unwrap().attrs, Attr::DIM);
    }

    // ── clear / resize / copy_from ──────────────────────────────────────

    #[test]
    fn clear_resets_cells() {
        let mut buf = FrameBuffer::new(5, 1);
        buf.paint_text(0, 0, "abc", Style::PLAIN);
        buf.clear();
        assert!(buf.row(0).unwrap().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn resize_changes_dimensions_and_clears() {
        let mut buf = FrameBuffer::new(5, 1);
        buf.paint_text(0, 0, "abc", Style::PLAIN);
        buf.resize(8, 3);
        assert_eq!(buf.width(), 8);
        assert_eq!(buf.height(), 3);
        assert!(buf.row(0).unwrap().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn copy_from_duplicates_content() {
        let mut a = FrameBuffer::new(5, 1);
        a.paint_text(0, 0, "abc", Style::PLAIN);
        let mut b = FrameBuffer::new(5, 1);
        b.copy_from(&a);
        assert_eq!(text_at(&b, 0), "abc");
    }

    // ── string_width ────────────────────────────────────────────────────

    #[test]
    fn string_width_ascii() {
        assert_eq!(string_width("hello"), 5);
    }

    #[test]
    fn string_width_wide() {
        assert_eq!(string_width("中文"), 4);
    }

    #[test]
    fn string_width_empty() {
        assert_eq!(string_width(""), 0);
    }
}
