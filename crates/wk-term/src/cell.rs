// SPDX-License-Identifier: MIT
//
// Cell — the atomic unit of terminal rendering.
//
// Every character position on screen is a Cell: a character, a foreground
// and background color, and a small attribute set. The rendering pipeline
// exists to produce, diff, and output grids of these.
//
// Wide characters are out of scope for this application — every cell is
// exactly one column, which keeps the diff and the cursor math trivial.

// ─── Color ───────────────────────────────────────────────────────────────────

/// A fully resolved terminal color.
///
/// The board only ever needs the terminal's own palette: the three task
/// states map to the classic red/blue/green slots, and everything else
/// inherits the user's theme via [`Default`](CellColor::Default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CellColor {
    /// Terminal default (inherits from the user's terminal theme).
    #[default]
    Default,
    /// ANSI palette index. 0–7 are the standard colors, 8–15 bright.
    Ansi(u8),
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters.
    /// Combine with bitwise OR: `Attr::BOLD | Attr::REVERSE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD    = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM     = 1 << 1;
        /// SGR 7 — swap foreground and background.
        const REVERSE = 1 << 2;
    }
}

impl Attr {
    /// Whether no attributes are set.
    #[inline]
    #[must_use]
    pub const fn is_empty_flags(self) -> bool {
        self.bits() == 0
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// A cell's visual styling, separate from its character.
///
/// Paint calls take one of these instead of three loose parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground (text) color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Text attributes (bold, dim, reverse).
    pub attrs: Attr,
}

impl Style {
    /// Plain style: default colors, no attributes.
    pub const PLAIN: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// A style with the given foreground over the default background.
    #[inline]
    #[must_use]
    pub const fn fg(color: CellColor) -> Self {
        Self {
            fg: color,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Add attributes to this style.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell — the atom of rendering.
///
/// The pipeline's job is to produce a grid of these, diff it against the
/// previous frame, and emit minimal ANSI escapes for the changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character to display.
    pub ch: char,
    /// Foreground (text) color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Text attributes.
    pub attrs: Attr,
}

impl Cell {
    /// An empty cell: space character, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: CellColor::Default,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a cell with full styling.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, style: Style) -> Self {
        Self {
            ch,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
        }
    }

    /// Whether this cell is visually empty (space, default colors, no styling).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.ch == ' '
            && self.fg == CellColor::Default
            && self.bg == CellColor::Default
            && self.attrs.is_empty_flags()
    }

    /// Whether two cells share styling (colors and attributes), regardless
    /// of character content. The renderer uses this to decide whether new
    /// SGR sequences are needed when moving between cells.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
