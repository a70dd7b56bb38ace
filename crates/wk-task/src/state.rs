//! Task state — the three-way cyclic status and its display mapping.
//!
//! Every task is in exactly one of three states. Tab cycles forward
//! through them, Shift+Tab backward. Each state carries a fixed-width
//! status symbol and a color; the mapping is one exhaustive `const`
//! match, so adding a state without a symbol or color is a compile error.
//!
//! The serialized names (`TO-DO`, `PENDING`, `COMPLETED`) match the
//! on-disk JSON format this board has always used.

use serde::{Deserialize, Serialize};
use wk_term::cell::CellColor;

// ---------------------------------------------------------------------------
// TaskState
// ---------------------------------------------------------------------------

/// The lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// Not started.
    #[serde(rename = "TO-DO")]
    Todo,
    /// Started but not finished.
    #[serde(rename = "PENDING")]
    Pending,
    /// Finished.
    #[serde(rename = "COMPLETED")]
    Done,
}

/// Display properties of a task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateStyle {
    /// Status prefix, always [`PREFIX_WIDTH`] columns including the
    /// trailing space.
    pub symbol: &'static str,
    /// Foreground color for the whole task row.
    pub color: CellColor,
}

/// Width of the status prefix in columns. Fixed so the edit cursor offset
/// is the same for every state.
pub const PREFIX_WIDTH: usize = 4;

impl TaskState {
    /// The next state in the cycle: Todo → Pending → Done → Todo.
    #[must_use]
    pub const fn cycle_forward(self) -> Self {
        match self {
            Self::Todo => Self::Pending,
            Self::Pending => Self::Done,
            Self::Done => Self::Todo,
        }
    }

    /// The previous state in the cycle: Todo → Done → Pending → Todo.
    #[must_use]
    pub const fn cycle_backward(self) -> Self {
        match self {
            Self::Todo => Self::Done,
            Self::Pending => Self::Todo,
            Self::Done => Self::Pending,
        }
    }

    /// Symbol and color for this state.
    #[must_use]
    pub const fn style(self) -> StateStyle {
        match self {
            Self::Todo => StateStyle {
                symbol: "[ ] ",
                color: CellColor::Ansi(1), // red
            },
            Self::Pending => StateStyle {
                symbol: "[~] ",
                color: CellColor::Ansi(4), // blue
            },
            Self::Done => StateStyle {
                symbol: "[x] ",
                color: CellColor::Ansi(2), // green
            },
        }
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Todo
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
