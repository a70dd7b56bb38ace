//! Global undo — whole-board snapshots, bounded depth.
//!
//! Every committed mutation (state cycle, add, delete, reorder, shift to a
//! neighbor week, text commit) records the resulting board as a serialized
//! snapshot. Undo steps back through those snapshots; redo steps forward.
//! This stack is completely independent of the line editor's local
//! history, and cancelling an edit never touches it.
//!
//! The depth bound counts *undoable steps*: with [`MAX_UNDO`] = 20 the
//! ring retains up to 21 snapshots (the baseline plus 20 mutations), so
//! 20 consecutive mutations can be unwound all the way back to the
//! baseline. Recording a 21st mutation drops the oldest snapshot.
//!
//! Snapshots are the board serialized to JSON — the same bytes the store
//! writes to disk, which makes a snapshot restore and a file reload
//! interchangeable.

use crate::history::SnapshotRing;
use crate::model::Board;

/// Maximum number of undoable steps.
pub const MAX_UNDO: usize = 20;

// ---------------------------------------------------------------------------
// UndoStack
// ---------------------------------------------------------------------------

/// Bounded undo/redo over serialized board snapshots.
#[derive(Debug)]
pub struct UndoStack {
    ring: SnapshotRing<String>,
}

impl UndoStack {
    /// Create a stack seeded with the baseline board.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the board cannot be encoded
    /// (not expected for well-formed boards).
    pub fn new(baseline: &Board) -> Result<Self, serde_json::Error> {
        Ok(Self {
            ring: SnapshotRing::new(MAX_UNDO + 1, serde_json::to_string(baseline)?),
        })
    }

    /// Record the board after a committed mutation.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the board cannot be encoded;
    /// nothing is recorded in that case.
    pub fn record(&mut self, board: &Board) -> Result<(), serde_json::Error> {
        self.ring.push(serde_json::to_string(board)?);
        Ok(())
    }

    /// Step back one snapshot and return the board to restore.
    ///
    /// Returns `None` at the history boundary. A snapshot that fails to
    /// decode (which would mean we serialized garbage) also yields `None`.
    pub fn undo(&mut self) -> Option<Board> {
        self.ring.undo().and_then(|s| serde_json::from_str(s).ok())
    }

    /// Step forward one snapshot and return the board to restore.
    ///
    /// Returns `None` at the history boundary.
    pub fn redo(&mut self) -> Option<Board> {
        self.ring.redo().and_then(|s| serde_json::from_str(s).ok())
    }

    /// True if a step back is possible.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.ring.can_undo()
    }

    /// True if a step forward is possible.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.ring.can_redo()
    }

    /// Number of stored snapshots (baseline included).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ring.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, Week, WeekKey};
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> WeekKey {
        WeekKey::new(s.to_string())
    }

    fn board_with_tasks(count: usize) -> Board {
        let mut week = Week::new("w");
        for i in 0..count {
            week.tasks.push(Task::new(format!("task {i}")));
        }
        let mut board = Board::new();
        board.insert(key("2026-W01"), week);
        board
    }

    #[test]
    fn fresh_stack_has_nothing_to_undo() {
        let stack = UndoStack::new(&board_with_tasks(0)).unwrap();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn undo_restores_previous_board() {
        let initial = board_with_tasks(0);
        let mut stack = UndoStack::new(&initial).unwrap();

        let mutated = board_with_tasks(1);
        stack.record(&mutated).unwrap();

        assert_eq!(stack.undo(), Some(initial));
        assert!(!stack.can_undo());
    }

    #[test]
    fn redo_restores_mutated_board() {
        let initial = board_with_tasks(0);
        let mutated = board_with_tasks(1);
        let mut stack = UndoStack::new(&initial).unwrap();
        stack.record(&mutated).unwrap();

        stack.undo();
        assert_eq!(stack.redo(), Some(mutated));
        assert!(!stack.can_redo());
    }

    #[test]
    fn undo_at_boundary_is_none() {
        let mut stack = UndoStack::new(&board_with_tasks(0)).unwrap();
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn twenty_mutations_fully_unwind_to_baseline() {
        let initial = board_with_tasks(0);
        let mut stack = UndoStack::new(&initial).unwrap();

        for i in 1..=MAX_UNDO {
            stack.record(&board_with_tasks(i)).unwrap();
        }
        assert_eq!(stack.depth(), MAX_UNDO + 1);

        for _ in 0..MAX_UNDO - 1 {
            assert!(stack.undo().is_some());
        }
        // The 20th undo lands on the baseline; a 21st is a no-op.
        assert_eq!(stack.undo(), Some(initial));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn twenty_first_mutation_drops_the_baseline() {
        let mut stack = UndoStack::new(&board_with_tasks(0)).unwrap();
        for i in 1..=MAX_UNDO + 1 {
            stack.record(&board_with_tasks(i)).unwrap();
        }
        assert_eq!(stack.depth(), MAX_UNDO + 1);

        // Unwinding everything now bottoms out at the first mutation,
        // not the baseline.
        let mut last = None;
        while let Some(board) = stack.undo() {
            last = Some(board);
        }
        assert_eq!(last, Some(board_with_tasks(1)));
    }

    #[test]
    fn record_after_undo_discards_redo_branch() {
        let mut stack = UndoStack::new(&board_with_tasks(0)).unwrap();
        stack.record(&board_with_tasks(1)).unwrap();
        stack.undo();
        assert!(stack.can_redo());

        stack.record(&board_with_tasks(2)).unwrap();
        assert!(!stack.can_redo());
        assert_eq!(stack.undo(), Some(board_with_tasks(0)));
    }
}
