//! Data model — tasks, weeks, and the board.
//!
//! The board is a map from week keys to weeks; a week is a title plus an
//! ordered task list. Ordering is significant and caller-controlled (the
//! reorder mode moves tasks by explicit index).
//!
//! `WeekKey` is an opaque ordered token here. Its format (`YYYY-Www`,
//! zero-padded so lexicographic order is chronological order) and the
//! neighbor arithmetic live in the store crate — the core never parses it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::TaskState;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A single task: its text and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    pub state: TaskState,
}

impl Task {
    /// A fresh task in the initial state.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: TaskState::Todo,
        }
    }
}

// ---------------------------------------------------------------------------
// Week
// ---------------------------------------------------------------------------

/// One week's bucket: an editable title and an ordered task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub title: String,
    pub tasks: Vec<Task>,
}

impl Week {
    /// An empty week with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tasks: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// WeekKey
// ---------------------------------------------------------------------------

/// Opaque ordered key identifying a week (`YYYY-Www`).
///
/// The core treats this as a comparable token; parsing and neighbor
/// arithmetic are the store's business.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekKey(String);

impl WeekKey {
    /// Wrap a raw key string.
    #[must_use]
    pub const fn new(raw: String) -> Self {
        Self(raw)
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WeekKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The whole data set: every week that has ever been touched.
///
/// This is the unit the global undo stack snapshots and the unit the store
/// persists. A `BTreeMap` keeps the on-disk JSON in chronological order.
pub type Board = BTreeMap<WeekKey, Week>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> WeekKey {
        WeekKey::new(s.to_string())
    }

    #[test]
    fn new_task_starts_todo() {
        let t = Task::new("write tests");
        assert_eq!(t.text, "write tests");
        assert_eq!(t.state, TaskState::Todo);
    }

    #[test]
    fn new_week_is_empty() {
        let w = Week::new("Week title");
        assert_eq!(w.title, "Week title");
        assert!(w.tasks.is_empty());
    }

    #[test]
    fn week_keys_order_chronologically() {
        // Zero-padded weeks sort correctly as strings.
        assert!(key("2025-W02") < key("2025-W10"));
        assert!(key("2025-W52") < key("2026-W01"));
    }

    #[test]
    fn board_iterates_in_key_order() {
        let mut board = Board::new();
        board.insert(key("2026-W02"), Week::new("b"));
        board.insert(key("2026-W01"), Week::new("a"));
        let titles: Vec<&str> = board.values().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn task_serde_shape() {
        let t = Task::new("x");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"text":"x","state":"TO-DO"}"#);
    }

    #[test]
    fn week_serde_round_trip() {
        let mut w = Week::new("Planning");
        w.tasks.push(Task::new("a"));
        w.tasks.push(Task {
            text: "b".to_string(),
            state: TaskState::Done,
        });

        let json = serde_json::to_string(&w).unwrap();
        let back: Week = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn week_key_serializes_transparently() {
        let json = serde_json::to_string(&key("2026-W32")).unwrap();
        assert_eq!(json, "\"2026-W32\"");
    }

    #[test]
    fn board_serde_round_trip() {
        let mut board = Board::new();
        let mut w = Week::new("t");
        w.tasks.push(Task::new("task"));
        board.insert(key("2026-W32"), w);

        let json = serde_json::to_string(&board).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn board_reads_historical_json() {
        // The format the curses-era data files used.
        let json = r#"{
            "2024-W15": {
                "title": "Spring cleaning",
                "tasks": [
                    {"text": "windows", "state": "COMPLETED"},
                    {"text": "gutters", "state": "PENDING"}
                ]
            }
        }"#;
        let board: Board = serde_json::from_str(json).unwrap();
        let week = &board[&key("2024-W15")];
        assert_eq!(week.tasks.len(), 2);
        assert_eq!(week.tasks[0].state, TaskState::Done);
        assert_eq!(week.tasks[1].state, TaskState::Pending);
    }
}
