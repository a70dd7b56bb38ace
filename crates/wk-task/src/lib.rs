//! # wk-task — Board core for wk
//!
//! This crate contains the fundamental building blocks of the task board:
//!
//! - **[`state`]** — the three-way task state and its display mapping
//! - **[`model`]** — `Task`, `Week`, `WeekKey`, and the `Board` map
//! - **[`history`]** — the bounded snapshot ring behind both undo systems
//! - **[`scroll`]** — the minimal-scroll algorithm shared by the task list
//!   and the edit line's horizontal window
//! - **[`word`]** — word-jump motions for the line editor
//! - **[`editline`]** — the single-line edit session and its command set
//! - **[`undo`]** — whole-board undo/redo over serialized snapshots
//! - **[`view`]** — pure rendering of the board into a frame buffer

pub mod editline;
pub mod history;
pub mod model;
pub mod scroll;
pub mod state;
pub mod undo;
pub mod view;
pub mod word;
