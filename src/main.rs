// SPDX-License-Identifier: MIT
//
// wk — a weekly task board that lives in the terminal.
//
// This is the main binary that wires together all the crates:
//
//   wk-term  → terminal control, rendering, input parsing, event loop
//   wk-task  → board model, line editor, undo, view layer
//   wk-store → JSON persistence and ISO week arithmetic
//
// The TaskBoard struct implements wk-term's App trait, connecting the
// event loop to the board state. Each keypress flows through:
//
//   stdin → parser → on_key → normal-mode dispatch or the edit session
//   paint → view::render → framebuffer → diff renderer → terminal
//
// Three weeks are visible at once: the previous week (dimmed), the
// active week (where all editing happens), and the next week (dimmed).
// Every committed mutation is saved to disk immediately and recorded on
// the global undo stack; the line editor keeps its own local history
// for the duration of one edit.

use std::env;
use std::process;

use wk_store::Store;
use wk_store::week::{self, Direction};
use wk_task::editline::{EditCommand, EditOutcome, EditSession, EditTarget};
use wk_task::model::{Board, Task, Week, WeekKey};
use wk_task::scroll::clamp_into_view;
use wk_task::undo::UndoStack;
use wk_task::view::{self, BoardView, Layout};
use wk_term::ansi::CursorShape;
use wk_term::buffer::FrameBuffer;
use wk_term::event_loop::{Action, App, EventLoop};
use wk_term::input::{KeyCode, KeyEvent, Modifiers};

/// Text given to a freshly added task before the edit session opens.
const NEW_TASK_TEXT: &str = "New task";

// ─── TaskBoard ──────────────────────────────────────────────────────────────

/// The application controller.
///
/// Owns the board, the store, the view state (selection, scroll, reorder
/// flag, active week), the global undo stack, and the edit session when
/// one is open.
struct TaskBoard {
    store: Store,
    board: Board,
    active: WeekKey,

    /// Selected task index in the active week; `None` selects the title.
    selected: Option<usize>,
    /// First visible task row of the active list.
    scroll: usize,
    /// When set, Up/Down move the selected task instead of the selection.
    reorder: bool,

    /// The live edit session and what it is editing, if any.
    edit: Option<(EditTarget, EditSession)>,

    /// Global undo over whole-board snapshots.
    undo: UndoStack,

    /// A message for the bottom line. Cleared on the next keypress.
    message: Option<String>,
    message_is_error: bool,

    /// Screen position of the edit cursor from the last paint, used by
    /// the event loop to place the hardware cursor.
    cursor_screen: Option<(u16, u16)>,
}

impl TaskBoard {
    /// Create the controller, materializing the three visible weeks.
    ///
    /// The undo baseline is taken after the missing weeks are created, so
    /// a full unwind never deletes the buckets the screen is showing.
    fn new(store: Store, mut board: Board, active: WeekKey) -> Result<Self, serde_json::Error> {
        let mut changed = false;
        for key in visible_keys(&active) {
            if !board.contains_key(&key) {
                board.insert(key, week::default_week());
                changed = true;
            }
        }

        let startup_save_error = if changed {
            store.save(&board).err().map(|e| format!("save failed: {e}"))
        } else {
            None
        };

        let undo = UndoStack::new(&board)?;

        Ok(Self {
            store,
            board,
            active,
            selected: None,
            scroll: 0,
            reorder: false,
            edit: None,
            undo,
            message_is_error: startup_save_error.is_some(),
            message: startup_save_error,
            cursor_screen: None,
        })
    }

    // ── Messages ───────────────────────────────────────────────────────

    fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_is_error = true;
    }

    fn clear_message(&mut self) {
        self.message = None;
        self.message_is_error = false;
    }

    // ── Week access ────────────────────────────────────────────────────

    /// The neighbor key in `direction`, or the active key itself if the
    /// key is somehow malformed (which only hand-edited data could cause).
    fn neighbor_key(&self, direction: Direction) -> WeekKey {
        week::neighbor(&self.active, direction).unwrap_or_else(|| self.active.clone())
    }

    /// The active week, created on demand.
    fn active_week_mut(&mut self) -> &mut Week {
        self.board
            .entry(self.active.clone())
            .or_insert_with(week::default_week)
    }

    fn active_tasks_len(&self) -> usize {
        self.board.get(&self.active).map_or(0, |w| w.tasks.len())
    }

    /// Insert default buckets for any of the three visible weeks that are
    /// missing, saving if anything was created.
    fn ensure_weeks(&mut self) {
        let mut changed = false;
        for key in visible_keys(&self.active) {
            if !self.board.contains_key(&key) {
                self.board.insert(key, week::default_week());
                changed = true;
            }
        }
        if changed {
            if let Err(e) = self.store.save(&self.board) {
                self.set_error(format!("save failed: {e}"));
            }
        }
    }

    /// Clamp the selection to the active week's task count.
    fn clamp_selection(&mut self) {
        if let Some(i) = self.selected {
            let len = self.active_tasks_len();
            self.selected = if len == 0 { None } else { Some(i.min(len - 1)) };
        }
    }

    // ── Mutation commit ────────────────────────────────────────────────

    /// Persist the board after a mutation and record the undo snapshot.
    ///
    /// On a save failure the mutation is rolled back wholesale — the
    /// in-memory state must match what is on disk, not run ahead of it.
    /// Returns whether the mutation stuck.
    fn commit_mutation(&mut self, before: Board, before_selected: Option<usize>) -> bool {
        match self.store.save(&self.board) {
            Ok(()) => {
                if let Err(e) = self.undo.record(&self.board) {
                    self.set_error(format!("undo snapshot failed: {e}"));
                }
                true
            }
            Err(e) => {
                self.board = before;
                self.selected = before_selected;
                self.clamp_selection();
                self.set_error(format!("save failed: {e}"));
                false
            }
        }
    }

    // ── Normal-mode commands ───────────────────────────────────────────

    fn handle_normal(&mut self, key: &KeyEvent) -> Action {
        self.clear_message();

        match key.code {
            KeyCode::Char('u') if key.modifiers == Modifiers::CTRL => self.global_undo(),
            KeyCode::Char('r') if key.modifiers == Modifiers::CTRL => self.global_redo(),
            KeyCode::Char('q' | 'Q') if key.modifiers.is_empty() => return Action::Quit,
            KeyCode::Char('r' | 'R') if key.modifiers.is_empty() => {
                self.reorder = !self.reorder;
            }
            KeyCode::Tab if key.modifiers == Modifiers::SHIFT => self.cycle_state(false),
            KeyCode::Tab => self.cycle_state(true),
            KeyCode::Char('I') if key.modifiers.is_empty() => self.begin_edit(true),
            KeyCode::Enter => self.begin_edit(false),
            KeyCode::Up => self.move_up(),
            KeyCode::Char('k') if key.modifiers.is_empty() => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Char('j') if key.modifiers.is_empty() => self.move_down(),
            KeyCode::Left => self.switch_week(Direction::Previous),
            KeyCode::Char('h') if key.modifiers.is_empty() => {
                self.switch_week(Direction::Previous);
            }
            KeyCode::Right => self.switch_week(Direction::Next),
            KeyCode::Char('l') if key.modifiers.is_empty() => {
                self.switch_week(Direction::Next);
            }
            KeyCode::Char('a' | 'A') if key.modifiers.is_empty() => self.add_task(),
            KeyCode::Char('d' | 'D') if key.modifiers.is_empty() => self.delete_task(),
            KeyCode::Char('n' | 'N') if key.modifiers.is_empty() => {
                self.shift_task(Direction::Next);
            }
            KeyCode::Char('p' | 'P') if key.modifiers.is_empty() => {
                self.shift_task(Direction::Previous);
            }
            _ => {}
        }

        Action::Continue
    }

    fn move_up(&mut self) {
        if self.reorder {
            if let Some(i) = self.selected {
                if i > 0 {
                    let before = self.board.clone();
                    self.active_week_mut().tasks.swap(i - 1, i);
                    self.selected = Some(i - 1);
                    self.commit_mutation(before, Some(i));
                }
            }
            return;
        }

        let len = self.active_tasks_len();
        self.selected = match self.selected {
            // Up from the title wraps to the last task.
            None if len > 0 => Some(len - 1),
            None => None,
            Some(0) => Some(0),
            Some(i) => Some(i - 1),
        };
    }

    fn move_down(&mut self) {
        if self.reorder {
            if let Some(i) = self.selected {
                if i + 1 < self.active_tasks_len() {
                    let before = self.board.clone();
                    self.active_week_mut().tasks.swap(i, i + 1);
                    self.selected = Some(i + 1);
                    self.commit_mutation(before, Some(i));
                }
            }
            return;
        }

        let len = self.active_tasks_len();
        self.selected = match self.selected {
            None if len > 0 => Some(0),
            None => None,
            Some(i) if i + 1 < len => Some(i + 1),
            // Down past the last task wraps to the title.
            Some(_) => None,
        };
    }

    fn switch_week(&mut self, direction: Direction) {
        if let Some(key) = week::neighbor(&self.active, direction) {
            self.active = key;
            self.selected = None;
            self.scroll = 0;
            self.ensure_weeks();
        }
    }

    fn cycle_state(&mut self, forward: bool) {
        let Some(i) = self.selected else { return };
        if i >= self.active_tasks_len() {
            return;
        }

        let before = self.board.clone();
        let task = &mut self.active_week_mut().tasks[i];
        task.state = if forward {
            task.state.cycle_forward()
        } else {
            task.state.cycle_backward()
        };
        self.commit_mutation(before, Some(i));
    }

    fn add_task(&mut self) {
        let before = self.board.clone();
        let before_selected = self.selected;

        let week = self.active_week_mut();
        let pos = match before_selected {
            Some(i) if i < week.tasks.len() => i + 1,
            _ => week.tasks.len(),
        };
        week.tasks.insert(pos, Task::new(NEW_TASK_TEXT));
        self.selected = Some(pos);

        if self.commit_mutation(before, before_selected) {
            self.edit = Some((
                EditTarget::Task(pos),
                EditSession::new(NEW_TASK_TEXT, false),
            ));
        }
    }

    fn delete_task(&mut self) {
        let Some(i) = self.selected else { return };
        if i >= self.active_tasks_len() {
            return;
        }

        let before = self.board.clone();
        self.active_week_mut().tasks.remove(i);
        self.selected = i.checked_sub(1);
        self.commit_mutation(before, Some(i));
    }

    /// Move the selected task to the neighbor week, appending it there.
    fn shift_task(&mut self, direction: Direction) {
        let Some(i) = self.selected else { return };
        if i >= self.active_tasks_len() {
            return;
        }
        let Some(target) = week::neighbor(&self.active, direction) else {
            return;
        };

        let before = self.board.clone();
        let task = self.active_week_mut().tasks.remove(i);
        self.board
            .entry(target)
            .or_insert_with(week::default_week)
            .tasks
            .push(task);
        self.clamp_selection();
        self.commit_mutation(before, Some(i));
    }

    // ── Editing ────────────────────────────────────────────────────────

    fn begin_edit(&mut self, at_start: bool) {
        match self.selected {
            None => {
                let title = self
                    .board
                    .get(&self.active)
                    .map_or_else(|| week::DEFAULT_TITLE.to_string(), |w| w.title.clone());
                self.edit = Some((EditTarget::Title, EditSession::new(&title, at_start)));
            }
            Some(i) if i < self.active_tasks_len() => {
                let text = self.board[&self.active].tasks[i].text.clone();
                self.edit = Some((EditTarget::Task(i), EditSession::new(&text, at_start)));
            }
            Some(_) => {}
        }
    }

    fn handle_edit(&mut self, key: &KeyEvent) -> Action {
        let Some(cmd) = EditCommand::from_key(key) else {
            return Action::Continue;
        };
        let Some((target, session)) = self.edit.as_mut() else {
            return Action::Continue;
        };

        match session.apply(cmd) {
            None => {}
            Some(EditOutcome::Cancelled) => {
                self.edit = None;
                self.cursor_screen = None;
            }
            Some(EditOutcome::Committed(text)) => {
                let target = *target;
                self.edit = None;
                self.cursor_screen = None;
                self.commit_edit(target, text);
            }
        }

        Action::Continue
    }

    /// Write committed text back into the board.
    ///
    /// An unchanged commit is a pure no-op: nothing is saved and no undo
    /// snapshot is recorded.
    fn commit_edit(&mut self, target: EditTarget, text: String) {
        let before = self.board.clone();
        let before_selected = self.selected;

        let changed = match target {
            EditTarget::Title => {
                let week = self.active_week_mut();
                if week.title == text {
                    false
                } else {
                    week.title = text;
                    true
                }
            }
            EditTarget::Task(i) => {
                let week = self.active_week_mut();
                match week.tasks.get_mut(i) {
                    Some(task) if task.text != text => {
                        task.text = text;
                        true
                    }
                    _ => false,
                }
            }
        };

        if changed {
            self.commit_mutation(before, before_selected);
        }
    }

    // ── Global undo / redo ─────────────────────────────────────────────

    fn global_undo(&mut self) {
        let Some(board) = self.undo.undo() else { return };
        self.restore_snapshot(board, true);
    }

    fn global_redo(&mut self) {
        let Some(board) = self.undo.redo() else { return };
        self.restore_snapshot(board, false);
    }

    /// Persist and adopt a snapshot from the undo stack.
    ///
    /// If the save fails the pointer move is reverted, so the stack stays
    /// in step with the disk and the in-memory state.
    fn restore_snapshot(&mut self, board: Board, was_undo: bool) {
        match self.store.save(&board) {
            Ok(()) => {
                self.board = board;
                self.ensure_weeks();
                self.clamp_selection();
            }
            Err(e) => {
                if was_undo {
                    let _ = self.undo.redo();
                } else {
                    let _ = self.undo.undo();
                }
                self.set_error(format!("save failed: {e}"));
            }
        }
    }
}

/// The three week keys a frame shows, in display order.
fn visible_keys(active: &WeekKey) -> [WeekKey; 3] {
    let prev = week::neighbor(active, Direction::Previous).unwrap_or_else(|| active.clone());
    let next = week::neighbor(active, Direction::Next).unwrap_or_else(|| active.clone());
    [prev, active.clone(), next]
}

// ─── App impl ───────────────────────────────────────────────────────────────

impl App for TaskBoard {
    fn on_key(&mut self, key: &KeyEvent) -> Action {
        if self.edit.is_some() {
            self.handle_edit(key)
        } else {
            self.handle_normal(key)
        }
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        let layout = Layout::compute(frame.height());

        // Keep the selection inside the visible window (minimal scroll).
        if let Some(i) = self.selected {
            self.scroll = clamp_into_view(self.scroll, i, layout.active_visible_rows());
        } else {
            self.scroll = self.scroll.min(self.active_tasks_len());
        }

        let prev_key = self.neighbor_key(Direction::Previous);
        let next_key = self.neighbor_key(Direction::Next);
        let fallback = week::default_week();
        let prev = self.board.get(&prev_key).unwrap_or(&fallback);
        let active = self.board.get(&self.active).unwrap_or(&fallback);
        let next = self.board.get(&next_key).unwrap_or(&fallback);

        let board_view = BoardView {
            prev: (&prev_key, prev),
            active: (&self.active, active),
            next: (&next_key, next),
            selected: self.selected,
            scroll: self.scroll,
            reorder: self.reorder,
            message: self
                .message
                .as_deref()
                .map(|m| (m, self.message_is_error)),
        };

        self.cursor_screen = view::render(
            frame,
            &board_view,
            self.edit.as_mut().map(|(target, session)| (*target, session)),
        );
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        self.cursor_screen.map(|(x, y)| (x, y, CursorShape::SteadyBar))
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn print_help() {
    println!("wk — weekly task board");
    println!();
    println!("Keys:");
    println!("  ↑↓/kj     Move selection / reorder (when reorder mode is on)");
    println!("  r         Toggle reorder mode");
    println!("  ←→/hl     Previous / next week");
    println!("  Tab       Cycle task state forward");
    println!("  Shift+Tab Cycle task state backward");
    println!("  I         Edit selected item, cursor at start");
    println!("  Enter     Edit selected item, cursor at end");
    println!("  a         Add a task after the selection");
    println!("  d         Delete the selected task");
    println!("  n / p     Shift task to next / previous week");
    println!("  Ctrl+U    Undo last action");
    println!("  Ctrl+R    Redo last undone action");
    println!("  q         Quit");
    println!();
    println!("In edit mode:");
    println!("  Esc       Cancel the edit");
    println!("  Enter     Commit the edit");
    println!("  Esc+u/r   Undo / redo within the edit");
    println!("  Esc+b/f   Word jump left / right (also Option+←→)");
    println!("  Ctrl+A/E  Start / end of line");
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().skip(1).any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    let store = Store::open_default();
    let board = store.load().unwrap_or_else(|e| {
        eprintln!("wk: {e}");
        process::exit(1);
    });

    let mut app = TaskBoard::new(store, board, week::current()).unwrap_or_else(|e| {
        eprintln!("wk: cannot snapshot board: {e}");
        process::exit(1);
    });

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("wk: failed to initialize terminal: {e}");
        process::exit(1);
    });

    if let Err(e) = event_loop.run(&mut app) {
        eprintln!("wk: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
