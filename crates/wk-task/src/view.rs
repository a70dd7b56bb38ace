//! View — pure rendering of the board into a frame buffer.
//!
//! Everything here is a function of its inputs: the three visible weeks,
//! the view state, and an optional edit session. Nothing is mutated except
//! the frame buffer (and the edit session's horizontal scroll window,
//! which is render state by definition). Out-of-bounds draws are clipped
//! by the frame buffer cell by cell, so a cramped terminal degrades to a
//! partial layout instead of an error.
//!
//! Screen layout, top to bottom:
//!
//! ```text
//!   previous week title                 (dim)
//!   ──────────────────────────
//!   up to 4 of its tasks                (dim)
//!
//!   active week title                   (bold)
//!   ══════════════════════════
//!   the active task list                (scrolls; selection reversed)
//!   next week title                     (dim)
//!   ──────────────────────────
//!   up to 8 of its tasks                (dim)
//!   help bar / message                  (bottom row)
//! ```
//!
//! The selected task is the only word-wrapped line: split at the last
//! space before the wrap width (hard split when a single word exceeds
//! it), continuation lines indented by the status-prefix width. Everything
//! else is truncated with an ellipsis.

use wk_term::buffer::FrameBuffer;
use wk_term::cell::{Attr, CellColor, Style};

use crate::editline::{EditSession, EditTarget};
use crate::model::{Week, WeekKey};
use crate::state::PREFIX_WIDTH;

/// Left margin for all content rows, matching the historical layout.
pub const LEFT_MARGIN: u16 = 2;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Row assignments for one frame, derived from the terminal height.
///
/// All regions are `[start, end)` half-open row ranges. On terminals too
/// small for the full layout the ranges collapse and the frame buffer
/// clips whatever remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub prev_title_y: u16,
    pub prev_tasks_y: u16,
    pub prev_tasks_end: u16,
    pub active_title_y: u16,
    pub active_tasks_y: u16,
    pub active_tasks_end: u16,
    pub next_title_y: u16,
    pub next_tasks_y: u16,
    pub next_tasks_end: u16,
    pub help_y: u16,
}

impl Layout {
    /// Compute the layout for a terminal of `rows` lines.
    #[must_use]
    pub fn compute(rows: u16) -> Self {
        let help_y = rows.saturating_sub(1);
        // The next-week section is pinned near the bottom on tall
        // terminals and at a fixed offset on short ones.
        let next_tasks_y = if rows > 35 { rows - 12 } else { 21 };
        let next_title_y = next_tasks_y.saturating_sub(2);

        let active_title_y: u16 = 7;
        let active_tasks_y = active_title_y + 2;

        Self {
            prev_title_y: 0,
            prev_tasks_y: 2,
            prev_tasks_end: active_title_y.saturating_sub(1).min(help_y),
            active_title_y,
            active_tasks_y,
            active_tasks_end: next_title_y.min(help_y).max(active_tasks_y),
            next_title_y,
            next_tasks_y,
            next_tasks_end: help_y,
            help_y,
        }
    }

    /// Rows available to the active task list.
    ///
    /// This is the `visible_rows` the scroll controller clamps against —
    /// the draw region and the scroll window are the same range.
    #[must_use]
    pub const fn active_visible_rows(&self) -> usize {
        (self.active_tasks_end - self.active_tasks_y) as usize
    }
}

// ---------------------------------------------------------------------------
// BoardView
// ---------------------------------------------------------------------------

/// Everything the renderer needs for one frame.
pub struct BoardView<'a> {
    pub prev: (&'a WeekKey, &'a Week),
    pub active: (&'a WeekKey, &'a Week),
    pub next: (&'a WeekKey, &'a Week),
    /// Selected task index in the active week; `None` selects the title.
    pub selected: Option<usize>,
    /// First visible task index of the active list.
    pub scroll: usize,
    pub reorder: bool,
    /// Status message for the bottom row; `true` marks an error.
    pub message: Option<(&'a str, bool)>,
}

/// Paint one frame.
///
/// Returns the screen position for the hardware cursor when an edit
/// session is active, `None` otherwise.
pub fn render(
    frame: &mut FrameBuffer,
    view: &BoardView<'_>,
    edit: Option<(EditTarget, &mut EditSession)>,
) -> Option<(u16, u16)> {
    let layout = Layout::compute(frame.height());
    let width = frame.width();
    let dim = Style::PLAIN.with_attrs(Attr::DIM);
    let bold = Style::PLAIN.with_attrs(Attr::BOLD);

    let (edit_target, mut edit_session) = match edit {
        Some((target, session)) => (Some(target), Some(session)),
        None => (None, None),
    };
    let mut cursor = None;

    // ── Previous week ───────────────────────────────────────────────
    draw_week_title(frame, layout.prev_title_y, view.prev.0, &view.prev.1.title, dim);
    frame.fill_row(layout.prev_title_y + 1, '─', dim);
    draw_side_tasks(
        frame,
        view.prev.1,
        layout.prev_tasks_y,
        layout.prev_tasks_end,
        4,
    );

    // ── Active week title ───────────────────────────────────────────
    if edit_target == Some(EditTarget::Title) {
        // The title row shows the live edit buffer with a cursor.
        let prefix = format!("{} – ", view.active.0);
        frame.paint_text(LEFT_MARGIN, layout.active_title_y, &prefix, bold);
        #[allow(clippy::cast_possible_truncation)]
        let base_x = LEFT_MARGIN + prefix.chars().count() as u16;
        if let Some(session) = edit_session.as_mut() {
            cursor = draw_edit_line(frame, session, base_x, layout.active_title_y, Style::PLAIN);
        }
    } else {
        draw_week_title(
            frame,
            layout.active_title_y,
            view.active.0,
            &view.active.1.title,
            bold,
        );
    }
    frame.fill_row(layout.active_title_y + 1, '═', bold);

    // ── Active task list ────────────────────────────────────────────
    let wrap_width = usize::from(width).saturating_sub(16).max(8);
    let tasks = &view.active.1.tasks;
    let mut y = layout.active_tasks_y;
    let mut idx = view.scroll;

    while idx < tasks.len() && y < layout.active_tasks_end {
        let task = &tasks[idx];
        let state = task.state.style();

        if edit_target == Some(EditTarget::Task(idx)) {
            // The edited row shows the live buffer, prefix kept.
            frame.paint_text(LEFT_MARGIN, y, state.symbol, Style::fg(state.color));
            #[allow(clippy::cast_possible_truncation)]
            let base_x = LEFT_MARGIN + PREFIX_WIDTH as u16;
            if let Some(session) = edit_session.as_mut() {
                cursor = draw_edit_line(frame, session, base_x, y, Style::PLAIN);
            }
            y += 1;
        } else if view.selected == Some(idx) {
            let style = Style::fg(state.color).with_attrs(Attr::REVERSE);
            let full = format!("{}{}", state.symbol, task.text);
            for line in wrap_line(&full, wrap_width, PREFIX_WIDTH) {
                if y >= layout.active_tasks_end {
                    break;
                }
                frame.paint_text(LEFT_MARGIN, y, &line, style);
                y += 1;
            }
        } else {
            let style = Style::fg(state.color);
            let full = format!("{}{}", state.symbol, task.text);
            frame.paint_text(LEFT_MARGIN, y, &truncate(&full, wrap_width), style);
            y += 1;
        }

        idx += 1;
    }

    // ── Next week ───────────────────────────────────────────────────
    draw_week_title(frame, layout.next_title_y, view.next.0, &view.next.1.title, dim);
    frame.fill_row(layout.next_title_y + 1, '─', dim);
    draw_side_tasks(
        frame,
        view.next.1,
        layout.next_tasks_y,
        layout.next_tasks_end,
        8,
    );

    // ── Bottom row: message or help bar ─────────────────────────────
    match view.message {
        Some((text, true)) => {
            let style = Style::fg(CellColor::Ansi(1)).with_attrs(Attr::BOLD);
            frame.paint_text(0, layout.help_y, text, style);
        }
        Some((text, false)) => {
            frame.paint_text(0, layout.help_y, text, Style::PLAIN);
        }
        None => {
            let hint_after = view
                .selected
                .is_some_and(|i| i < view.active.1.tasks.len());
            let help = help_text(view.reorder, hint_after);
            frame.paint_text(0, layout.help_y, &help, dim);
        }
    }

    cursor
}

// ---------------------------------------------------------------------------
// Pieces
// ---------------------------------------------------------------------------

/// Draw a `key – title` heading, ellipsis-truncated to the frame width.
fn draw_week_title(frame: &mut FrameBuffer, y: u16, key: &WeekKey, title: &str, style: Style) {
    let label = format!("{key} – {title}");
    let budget = usize::from(frame.width()).saturating_sub(usize::from(LEFT_MARGIN) + 4);
    frame.paint_text(LEFT_MARGIN, y, &truncate(&label, budget), style);
}

/// Draw a non-active week's tasks: dim, truncated, capped at `max_tasks`,
/// with a `... more` row when the cap cut the list short.
fn draw_side_tasks(frame: &mut FrameBuffer, week: &Week, start: u16, end: u16, max_tasks: usize) {
    let budget = usize::from(frame.width()).saturating_sub(16).max(8);
    let mut y = start;
    let mut idx = 0;

    while idx < week.tasks.len() && idx < max_tasks && y < end {
        let task = &week.tasks[idx];
        let state = task.state.style();
        let style = Style::fg(state.color).with_attrs(Attr::DIM);
        let full = format!("{}{}", state.symbol, task.text);
        frame.paint_text(LEFT_MARGIN, y, &truncate(&full, budget), style);
        y += 1;
        idx += 1;
    }

    if idx < week.tasks.len() && y < end {
        frame.paint_text(LEFT_MARGIN, y, "... more", Style::PLAIN.with_attrs(Attr::DIM));
    }
}

/// Draw an edit session's visible window and return the cursor position.
fn draw_edit_line(
    frame: &mut FrameBuffer,
    session: &mut EditSession,
    base_x: u16,
    y: u16,
    style: Style,
) -> Option<(u16, u16)> {
    let budget = usize::from(frame.width()).saturating_sub(usize::from(base_x) + 2);
    let (visible, col) = session.window(budget);
    frame.paint_text(base_x, y, &visible, style);
    #[allow(clippy::cast_possible_truncation)]
    let col = col as u16;
    Some((base_x + col, y))
}

/// The help bar contents.
#[must_use]
pub fn help_text(reorder: bool, add_after_selected: bool) -> String {
    let mode = if reorder { " [REORDER]" } else { "" };
    let hint = if add_after_selected {
        " (after selected)"
    } else {
        " (at end)"
    };
    format!(
        "↑↓/kj:Move/Reorder{mode} | r:Reorder | ←→:Week | Tab/S-Tab:State | \
         I:Edit@start | a:Add{hint} | ⏎:Edit | d:Del | n/p:Shift | \
         Ctrl+U:Undo | Ctrl+R:Redo | q:Quit"
    )
}

// ---------------------------------------------------------------------------
// Text shaping
// ---------------------------------------------------------------------------

/// Word-wrap a line to `width` columns.
///
/// Splits at the last space before the width boundary, hard-splitting
/// when a single run has no space. Continuation lines are indented by
/// `indent` columns so wrapped text aligns under the first line's text,
/// not under its status prefix.
#[must_use]
pub fn wrap_line(full: &str, width: usize, indent: usize) -> Vec<String> {
    if width == 0 {
        return vec![full.to_string()];
    }
    if width <= indent {
        // Degenerate terminal: indentation would never converge, so fall
        // back to plain hard chunks.
        let chars: Vec<char> = full.chars().collect();
        return chars.chunks(width).map(|c| c.iter().collect()).collect();
    }

    let mut lines = Vec::new();
    let mut rem: Vec<char> = full.chars().collect();
    let mut min_split = 0;

    loop {
        if rem.len() <= width {
            lines.push(rem.iter().collect());
            break;
        }

        let split = rem[..width]
            .iter()
            .rposition(|&c| c == ' ')
            .filter(|&i| i > min_split)
            .unwrap_or(width);

        lines.push(rem[..split].iter().collect());

        let mut rest: Vec<char> = rem[split..].to_vec();
        let lead = rest.iter().take_while(|c| **c == ' ').count();
        rest.drain(..lead);
        if rest.is_empty() {
            break;
        }

        rem = std::iter::repeat_n(' ', indent).chain(rest).collect();
        min_split = indent;
    }

    lines
}

/// Ellipsis-truncate a line to at most `max` columns.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, Week};
    use crate::state::TaskState;
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> WeekKey {
        WeekKey::new(s.to_string())
    }

    fn week_with(titles: &[&str]) -> Week {
        let mut w = Week::new("Week title");
        for t in titles {
            w.tasks.push(Task::new(*t));
        }
        w
    }

    fn row_text(frame: &FrameBuffer, y: u16) -> String {
        frame
            .row(y)
            .unwrap()
            .iter()
            .map(|c| c.ch)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn render_simple(
        frame: &mut FrameBuffer,
        active: &Week,
        selected: Option<usize>,
        scroll: usize,
    ) -> Option<(u16, u16)> {
        let prev_key = key("2026-W31");
        let active_key = key("2026-W32");
        let next_key = key("2026-W33");
        let empty = Week::new("Week title");
        let view = BoardView {
            prev: (&prev_key, &empty),
            active: (&active_key, active),
            next: (&next_key, &empty),
            selected,
            scroll,
            reorder: false,
            message: None,
        };
        render(frame, &view, None)
    }

    // -- wrap_line ----------------------------------------------------------

    #[test]
    fn wrap_short_line_is_single() {
        assert_eq!(wrap_line("hello", 10, 4), vec!["hello"]);
    }

    #[test]
    fn wrap_exact_width_is_single() {
        assert_eq!(wrap_line("0123456789", 10, 4), vec!["0123456789"]);
    }

    #[test]
    fn wrap_splits_at_last_space_before_boundary() {
        // Exactly width+1 chars with a space at width-1: the first line
        // ends before that space.
        let line = "abcdefghi k"; // 11 chars, space at index 9
        let wrapped = wrap_line(line, 10, 4);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0], "abcdefghi");
        assert_eq!(wrapped[1], "    k");
    }

    #[test]
    fn wrap_continuations_are_indented() {
        let wrapped = wrap_line("[ ] one two three four five", 12, 4);
        assert!(wrapped.len() > 1);
        for cont in &wrapped[1..] {
            assert!(cont.starts_with("    "), "not indented: {cont:?}");
        }
    }

    #[test]
    fn wrap_hard_splits_spaceless_run() {
        let wrapped = wrap_line("abcdefghijklmno", 6, 4);
        assert_eq!(wrapped[0], "abcdef");
        assert!(wrapped.len() > 1);
    }

    #[test]
    fn wrap_every_line_fits_width() {
        let wrapped = wrap_line("[ ] a fairly long task description for wrap", 14, 4);
        for line in &wrapped {
            assert!(line.chars().count() <= 14, "too long: {line:?}");
        }
    }

    #[test]
    fn wrap_preserves_all_words() {
        let text = "[ ] alpha beta gamma delta epsilon";
        let wrapped = wrap_line(text, 12, 4);
        let joined = wrapped.join(" ");
        for word in ["alpha", "beta", "gamma", "delta", "epsilon"] {
            assert!(joined.contains(word), "lost {word:?}");
        }
    }

    #[test]
    fn wrap_degenerate_width_hard_chunks() {
        let wrapped = wrap_line("aaaa bbbb", 3, 4);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 3));
    }

    // -- truncate -----------------------------------------------------------

    #[test]
    fn truncate_short_is_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_gets_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    // -- Layout -------------------------------------------------------------

    #[test]
    fn layout_on_standard_terminal() {
        let l = Layout::compute(24);
        assert_eq!(l.active_title_y, 7);
        assert_eq!(l.active_tasks_y, 9);
        assert_eq!(l.next_tasks_y, 21);
        assert_eq!(l.next_title_y, 19);
        assert_eq!(l.help_y, 23);
        assert_eq!(l.active_visible_rows(), 10);
    }

    #[test]
    fn layout_on_tall_terminal_pins_next_week_low() {
        let l = Layout::compute(50);
        assert_eq!(l.next_tasks_y, 38);
        assert_eq!(l.active_visible_rows(), (38 - 2 - 9) as usize);
    }

    #[test]
    fn layout_scroll_window_equals_draw_region() {
        for rows in [20, 24, 36, 60] {
            let l = Layout::compute(rows);
            assert_eq!(
                l.active_visible_rows(),
                usize::from(l.active_tasks_end - l.active_tasks_y)
            );
        }
    }

    #[test]
    fn layout_tiny_terminal_does_not_underflow() {
        let l = Layout::compute(5);
        assert!(l.active_tasks_end >= l.active_tasks_y);
        let _ = l.active_visible_rows();
    }

    // -- render -------------------------------------------------------------

    #[test]
    fn renders_week_titles() {
        let mut frame = FrameBuffer::new(80, 24);
        let active = week_with(&["one"]);
        render_simple(&mut frame, &active, None, 0);
        assert!(row_text(&frame, 0).contains("2026-W31"));
        assert!(row_text(&frame, 7).contains("2026-W32"));
        assert!(row_text(&frame, 19).contains("2026-W33"));
    }

    #[test]
    fn renders_separators() {
        let mut frame = FrameBuffer::new(80, 24);
        let active = week_with(&[]);
        render_simple(&mut frame, &active, None, 0);
        assert!(row_text(&frame, 1).starts_with('─'));
        assert!(row_text(&frame, 8).starts_with('═'));
    }

    #[test]
    fn renders_tasks_with_status_prefixes() {
        let mut frame = FrameBuffer::new(80, 24);
        let mut active = week_with(&["write code", "ship it"]);
        active.tasks[1].state = TaskState::Done;
        render_simple(&mut frame, &active, None, 0);
        assert_eq!(row_text(&frame, 9), "  [ ] write code");
        assert_eq!(row_text(&frame, 10), "  [x] ship it");
    }

    #[test]
    fn selected_task_is_reversed() {
        let mut frame = FrameBuffer::new(80, 24);
        let active = week_with(&["a", "b"]);
        render_simple(&mut frame, &active, Some(1), 0);
        let cell = frame.get(LEFT_MARGIN, 10).unwrap();
        assert!(cell.attrs.contains(Attr::REVERSE));
        let unselected = frame.get(LEFT_MARGIN, 9).unwrap();
        assert!(!unselected.attrs.contains(Attr::REVERSE));
    }

    #[test]
    fn selected_long_task_wraps() {
        let mut frame = FrameBuffer::new(40, 24);
        let active = week_with(&["a very long task description that wraps around"]);
        render_simple(&mut frame, &active, Some(0), 0);
        // Continuation line indented under the text.
        assert!(!row_text(&frame, 10).trim_start().is_empty());
        assert!(row_text(&frame, 10).starts_with("      ")); // margin + indent
    }

    #[test]
    fn unselected_long_task_truncates() {
        let mut frame = FrameBuffer::new(40, 24);
        let active = week_with(&["a very long task description that would wrap"]);
        render_simple(&mut frame, &active, None, 0);
        assert!(row_text(&frame, 9).ends_with("..."));
        assert_eq!(row_text(&frame, 10), "");
    }

    #[test]
    fn scroll_offsets_task_window() {
        let mut frame = FrameBuffer::new(80, 24);
        let names: Vec<String> = (0..30).map(|i| format!("task {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let active = week_with(&refs);
        render_simple(&mut frame, &active, Some(15), 6);
        assert_eq!(row_text(&frame, 9), "  [ ] task 6");
    }

    #[test]
    fn side_week_shows_more_indicator() {
        let mut frame = FrameBuffer::new(80, 40);
        let prev_key = key("2026-W31");
        let active_key = key("2026-W32");
        let next_key = key("2026-W33");
        let many = week_with(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        let active = week_with(&[]);
        let view = BoardView {
            prev: (&prev_key, &active),
            active: (&active_key, &active),
            next: (&next_key, &many),
            selected: None,
            scroll: 0,
            reorder: false,
            message: None,
        };
        render(&mut frame, &view, None);
        // Next week caps at 8 tasks, then the indicator row.
        let l = Layout::compute(40);
        assert_eq!(row_text(&frame, l.next_tasks_y + 8), "  ... more");
    }

    #[test]
    fn help_bar_on_bottom_row() {
        let mut frame = FrameBuffer::new(200, 24);
        let active = week_with(&[]);
        render_simple(&mut frame, &active, None, 0);
        assert!(row_text(&frame, 23).contains("q:Quit"));
        assert!(row_text(&frame, 23).contains("Ctrl+U:Undo"));
    }

    #[test]
    fn message_replaces_help_bar() {
        let mut frame = FrameBuffer::new(80, 24);
        let active = week_with(&[]);
        let active_key = key("2026-W32");
        let empty = Week::new("Week title");
        let prev_key = key("2026-W31");
        let next_key = key("2026-W33");
        let view = BoardView {
            prev: (&prev_key, &empty),
            active: (&active_key, &active),
            next: (&next_key, &empty),
            selected: None,
            scroll: 0,
            reorder: false,
            message: Some(("save failed: disk full", true)),
        };
        render(&mut frame, &view, None);
        assert!(row_text(&frame, 23).contains("save failed"));
    }

    #[test]
    fn no_edit_means_no_cursor() {
        let mut frame = FrameBuffer::new(80, 24);
        let active = week_with(&["a"]);
        assert_eq!(render_simple(&mut frame, &active, Some(0), 0), None);
    }

    #[test]
    fn editing_task_places_cursor() {
        let mut frame = FrameBuffer::new(80, 24);
        let active = week_with(&["hello"]);
        let prev_key = key("2026-W31");
        let active_key = key("2026-W32");
        let next_key = key("2026-W33");
        let empty = Week::new("Week title");
        let view = BoardView {
            prev: (&prev_key, &empty),
            active: (&active_key, &active),
            next: (&next_key, &empty),
            selected: Some(0),
            scroll: 0,
            reorder: false,
            message: None,
        };
        let mut session = EditSession::new("hello", false);
        let cursor = render(&mut frame, &view, Some((EditTarget::Task(0), &mut session)));
        // Margin 2 + prefix 4 + cursor at end of "hello" = column 11.
        assert_eq!(cursor, Some((11, 9)));
        assert_eq!(row_text(&frame, 9), "  [ ] hello");
    }

    #[test]
    fn editing_title_places_cursor_after_prefix() {
        let mut frame = FrameBuffer::new(80, 24);
        let active = week_with(&[]);
        let prev_key = key("2026-W31");
        let active_key = key("2026-W32");
        let next_key = key("2026-W33");
        let empty = Week::new("Week title");
        let view = BoardView {
            prev: (&prev_key, &empty),
            active: (&active_key, &active),
            next: (&next_key, &empty),
            selected: None,
            scroll: 0,
            reorder: false,
            message: None,
        };
        let mut session = EditSession::new("T", true);
        let cursor = render(&mut frame, &view, Some((EditTarget::Title, &mut session)));
        // Margin 2 + "2026-W32 – " (11 chars) = column 13, cursor at start.
        assert_eq!(cursor, Some((13, 7)));
        assert!(row_text(&frame, 7).contains("2026-W32 – T"));
    }

    // -- help_text ----------------------------------------------------------

    #[test]
    fn help_text_shows_reorder_badge() {
        assert!(help_text(true, false).contains("[REORDER]"));
        assert!(!help_text(false, false).contains("[REORDER]"));
    }

    #[test]
    fn help_text_add_hint_tracks_selection() {
        assert!(help_text(false, true).contains("(after selected)"));
        assert!(help_text(false, false).contains("(at end)"));
    }
}
