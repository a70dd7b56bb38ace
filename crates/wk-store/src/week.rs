//! ISO week keys — the calendar arithmetic behind bucket identity.
//!
//! A week key is `YYYY-Www` from the ISO 8601 week calendar (`2026-W32`).
//! Zero-padding makes lexicographic order chronological, which is what
//! lets the board use plain string keys in an ordered map.
//!
//! The core never parses a key; everything calendar-shaped funnels
//! through here. Neighbor arithmetic goes via `NaiveDate` so year
//! boundaries and 53-week years come out right instead of being
//! hand-rolled.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use wk_task::model::{Week, WeekKey};

/// Title given to weeks created on demand.
pub const DEFAULT_TITLE: &str = "Week title";

/// Which neighbor of a week to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// The key for the week containing today.
#[must_use]
pub fn current() -> WeekKey {
    from_date(Local::now().date_naive())
}

/// The key for the week containing `date`.
#[must_use]
pub fn from_date(date: NaiveDate) -> WeekKey {
    let iso = date.iso_week();
    WeekKey::new(format!("{:04}-W{:02}", iso.year(), iso.week()))
}

/// The Monday of the week a key names, or `None` for a malformed key.
#[must_use]
pub fn parse(key: &WeekKey) -> Option<NaiveDate> {
    let (year, week) = key.as_str().split_once("-W")?;
    let year: i32 = year.parse().ok()?;
    let week: u32 = week.parse().ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

/// The previous or next week's key.
///
/// Pure and deterministic. Returns `None` only for a malformed key or a
/// date outside the supported calendar range.
#[must_use]
pub fn neighbor(key: &WeekKey, direction: Direction) -> Option<WeekKey> {
    let monday = parse(key)?;
    let delta = match direction {
        Direction::Previous => Duration::weeks(-1),
        Direction::Next => Duration::weeks(1),
    };
    Some(from_date(monday.checked_add_signed(delta)?))
}

/// The bucket supplied for a key with no existing entry.
#[must_use]
pub fn default_week() -> Week {
    Week::new(DEFAULT_TITLE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
