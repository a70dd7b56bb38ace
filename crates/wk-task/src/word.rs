//! Word motions for the line editor.
//!
//! Two motions only, matching what the edit keys need:
//!
//! - **left**: skip whitespace behind the cursor, then skip the word
//!   before it — lands on the start of the previous word.
//! - **right**: skip the word under the cursor, then the whitespace after
//!   it — lands on the start of the next word (or the end of the line).
//!
//! Word boundaries are blank vs non-blank; the single-line editor has no
//! use for the finer punctuation classes a full editor distinguishes.

/// Jump left to the start of the previous word.
#[must_use]
pub fn jump_left(chars: &[char], pos: usize) -> usize {
    let mut pos = pos.min(chars.len());

    // Skip whitespace.
    while pos > 0 && chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    // Skip word.
    while pos > 0 && !chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    pos
}

/// Jump right past the current word to the start of the next.
#[must_use]
pub fn jump_right(chars: &[char], pos: usize) -> usize {
    let mut pos = pos.min(chars.len());

    // Skip word.
    while pos < chars.len() && !chars[pos].is_whitespace() {
        pos += 1;
    }
    // Skip whitespace.
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    pos
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    // -- jump_left ----------------------------------------------------------

    #[test]
    fn left_from_end_of_single_word() {
        assert_eq!(jump_left(&chars("hello"), 5), 0);
    }

    #[test]
    fn left_from_middle_of_word() {
        assert_eq!(jump_left(&chars("hello"), 3), 0);
    }

    #[test]
    fn left_over_space_lands_on_word_start() {
        // "hello world", cursor at end → start of "world".
        assert_eq!(jump_left(&chars("hello world"), 11), 6);
    }

    #[test]
    fn left_from_word_start_jumps_to_previous_word() {
        assert_eq!(jump_left(&chars("hello world"), 6), 0);
    }

    #[test]
    fn left_skips_multiple_spaces() {
        assert_eq!(jump_left(&chars("a   b"), 4), 0);
    }

    #[test]
    fn left_at_start_is_noop() {
        assert_eq!(jump_left(&chars("hello"), 0), 0);
    }

    #[test]
    fn left_on_empty_line() {
        assert_eq!(jump_left(&[], 0), 0);
    }

    #[test]
    fn left_clamps_out_of_range_pos() {
        assert_eq!(jump_left(&chars("ab"), 99), 0);
    }

    // -- jump_right ---------------------------------------------------------

    #[test]
    fn right_from_start_of_single_word() {
        assert_eq!(jump_right(&chars("hello"), 0), 5);
    }

    #[test]
    fn right_lands_on_next_word_start() {
        assert_eq!(jump_right(&chars("hello world"), 0), 6);
    }

    #[test]
    fn right_from_middle_of_word() {
        assert_eq!(jump_right(&chars("hello world"), 3), 6);
    }

    #[test]
    fn right_skips_multiple_spaces() {
        assert_eq!(jump_right(&chars("a   b"), 0), 4);
    }

    #[test]
    fn right_at_end_is_noop() {
        assert_eq!(jump_right(&chars("hello"), 5), 5);
    }

    #[test]
    fn right_on_last_word_stops_at_end() {
        assert_eq!(jump_right(&chars("hello world"), 6), 11);
    }

    #[test]
    fn right_on_empty_line() {
        assert_eq!(jump_right(&[], 0), 0);
    }

    // -- Round trips --------------------------------------------------------

    #[test]
    fn left_then_right_over_two_words() {
        let line = chars("one two");
        let at_two = jump_left(&line, 7);
        assert_eq!(at_two, 4);
        assert_eq!(jump_right(&line, jump_left(&line, at_two)), 4);
    }
}
