use std::borrow::Cow;
use std::time::Duration;

use similar::{Algorithm, ChangeTag, TextDiff as LineDiff};

use crate::core::models::diff_result::{TextDiff, TextDiffLine};

/// Upper bound on diff time; past it the result is still correct but
/// may not be minimal.
const DIFF_TIMEOUT: Duration = Duration::from_secs(2);

/// Line diff of two texts.
///
/// A missing final newline does not count as a difference.
pub fn diff_lines(left_name: &str, left: &str, right_name: &str, right: &str) -> TextDiff {
    let (left, right) = (terminated(left), terminated(right));

    let lines = LineDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(DIFF_TIMEOUT)
        .diff_lines(left.as_ref(), right.as_ref())
        .iter_all_changes()
        .map(|change| {
            let line = change.value().trim_end_matches(['\r', '\n']).to_string();
            match change.tag() {
                ChangeTag::Equal => TextDiffLine::Same(line),
                ChangeTag::Delete => TextDiffLine::Left(line),
                ChangeTag::Insert => TextDiffLine::Right(line),
            }
        })
        .collect();

    TextDiff {
        left_name: left_name.to_string(),
        right_name: right_name.to_string(),
        lines,
    }
}

fn terminated(text: &str) -> Cow<'_, str> {
    if text.is_empty() || text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{text}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TextDiffLine::{Left, Right, Same};

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn identical_texts() {
        let diff = diff_lines("l", "a = 1\nb = 2\n", "r", "a = 1\nb = 2\n");

        assert!(diff.is_identical());
        assert_eq!(diff.lines.len(), 2);
    }

    #[test]
    fn changed_line_shows_both_sides() {
        let diff = diff_lines("l", "a = 1\nb = 2\nc = 3\n", "r", "a = 1\nb = 9\nc = 3\n");

        assert_eq!(
            diff.lines,
            vec![
                Same(s("a = 1")),
                Left(s("b = 2")),
                Right(s("b = 9")),
                Same(s("c = 3")),
            ]
        );
    }

    #[test]
    fn added_and_removed_tails() {
        let diff = diff_lines("l", "a = 1\nold = x\n", "r", "a = 1\nnew = y\nz = 1\n");

        assert_eq!(
            diff.lines,
            vec![
                Same(s("a = 1")),
                Left(s("old = x")),
                Right(s("new = y")),
                Right(s("z = 1")),
            ]
        );
    }

    #[test]
    fn missing_final_newline_is_not_a_change() {
        let diff = diff_lines("l", "a = 1\nb = 2", "r", "a = 1\nb = 2\n");

        assert!(diff.is_identical());
    }

    #[test]
    fn long_texts_diff_line_by_line() {
        let left: String = (0..2_000).map(|i| format!("k{i} = a\n")).collect();
        let right: String = (0..2_000).map(|i| format!("k{i} = b\n")).collect();

        let diff = diff_lines("l", &left, "r", &right);

        assert_eq!(diff.lines.len(), 4_000);
        assert!(!diff.lines.iter().any(|l| matches!(l, Same(_))));
    }

    #[test]
    fn one_side_empty() {
        let diff = diff_lines("l", "", "r", "a = 1\n");

        assert_eq!(diff.lines, vec![Right(s("a = 1"))]);
        assert_eq!(diff.left_name, "l");
        assert_eq!(diff.right_name, "r");
    }
}
