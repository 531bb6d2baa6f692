//! Divide-and-conquer longest-common-subsequence marking.
//!
//! `calc_changes` is the Hirschberg-style routine that, given two line
//! slices, marks every line that does not belong to their longest common
//! subsequence as "changed" in one of two caller-owned bitmaps. It never
//! materializes the alignment itself, only the per-line changed bits,
//! which is all the ed-script generator needs.

use crate::slice::{trim, LineSlice};

/// Which way to walk the two slices while filling in an LCS-length row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Walk both slices from their first line to their last.
    Forward,
    /// Walk both slices from their last line to their first.
    Backward,
}

/// Compute the final row of the LCS-length dynamic-programming table
/// between `a` and `b`, walking both in the given `direction`.
///
/// Runs in `O(|a| * |b|)` time and `O(|b|)` space. The returned vector has
/// length `b.len() + 1` and is indexed `0..=b.len()`.
pub(crate) fn lcs_row(a: LineSlice<'_>, b: LineSlice<'_>, direction: Direction) -> Vec<usize> {
    let mut result = vec![0usize; b.len() + 1];
    let mut prev = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        prev.copy_from_slice(&result);
        let ai = match direction {
            Direction::Forward => i,
            Direction::Backward => a.len() - 1 - i,
        };
        let line_a = a.get(ai);

        for j in 0..b.len() {
            let bj = match direction {
                Direction::Forward => j,
                Direction::Backward => b.len() - 1 - j,
            };
            let line_b = b.get(bj);
            result[j + 1] = if line_a == line_b {
                prev[j] + 1
            } else {
                result[j].max(prev[j + 1])
            };
        }
    }

    result
}

/// Mark the changed bits for a pair of slices where `small` has at most
/// one line.
///
/// If `small` holds a single line, look for it in `other`: if found, every
/// *other* position in `other` is changed (the matching one is the LCS);
/// if not found, `small`'s one line is changed too, and every position in
/// `other` is changed. If `small` is empty, every position in `other` is
/// changed.
fn set_changed(
    changed_small: &mut [bool],
    changed_other: &mut [bool],
    small: LineSlice<'_>,
    other: LineSlice<'_>,
) {
    debug_assert!(small.len() <= 1);

    let mut to_skip = None;
    if small.len() == 1 {
        let line = small.get(0);
        to_skip = other.position_of(line);
        if to_skip.is_none() {
            changed_small[small.offset()] = true;
        }
    }

    let end = other.offset() + other.len();
    for i in other.offset()..end {
        if Some(i) != to_skip {
            changed_other[i] = true;
        }
    }
}

/// Work out all the changed bits for the lines of `a` and `b`, writing
/// them into `changed_a` and `changed_b` (each as long as the full
/// consensus that `a`/`b` are slices of).
///
/// Recursively splits `a` in half and `b` at whatever column maximizes
/// the combined forward/backward LCS length, until one side is short
/// enough for [`set_changed`] to finish directly. The split-column
/// tie-break (smallest column on a tie) is required for the output to be
/// deterministic.
pub(crate) fn calc_changes<'a>(
    mut a: LineSlice<'a>,
    mut b: LineSlice<'a>,
    changed_a: &mut [bool],
    changed_b: &mut [bool],
) {
    trim(&mut a, &mut b);

    if a.is_empty() {
        set_changed(changed_a, changed_b, a, b);
    } else if b.is_empty() {
        set_changed(changed_b, changed_a, b, a);
    } else if a.len() == 1 {
        set_changed(changed_a, changed_b, a, b);
    } else if b.len() == 1 {
        set_changed(changed_b, changed_a, b, a);
    } else {
        let mid = a.len() / 2;
        let (top, bot) = a.split_at(mid);

        let lens_top = lcs_row(top, b, Direction::Forward);
        let lens_bot = lcs_row(bot, b, Direction::Backward);

        let mut best_k = 0;
        let mut best_sum = None;
        for k in 0..=b.len() {
            let sum = lens_top[k] + lens_bot[b.len() - k];
            if best_sum.map_or(true, |best| sum > best) {
                best_k = k;
                best_sum = Some(sum);
            }
        }

        let (left, right) = b.split_at_column(best_k);
        calc_changes(top, left, changed_a, changed_b);
        calc_changes(bot, right, changed_a, changed_b);
    }
}
