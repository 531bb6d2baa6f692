//! Generate and apply the ed-style scripts used inside a consensus diff.
//!
//! The generator (§ [`generate_ed_diff`]) is router-aware: it only ever
//! hands the underlying LCS routine ([`crate::lcs`]) a block of lines
//! between two router entries common to both consensuses, which keeps the
//! overall cost near-linear on real consensus pairs. The applier
//! (§ [`apply_ed_diff`]) is a single backward sweep over the base
//! consensus and makes no assumption about how the script was produced,
//! only that it obeys the strict grammar in [`EdCommandHead::parse`].

use std::cmp::Ordering;

use crate::err::Error;
use crate::lcs::calc_changes;
use crate::router::{get_identity_hash, hashcmp, next_router};
use crate::slice::LineSlice;

/// Blocks of non-router lines larger than this between two router entries
/// common to both consensuses are treated as pathological input.
const MAX_BLOCK_LINES: usize = 10_000;

/// The action an ed command performs on a range of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdAction {
    /// `<n>a` — append new lines after line `n`.
    Append,
    /// `<n>c` / `<n1>,<n2>c` — replace a range of lines with new ones.
    Change,
    /// `<n>d` / `<n1>,<n2>d` — delete a range of lines.
    Delete,
}

/// The parsed head of one ed command: its line range and its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdCommandHead {
    /// First line of the affected range (1-based); for `a`, the line after
    /// which new content is inserted (`0` means "at the very start").
    pub(crate) start: usize,
    /// Last line of the affected range (1-based); equal to `start` unless
    /// the command used the `<n1>,<n2>` range form.
    pub(crate) end: usize,
    /// What this command does to that range.
    pub(crate) action: EdAction,
}

impl EdCommandHead {
    /// Parse the range-and-action head of an ed command, e.g. `"12d"` or
    /// `"4,9c"`.
    ///
    /// Requires a decimal `start`, an optional `,`-separated decimal `end`
    /// strictly greater than `start`, and exactly one trailing action
    /// character in `{a, c, d}`. Unlike a general-purpose `ed`, this parser
    /// accepts no leading sign, no whitespace, and no other command forms.
    pub(crate) fn parse(line: &str) -> Result<Self, Error> {
        let bad = || Error::BadEdCommand(line.to_string());
        let bytes = line.as_bytes();
        let mut i = 0;

        let start_begin = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start_begin {
            return Err(bad());
        }
        let start: usize = line[start_begin..i].parse().map_err(|_| bad())?;

        let end = if i < bytes.len() && bytes[i] == b',' {
            i += 1;
            let end_begin = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i == end_begin {
                return Err(bad());
            }
            let end: usize = line[end_begin..i].parse().map_err(|_| bad())?;
            if end <= start {
                return Err(bad());
            }
            end
        } else {
            start
        };

        let mut rest = line[i..].chars();
        let action_ch = rest.next().ok_or_else(bad)?;
        if rest.next().is_some() {
            return Err(bad());
        }
        let action = match action_ch {
            'a' => EdAction::Append,
            'c' => EdAction::Change,
            'd' => EdAction::Delete,
            _ => return Err(bad()),
        };

        Ok(EdCommandHead { start, end, action })
    }
}

/// Apply an ed script to a base consensus, returning the result.
///
/// `diff` is read as a sequence of commands, each either a bare range head
/// (`d`) or a range head followed by its added lines and a `.` terminator
/// (`a`/`c`). Commands must address `cons_a` in strictly decreasing order,
/// matching how [`generate_ed_diff`] emits them; any other order is
/// rejected, since an out-of-order command would read addresses that have
/// already been shifted by an earlier one.
pub(crate) fn apply_ed_diff(cons_a: &[&str], diff: &[&str]) -> Result<Vec<String>, Error> {
    let mut out: Vec<String> = Vec::with_capacity(cons_a.len());
    let mut j = cons_a.len();
    let mut i = 0;

    while i < diff.len() {
        let line = diff[i];
        let head = EdCommandHead::parse(line)?;

        if head.end > j {
            return Err(Error::BadEdCommand(line.to_string()));
        }

        while j > head.end {
            out.push(cons_a[j - 1].to_string());
            j -= 1;
        }

        if matches!(head.action, EdAction::Change | EdAction::Delete) {
            if head.start == 0 {
                return Err(Error::BadEdCommand(line.to_string()));
            }
            j = head.start - 1;
        }

        i += 1;

        if matches!(head.action, EdAction::Append | EdAction::Change) {
            let added_begin = i;
            while i < diff.len() && diff[i] != "." {
                i += 1;
            }
            if i == diff.len() {
                return Err(Error::BadEdCommand(line.to_string()));
            }
            if i == added_begin {
                return Err(Error::BadEdCommand(line.to_string()));
            }
            for k in (added_begin..i).rev() {
                out.push(diff[k].to_string());
            }
            i += 1; // Skip the "." terminator.
        }
    }

    while j > 0 {
        out.push(cons_a[j - 1].to_string());
        j -= 1;
    }

    out.reverse();
    Ok(out)
}

/// Generate an ed script transforming `cons_a` into `cons_b`.
///
/// Walks both consensuses router entry by router entry, failing if either
/// side's identity hashes are not strictly increasing, and hands each
/// matched block of lines to [`calc_changes`]. The resulting per-line
/// changed bitmaps are then scanned from the last line backward to emit
/// one ed command per contiguous run of changes.
///
/// This function does not self-check its own output; callers that need
/// the correctness guarantee (I4 in the design notes) should re-apply the
/// result and compare, as [`crate::diff::generate_diff`] does.
pub(crate) fn generate_ed_diff(cons_a: &[&str], cons_b: &[&str]) -> Result<Vec<String>, Error> {
    let len_a = cons_a.len();
    let len_b = cons_b.len();

    let mut changed_a = vec![false; len_a];
    let mut changed_b = vec![false; len_b];

    fn not_done(idx: Option<usize>, len: usize) -> bool {
        idx.map_or(true, |v| v < len)
    }

    let mut i_a: Option<usize> = None;
    let mut i_b: Option<usize> = None;
    let mut start_a = 0usize;
    let mut start_b = 0usize;
    let mut hash_a: Option<&str> = None;
    let mut hash_b: Option<&str> = None;
    let mut last_hash_a: Option<&str> = None;
    let mut last_hash_b: Option<&str> = None;

    while not_done(i_a, len_a) || not_done(i_b, len_b) {
        if not_done(i_a, len_a) {
            let next = next_router(cons_a, i_a);
            i_a = Some(next);
            if next != len_a {
                last_hash_a = hash_a;
                hash_a = get_identity_hash(cons_a[next]);
                if hashcmp(hash_a, last_hash_a) != Ordering::Greater {
                    return Err(Error::UnsortedRouters(cons_a[next].to_string()));
                }
            }
        }

        if not_done(i_b, len_b) {
            let next = next_router(cons_b, i_b);
            i_b = Some(next);
            if next != len_b {
                last_hash_b = hash_b;
                hash_b = get_identity_hash(cons_b[next]);
                if hashcmp(hash_b, last_hash_b) != Ordering::Greater {
                    return Err(Error::UnsortedRouters(cons_b[next].to_string()));
                }
            }
        }

        if not_done(i_a, len_a) || not_done(i_b, len_b) {
            loop {
                let cmp = hashcmp(hash_a, hash_b);
                if cmp == Ordering::Equal {
                    break;
                }
                if not_done(i_a, len_a) && cmp == Ordering::Less {
                    let next = next_router(cons_a, i_a);
                    i_a = Some(next);
                    if next == len_a {
                        i_b = Some(len_b);
                        break;
                    }
                    last_hash_a = hash_a;
                    hash_a = get_identity_hash(cons_a[next]);
                    if hashcmp(hash_a, last_hash_a) != Ordering::Greater {
                        return Err(Error::UnsortedRouters(cons_a[next].to_string()));
                    }
                }
                if not_done(i_b, len_b) && cmp == Ordering::Greater {
                    let next = next_router(cons_b, i_b);
                    i_b = Some(next);
                    if next == len_b {
                        i_a = Some(len_a);
                        break;
                    }
                    last_hash_b = hash_b;
                    hash_b = get_identity_hash(cons_b[next]);
                    if hashcmp(hash_b, last_hash_b) != Ordering::Greater {
                        return Err(Error::UnsortedRouters(cons_b[next].to_string()));
                    }
                }
            }
        }

        let cur_a = i_a.unwrap_or(len_a);
        let cur_b = i_b.unwrap_or(len_b);

        let block_len_a = cur_a - start_a;
        let block_len_b = cur_b - start_b;
        if block_len_a > MAX_BLOCK_LINES || block_len_b > MAX_BLOCK_LINES {
            return Err(Error::BlockTooLarge {
                found: block_len_a.max(block_len_b),
                limit: MAX_BLOCK_LINES,
            });
        }

        let slice_a = LineSlice::new(cons_a, start_a, block_len_a);
        let slice_b = LineSlice::new(cons_b, start_b, block_len_b);
        calc_changes(slice_a, slice_b, &mut changed_a, &mut changed_b);

        start_a = cur_a;
        start_b = cur_b;
    }

    emit_ed_script(cons_b, &changed_a, &changed_b)
}

/// An alternate applier kept for differential testing against
/// [`apply_ed_diff`].
///
/// Where the default applier threads a single backward-growing output
/// buffer, this one clones the base consensus up front and repeatedly
/// [`Vec::splice`]s each command's range directly into it. Both rely on
/// the same invariant (I3: commands address strictly decreasing ranges),
/// which is why later splices never disturb the indices an earlier
/// command already touched.
#[cfg(feature = "slow-diff-apply")]
pub(crate) fn apply_ed_diff_slow(cons_a: &[&str], diff: &[&str]) -> Result<Vec<String>, Error> {
    let mut buf: Vec<String> = cons_a.iter().map(|s| s.to_string()).collect();
    let mut j = cons_a.len();
    let mut i = 0;

    while i < diff.len() {
        let line = diff[i];
        let head = EdCommandHead::parse(line)?;
        if head.end > j {
            return Err(Error::BadEdCommand(line.to_string()));
        }

        i += 1;
        let mut added: Vec<String> = Vec::new();
        if matches!(head.action, EdAction::Append | EdAction::Change) {
            let added_begin = i;
            while i < diff.len() && diff[i] != "." {
                i += 1;
            }
            if i == diff.len() || i == added_begin {
                return Err(Error::BadEdCommand(line.to_string()));
            }
            added = diff[added_begin..i].iter().map(|s| s.to_string()).collect();
            i += 1;
        }

        let range = if matches!(head.action, EdAction::Change | EdAction::Delete) {
            if head.start == 0 {
                return Err(Error::BadEdCommand(line.to_string()));
            }
            j = head.start - 1;
            (head.start - 1)..head.end
        } else {
            head.start..head.start
        };
        buf.splice(range, added);
    }

    Ok(buf)
}

/// Scan the two changed bitmaps from the last line backward, emitting one
/// ed command per contiguous run where either bitmap is set.
fn emit_ed_script(cons_b: &[&str], changed_a: &[bool], changed_b: &[bool]) -> Result<Vec<String>, Error> {
    let mut result = Vec::new();
    let mut i1 = changed_a.len() as isize - 1;
    let mut i2 = changed_b.len() as isize - 1;

    while i1 >= 0 || i2 >= 0 {
        let a_changed = i1 >= 0 && changed_a[i1 as usize];
        let b_changed = i2 >= 0 && changed_b[i2 as usize];
        if !a_changed && !b_changed {
            if i1 >= 0 {
                i1 -= 1;
            }
            if i2 >= 0 {
                i2 -= 1;
            }
            continue;
        }

        let end1 = i1;
        let end2 = i2;

        while i1 >= 0 && changed_a[i1 as usize] {
            i1 -= 1;
        }
        while i2 >= 0 && changed_b[i2 as usize] {
            i2 -= 1;
        }

        let start1 = i1 + 1;
        let start2 = i2 + 1;
        let added = end2 - i2;
        let deleted = end1 - i1;

        if added == 0 {
            if deleted == 1 {
                result.push(format!("{}d", start1 + 1));
            } else {
                result.push(format!("{},{}d", start1 + 1, start1 + deleted));
            }
        } else {
            if deleted == 0 {
                result.push(format!("{start1}a"));
            } else if deleted == 1 {
                result.push(format!("{}c", start1 + 1));
            } else {
                result.push(format!("{},{}c", start1 + 1, start1 + deleted));
            }

            for idx in start2..=end2 {
                let line = cons_b[idx as usize];
                if line == "." {
                    return Err(Error::IllegalAddedLine);
                }
                result.push(line.to_string());
            }
            result.push(".".to_string());
        }
    }

    Ok(result)
}
