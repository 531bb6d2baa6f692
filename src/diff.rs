//! Header framing: wraps an ed script with a version line and a pair of
//! digests, and unwraps it back out while checking both.

use crate::digest::{digest_consensus, ConsensusDigest};
use crate::ed::{apply_ed_diff, generate_ed_diff};
use crate::err::Error;

/// The exact text of the first line of every consensus diff this crate
/// produces or accepts.
const VERSION_LINE: &str = "network-status-diff-version 1";

/// Extracted, validated contents of a diff's two header lines.
struct Header {
    /// The digest of the base consensus, recorded in the `hash` line.
    digest_a: ConsensusDigest,
    /// The digest of the result consensus, recorded in the `hash` line.
    digest_b: ConsensusDigest,
}

/// Parse and validate a diff's first two lines.
fn parse_header(diff: &[&str]) -> Result<Header, Error> {
    if diff.len() < 3 {
        return Err(Error::MalformedHeader(format!(
            "diff has only {} lines, need at least 3",
            diff.len()
        )));
    }
    if diff[0] != VERSION_LINE {
        return Err(Error::MalformedHeader(diff[0].to_string()));
    }

    let mut tokens = diff[1].split_whitespace();
    let keyword = tokens.next();
    let a_hex = tokens.next();
    let b_hex = tokens.next();
    let extra = tokens.next();

    if keyword != Some("hash") || a_hex.is_none() || b_hex.is_none() || extra.is_some() {
        return Err(Error::MalformedHeader(diff[1].to_string()));
    }

    let digest_a = ConsensusDigest::parse_hex(a_hex.unwrap_or_default())?;
    let digest_b = ConsensusDigest::parse_hex(b_hex.unwrap_or_default())?;

    Ok(Header { digest_a, digest_b })
}

/// Extract the base and result digests recorded in a diff's header
/// without applying it.
///
/// Useful for callers maintaining a cache of diffs keyed by digest pair:
/// they can decide whether a diff is relevant before paying the cost of
/// applying it.
pub fn get_digests(diff: &[&str]) -> Result<(ConsensusDigest, ConsensusDigest), Error> {
    let header = parse_header(diff)?;
    Ok((header.digest_a, header.digest_b))
}

/// Generate a consensus diff transforming `cons_a` into `cons_b`.
///
/// `digest_a` and `digest_b` are the SHA-256 digests of `cons_a` and
/// `cons_b`'s on-wire forms (see [`digest_consensus`]); this function
/// trusts them rather than recomputing, since a caller generating a diff
/// typically already has both on hand.
///
/// Before returning, this re-applies the generated ed script to `cons_a`
/// and compares the result to `cons_b` byte-for-byte, failing with
/// [`Error::SelfCheckFailed`] on any mismatch.
pub fn generate_diff(
    cons_a: &[&str],
    cons_b: &[&str],
    digest_a: &ConsensusDigest,
    digest_b: &ConsensusDigest,
) -> Result<Vec<String>, Error> {
    let script = generate_ed_diff(cons_a, cons_b)?;

    let script_refs: Vec<&str> = script.iter().map(String::as_str).collect();
    let applied = apply_ed_diff(cons_a, &script_refs)?;
    if applied != cons_b {
        return Err(Error::SelfCheckFailed);
    }

    let mut out = Vec::with_capacity(script.len() + 2);
    out.push(VERSION_LINE.to_string());
    out.push(format!("hash {digest_a} {digest_b}"));
    out.extend(script);
    Ok(out)
}

/// Apply a consensus diff to a base consensus, returning the
/// reconstructed target consensus.
///
/// `digest_a` must be the SHA-256 digest of `cons_a`'s on-wire form; it
/// is checked against the diff's recorded base digest before anything
/// else is done. The reconstructed consensus's digest is then checked
/// against the diff's recorded result digest before it is returned.
pub fn apply_diff(cons_a: &[&str], diff: &[&str], digest_a: &ConsensusDigest) -> Result<Vec<String>, Error> {
    let header = parse_header(diff)?;

    if *digest_a != header.digest_a {
        return Err(Error::BaseDigestMismatch {
            expected: header.digest_a.to_string(),
            found: digest_a.to_string(),
        });
    }

    let result = apply_ed_diff(cons_a, &diff[2..])?;
    let result_refs: Vec<&str> = result.iter().map(String::as_str).collect();
    let found_digest_b = digest_consensus(&result_refs);

    if found_digest_b != header.digest_b {
        return Err(Error::ResultDigestMismatch {
            expected: header.digest_b.to_string(),
            found: found_digest_b.to_string(),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn split(s: &str) -> Vec<&str> {
        s.split('\n').collect()
    }

    #[test]
    fn seed_scenario_6_end_to_end() {
        let a = split("header\nnetwork-status-version foo\nr name ccccccccccccccccccccccccccc etc\nfoo\nr name eeeeeeeeeeeeeeeeeeeeeeeeeee etc\nbar\ndirectory-signature foo bar\nbar");
        let b = split("header\nnetwork-status-version foo\nr name ccccccccccccccccccccccccccc etc\nsample\nr name eeeeeeeeeeeeeeeeeeeeeeeeeee etc\nbar\ndirectory-signature foo bar\nbar");

        let digest_a = digest_consensus(&a);
        let digest_b = digest_consensus(&b);

        let diff = generate_diff(&a, &b, &digest_a, &digest_b).unwrap();
        let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();

        assert_eq!(diff_refs[0], "network-status-diff-version 1");

        let reconstructed = apply_diff(&a, &diff_refs, &digest_a).unwrap();
        assert_eq!(reconstructed, b);
    }

    #[test]
    fn idempotence_on_equal_inputs() {
        let a = split("same\nsame\nsame");
        let digest_a = digest_consensus(&a);
        let diff = generate_diff(&a, &a, &digest_a, &digest_a).unwrap();
        assert_eq!(diff.len(), 2);
        let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();
        let reconstructed = apply_diff(&a, &diff_refs, &digest_a).unwrap();
        assert_eq!(reconstructed, a);
    }

    #[test]
    fn apply_accepts_lowercase_hex_digests() {
        let a = vec!["x", "y"];
        let b = vec!["x", "z"];
        let digest_a = digest_consensus(&a);
        let digest_b = digest_consensus(&b);
        let diff = generate_diff(&a, &b, &digest_a, &digest_b).unwrap();

        let lowered: Vec<String> = diff
            .iter()
            .enumerate()
            .map(|(i, l)| if i == 1 { l.to_lowercase() } else { l.clone() })
            .collect();
        let lowered_refs: Vec<&str> = lowered.iter().map(String::as_str).collect();

        let reconstructed = apply_diff(&a, &lowered_refs, &digest_a).unwrap();
        assert_eq!(reconstructed, b);
    }

    #[test]
    fn apply_rejects_base_digest_mismatch() {
        let a = vec!["x"];
        let b = vec!["y"];
        let digest_a = digest_consensus(&a);
        let digest_b = digest_consensus(&b);
        let diff = generate_diff(&a, &b, &digest_a, &digest_b).unwrap();
        let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();

        let wrong_digest = digest_consensus(&["not", "a"]);
        let err = apply_diff(&a, &diff_refs, &wrong_digest).unwrap_err();
        assert!(matches!(err, Error::BaseDigestMismatch { .. }));
    }

    #[test]
    fn apply_rejects_result_digest_mismatch() {
        let a = vec!["x"];
        let b = vec!["y"];
        let digest_a = digest_consensus(&a);
        let digest_b = digest_consensus(&b);
        let mut diff = generate_diff(&a, &b, &digest_a, &digest_b).unwrap();
        // Corrupt the recorded result digest so applying detects it.
        diff[1] = format!("hash {digest_a} {}", digest_consensus(&["different"]));
        let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();

        let err = apply_diff(&a, &diff_refs, &digest_a).unwrap_err();
        assert!(matches!(err, Error::ResultDigestMismatch { .. }));
    }

    #[test]
    fn apply_rejects_malformed_version_line() {
        let diff = ["network-status-diff-version 2", "hash aa bb", "1d"];
        let digest_a = digest_consensus(&["x"]);
        let err = apply_diff(&["x"], &diff, &digest_a).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn apply_rejects_wrong_hash_line_token_count() {
        let diff = ["network-status-diff-version 1", "hash aa bb cc", "1d"];
        let digest_a = digest_consensus(&["x"]);
        let err = apply_diff(&["x"], &diff, &digest_a).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn apply_rejects_non_hex_digest_tokens() {
        let not_hex = "z".repeat(64);
        let diff_line = format!("hash {not_hex} {not_hex}");
        let diff = ["network-status-diff-version 1", &diff_line, "1d"];
        let digest_a = digest_consensus(&["x"]);
        let err = apply_diff(&["x"], &diff, &digest_a).unwrap_err();
        assert!(matches!(err, Error::BadDigestFormat(_)));
    }

    #[test]
    fn apply_rejects_too_short_diff() {
        let diff = ["network-status-diff-version 1"];
        let digest_a = digest_consensus(&["x"]);
        let err = apply_diff(&["x"], &diff, &digest_a).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn get_digests_reads_header_without_applying() {
        let a = vec!["x"];
        let b = vec!["y"];
        let digest_a = digest_consensus(&a);
        let digest_b = digest_consensus(&b);
        let diff = generate_diff(&a, &b, &digest_a, &digest_b).unwrap();
        let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();

        let (got_a, got_b) = get_digests(&diff_refs).unwrap();
        assert_eq!(got_a, digest_a);
        assert_eq!(got_b, digest_b);
    }
}
