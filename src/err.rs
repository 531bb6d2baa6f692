//! The error type returned by this crate's codec operations.

use thiserror::Error;

/// An error encountered while generating or applying a consensus diff.
///
/// Every variant here corresponds to a well-formed-but-unexpected input:
/// this crate never panics on malformed diffs, out-of-order routers, or
/// any other caller-supplied data. A few variants (`SelfCheckFailed`) can
/// only occur due to a bug in this crate's own generator, not bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The diff's first two lines are missing, misspelled, or have the
    /// wrong number of tokens.
    #[error("malformed consensus-diff header: {0}")]
    MalformedHeader(String),

    /// A digest token in the header is not a well-formed 64-character
    /// base16 SHA-256 digest.
    #[error("malformed digest in consensus-diff header: {0:?}")]
    BadDigestFormat(String),

    /// The consensus the caller supplied does not hash to the digest the
    /// diff's header says it should.
    #[error(
        "base consensus does not match the digest in the diff header \
         (expected {expected}, found {found})"
    )]
    BaseDigestMismatch {
        /// The digest recorded in the diff's header.
        expected: String,
        /// The digest actually computed from the caller's consensus.
        found: String,
    },

    /// The consensus reconstructed by applying the diff does not hash to
    /// the digest the diff's header says it should.
    #[error(
        "reconstructed consensus does not match the digest in the diff header \
         (expected {expected}, found {found})"
    )]
    ResultDigestMismatch {
        /// The digest recorded in the diff's header.
        expected: String,
        /// The digest actually computed from the reconstructed consensus.
        found: String,
    },

    /// An ed command could not be parsed, or arrived in the wrong order.
    ///
    /// Covers a missing range, a missing or unrecognized action character,
    /// a multi-character action, an out-of-order range (addresses must
    /// strictly decrease), an `a`/`c` block with no terminating `.`, and
    /// an `a`/`c` block with no added lines at all.
    #[error("malformed ed command: {0}")]
    BadEdCommand(String),

    /// A line to be added by the diff is exactly `"."`, which would be
    /// indistinguishable from the ed block terminator.
    #[error("diff would add a line equal to the ed terminator \".\"")]
    IllegalAddedLine,

    /// A consensus's router entries do not appear in strictly increasing
    /// identity-hash order.
    #[error("router identity hashes are not strictly increasing at: {0:?}")]
    UnsortedRouters(String),

    /// A run of changed lines between two common router entries exceeded
    /// the safety bound on block size.
    #[error("a block of {found} lines exceeds the safety bound of {limit} lines")]
    BlockTooLarge {
        /// The size of the oversized block.
        found: usize,
        /// The safety bound that was exceeded.
        limit: usize,
    },

    /// The ed script this crate generated did not reproduce the target
    /// consensus when re-applied to the base consensus.
    ///
    /// This indicates a bug in this crate's diff generator, not a problem
    /// with the caller's input.
    #[error("internal error: generated diff did not reproduce the target consensus")]
    SelfCheckFailed,
}
