//! The SHA-256 digest type used to frame a consensus diff.
//!
//! A consensus diff's header records the digest of its base and result
//! consensuses so that [`crate::diff::apply_diff`] can detect a caller
//! applying a diff to the wrong document. This module owns the digest
//! type and its base16 encoding; the actual hashing is delegated to
//! [`sha2`].

use derive_more::Display;
use digest::Digest as _;
use sha2::Sha256;

use crate::err::Error;

/// A 32-byte SHA-256 digest, displayed as 64 uppercase hex characters.
///
/// Consensus diffs encode digests this way in their header lines, e.g.
/// `hash <base-digest> <result-digest>`.
#[derive(Clone, Copy, PartialEq, Eq, Display)]
#[display("{}", hex::encode_upper(_0))]
pub struct ConsensusDigest([u8; 32]);

impl ConsensusDigest {
    /// Wrap a raw 32-byte digest.
    pub(crate) fn from_bytes(bytes: [u8; 32]) -> Self {
        ConsensusDigest(bytes)
    }

    /// Parse a digest from a 64-character base16 string. Accepts both
    /// upper- and lowercase hex digits, as the header format does not
    /// specify a case.
    pub(crate) fn parse_hex(s: &str) -> Result<Self, Error> {
        if s.len() != 64 {
            return Err(Error::BadDigestFormat(s.to_string()));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out).map_err(|_| Error::BadDigestFormat(s.to_string()))?;
        Ok(ConsensusDigest(out))
    }
}

impl std::fmt::Debug for ConsensusDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConsensusDigest({self})")
    }
}

/// Compute the SHA-256 digest of a consensus document, the same way the
/// directory protocol does: every line followed by a newline, including
/// the last.
pub fn digest_consensus(lines: &[&str]) -> ConsensusDigest {
    let mut hasher = Sha256::new();
    for line in lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    ConsensusDigest::from_bytes(hasher.finalize().into())
}
