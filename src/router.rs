//! Recognize router-entry lines in a consensus and compare their identity
//! hashes.
//!
//! A router entry is a line beginning with the two bytes `"r "`; its
//! identity hash is the base64 token that follows the router nickname.
//! Hashes are ordered by a custom table, not by ASCII value, so that the
//! comparison matches the Tor directory protocol's notion of sorted order.

use std::cmp::Ordering;

/// Sentinel value for a byte that is not part of the base64 alphabet.
const NON_B64: u8 = 255;

/// Minimum accepted length, in bytes, of an identity hash. 27 base64
/// characters is the length of a base64-encoded 20-byte (SHA-1-sized)
/// router identity; a shorter run cannot be a real identity hash.
const MIN_HASH_LEN: usize = 27;

/// Maps each possible byte value to its 6-bit base64 value, or to
/// [`NON_B64`] if the byte is not part of the base64 alphabet
/// `[A-Za-z0-9+/]`. Ordering by this table (not by ASCII order) is what
/// makes `+ < / < digits < uppercase < lowercase`.
#[rustfmt::skip]
const BASE64_VALUE: [u8; 256] = [
    // 0x00..0x0F
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    // 0x10..0x1F
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    // 0x20..0x2F : ' ' ! " # $ % & ' ( ) * + , - . /
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, 62,      NON_B64, NON_B64, NON_B64, 63,
    // 0x30..0x3F : 0 1 2 3 4 5 6 7 8 9 : ; < = > ?
    52, 53, 54, 55, 56, 57, 58, 59, 60, 61, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    // 0x40..0x4F : @ A B C D E F G H I J K L M N O
    NON_B64, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14,
    // 0x50..0x5F : P Q R S T U V W X Y Z [ \ ] ^ _
    15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    // 0x60..0x6F : ` a b c d e f g h i j k l m n o
    NON_B64, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40,
    // 0x70..0x7F : p q r s t u v w x y z { | } ~ DEL
    41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    // 0x80..0xFF
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
    NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64, NON_B64,
];

/// Returns the 6-bit base64 value of `b`, or `None` if `b` is outside the
/// base64 alphabet `[A-Za-z0-9+/]`.
fn base64_value(b: u8) -> u8 {
    BASE64_VALUE[b as usize]
}

/// Given a line that may be a router entry, return its identity hash:
/// the base64 token immediately following the router nickname.
///
/// Returns `None` if the line is too short to contain a nickname and a
/// hash, or if the candidate hash run is shorter than the minimum
/// identity-hash length.
///
/// The caller is expected to have already skipped the leading `"r "`; this
/// function does that itself for convenience, but does not otherwise
/// validate that `line` is a router entry.
pub(crate) fn get_identity_hash(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("r ")?;
    let nickname_end = rest.find(' ')?;
    let hash_field = &rest[nickname_end + 1..];
    let hash_len = hash_field
        .bytes()
        .take_while(|&b| base64_value(b) != NON_B64)
        .count();
    if hash_len < MIN_HASH_LEN {
        return None;
    }
    Some(&hash_field[..hash_len])
}

/// True iff `line` is a well-formed router entry: it starts with `"r "`
/// and a valid identity hash can be extracted from it.
pub(crate) fn is_router_entry(line: &str) -> bool {
    line.starts_with("r ") && get_identity_hash(line).is_some()
}

/// Return the index of the next router entry in `cons` at or after
/// `cur.map_or(0, |c| c + 1)`, or `cons.len()` if there is none.
///
/// `cur = None` means "search from the start of the consensus", matching
/// the convention that a walk begins before any line has been visited.
pub(crate) fn next_router(cons: &[&str], cur: Option<usize>) -> usize {
    let start = cur.map_or(0, |c| c + 1);
    (start..cons.len())
        .find(|&i| is_router_entry(cons[i]))
        .unwrap_or(cons.len())
}

/// Compare two (possibly absent) identity hashes under the base64 value
/// table, stopping at the first byte outside the base64 alphabet on
/// either side.
///
/// `None` (no hash) sorts below any `Some` hash; two `None`s are equal.
pub(crate) fn hashcmp(h1: Option<&str>, h2: Option<&str>) -> Ordering {
    let (h1, h2) = match (h1, h2) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(h1), Some(h2)) => (h1, h2),
    };

    let mut a = h1.bytes();
    let mut b = h2.bytes();
    loop {
        let av = a.next().map_or(NON_B64, base64_value);
        let bv = b.next().map_or(NON_B64, base64_value);
        if av == NON_B64 {
            return if bv == NON_B64 {
                Ordering::Equal
            } else {
                Ordering::Less
            };
        } else if bv == NON_B64 {
            return Ordering::Greater;
        } else if av != bv {
            return av.cmp(&bv);
        }
    }
}
