#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
// @@ begin lint list maintained by maint/add_warning @@
#![allow(renamed_and_removed_lints)] // @@REMOVE_WHEN(ci_arti_stable)
#![allow(unknown_lints)] // @@REMOVE_WHEN(ci_arti_nightly)
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_option)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::trait_duplication_in_bounds)]
#![deny(clippy::unchecked_duration_subtraction)]
#![deny(clippy::unnecessary_wraps)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::let_unit_value)] // This can reasonably be done for explicitness
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::significant_drop_in_scrutinee)] // arti/-/merge_requests/588/#note_2812945
#![allow(clippy::result_large_err)] // temporary workaround for arti#587
#![allow(clippy::needless_raw_string_hashes)] // complained-about code is fine, often best
//! <!-- @@ end lint list maintained by maint/add_warning @@ -->

mod digest;
mod diff;
mod ed;
mod err;
mod lcs;
mod router;
mod slice;

pub use digest::{digest_consensus, ConsensusDigest};
pub use diff::{apply_diff, generate_diff, get_digests};
pub use err::Error;

/// Result type returned by this crate's codec operations.
pub type Result<T> = std::result::Result<T, Error>;

static_assertions::assert_impl_all!(Error: Send, Sync);
static_assertions::assert_impl_all!(ConsensusDigest: Send, Sync);

#[cfg(test)]
mod test {
    // @@ begin test lint list maintained by maint/add_warning @@
    #![allow(clippy::bool_assert_comparison)]
    #![allow(clippy::clone_on_copy)]
    #![allow(clippy::dbg_macro)]
    #![allow(clippy::mixed_attributes_style)]
    #![allow(clippy::print_stderr)]
    #![allow(clippy::print_stdout)]
    #![allow(clippy::single_char_pattern)]
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::unchecked_duration_subtraction)]
    #![allow(clippy::useless_vec)]
    #![allow(clippy::needless_pass_by_value)]
    //! <!-- @@ end test lint list maintained by maint/add_warning @@ -->
    use super::*;
    use rand::Rng;

    fn random_consensus(rng: &mut impl Rng, n_lines: usize) -> Vec<String> {
        (0..n_lines)
            .map(|_| {
                let len = rng.random_range(1..6);
                (0..len)
                    .map(|_| (b'a' + rng.random_range(0..4)) as char)
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn random_round_trips() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let a = random_consensus(&mut rng, rng.random_range(0..12));
            let b = random_consensus(&mut rng, rng.random_range(0..12));
            let a_refs: Vec<&str> = a.iter().map(String::as_str).collect();
            let b_refs: Vec<&str> = b.iter().map(String::as_str).collect();

            let digest_a = digest_consensus(&a_refs);
            let digest_b = digest_consensus(&b_refs);

            match generate_diff(&a_refs, &b_refs, &digest_a, &digest_b) {
                Ok(diff) => {
                    let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();
                    let reconstructed = apply_diff(&a_refs, &diff_refs, &digest_a).unwrap();
                    assert_eq!(reconstructed, b);
                }
                // Random lines can legitimately equal ".", which this
                // codec cannot represent as an added line.
                Err(Error::IllegalAddedLine) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
