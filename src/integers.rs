// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

//! Wide reference integers for the verification checks.
//!
//! Nothing on the production path computes with these; they recompute the
//! results of the 64-bit algorithms at a width where nothing can overflow.

use ::uint::construct_uint;

// these have scuffed doc comments because the macro codegens the beginning of them
construct_uint! {
    /// with 256-bits of precision, consisting of four 64-bit words.
    pub struct U256(4);
}

impl U256 {
    /// Build from a `(hi, lo)` pair of 64-bit words.
    #[inline]
    pub const fn from_pair(hi: u64, lo: u64) -> U256 {
        U256([lo, hi, 0, 0])
    }

    #[inline]
    pub fn cube(self) -> U256 {
        self * self * self
    }
}
