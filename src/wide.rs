// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

//! Full-width 64x64 -> 128 bit multiplication using only 64-bit operations.

const LOW_32: u64 = 0xffff_ffff;

/// ## Full 128-bit product of two u64
///
/// Schoolbook decomposition into 32-bit halves. Every partial product is at
/// most (2^32 - 1)^2 = 2^64 - 2^33 + 1, which leaves room for adding one more
/// 32-bit value without wrapping.
///
/// ### Arguments
///
/// * `u` - Left operand
/// * `v` - Right operand
///
/// ### Returns
///
/// `(hi, lo)` such that `hi * 2^64 + lo == u * v`
#[inline]
pub const fn mul_64x64(u: u64, v: u64) -> (u64, u64) {
    let u_hi = u >> 32;
    let u_lo = u & LOW_32;
    let v_hi = v >> 32;
    let v_lo = v & LOW_32;

    let t = u_lo * v_lo;
    let w0 = t & LOW_32;
    let k = t >> 32;

    let t = u_hi * v_lo + k;
    let w1 = t & LOW_32;
    let w2 = t >> 32;

    let t = u_lo * v_hi + w1;
    let k = t >> 32;

    let hi = u_hi * v_hi + w2 + k;
    let lo = (t << 32) + w0;
    (hi, lo)
}

/// Full 128-bit square of a u64, `(hi, lo)`.
#[inline]
pub const fn square_64(a: u64) -> (u64, u64) {
    mul_64x64(a, a)
}
