// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

//! Digit-by-digit square and cube roots.
//!
//! Both run a fixed number of iterations for a given width, never touch
//! floating point, and return the truncated root.

use crate::{
    error::FixedPointError,
    fixed_point::FixedPoint,
    integers::U256,
    macros::{verify, VERIFY_BUILD},
    wide::mul_64x64,
};

/// Cube root iterations whose remainder stays inside 64 bits.
///
/// Entering iteration `i` the root has at most `i` bits and the remainder is
/// at most `3y^2 + 3y < 2^(2i + 2)`, so `8r + 7 < 2^64` needs `2i + 5 <= 63`.
const CUBE_ROOT_FAST_ITERATIONS: u32 = 30;

/// 3-bit groups in the cube root operand window: 64 magnitude bits plus up to
/// two alignment bits.
const CUBE_ROOT_OPERAND_DIGITS: u32 = 22;

impl<const F: u32> FixedPoint<F> {
    const SQRT_WIDTH_OK: () = assert!(F % 2 == 0, "sqrt requires an even number of fractional bits");
    const CUBE_ROOT_WIDTH_OK: () = assert!(F <= 58, "cube_root supports at most 58 fractional bits");

    /// ## Square root
    ///
    /// Binary digit-by-digit extraction over the raw bits followed by `F`
    /// zero bits: `32 + F/2` iterations, two operand bits each. The result is
    /// the truncated root `y` with `y^2 <= a < (y + ulp)^2`.
    ///
    /// The operand must be non-negative (asserted in verification builds,
    /// unspecified otherwise). `F` must be even:
    ///
    /// ```compile_fail
    /// use lockstep_fixed::FixedPoint;
    ///
    /// let _ = FixedPoint::<33>::from_int(4).sqrt();
    /// ```
    #[track_caller]
    pub fn sqrt(self) -> Self {
        let () = Self::WIDTH_OK;
        let () = Self::SQRT_WIDTH_OK;
        verify!(self.0 >= 0, "sqrt of negative raw value {}", self.0);

        let operand = self.0 as u64;
        let mut bits = operand;
        // wide enough for F = 62, where the last shift passes 64 bits
        let mut remainder: u128 = 0;
        let mut root: u64 = 0;

        for _ in 0..(32 + F / 2) {
            remainder = (remainder << 2) | u128::from(bits >> 62);
            bits <<= 2;
            root <<= 1;
            let trial = (u128::from(root) << 1) | 1;
            if remainder >= trial {
                remainder -= trial;
                root += 1;
            }
        }

        verify!(
            {
                let scaled = u128::from(operand) << F;
                let y = u128::from(root);
                y * y <= scaled && (y + 1) * (y + 1) > scaled
            },
            "sqrt of raw {} missed the bracket with root {}",
            self.0,
            root
        );

        Self(root as i64)
    }

    /// Checked [`Self::sqrt`].
    pub fn try_sqrt(self) -> Result<Self, FixedPointError> {
        if self.0 < 0 {
            return Err(FixedPointError::NegativeOperand);
        }
        Ok(self.sqrt())
    }

    /// ## Cube root
    ///
    /// Shifting nth-root extraction (base 2, n = 3) on the magnitude, sign
    /// reapplied: `cube_root(-a) == -cube_root(a)`. The root `y` of the
    /// magnitude is truncated, `y^3 <= |a| < (y + ulp)^3`.
    ///
    /// The operand digits are `|raw| << (2F mod 3)` read in 3-bit groups,
    /// followed by zero groups, for `22 + floor(2F/3)` iterations in total.
    /// The first 30 iterations keep the remainder in 64 bits; the rest carry
    /// it as a 128-bit pair. The iteration count depends only on `F`.
    ///
    /// At most 58 fractional bits are supported:
    ///
    /// ```compile_fail
    /// use lockstep_fixed::FixedPoint;
    ///
    /// let _ = FixedPoint::<59>::from_int(8).cube_root();
    /// ```
    pub fn cube_root(self) -> Self {
        let () = Self::WIDTH_OK;
        let () = Self::CUBE_ROOT_WIDTH_OK;

        let negative = self.0 < 0;
        let magnitude = self.0.unsigned_abs();

        // raw * 2^(2F) == (magnitude << align) * 8^floor(2F/3)
        let align = (2 * F) % 3;
        let mut head = Some(magnitude >> (63 - align));
        let mut tail = magnitude << (align + 1);

        let total = CUBE_ROOT_OPERAND_DIGITS + 2 * F / 3;
        let fast = total.min(CUBE_ROOT_FAST_ITERATIONS);

        let mut y: u64 = 0;
        let mut r: u64 = 0;
        let mut consumed = U256::zero();

        for i in 0..fast {
            let alpha = head.take().unwrap_or_else(|| {
                let digit = tail >> 61;
                tail <<= 3;
                digit
            });

            // (2y + 1)^3 - (2y)^3
            let det1 = (12 * y + 6) * y + 1;
            let det2 = 8 * r + alpha;
            if det1 <= det2 {
                y = 2 * y + 1;
                r = det2 - det1;
            } else {
                y = 2 * y;
                r = det2;
            }

            if VERIFY_BUILD {
                consumed = (consumed << 3usize) | U256::from(alpha);
                check_cube_step(y, U256::from(r), consumed, i);
            }
        }

        // operand digits are exhausted; only zero groups remain
        let mut r_hi: u64 = 0;
        let mut r_lo: u64 = r;

        for i in fast..total {
            let (det1_hi, det1_lo) = mul_64x64(y, 12 * y + 6);
            let (det1_lo, carry) = det1_lo.overflowing_add(1);
            let det1_hi = det1_hi + u64::from(carry);

            let det2_hi = (r_hi << 3) | (r_lo >> 61);
            let det2_lo = r_lo << 3;

            if (det1_hi, det1_lo) <= (det2_hi, det2_lo) {
                y = 2 * y + 1;
                let (lo, borrow) = det2_lo.overflowing_sub(det1_lo);
                r_hi = det2_hi - det1_hi - u64::from(borrow);
                r_lo = lo;
            } else {
                y = 2 * y;
                r_hi = det2_hi;
                r_lo = det2_lo;
            }

            if VERIFY_BUILD {
                consumed = consumed << 3usize;
                check_cube_step(y, U256::from_pair(r_hi, r_lo), consumed, i);
            }
        }

        verify!(
            {
                let target = U256::from(magnitude) << (2 * F as usize);
                U256::from(y).cube() <= target && (U256::from(y) + U256::from(1u64)).cube() > target
            },
            "cube root of raw {} missed the bracket with root {}",
            self.0,
            y
        );

        let root = y as i64;
        Self(if negative { -root } else { root })
    }
}

/// After every step the root so far is exact for the digits consumed so far.
#[track_caller]
fn check_cube_step(y: u64, remainder: U256, consumed: U256, iteration: u32) {
    let y = U256::from(y);
    assert!(
        y.cube() + remainder == consumed,
        "cube root remainder drifted at iteration {}",
        iteration
    );
    assert!(
        (y + U256::from(1u64)).cube() > consumed,
        "cube root digit too small at iteration {}",
        iteration
    );
}
