// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

use crate::{error::FixedPointError, macros::verify, utils::extract_from_raw_bytes, wide::mul_64x64};

/// Signed fixed-point number with `F` fractional bits stored in an `i64`.
///
/// ## Fields
///
/// * `0` - The raw scaled value, `value = raw / 2^F`
///
/// ## Notes
///
/// * `F` must be in `1..=63`; other widths fail to compile
/// * Multiply, divide and the roots are pure integer algorithms, so the same
///   inputs give the same raw result on every machine
/// * Every lossy step truncates (toward zero for `*` and `/`); nothing rounds
///   to nearest
/// * The raw integer is the persistence format; converting through a float
///   loses precision
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct FixedPoint<const F: u32>(pub i64);

/// The conventional simulation width: 31 integer bits, 32 fractional bits.
pub type Fixed32 = FixedPoint<32>;

impl<const F: u32> FixedPoint<F> {
    pub const FRAC_BITS: u32 = F;
    pub const ZERO: Self = Self(0);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);
    /// One unit in the last place.
    pub const ULP: Self = Self(1);
    /// `1.0`; a compile-time error at `F = 63`, where it is not representable.
    ///
    /// ```
    /// use lockstep_fixed::FixedPoint;
    ///
    /// assert_eq!(FixedPoint::<62>::ONE.into_raw(), 1 << 62);
    /// ```
    ///
    /// ```compile_fail
    /// use lockstep_fixed::FixedPoint;
    ///
    /// let one = FixedPoint::<63>::ONE;
    /// assert_eq!(one.into_raw(), 0);
    /// ```
    pub const ONE: Self = {
        assert!(F < 63, "ONE is not representable with 63 fractional bits");
        Self(1 << F)
    };

    // --- compile-time guard ---
    pub(crate) const WIDTH_OK: () = assert!(F >= 1 && F <= 63, "FRAC_BITS must be in 1..=63");

    /// Wrap a raw value. Widths outside `1..=63` fail to build:
    ///
    /// ```compile_fail
    /// use lockstep_fixed::FixedPoint;
    ///
    /// let x = FixedPoint::<0>::new(1);
    /// assert_eq!(x.into_raw(), 1);
    /// ```
    ///
    /// ```compile_fail
    /// use lockstep_fixed::FixedPoint;
    ///
    /// let x = FixedPoint::<64>::new(1);
    /// assert_eq!(x.into_raw(), 1);
    /// ```
    #[inline]
    pub const fn new(raw: i64) -> Self {
        let () = Self::WIDTH_OK;
        Self(raw)
    }

    #[inline] pub const fn from_raw(raw: i64) -> Self { Self::new(raw) }
    #[inline] pub const fn into_raw(self) -> i64 { self.0 }

    /// `(num << F) / den`, truncated toward zero.
    ///
    /// The numerator is shifted at 64-bit width; use [`Self::try_from_ratio`]
    /// when `num << F` may not fit.
    #[track_caller]
    #[inline]
    pub const fn from_ratio(num: i64, den: i64) -> Self {
        assert!(den != 0, "division by zero");
        Self::new((num << F) / den)
    }

    /// Checked [`Self::from_ratio`], scaling the numerator at 128-bit width.
    pub fn try_from_ratio(num: i64, den: i64) -> Result<Self, FixedPointError> {
        if den == 0 {
            return Err(FixedPointError::DivisionByZero);
        }
        let q = (i128::from(num) << F) / i128::from(den);
        i64::try_from(q).map(Self::new).map_err(|_| FixedPointError::Overflow)
    }

    /// `n << F`. Integers outside the representable range wrap.
    #[inline]
    pub const fn from_int(n: i64) -> Self {
        Self::new(n << F)
    }

    /// Scale by `2^F` and truncate toward zero. Out-of-range inputs saturate,
    /// NaN becomes zero.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Self::new((value * Self::scale_f64()) as i64)
    }

    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self::new((value * Self::scale_f32()) as i64)
    }

    #[inline] pub fn to_f64(self) -> f64 { self.0 as f64 / Self::scale_f64() }
    #[inline] pub fn to_f32(self) -> f32 { self.0 as f32 / Self::scale_f32() }

    #[inline] fn scale_f64() -> f64 { (1u64 << F) as f64 }
    #[inline] fn scale_f32() -> f32 { (1u64 << F) as f32 }

    /// Integer part by arithmetic shift: rounds toward negative infinity,
    /// so `-0.5` becomes `-1`.
    #[inline] pub const fn to_int(self) -> i64 { self.0 >> F }
    #[inline] pub const fn to_i64(self) -> i64 { self.to_int() }
    /// [`Self::to_int`] truncated to 32 bits.
    #[inline] pub const fn to_i32(self) -> i32 { self.to_int() as i32 }

    /// Change the fractional width by shifting the raw value.
    ///
    /// Widening shifts left and is exact while the result fits; narrowing
    /// shifts right (arithmetic) and drops the low bits without rounding.
    #[inline]
    pub fn rescale<const G: u32>(self) -> FixedPoint<G> {
        if G > F {
            FixedPoint::new(self.0 << (G - F))
        } else {
            FixedPoint::new(self.0 >> (F - G))
        }
    }

    #[inline] pub const fn to_le_bytes(self) -> [u8; 8] { self.0.to_le_bytes() }
    #[inline] pub const fn from_le_bytes(bytes: [u8; 8]) -> Self { Self::new(i64::from_le_bytes(bytes)) }

    /// Restore a value stored with [`Self::to_le_bytes`]; the slice must be
    /// exactly eight bytes.
    pub fn try_from_le_bytes(bytes: &[u8]) -> Result<Self, FixedPointError> {
        let raw: [u8; 8] = extract_from_raw_bytes(bytes, 0..bytes.len())?;
        Ok(Self::from_le_bytes(raw))
    }

    // --- sign helpers ---
    /// Wraps on `MIN`, like `+` and `-` in release builds.
    #[inline] pub const fn abs(self) -> Self { Self(self.0.wrapping_abs()) }
    #[inline] pub const fn is_negative(&self) -> bool { self.0.is_negative() }
    #[inline] pub const fn is_positive(&self) -> bool { self.0.is_positive() }

    // --- arithmetic helpers, storage domain ---
    #[inline] pub fn saturating_add(self, rhs: Self) -> Self { Self(self.0.saturating_add(rhs.0)) }
    #[inline] pub fn saturating_sub(self, rhs: Self) -> Self { Self(self.0.saturating_sub(rhs.0)) }
    #[inline] pub fn checked_add(self, rhs: Self) -> Option<Self> { self.0.checked_add(rhs.0).map(Self) }
    #[inline] pub fn checked_sub(self, rhs: Self) -> Option<Self> { self.0.checked_sub(rhs.0).map(Self) }
    #[inline] pub fn wrapping_add(self, rhs: Self) -> Self { Self(self.0.wrapping_add(rhs.0)) }
    #[inline] pub fn wrapping_sub(self, rhs: Self) -> Self { Self(self.0.wrapping_sub(rhs.0)) }

    // --- widening arithmetic ---

    /// `|a| * |b| >> F` as `(spill, low)`: the shifted 128-bit product split
    /// at bit 64, plus the sign of the result.
    #[inline]
    fn mul_magnitude(self, rhs: Self) -> (bool, u64, u64) {
        let () = Self::WIDTH_OK;
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let (hi, lo) = mul_64x64(self.0.unsigned_abs(), rhs.0.unsigned_abs());
        // low bits of hi slide into the top of the result word
        let low = (lo >> F) | (hi << (64 - F));
        (negative, hi >> F, low)
    }

    /// `(|a| << F) / |b|` as a 128-bit `(hi, lo)` quotient, plus the sign.
    ///
    /// Restoring long division, one bit per step. The dividend occupies the
    /// `(hi, lo)` pair and is shifted out of the top while quotient bits shift
    /// in from the bottom, so after 128 steps the pair holds the quotient.
    #[inline]
    fn div_magnitude(self, rhs: Self) -> (bool, u64, u64) {
        let () = Self::WIDTH_OK;
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let divisor = rhs.0.unsigned_abs();
        let magnitude = self.0.unsigned_abs();

        let mut hi = magnitude >> (64 - F);
        let mut lo = magnitude << F;
        let mut remainder = 0u64;

        for _ in 0..128 {
            let top = hi >> 63;
            hi = (hi << 1) | (lo >> 63);
            lo <<= 1;
            // remainder < divisor <= 2^63 before the shift
            remainder = (remainder << 1) | top;
            if remainder >= divisor {
                remainder -= divisor;
                lo |= 1;
            }
        }

        (negative, hi, lo)
    }

    /// Apply the sign to a magnitude, if the result fits in `i64`.
    #[inline]
    fn from_signed_magnitude(negative: bool, spill: u64, magnitude: u64) -> Option<Self> {
        if spill != 0 {
            return None;
        }
        if negative {
            (magnitude <= 1 << 63).then(|| Self((magnitude as i64).wrapping_neg()))
        } else {
            i64::try_from(magnitude).ok().map(Self)
        }
    }

    /// `(a * b) >> F`, truncated toward zero.
    ///
    /// Results outside the `i64` range are unspecified; verification builds
    /// check every in-range result against a native 128-bit product.
    #[track_caller]
    #[inline]
    pub fn mul_trunc(self, rhs: Self) -> Self {
        let (negative, _, magnitude) = self.mul_magnitude(rhs);
        let out = if negative { (magnitude as i64).wrapping_neg() } else { magnitude as i64 };

        verify!(
            Self::matches_reference(out, {
                let wide = (u128::from(self.0.unsigned_abs()) * u128::from(rhs.0.unsigned_abs())) >> F;
                if negative { -(wide as i128) } else { wide as i128 }
            }),
            "multiplication mismatch: {} * {} gave raw {}",
            self.0,
            rhs.0,
            out
        );

        Self(out)
    }

    /// `(a << F) / b`, truncated toward zero.
    ///
    /// Panics when `b` is zero. Quotients outside the `i64` range are
    /// unspecified; verification builds check every in-range result against a
    /// native 128-bit division.
    #[track_caller]
    #[inline]
    pub fn div_trunc(self, rhs: Self) -> Self {
        assert!(rhs.0 != 0, "division by zero");

        let (negative, _, magnitude) = self.div_magnitude(rhs);
        let out = if negative { (magnitude as i64).wrapping_neg() } else { magnitude as i64 };

        verify!(
            Self::matches_reference(out, (i128::from(self.0) << F) / i128::from(rhs.0)),
            "division mismatch: {} / {} gave raw {}",
            self.0,
            rhs.0,
            out
        );

        Self(out)
    }

    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        let (negative, spill, magnitude) = self.mul_magnitude(rhs);
        Self::from_signed_magnitude(negative, spill, magnitude)
    }

    #[inline]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        let (negative, hi, lo) = self.div_magnitude(rhs);
        Self::from_signed_magnitude(negative, hi, lo)
    }

    /// Out-of-range references say nothing about correctness.
    #[inline]
    fn matches_reference(out: i64, reference: i128) -> bool {
        i64::try_from(reference).map_or(true, |expected| expected == out)
    }
}

// ---- operator impls ----

impl<const F: u32> core::ops::Add for FixedPoint<F> {
    type Output = Self;
    #[track_caller]
    #[inline] fn add(self, rhs: Self) -> Self { Self(self.0 + rhs.0) }
}

impl<const F: u32> core::ops::Sub for FixedPoint<F> {
    type Output = Self;
    #[track_caller]
    #[inline] fn sub(self, rhs: Self) -> Self { Self(self.0 - rhs.0) }
}

impl<const F: u32> core::ops::Mul for FixedPoint<F> {
    type Output = Self;
    #[track_caller]
    #[inline] fn mul(self, rhs: Self) -> Self { self.mul_trunc(rhs) }
}

impl<const F: u32> core::ops::Div for FixedPoint<F> {
    type Output = Self;
    #[track_caller]
    #[inline] fn div(self, rhs: Self) -> Self { self.div_trunc(rhs) }
}

impl<const F: u32> core::ops::Neg for FixedPoint<F> {
    type Output = Self;
    #[track_caller]
    #[inline] fn neg(self) -> Self { Self(-self.0) }
}

impl<const F: u32> core::ops::AddAssign for FixedPoint<F> {
    #[track_caller]
    #[inline] fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl<const F: u32> core::ops::SubAssign for FixedPoint<F> {
    #[track_caller]
    #[inline] fn sub_assign(&mut self, rhs: Self) { *self = *self - rhs; }
}

impl<const F: u32> core::ops::MulAssign for FixedPoint<F> {
    #[track_caller]
    #[inline] fn mul_assign(&mut self, rhs: Self) { *self = *self * rhs; }
}

impl<const F: u32> core::ops::DivAssign for FixedPoint<F> {
    #[track_caller]
    #[inline] fn div_assign(&mut self, rhs: Self) { *self = *self / rhs; }
}

/// Plain integers on either side are scaled by `2^F` before the fixed-point
/// operation runs.
macro_rules! impl_int_operand {
    ($($op:ident, $method:ident, $op_assign:ident, $method_assign:ident;)*) => {
        $(
            impl<const F: u32> core::ops::$op<i64> for FixedPoint<F> {
                type Output = Self;
                #[track_caller]
                #[inline]
                fn $method(self, rhs: i64) -> Self {
                    core::ops::$op::$method(self, Self::from_int(rhs))
                }
            }

            impl<const F: u32> core::ops::$op<FixedPoint<F>> for i64 {
                type Output = FixedPoint<F>;
                #[track_caller]
                #[inline]
                fn $method(self, rhs: FixedPoint<F>) -> FixedPoint<F> {
                    core::ops::$op::$method(FixedPoint::<F>::from_int(self), rhs)
                }
            }

            impl<const F: u32> core::ops::$op_assign<i64> for FixedPoint<F> {
                #[track_caller]
                #[inline]
                fn $method_assign(&mut self, rhs: i64) {
                    *self = core::ops::$op::$method(*self, rhs);
                }
            }
        )*
    };
}

impl_int_operand! {
    Add, add, AddAssign, add_assign;
    Sub, sub, SubAssign, sub_assign;
    Mul, mul, MulAssign, mul_assign;
    Div, div, DivAssign, div_assign;
}

impl<const F: u32> PartialEq<i64> for FixedPoint<F> {
    #[inline] fn eq(&self, other: &i64) -> bool { self.0 == (*other << F) }
}

impl<const F: u32> PartialEq<FixedPoint<F>> for i64 {
    #[inline] fn eq(&self, other: &FixedPoint<F>) -> bool { (*self << F) == other.0 }
}

impl<const F: u32> PartialOrd<i64> for FixedPoint<F> {
    #[inline]
    fn partial_cmp(&self, other: &i64) -> Option<core::cmp::Ordering> {
        Some(self.0.cmp(&(*other << F)))
    }
}

impl<const F: u32> PartialOrd<FixedPoint<F>> for i64 {
    #[inline]
    fn partial_cmp(&self, other: &FixedPoint<F>) -> Option<core::cmp::Ordering> {
        Some((*self << F).cmp(&other.0))
    }
}

// Shifts move the raw value: power-of-two scaling, not a width conversion.
macro_rules! impl_raw_shift {
    ($($rhs:ty),*) => {
        $(
            impl<const F: u32> core::ops::Shl<$rhs> for FixedPoint<F> {
                type Output = Self;
                #[inline] fn shl(self, shift: $rhs) -> Self { Self(self.0 << shift) }
            }

            impl<const F: u32> core::ops::Shr<$rhs> for FixedPoint<F> {
                type Output = Self;
                #[inline] fn shr(self, shift: $rhs) -> Self { Self(self.0 >> shift) }
            }

            impl<const F: u32> core::ops::ShlAssign<$rhs> for FixedPoint<F> {
                #[inline] fn shl_assign(&mut self, shift: $rhs) { self.0 <<= shift; }
            }

            impl<const F: u32> core::ops::ShrAssign<$rhs> for FixedPoint<F> {
                #[inline] fn shr_assign(&mut self, shift: $rhs) { self.0 >>= shift; }
            }
        )*
    };
}

impl_raw_shift!(u32, usize);

impl<const F: u32> TryFrom<i64> for FixedPoint<F> {
    type Error = FixedPointError;

    #[inline]
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let raw = i128::from(value) << F;
        i64::try_from(raw)
            .map(Self::new)
            .map_err(|_| FixedPointError::IntegerConversionError)
    }
}

impl<const F: u32> TryFrom<i32> for FixedPoint<F> {
    type Error = FixedPointError;

    #[inline]
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

/// Truncated decimal, at most nine fractional digits, trailing zeros trimmed.
impl<const F: u32> std::fmt::Display for FixedPoint<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let int_part = magnitude >> F;
        let frac = magnitude & ((1u64 << F) - 1);
        let frac_9dp = (u128::from(frac) * 1_000_000_000) >> F;

        let frac_str = format!("{:09}", frac_9dp);
        let trimmed = frac_str.trim_end_matches('0');
        let sign = if self.0 < 0 && (int_part != 0 || !trimmed.is_empty()) { "-" } else { "" };

        if trimmed.is_empty() {
            write!(f, "{}{}", sign, int_part)
        } else {
            write!(f, "{}{}.{}", sign, int_part, trimmed)
        }
    }
}

// Optional: bytemuck
#[cfg(feature = "bytemuck")]
unsafe impl<const F: u32> bytemuck::Zeroable for FixedPoint<F> {}
#[cfg(feature = "bytemuck")]
unsafe impl<const F: u32> bytemuck::Pod for FixedPoint<F> {}

// Optional: serde, as the raw integer
#[cfg(feature = "serde")]
impl<const F: u32> serde::Serialize for FixedPoint<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        serde::Serialize::serialize(&self.0, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, const F: u32> serde::Deserialize<'de> for FixedPoint<F> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: serde::Deserializer<'de>
    {
        <i64 as serde::Deserialize<'de>>::deserialize(deserializer).map(Self::new)
    }
}
