// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

/// Verification builds recompute results against wide references.
pub(crate) const VERIFY_BUILD: bool = cfg!(any(debug_assertions, feature = "verify"));

/// Assert a consistency relation in verification builds.
///
/// Active under `debug_assertions` or the `verify` feature; otherwise the
/// condition is type-checked but never evaluated.
macro_rules! verify {
    ($cond:expr, $($arg:tt)+) => {
        if $crate::macros::VERIFY_BUILD {
            assert!($cond, $($arg)+);
        }
    };
}

pub(crate) use verify;

/// Build a fixed-point value from an integer literal or a literal ratio.
///
/// The fractional width comes from the surrounding type.
///
/// ```
/// use lockstep_fixed::{fixed, Fixed32};
///
/// let third: Fixed32 = fixed!(1 / 3);
/// let minus_two: Fixed32 = fixed!(-2);
///
/// assert_eq!(third.into_raw(), (1i64 << 32) / 3);
/// assert_eq!(minus_two.to_int(), -2);
/// ```
#[macro_export]
macro_rules! fixed {
    ($num:literal / $den:literal) => {
        $crate::FixedPoint::from_ratio($num, $den)
    };
    ($int:literal) => {
        $crate::FixedPoint::from_int($int)
    };
}

#[cfg(test)]
mod tests {
    use crate::{FixedPoint, Fixed32};

    #[test]
    fn fixed_literal_forms() {
        let a: Fixed32 = fixed!(3 / 4);
        assert_eq!(a.into_raw(), 3i64 << 30);

        let b: FixedPoint<16> = fixed!(-27);
        assert_eq!(b.into_raw(), -27i64 << 16);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "relation broke: 1 != 2")]
    fn verify_fires_in_debug() {
        let (a, b) = (1, 2);
        verify!(a == b, "relation broke: {} != {}", a, b);
    }
}
