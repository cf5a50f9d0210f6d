// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

/// Errors returned by the checked constructors and conversions.
///
/// The operator impls never return these; they panic (zero divisor) or
/// assert in verification builds instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FixedPointError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("result does not fit in 64-bit fixed-point storage")]
    Overflow,
    #[error("square root of a negative value")]
    NegativeOperand,
    #[error("integer conversion out of range")]
    IntegerConversionError,
    #[error("byte range does not hold a raw value")]
    RangeError,
}
