// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

//! Deterministic 64-bit fixed-point arithmetic.
//!
//! ```
//! use lockstep_fixed::Fixed32;
//!
//! let eight = Fixed32::from_ratio(8, 1);
//! assert_eq!(eight.cube_root(), Fixed32::from_int(2));
//! assert_eq!(Fixed32::from_int(4).sqrt(), Fixed32::from_int(2));
//! assert_eq!((Fixed32::from_int(7) / 2).to_f64(), 3.5);
//! ```

pub mod error;
pub mod macros;
pub mod fixed_point;
pub mod integers;
pub mod roots;
pub mod wide;
mod utils;

pub use error::FixedPointError;
pub use fixed_point::{Fixed32, FixedPoint};
pub use wide::{mul_64x64, square_64};
