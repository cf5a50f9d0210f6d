// Copyright (c) 2025, Arcane Labs
// SPDX-License-Identifier: Apache-2.0

use crate::error::FixedPointError;

#[inline]
pub(crate) fn extract_from_raw_bytes<T>(bytes: &[u8], range: std::ops::Range<usize>) -> Result<T, FixedPointError>
where
    T: Sized + for<'a> TryFrom<&'a [u8]>,
{
    let slice = bytes.get(range).ok_or(FixedPointError::RangeError)?;
    T::try_from(slice).map_err(|_| FixedPointError::RangeError)
}
