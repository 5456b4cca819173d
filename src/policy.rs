//! Capacity growth rules.
//!
//! A buffer never grows by a flat factor: when it needs room for at least
//! `min` elements its capacity becomes the smallest power of two that is
//! `>= min`. The first allocation of an empty buffer starts at
//! [`DEFAULT_CAPACITY`].

use crate::error::{BufferError, Result};

/// Capacity given to a buffer on its first allocation.
pub const DEFAULT_CAPACITY: usize = 2;

/// Largest power of two representable in `usize`.
pub const MAX_POW2: usize = 1 << (usize::BITS - 1);

/// Returns the smallest power of two `>= n`, with `0` rounding to `1`.
///
/// `None` when the result does not fit in `usize`.
#[must_use]
pub const fn next_pow2(n: usize) -> Option<usize> {
    n.checked_next_power_of_two()
}

/// Capacity an allocated buffer grows to when it needs at least `min` slots.
///
/// # Errors
///
/// [`BufferError::CapacityOverflow`] if `min` is already the largest power
/// of two (it cannot be rounded further) or if rounding overflows.
pub const fn grow_capacity(min: usize) -> Result<usize> {
    if min >= MAX_POW2 && min.is_power_of_two() {
        return Err(BufferError::CapacityOverflow);
    }
    match next_pow2(min) {
        Some(cap) => Ok(cap),
        None => Err(BufferError::CapacityOverflow),
    }
}

/// Capacity of the first allocation for a buffer that needs `min` slots.
///
/// [`DEFAULT_CAPACITY`] unless a bulk operation needs more, in which case
/// the regular rounding of [`grow_capacity`] applies.
///
/// # Errors
///
/// Same as [`grow_capacity`].
pub const fn initial_capacity(min: usize) -> Result<usize> {
    if min <= DEFAULT_CAPACITY {
        Ok(DEFAULT_CAPACITY)
    } else {
        grow_capacity(min)
    }
}
