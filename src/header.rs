/// Length and capacity of a buffer at one point in time.
///
/// Returned by [`GrowableBuffer::header`](crate::GrowableBuffer::header).
/// An unallocated buffer reports `Header { length: 0, capacity: 0 }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Number of live elements.
    pub length: usize,
    /// Number of allocated element slots.
    pub capacity: usize,
}

impl Header {
    /// Returns `true` if no block is allocated.
    #[must_use]
    pub const fn is_unallocated(&self) -> bool {
        self.capacity == 0
    }

    /// Number of free slots before the next growth. `0` for a header whose
    /// length exceeds its capacity.
    #[must_use]
    pub const fn spare(&self) -> usize {
        self.capacity.saturating_sub(self.length)
    }
}
