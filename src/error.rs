use std::alloc::Layout;

use thiserror::Error;

/// Result alias for the fallible (`try_*`) buffer operations.
pub type Result<T> = std::result::Result<T, BufferError>;

/// Failure of a capacity change.
///
/// Returned by the `try_*` methods of
/// [`GrowableBuffer`](crate::GrowableBuffer). Their infallible counterparts
/// treat both variants as fatal, see [`BufferError::fatal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The allocator returned no memory for the requested block.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocationFailure {
        /// Layout of the block that could not be obtained.
        layout: Layout,
    },

    /// The requested capacity cannot be represented, either because the
    /// power-of-two rounding would overflow `usize` or because the block
    /// would exceed `isize::MAX` bytes.
    #[error("capacity overflow")]
    CapacityOverflow,
}

impl BufferError {
    /// Applies the default failure policy: allocation failure goes through
    /// [`std::alloc::handle_alloc_error`] (which aborts), capacity overflow
    /// panics.
    ///
    /// # Panics
    ///
    /// Panics for [`CapacityOverflow`](Self::CapacityOverflow); aborts for
    /// [`AllocationFailure`](Self::AllocationFailure).
    #[cold]
    #[track_caller]
    pub fn fatal(self) -> ! {
        tracing::error!(target: "grow_buf", error = %self, "unrecoverable buffer failure");
        match self {
            Self::AllocationFailure { layout } => std::alloc::handle_alloc_error(layout),
            Self::CapacityOverflow => panic!("capacity overflow"),
        }
    }
}
