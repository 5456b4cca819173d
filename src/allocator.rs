use std::alloc::Layout;
use std::ptr::NonNull;

/// Allocation strategy backing a [`GrowableBuffer`](crate::GrowableBuffer).
///
/// A buffer keeps all of its elements in one block and only ever asks for
/// two things: resize that block (allocating it if there is none yet) and
/// give it back.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `new_layout.size()` bytes and aligned to `new_layout.align()`. When
/// `reallocate` moves an existing block it must preserve its first
/// `min(old, new)` bytes. A block must stay valid until it is passed to
/// `release` or to `reallocate` again.
pub unsafe trait RawAllocator {
    /// Resizes `block` to `new_layout`, or allocates a fresh block when
    /// `block` is `None`.
    ///
    /// Returns `None` on failure, in which case `block` is untouched.
    ///
    /// # Safety
    ///
    /// `block`, if present, must have been returned by this allocator with
    /// the paired layout. `new_layout` has non-zero size and the same
    /// alignment as the old layout.
    unsafe fn reallocate(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with `layout` and
    /// must not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global heap (`std::alloc`), the default strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heap;

// SAFETY: forwards to the global allocator, which upholds the contract.
unsafe impl RawAllocator for Heap {
    unsafe fn reallocate(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        let raw = match block {
            // SAFETY: caller guarantees a non-zero size.
            None => unsafe { std::alloc::alloc(new_layout) },
            // SAFETY: caller guarantees `ptr` came from the global allocator
            // with `old`, and that alignment is unchanged.
            Some((ptr, old)) => unsafe {
                std::alloc::realloc(ptr.as_ptr(), old, new_layout.size())
            },
        };
        NonNull::new(raw)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees `ptr` came from the global allocator
        // with `layout`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: a shared reference forwards to the same allocator.
unsafe impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    unsafe fn reallocate(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        // SAFETY: same contract as the caller's.
        unsafe { (**self).reallocate(block, new_layout) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: same contract as the caller's.
        unsafe { (**self).release(ptr, layout) }
    }
}
