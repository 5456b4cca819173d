use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::allocator::{Heap, RawAllocator};
use crate::error::{BufferError, Result};
use crate::header::Header;
use crate::policy;

/// Growable, contiguous, typed buffer.
///
/// Elements live in a single block obtained from the allocator `A`. The
/// block is created lazily by the first growing operation and grows to the
/// next power of two whenever it runs out of room (see [`policy`]). A buffer
/// with no block is *unallocated*: it reports length and capacity `0`.
///
/// Operations that may allocate come in pairs. The plain form (`append`,
/// `resize`, ...) treats failure as fatal, see [`BufferError::fatal`]. The
/// `try_` form returns the error instead.
///
/// Out-of-range indices and empty bulk inputs are silently ignored rather
/// than reported.
///
/// # Example
///
/// ```
/// use grow_buf::GrowableBuffer;
///
/// let mut buf = GrowableBuffer::new();
/// buf.append(1);
/// buf.append(2);
/// buf.append(3);
/// assert_eq!((buf.len(), buf.capacity()), (3, 4));
///
/// assert_eq!(buf.pop_back(), 3);
/// buf.delete_at(0);
/// assert_eq!(buf.as_slice(), &[2]);
///
/// buf.shrink_to_fit();
/// assert_eq!(buf.capacity(), 1);
/// ```
pub struct GrowableBuffer<T, A: RawAllocator = Heap> {
    /// Start of the element block. Dangling while unallocated.
    ptr: NonNull<T>,
    len: usize,
    /// Allocated slots. `0` means no block.
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer exclusively owns its elements and its block, like
// `Vec<T>`. Sending or sharing it is sound when `T` and `A` allow it.
unsafe impl<T: Send, A: RawAllocator + Send> Send for GrowableBuffer<T, A> {}
unsafe impl<T: Sync, A: RawAllocator + Sync> Sync for GrowableBuffer<T, A> {}

impl<T> GrowableBuffer<T> {
    /// Creates an unallocated buffer on the global heap.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Heap)
    }

    /// Creates a buffer with exactly `capacity` slots on the global heap.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts if the allocation fails.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Heap)
    }
}

impl<T, A: RawAllocator> GrowableBuffer<T, A> {
    /// Creates an unallocated buffer that will allocate from `alloc`.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Creates a buffer with exactly `capacity` slots allocated from `alloc`.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts if the allocation fails.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        let mut buf = Self::new_in(alloc);
        buf.resize(capacity);
        buf
    }

    /// Returns the allocator backing this buffer.
    #[must_use]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of live elements. `0` when unallocated.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of allocated slots. `0` when unallocated.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns `true` if a block is currently allocated.
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.cap != 0
    }

    /// Returns a snapshot of length and capacity.
    #[must_use]
    pub const fn header(&self) -> Header {
        Header {
            length: self.len,
            capacity: self.cap,
        }
    }

    /// Returns a pointer to the first slot, or null while unallocated.
    ///
    /// Any operation that changes the capacity may move the block and
    /// invalidate the pointer.
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        if self.cap == 0 {
            ptr::null()
        } else {
            self.ptr.as_ptr()
        }
    }

    /// Returns the live elements as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr[..len]` is initialized; `ptr` is dangling only when
        // `len == 0`, which is valid for an empty slice.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    #[must_use]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` gives exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Sets the capacity to exactly `new_capacity`, without rounding.
    ///
    /// `0` releases the block and makes the buffer unallocated, dropping
    /// every element. A capacity below the current length drops the
    /// trailing elements; callers are expected not to rely on this.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts if the allocation fails.
    pub fn resize(&mut self, new_capacity: usize) {
        if let Err(err) = self.try_resize(new_capacity) {
            err.fatal();
        }
    }

    /// Fallible form of [`resize`](Self::resize).
    ///
    /// On error the capacity is unchanged. When shrinking below the length,
    /// the trailing elements are dropped before the block is resized.
    ///
    /// # Errors
    ///
    /// [`BufferError::CapacityOverflow`] if the block size overflows,
    /// [`BufferError::AllocationFailure`] if the allocator fails.
    pub fn try_resize(&mut self, new_capacity: usize) -> Result<()> {
        self.set_capacity(new_capacity)
    }

    /// Shrinks the capacity to exactly the length.
    ///
    /// Does nothing when the buffer is empty: an empty buffer keeps its
    /// block. Use [`free`](Self::free) to release it.
    ///
    /// # Panics
    ///
    /// Aborts if the allocator fails to resize the block.
    pub fn shrink_to_fit(&mut self) {
        if let Err(err) = self.try_shrink_to_fit() {
            err.fatal();
        }
    }

    /// Fallible form of [`shrink_to_fit`](Self::shrink_to_fit).
    ///
    /// # Errors
    ///
    /// [`BufferError::AllocationFailure`] if the allocator fails.
    pub fn try_shrink_to_fit(&mut self) -> Result<()> {
        if self.len > 0 && self.len != self.cap {
            self.set_capacity(self.len)
        } else {
            Ok(())
        }
    }

    /// Appends `value` at the end, allocating the buffer if needed.
    ///
    /// O(1) amortized.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts if the allocation fails.
    pub fn append(&mut self, value: T) {
        if let Err(err) = self.try_append(value) {
            err.fatal();
        }
    }

    /// Fallible form of [`append`](Self::append). On error `value` is
    /// dropped and the buffer is unchanged.
    ///
    /// # Errors
    ///
    /// See [`try_resize`](Self::try_resize).
    pub fn try_append(&mut self, value: T) -> Result<()> {
        self.reserve_for(self.required(1)?)?;
        // SAFETY: `len < cap` after `reserve_for`.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Inserts `value` at `index`, shifting later elements right.
    ///
    /// Silently ignored if the buffer is unallocated or `index > len`.
    /// `index == len` appends.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts if the allocation fails.
    pub fn insert_at(&mut self, index: usize, value: T) {
        if let Err(err) = self.try_insert_at(index, value) {
            err.fatal();
        }
    }

    /// Fallible form of [`insert_at`](Self::insert_at).
    ///
    /// # Errors
    ///
    /// See [`try_resize`](Self::try_resize).
    pub fn try_insert_at(&mut self, index: usize, value: T) -> Result<()> {
        if self.cap == 0 || index > self.len {
            return Ok(());
        }
        self.reserve_for(self.required(1)?)?;
        // SAFETY: `index <= len < cap`; the shifted range ends at `len + 1`
        // which is within capacity. `ptr::copy` handles the overlap.
        unsafe {
            let slot = self.ptr.as_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.len - index);
            slot.write(value);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element, or `None` if empty.
    pub const fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` is initialized and is no
        // longer counted as live.
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Removes and returns the last element, or `T::default()` if empty.
    ///
    /// An empty buffer and a stored default value are indistinguishable
    /// here; check [`is_empty`](Self::is_empty) or use [`pop`](Self::pop)
    /// when that matters.
    pub fn pop_back(&mut self) -> T
    where
        T: Default,
    {
        self.pop().unwrap_or_default()
    }

    /// Drops the element at `index` and shifts later elements left.
    ///
    /// Silently ignored if `index >= len`. O(len - index).
    pub fn delete_at(&mut self, index: usize) {
        if index >= self.len {
            return;
        }
        // SAFETY: `index < len`; the element is read out before its slot is
        // overwritten by the shift.
        let removed = unsafe {
            let slot = self.ptr.as_ptr().add(index);
            let removed = slot.read();
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            removed
        };
        self.len -= 1;
        drop(removed);
    }

    /// Drops `n` elements starting at `index` and shifts the tail left.
    ///
    /// Silently ignored unless `index + n <= len`.
    pub fn delete_range(&mut self, index: usize, n: usize) {
        let Some(end) = index.checked_add(n) else {
            return;
        };
        if n == 0 || end > self.len {
            return;
        }
        let tail = self.len - end;
        // Leak rather than double-drop if a destructor panics.
        self.len = index;
        // SAFETY: `[index, end)` is initialized and no longer live; the tail
        // `[end, end + tail)` is moved down over it.
        unsafe {
            let slot = self.ptr.as_ptr().add(index);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(slot, n));
            ptr::copy(slot.add(n), slot, tail);
        }
        self.len = index + tail;
    }

    /// Drops every element and releases the block. The buffer becomes
    /// unallocated and may be reused. Calling it again does nothing.
    pub fn free(&mut self) {
        self.release();
    }

    fn required(&self, additional: usize) -> Result<usize> {
        self.len
            .checked_add(additional)
            .ok_or(BufferError::CapacityOverflow)
    }

    /// Ensures room for at least `min` elements following the growth policy.
    fn reserve_for(&mut self, min: usize) -> Result<()> {
        if self.cap == 0 {
            return self.set_capacity(policy::initial_capacity(min)?);
        }
        if self.cap < min {
            return self.set_capacity(policy::grow_capacity(min)?);
        }
        Ok(())
    }

    fn layout_for(cap: usize) -> Result<Layout> {
        Layout::array::<T>(cap).map_err(|_| BufferError::CapacityOverflow)
    }

    /// The allocated block and its layout, if memory is actually held.
    fn block(&self) -> Option<(NonNull<u8>, Layout)> {
        if self.cap == 0 {
            return None;
        }
        let layout = Self::layout_for(self.cap).ok()?;
        (layout.size() != 0).then_some((self.ptr.cast(), layout))
    }

    fn set_capacity(&mut self, new_cap: usize) -> Result<()> {
        if new_cap == self.cap {
            return Ok(());
        }
        if new_cap == 0 {
            self.release();
            return Ok(());
        }
        let new_layout = Self::layout_for(new_cap)?;
        if new_cap < self.len {
            tracing::warn!(
                target: "grow_buf",
                len = self.len,
                new_cap,
                "resize below length drops trailing elements"
            );
            self.truncate(new_cap);
        }
        if new_layout.size() != 0 {
            // SAFETY: `block` came from `self.alloc` with its layout; the
            // new layout is non-empty and has the same alignment.
            let raw = unsafe { self.alloc.reallocate(self.block(), new_layout) }
                .ok_or(BufferError::AllocationFailure { layout: new_layout })?;
            self.ptr = raw.cast();
        }
        tracing::debug!(
            target: "grow_buf",
            from = self.cap,
            to = new_cap,
            elem_size = size_of::<T>(),
            "reallocated buffer"
        );
        self.cap = new_cap;
        Ok(())
    }

    fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let dropped = self.len - new_len;
        self.len = new_len;
        // SAFETY: `[new_len, new_len + dropped)` was initialized and is no
        // longer counted as live.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(new_len),
                dropped,
            ));
        }
    }

    fn release(&mut self) {
        if self.cap == 0 {
            return;
        }
        self.truncate(0);
        if let Some((block, layout)) = self.block() {
            // SAFETY: `block` came from `self.alloc` with `layout` and is
            // forgotten right after.
            unsafe { self.alloc.release(block, layout) };
        }
        tracing::trace!(target: "grow_buf", capacity = self.cap, "released buffer");
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T: Copy, A: RawAllocator> GrowableBuffer<T, A> {
    /// Copies `values` onto the end, allocating the buffer if needed.
    ///
    /// Does nothing for an empty slice.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts if the allocation fails.
    pub fn append_slice(&mut self, values: &[T]) {
        if let Err(err) = self.try_append_slice(values) {
            err.fatal();
        }
    }

    /// Fallible form of [`append_slice`](Self::append_slice).
    ///
    /// # Errors
    ///
    /// See [`try_resize`](Self::try_resize).
    pub fn try_append_slice(&mut self, values: &[T]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let n = values.len();
        self.reserve_for(self.required(n)?)?;
        // SAFETY: `len + n <= cap`; `values` cannot alias the buffer while
        // it is mutably borrowed.
        unsafe {
            ptr::copy_nonoverlapping(values.as_ptr(), self.ptr.as_ptr().add(self.len), n);
        }
        self.len += n;
        Ok(())
    }

    /// Copies `values` in at `index`, shifting later elements right.
    ///
    /// Silently ignored if the buffer is unallocated, `index > len`, or
    /// `values` is empty.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts if the allocation fails.
    pub fn insert_slice_at(&mut self, index: usize, values: &[T]) {
        if let Err(err) = self.try_insert_slice_at(index, values) {
            err.fatal();
        }
    }

    /// Fallible form of [`insert_slice_at`](Self::insert_slice_at).
    ///
    /// # Errors
    ///
    /// See [`try_resize`](Self::try_resize).
    pub fn try_insert_slice_at(&mut self, index: usize, values: &[T]) -> Result<()> {
        if self.cap == 0 || index > self.len || values.is_empty() {
            return Ok(());
        }
        let n = values.len();
        self.reserve_for(self.required(n)?)?;
        // SAFETY: `len + n <= cap`; the tail moves to `[index + n, len + n)`
        // and the gap is filled from a slice that cannot alias the buffer.
        unsafe {
            let slot = self.ptr.as_ptr().add(index);
            ptr::copy(slot, slot.add(n), self.len - index);
            ptr::copy_nonoverlapping(values.as_ptr(), slot, n);
        }
        self.len += n;
        Ok(())
    }

    /// Returns a copy of the first element, or `T::default()` if empty.
    ///
    /// Same ambiguity as [`pop_back`](Self::pop_back).
    #[must_use]
    pub fn first_or_default(&self) -> T
    where
        T: Default,
    {
        self.as_slice().first().copied().unwrap_or_default()
    }

    /// Returns a copy of the last element, or `T::default()` if empty.
    ///
    /// Same ambiguity as [`pop_back`](Self::pop_back).
    #[must_use]
    pub fn last_or_default(&self) -> T
    where
        T: Default,
    {
        self.as_slice().last().copied().unwrap_or_default()
    }
}

impl<T, A: RawAllocator> Drop for GrowableBuffer<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, A: RawAllocator + Clone> Clone for GrowableBuffer<T, A> {
    /// Copies the elements into a new block of the same capacity.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity_in(self.cap, self.alloc.clone());
        out.append_slice(self.as_slice());
        out
    }
}

impl<T, A: RawAllocator> std::ops::Deref for GrowableBuffer<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: RawAllocator> std::ops::DerefMut for GrowableBuffer<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: RawAllocator> AsRef<[T]> for GrowableBuffer<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: std::fmt::Debug, A: RawAllocator> std::fmt::Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq, A: RawAllocator, B: RawAllocator> PartialEq<GrowableBuffer<T, B>>
    for GrowableBuffer<T, A>
{
    fn eq(&self, other: &GrowableBuffer<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: RawAllocator> Eq for GrowableBuffer<T, A> {}

impl<T: PartialEq, A: RawAllocator> PartialEq<[T]> for GrowableBuffer<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, A: RawAllocator, const N: usize> PartialEq<[T; N]> for GrowableBuffer<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}

impl<'a, T, A: RawAllocator> IntoIterator for &'a GrowableBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A: RawAllocator> IntoIterator for &'a mut GrowableBuffer<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, A: RawAllocator> Extend<T> for GrowableBuffer<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> std::iter::FromIterator<T> for GrowableBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buf = Self::new();
        buf.extend(iter);
        buf
    }
}
