use std::iter::FusedIterator;

use crate::GrowableBuffer;
use crate::allocator::{Heap, RawAllocator};

/// Container kind a [`SequenceCursor`] knows how to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CursorKind {
    /// A [`GrowableBuffer`].
    Array = 0,
}

impl TryFrom<u32> for CursorKind {
    type Error = u32;

    fn try_from(tag: u32) -> Result<Self, u32> {
        match tag {
            0 => Ok(Self::Array),
            other => Err(other),
        }
    }
}

/// Pull strategy: yields the element at `*index` and advances it.
type PullFn<T, A> = fn(&GrowableBuffer<T, A>, &mut usize) -> Option<T>;

fn pull_array<T: Copy, A: RawAllocator>(
    buf: &GrowableBuffer<T, A>,
    index: &mut usize,
) -> Option<T> {
    let value = buf.as_slice().get(*index).copied()?;
    *index += 1;
    Some(value)
}

/// Forward-only cursor pulling element copies out of a buffer.
///
/// The cursor owns its position, so independent cursors over the same
/// buffer never interfere. Once it reaches the end it stays exhausted until
/// [`reset`](Self::reset), even if the buffer grows in the meantime.
///
/// The buffer is passed to each [`next`](Self::next) call rather than held,
/// so it may be mutated between pulls; the cursor then reads whatever the
/// buffer contains at its current position.
///
/// # Example
///
/// ```
/// use grow_buf::{CursorKind, GrowableBuffer, SequenceCursor};
///
/// let mut buf = GrowableBuffer::new();
/// buf.append_slice(&[10, 20]);
///
/// let mut cursor = SequenceCursor::new(CursorKind::Array);
/// assert_eq!(cursor.next(&buf), Some(10));
/// assert_eq!(cursor.next(&buf), Some(20));
/// assert_eq!(cursor.next(&buf), None);
///
/// cursor.reset();
/// let all: Vec<i32> = cursor.pull(&buf).collect();
/// assert_eq!(all, [10, 20]);
/// ```
pub struct SequenceCursor<T, A: RawAllocator = Heap> {
    kind: Option<CursorKind>,
    pull: Option<PullFn<T, A>>,
    index: usize,
    exhausted: bool,
}

impl<T: Copy, A: RawAllocator> SequenceCursor<T, A> {
    /// Creates a cursor using the pull strategy for `kind`.
    #[must_use]
    pub fn new(kind: CursorKind) -> Self {
        let pull: PullFn<T, A> = match kind {
            CursorKind::Array => pull_array::<T, A>,
        };
        Self {
            kind: Some(kind),
            pull: Some(pull),
            index: 0,
            exhausted: false,
        }
    }

    /// Creates a cursor from a raw kind tag.
    ///
    /// An unknown tag gives a cursor without a strategy: it reports
    /// [`has_strategy`](Self::has_strategy) as `false` and never yields.
    #[must_use]
    pub fn from_tag(tag: u32) -> Self {
        CursorKind::try_from(tag).map_or_else(
            |unknown| {
                tracing::debug!(
                    target: "grow_buf",
                    tag = unknown,
                    "no pull strategy for cursor kind"
                );
                Self {
                    kind: None,
                    pull: None,
                    index: 0,
                    exhausted: false,
                }
            },
            Self::new,
        )
    }
}

impl<T, A: RawAllocator> SequenceCursor<T, A> {
    /// Returns the kind this cursor was created for, if recognised.
    #[must_use]
    pub const fn kind(&self) -> Option<CursorKind> {
        self.kind
    }

    /// Returns `true` if the cursor has a usable pull strategy.
    #[must_use]
    pub const fn has_strategy(&self) -> bool {
        self.pull.is_some()
    }

    /// Index of the next element to pull.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.index
    }

    /// Returns `true` once the cursor has run off the end.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Rewinds to the first element.
    pub const fn reset(&mut self) {
        self.index = 0;
        self.exhausted = false;
    }

    /// Pulls the next element of `buf`, or `None` when exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self, buf: &GrowableBuffer<T, A>) -> Option<T> {
        if self.exhausted {
            return None;
        }
        let pull = self.pull?;
        let value = pull(buf, &mut self.index);
        if value.is_none() {
            self.exhausted = true;
        }
        value
    }

    /// Borrows the cursor as an [`Iterator`] over `buf`.
    ///
    /// Items consumed through the adapter advance this cursor.
    pub const fn pull<'a>(&'a mut self, buf: &'a GrowableBuffer<T, A>) -> Pull<'a, T, A> {
        Pull { cursor: self, buf }
    }
}

impl<T, A: RawAllocator> Clone for SequenceCursor<T, A> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            pull: self.pull,
            index: self.index,
            exhausted: self.exhausted,
        }
    }
}

impl<T, A: RawAllocator> std::fmt::Debug for SequenceCursor<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceCursor")
            .field("kind", &self.kind)
            .field("index", &self.index)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

/// Iterator driving a [`SequenceCursor`] over one buffer.
///
/// Created by [`SequenceCursor::pull`].
pub struct Pull<'a, T, A: RawAllocator = Heap> {
    cursor: &'a mut SequenceCursor<T, A>,
    buf: &'a GrowableBuffer<T, A>,
}

impl<T, A: RawAllocator> Iterator for Pull<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next(self.buf)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.cursor.exhausted || self.cursor.pull.is_none() {
            return (0, Some(0));
        }
        let remaining = self.buf.len().saturating_sub(self.cursor.index);
        (remaining, Some(remaining))
    }
}

impl<T, A: RawAllocator> FusedIterator for Pull<'_, T, A> {}
