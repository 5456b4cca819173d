//! Growable typed buffer with power-of-two growth.
//!
//! `grow-buf` provides a contiguous, relocatable buffer whose capacity
//! always grows to the next power of two, plus a small pull-based cursor
//! over it.
//!
//! # Types
//!
//! - [`GrowableBuffer<T, A>`] — lazily allocated buffer with append, insert,
//!   delete and shrink operations, backed by a pluggable [`RawAllocator`]
//! - [`SequenceCursor<T, A>`] — forward-only cursor owning its position
//! - [`Header`] — length/capacity snapshot
//!
//! # Failure policy
//!
//! Every operation that may allocate has a fatal form and a `try_` form.
//! The fatal form aborts on allocation failure and panics on capacity
//! overflow; the `try_` form returns a [`BufferError`]. Invalid indices are
//! never errors: the operation is silently skipped.
//!
//! # Short names
//!
//! With the `short-names` feature (on by default) the crate also exports
//! `Buf` and `Cursor` as aliases of the full type names.
//!
//! # Example
//!
//! ```
//! use grow_buf::{CursorKind, GrowableBuffer, SequenceCursor};
//!
//! let mut buf: GrowableBuffer<u32> = GrowableBuffer::new();
//! assert!(!buf.is_allocated());
//!
//! buf.append(7);
//! assert_eq!(buf.capacity(), 2);
//!
//! buf.append_slice(&[8, 9, 10]);
//! assert_eq!(buf.capacity(), 4);
//! buf.insert_at(0, 6);
//! assert_eq!(buf.capacity(), 8);
//! assert_eq!(buf[0], 6);
//!
//! let mut cursor = SequenceCursor::new(CursorKind::Array);
//! let sum: u32 = cursor.pull(&buf).sum();
//! assert_eq!(sum, 40);
//!
//! buf.free();
//! assert_eq!(buf.header().capacity, 0);
//! ```

#![deny(missing_docs)]

mod allocator;
mod buffer;
mod cursor;
mod error;
mod header;
pub mod policy;

pub use allocator::{Heap, RawAllocator};
pub use buffer::GrowableBuffer;
pub use cursor::{CursorKind, Pull, SequenceCursor};
pub use error::{BufferError, Result};
pub use header::Header;

#[cfg(feature = "short-names")]
pub use buffer::GrowableBuffer as Buf;
#[cfg(feature = "short-names")]
pub use cursor::SequenceCursor as Cursor;

#[cfg(test)]
mod tests;
