use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use super::*;

struct Tracked(Rc<Cell<u32>>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Heap allocator that counts the calls it forwards.
#[derive(Default)]
struct Counting {
    reallocs: Cell<usize>,
    releases: Cell<usize>,
    live: Cell<usize>,
}

unsafe impl RawAllocator for Counting {
    unsafe fn reallocate(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        self.reallocs.set(self.reallocs.get() + 1);
        if block.is_none() {
            self.live.set(self.live.get() + 1);
        }
        unsafe { Heap.reallocate(block, new_layout) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.releases.set(self.releases.get() + 1);
        self.live.set(self.live.get() - 1);
        unsafe { Heap.release(ptr, layout) }
    }
}

/// Heap allocator that refuses every request after the first `budget`.
struct Limited {
    budget: Cell<usize>,
}

impl Limited {
    fn new(budget: usize) -> Self {
        Self {
            budget: Cell::new(budget),
        }
    }
}

unsafe impl RawAllocator for Limited {
    unsafe fn reallocate(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        let left = self.budget.get();
        if left == 0 {
            return None;
        }
        self.budget.set(left - 1);
        unsafe { Heap.reallocate(block, new_layout) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { Heap.release(ptr, layout) }
    }
}

mod allocator;
