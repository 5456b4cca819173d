use super::*;

#[test]
fn growth_reallocates_in_place_of_copying() {
    let counting = Counting::default();
    let mut buf = GrowableBuffer::new_in(&counting);
    for i in 0..5u32 {
        buf.append(i);
    }
    // 2 -> 4 -> 8
    assert_eq!(counting.reallocs.get(), 3);
    assert_eq!(counting.live.get(), 1);
    assert_eq!(buf, [0, 1, 2, 3, 4]);

    buf.free();
    assert_eq!(counting.releases.get(), 1);
    assert_eq!(counting.live.get(), 0);
}

#[test]
fn drop_releases_block() {
    let counting = Counting::default();
    {
        let mut buf = GrowableBuffer::new_in(&counting);
        buf.append_slice(&[1u8, 2, 3]);
        assert_eq!(counting.live.get(), 1);
    }
    assert_eq!(counting.releases.get(), 1);
    assert_eq!(counting.live.get(), 0);
}

#[test]
fn unallocated_buffer_never_calls_allocator() {
    let counting = Counting::default();
    let mut buf: GrowableBuffer<u32, &Counting> = GrowableBuffer::new_in(&counting);
    buf.insert_at(0, 1);
    buf.delete_at(0);
    buf.shrink_to_fit();
    buf.free();
    drop(buf);
    assert_eq!(counting.reallocs.get(), 0);
    assert_eq!(counting.releases.get(), 0);
}

#[test]
fn zero_sized_elements_skip_allocator() {
    let counting = Counting::default();
    let mut buf = GrowableBuffer::new_in(&counting);
    for _ in 0..10 {
        buf.append(());
    }
    assert_eq!(buf.capacity(), 16);
    buf.free();
    assert_eq!(counting.reallocs.get(), 0);
    assert_eq!(counting.releases.get(), 0);
}

#[test]
fn resize_to_zero_releases() {
    let counting = Counting::default();
    let mut buf = GrowableBuffer::new_in(&counting);
    buf.append(1u64);
    buf.resize(0);
    assert_eq!(counting.releases.get(), 1);
    assert!(!buf.is_allocated());
}

#[test]
fn first_allocation_failure_is_reported() {
    let limited = Limited::new(0);
    let mut buf: GrowableBuffer<u32, &Limited> = GrowableBuffer::new_in(&limited);
    let err = buf.try_append(1).unwrap_err();

    assert_eq!(
        err,
        BufferError::AllocationFailure {
            layout: Layout::array::<u32>(2).unwrap()
        }
    );
    assert!(!buf.is_allocated());
    assert!(buf.is_empty());
}

#[test]
fn growth_failure_leaves_contents() {
    let limited = Limited::new(1);
    let mut buf = GrowableBuffer::new_in(&limited);
    buf.try_append_slice(&[1u16, 2]).unwrap();

    assert!(matches!(
        buf.try_append(3),
        Err(BufferError::AllocationFailure { .. })
    ));
    assert!(matches!(
        buf.try_insert_at(0, 0),
        Err(BufferError::AllocationFailure { .. })
    ));
    assert!(matches!(
        buf.try_insert_slice_at(1, &[9]),
        Err(BufferError::AllocationFailure { .. })
    ));
    assert_eq!(buf, [1, 2]);
    assert_eq!(buf.capacity(), 2);
}

#[test]
fn shrink_failure_is_reported() {
    let limited = Limited::new(1);
    let mut buf = GrowableBuffer::new_in(&limited);
    buf.try_resize(8).unwrap();
    buf.try_append(5u8).unwrap();

    assert!(buf.try_shrink_to_fit().is_err());
    assert_eq!(buf.capacity(), 8);
    assert_eq!(buf, [5]);
}

#[test]
fn silent_noops_succeed_without_allocating() {
    let limited = Limited::new(0);
    let mut buf: GrowableBuffer<u8, &Limited> = GrowableBuffer::new_in(&limited);
    assert_eq!(buf.try_insert_at(0, 1), Ok(()));
    assert_eq!(buf.try_insert_slice_at(0, &[1, 2]), Ok(()));
    assert_eq!(buf.try_append_slice(&[]), Ok(()));
    assert_eq!(buf.try_shrink_to_fit(), Ok(()));
    assert_eq!(buf.try_resize(0), Ok(()));
}

#[test]
fn error_messages() {
    let layout = Layout::array::<u64>(4).unwrap();
    assert_eq!(
        BufferError::AllocationFailure { layout }.to_string(),
        "memory allocation of 32 bytes failed"
    );
    assert_eq!(
        BufferError::CapacityOverflow.to_string(),
        "capacity overflow"
    );
}

#[test]
#[should_panic(expected = "capacity overflow")]
fn fatal_overflow_panics() {
    BufferError::CapacityOverflow.fatal();
}

#[test]
fn heap_preserves_bytes_on_realloc() {
    let small = Layout::array::<u8>(4).unwrap();
    let large = Layout::array::<u8>(64).unwrap();
    unsafe {
        let block = Heap.reallocate(None, small).unwrap();
        block.as_ptr().copy_from_nonoverlapping([1u8, 2, 3, 4].as_ptr(), 4);

        let grown = Heap.reallocate(Some((block, small)), large).unwrap();
        let bytes = std::slice::from_raw_parts(grown.as_ptr(), 4);
        assert_eq!(bytes, &[1, 2, 3, 4]);

        Heap.release(grown, large);
    }
}

#[test]
fn clone_uses_same_allocator() {
    let counting = Counting::default();
    let mut buf = GrowableBuffer::new_in(&counting);
    buf.append_slice(&[1i32, 2, 3]);
    let copy = buf.clone();
    assert_eq!(copy, buf);
    assert!(std::ptr::eq(*copy.allocator(), &counting));
    assert_eq!(counting.live.get(), 2);
    drop(copy);
    drop(buf);
    assert_eq!(counting.live.get(), 0);
}
