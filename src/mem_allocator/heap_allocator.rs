use std::{
    alloc::{self, Layout},
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering::*},
};

use parking_lot::Mutex;

use super::MemAllocator;
use crate::error::{Error, Result};

/// Takes every request straight from the global allocator and frees them all
/// on drop. Unlike [`super::BlockArena`] it tolerates concurrent callers.
#[derive(Default, Debug)]
pub struct HeapAllocator {
    mems: Mutex<Vec<(NonNull<u8>, Layout)>>,
    mem_alloc: AtomicUsize,
}

unsafe impl Send for HeapAllocator {}
unsafe impl Sync for HeapAllocator {}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live allocations.
    pub fn allocations(&self) -> usize {
        self.mems.lock().len()
    }
}

unsafe impl MemAllocator for HeapAllocator {
    unsafe fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        assert!(layout.size() > 0, "zero-sized allocation");

        let ptr = NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(Error::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        })?;
        self.mems.lock().push((ptr, layout));
        self.mem_alloc.fetch_add(layout.size(), Relaxed);
        Ok(ptr)
    }

    fn mem_usage(&self) -> usize {
        self.mem_alloc.load(Relaxed)
    }
}

impl Drop for HeapAllocator {
    fn drop(&mut self) {
        for (ptr, layout) in self.mems.get_mut().drain(..) {
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{alloc::Layout, sync::Arc};

    use crate::mem_allocator::MemAllocator;

    use super::HeapAllocator;

    #[test]
    fn test_heap_allocator_usage() {
        let allocator = HeapAllocator::new();
        let layout = Layout::from_size_align(40, 8).unwrap();

        for _ in 0..10 {
            let ptr = unsafe { allocator.allocate(layout) };
            assert_eq!(ptr.as_ptr() as usize % 8, 0);
        }
        assert_eq!(allocator.mem_usage(), 400);
        assert_eq!(allocator.allocations(), 10);
    }

    #[test]
    fn test_heap_allocator_concurrent() {
        let allocator = Arc::new(HeapAllocator::new());
        let layout = Layout::from_size_align(16, 8).unwrap();

        crossbeam::scope(|s| {
            for _ in 0..4 {
                let allocator = allocator.clone();
                s.spawn(move |_| {
                    for _ in 0..1000 {
                        unsafe { allocator.allocate(layout) };
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(allocator.allocations(), 4000);
        assert_eq!(allocator.mem_usage(), 4000 * 16);
    }
}
