use std::{alloc::Layout, ptr::NonNull};

use crate::error::{Result, alloc_failed};

mod block_arena;
mod heap_allocator;

pub mod prelude {
    #![allow(unused)]

    pub use super::MemAllocator;
    pub use super::block_arena::{ALIGN, BlockArena};
    pub use super::heap_allocator::HeapAllocator;
}

/// Source of node memory for a skip list.
///
/// # Safety
///
/// A successful `try_allocate` must return memory that is valid for reads and
/// writes of `layout.size()` bytes, aligned to `layout.align()`, not handed
/// out again, and not freed until the allocator is dropped. `mem_usage` must
/// be safe to call while another thread allocates.
///
/// The skip list writes its nodes straight into that memory, so a safe impl
/// is rejected:
///
/// ```compile_fail
/// use std::{alloc::Layout, ptr::NonNull};
///
/// use memlist::prelude::*;
///
/// struct Dangling;
///
/// impl MemAllocator for Dangling {
///     unsafe fn try_allocate(&self, _layout: Layout) -> Result<NonNull<u8>> {
///         Ok(NonNull::dangling())
///     }
///
///     fn mem_usage(&self) -> usize {
///         0
///     }
/// }
/// ```
pub unsafe trait MemAllocator: Send + Sync {
    /// # Safety
    ///
    /// `layout` must have a non-zero size. Implementations may allow only one
    /// allocating thread at a time; the caller must uphold that.
    unsafe fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>>;

    /// Like [`MemAllocator::try_allocate`], but running out of memory aborts.
    ///
    /// # Safety
    ///
    /// Same as [`MemAllocator::try_allocate`].
    unsafe fn allocate(&self, layout: Layout) -> NonNull<u8> {
        match unsafe { self.try_allocate(layout) } {
            Ok(ptr) => ptr,
            Err(err) => alloc_failed(err),
        }
    }

    /// Total bytes acquired so far. Safe to call from any thread, even while
    /// another thread allocates.
    fn mem_usage(&self) -> usize;
}
