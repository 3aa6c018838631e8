use std::{
    alloc::{self, Layout},
    cell::UnsafeCell,
    mem,
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering::*},
};

use super::MemAllocator;
use crate::{
    error::{Error, Result, alloc_failed},
    options::ArenaOptions,
};

/// Alignment of [`BlockArena::allocate_aligned`]: the pointer size, but at
/// least 8.
pub const ALIGN: usize = if mem::size_of::<usize>() > 8 {
    mem::size_of::<usize>()
} else {
    8
};

struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

struct BlockArenaInner {
    blocks: Vec<Block>,
    ptr: NonNull<u8>,
    remaining_size: usize,
}

impl BlockArenaInner {
    fn carve(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let slop = self.ptr.as_ptr().align_offset(align);
        let need = slop.checked_add(size)?;
        if need > self.remaining_size {
            return None;
        }

        unsafe {
            let result = self.ptr.add(slop);
            self.ptr = result.add(size);
            self.remaining_size -= need;
            Some(result)
        }
    }
}

/// Bump-pointer arena that frees all of its blocks at once when dropped.
///
/// Allocation is single-writer: the `allocate*` methods must never run
/// concurrently with each other. [`BlockArena::memory_usage`] may be called
/// from any thread at any time.
pub struct BlockArena {
    inner: UnsafeCell<BlockArenaInner>,
    block_size: usize,
    memory_usage: AtomicUsize,
}

unsafe impl Send for BlockArena {}
unsafe impl Sync for BlockArena {}

impl BlockArena {
    pub fn new() -> Self {
        Self::with_options(ArenaOptions::default())
    }

    pub fn with_options(options: ArenaOptions) -> Self {
        Self {
            inner: UnsafeCell::new(BlockArenaInner {
                blocks: Vec::new(),
                ptr: NonNull::dangling(),
                remaining_size: 0,
            }),
            block_size: options.block_size,
            memory_usage: AtomicUsize::new(0),
        }
    }

    /// # Safety
    ///
    /// No other allocation on this arena may be in progress.
    pub unsafe fn allocate(&self, bytes: usize) -> NonNull<u8> {
        unsafe { self.alloc(bytes, 1) }.unwrap_or_else(|err| alloc_failed(err))
    }

    /// Aligned to [`ALIGN`].
    ///
    /// # Safety
    ///
    /// Same as [`BlockArena::allocate`].
    pub unsafe fn allocate_aligned(&self, bytes: usize) -> NonNull<u8> {
        unsafe { self.alloc(bytes, ALIGN) }.unwrap_or_else(|err| alloc_failed(err))
    }

    pub fn memory_usage(&self) -> usize {
        self.memory_usage.load(Relaxed)
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    unsafe fn alloc(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        assert!(size > 0, "zero-sized arena allocation");
        assert!(align.is_power_of_two());

        let inner = unsafe { &mut *self.inner.get() };
        if let Some(ptr) = inner.carve(size, align) {
            return Ok(ptr);
        }
        self.alloc_fallback(inner, size, align)
    }

    fn alloc_fallback(
        &self,
        inner: &mut BlockArenaInner,
        size: usize,
        align: usize,
    ) -> Result<NonNull<u8>> {
        // Worst-case padding inside a fresh block.
        let need = size + align.saturating_sub(ALIGN);
        if need > self.block_size / 4 {
            // The current block keeps serving small requests.
            return self.new_block(inner, size, align, true);
        }

        // Whatever is left in the current block is abandoned.
        let ptr = self.new_block(inner, self.block_size, ALIGN, false)?;
        inner.ptr = ptr;
        inner.remaining_size = self.block_size;

        Ok(inner
            .carve(size, align)
            .unwrap_or_else(|| unreachable!("fresh block cannot hold {size} bytes")))
    }

    fn new_block(
        &self,
        inner: &mut BlockArenaInner,
        size: usize,
        align: usize,
        dedicated: bool,
    ) -> Result<NonNull<u8>> {
        let layout = Layout::from_size_align(size, align.max(ALIGN))?;

        // SAFETY: `size` is non-zero.
        let ptr = NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(Error::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        })?;

        inner.blocks.push(Block { ptr, layout });
        let usage = self.memory_usage.fetch_add(layout.size(), Relaxed) + layout.size();
        tracing::trace!(
            size = layout.size(),
            dedicated,
            blocks = inner.blocks.len(),
            usage,
            "arena acquired block"
        );

        Ok(ptr)
    }
}

impl Default for BlockArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BlockArena {
    fn drop(&mut self) {
        for block in self.inner.get_mut().blocks.drain(..) {
            // SAFETY: every block was obtained from the global allocator with
            // exactly this layout.
            unsafe { alloc::dealloc(block.ptr.as_ptr(), block.layout) };
        }
    }
}

unsafe impl MemAllocator for BlockArena {
    unsafe fn try_allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        unsafe { self.alloc(layout.size(), layout.align()) }
    }

    fn mem_usage(&self) -> usize {
        self.memory_usage()
    }
}
