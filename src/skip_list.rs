use std::{
    alloc::Layout,
    cmp::Ordering::*,
    mem,
    ptr::{self, NonNull, null_mut},
    sync::atomic::{AtomicPtr, AtomicUsize, Ordering::*},
};

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{comparator::prelude::*, mem_allocator::prelude::*};

mod iter;

use self::iter::{Keys, SkipListIter};

pub mod prelude {
    #![allow(unused)]

    pub use super::iter::{Keys, SkipListIter};
    pub use super::{MAX_HEIGHT, SkipList};
}

pub const MAX_HEIGHT: usize = 12;

const BRANCHING: u32 = 4;
const HEIGHT_SEED: u64 = 0xdeadbeef;

#[repr(C)]
struct Node<K> {
    key: K,
    // Only the first `height` slots are allocated.
    tower: [AtomicPtr<Node<K>>; 0],
}

impl<K> Node<K> {
    fn get_layout(height: usize) -> Layout {
        assert!((1..=MAX_HEIGHT).contains(&height));
        let size = mem::offset_of!(Node<K>, tower) + mem::size_of::<AtomicPtr<Self>>() * height;
        let align = mem::align_of::<Self>();
        Layout::from_size_align(size, align)
            .unwrap_or_else(|_| panic!("Layout error, size: {size}, align: {align}"))
    }

    /// # Safety
    ///
    /// `node` is live and taller than `level`.
    unsafe fn slot<'a>(node: *mut Self, level: usize) -> &'a AtomicPtr<Self> {
        unsafe {
            &*(&raw const (*node).tower)
                .cast::<AtomicPtr<Self>>()
                .add(level)
        }
    }

    unsafe fn next(node: *mut Self, level: usize) -> *mut Self {
        unsafe { Self::slot(node, level).load(Acquire) }
    }

    unsafe fn set_next(node: *mut Self, level: usize, next: *mut Self) {
        unsafe { Self::slot(node, level).store(next, Release) }
    }

    unsafe fn next_relaxed(node: *mut Self, level: usize) -> *mut Self {
        unsafe { Self::slot(node, level).load(Relaxed) }
    }

    unsafe fn set_next_relaxed(node: *mut Self, level: usize, next: *mut Self) {
        unsafe { Self::slot(node, level).store(next, Relaxed) }
    }

    /// # Safety
    ///
    /// `node` is live and is not the head.
    unsafe fn key<'a>(node: *mut Self) -> &'a K {
        unsafe { &(*node).key }
    }

    unsafe fn init_tower(node: *mut Self, height: usize) {
        unsafe {
            let tower = (&raw mut (*node).tower).cast::<AtomicPtr<Self>>();
            for level in 0..height {
                ptr::write(tower.add(level), AtomicPtr::new(null_mut()));
            }
        }
    }

    /// # Safety
    ///
    /// No other allocation on `allocator` may be in progress.
    unsafe fn new_in(key: K, height: usize, allocator: &impl MemAllocator) -> *mut Self {
        let layout = Self::get_layout(height);
        unsafe {
            let p = allocator.allocate(layout).as_ptr().cast::<Self>();
            assert!(p.is_aligned());

            ptr::write(&raw mut (*p).key, key);
            Self::init_tower(p, height);
            p
        }
    }

    // The head never holds a key.
    unsafe fn new_head(allocator: &impl MemAllocator) -> NonNull<Self> {
        let layout = Self::get_layout(MAX_HEIGHT);
        unsafe {
            let p = allocator.allocate(layout).cast::<Self>();
            assert!(p.as_ptr().is_aligned());

            Self::init_tower(p.as_ptr(), MAX_HEIGHT);
            p
        }
    }
}

/// Ordered set of keys. Writers are serialized on an internal mutex, readers
/// never block.
pub struct SkipList<K, C, A = BlockArena> {
    head: NonNull<Node<K>>,
    max_height: AtomicUsize,
    writer: Mutex<SmallRng>,
    c: C,
    a: A,
}

unsafe impl<K, C, A> Send for SkipList<K, C, A>
where
    K: Send,
    C: Send,
    A: Send,
{
}

unsafe impl<K, C, A> Sync for SkipList<K, C, A>
where
    K: Send + Sync,
    C: Sync,
    A: Sync,
{
}

impl<K, C, A> Default for SkipList<K, C, A>
where
    C: Comparator<Item = K> + Default,
    A: MemAllocator + Default,
{
    fn default() -> Self {
        Self::new(C::default(), A::default())
    }
}

impl<K, C, A> SkipList<K, C, A>
where
    C: Comparator<Item = K>,
    A: MemAllocator,
{
    pub fn new(c: C, a: A) -> Self {
        // SAFETY: `a` is not shared with anyone yet.
        let head = unsafe { Node::new_head(&a) };
        SkipList {
            head,
            max_height: AtomicUsize::new(1),
            writer: Mutex::new(SmallRng::seed_from_u64(HEIGHT_SEED)),
            c,
            a,
        }
    }

    pub fn height(&self) -> usize {
        self.max_height.load(Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        unsafe { Node::next(self.head.as_ptr(), 0).is_null() }
    }

    pub fn mem_usage(&self) -> usize {
        self.a.mem_usage()
    }

    /// Inserts `key`. No equal key may already be present.
    pub fn insert(&self, key: K) {
        let mut rng = self.writer.lock();

        // Levels above the current height start from the head.
        let mut prev = [self.head.as_ptr(); MAX_HEIGHT];
        let x = self.find_greater_or_equal(&key, Some(&mut prev));
        debug_assert!(
            x.is_null() || self.c.compare(&key, unsafe { Node::key(x) }) != Equal,
            "duplicate key inserted"
        );

        let height = random_height(&mut *rng);
        let max_height = self.height();
        if height > max_height {
            tracing::debug!(from = max_height, to = height, "skip list height grows");
            // Readers seeing the old height skip the new levels, readers seeing
            // the new one find null or an already published node there.
            self.max_height.store(height, Relaxed);
        }

        // SAFETY: the writer lock is held.
        let node = unsafe { Node::new_in(key, height, &self.a) };
        for (level, &prev) in prev.iter().enumerate().take(height) {
            unsafe {
                // `node` is unreachable until the release store below.
                Node::set_next_relaxed(node, level, Node::next_relaxed(prev, level));
                Node::set_next(prev, level, node);
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        let x = self.find_greater_or_equal(key, None);
        !x.is_null() && self.c.compare(key, unsafe { Node::key(x) }) == Equal
    }

    pub fn iter(&self) -> SkipListIter<'_, K, C, A> {
        SkipListIter::new(self)
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, C, A> {
        Keys::new(self)
    }

    fn head(&self) -> *mut Node<K> {
        self.head.as_ptr()
    }

    fn key_is_after_node(&self, key: &K, n: *mut Node<K>) -> bool {
        !n.is_null() && self.c.compare(unsafe { Node::key(n) }, key) == Less
    }

    // First node >= key, or null.
    fn find_greater_or_equal(
        &self,
        key: &K,
        mut prev: Option<&mut [*mut Node<K>; MAX_HEIGHT]>,
    ) -> *mut Node<K> {
        let mut x = self.head();
        let mut level = self.height() - 1;
        loop {
            let next = unsafe { Node::next(x, level) };
            if self.key_is_after_node(key, next) {
                x = next;
                continue;
            }

            if let Some(prev) = prev.as_deref_mut() {
                prev[level] = x;
            }
            if level == 0 {
                return next;
            }
            level -= 1;
        }
    }

    fn find_less_than(&self, key: &K) -> *mut Node<K> {
        let head = self.head();
        let mut x = head;
        let mut level = self.height() - 1;
        loop {
            debug_assert!(ptr::eq(x, head) || self.key_is_after_node(key, x));
            let next = unsafe { Node::next(x, level) };
            if self.key_is_after_node(key, next) {
                x = next;
                continue;
            }

            if level == 0 {
                return x;
            }
            level -= 1;
        }
    }

    fn find_last(&self) -> *mut Node<K> {
        let mut x = self.head();
        let mut level = self.height() - 1;
        loop {
            let next = unsafe { Node::next(x, level) };
            if !next.is_null() {
                x = next;
                continue;
            }

            if level == 0 {
                return x;
            }
            level -= 1;
        }
    }
}

impl<K, C, A> Drop for SkipList<K, C, A> {
    fn drop(&mut self) {
        if !mem::needs_drop::<K>() {
            return;
        }

        unsafe {
            let mut cur = Node::next(self.head.as_ptr(), 0);
            while !cur.is_null() {
                let next = Node::next(cur, 0);
                ptr::drop_in_place(&raw mut (*cur).key);
                cur = next;
            }
        }
    }
}

// [1, MAX_HEIGHT]
fn random_height(rng: &mut impl Rng) -> usize {
    let mut h = 1;
    while h < MAX_HEIGHT && rng.random::<u32>() % BRANCHING == 0 {
        h += 1;
    }
    h
}
