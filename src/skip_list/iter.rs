use std::ptr::{self, null_mut};

use super::{Node, SkipList};
use crate::{comparator::Comparator, mem_allocator::MemAllocator};

/// Cursor over a [`SkipList`]. Starts out invalid.
pub struct SkipListIter<'a, K, C, A> {
    list: &'a SkipList<K, C, A>,
    node: *mut Node<K>,
}

impl<K, C, A> Clone for SkipListIter<'_, K, C, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, C, A> Copy for SkipListIter<'_, K, C, A> {}

unsafe impl<K, C, A> Send for SkipListIter<'_, K, C, A> where SkipList<K, C, A>: Sync {}

unsafe impl<K, C, A> Sync for SkipListIter<'_, K, C, A> where SkipList<K, C, A>: Sync {}

impl<'a, K, C, A> SkipListIter<'a, K, C, A>
where
    C: Comparator<Item = K>,
    A: MemAllocator,
{
    pub fn new(list: &'a SkipList<K, C, A>) -> Self {
        SkipListIter {
            list,
            node: null_mut(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.node.is_null()
    }

    pub fn key(&self) -> Option<&'a K> {
        if self.is_valid() {
            unsafe { Some(Node::key(self.node)) }
        } else {
            None
        }
    }

    pub fn next(&mut self) {
        assert!(self.is_valid());
        self.node = unsafe { Node::next(self.node, 0) };
    }

    // No backward links, so search again from the head.
    pub fn prev(&mut self) {
        assert!(self.is_valid());
        let key = unsafe { Node::key(self.node) };
        self.node = self.or_invalid(self.list.find_less_than(key));
    }

    pub fn seek(&mut self, target: &K) {
        self.node = self.list.find_greater_or_equal(target, None);
    }

    pub fn seek_to_first(&mut self) {
        self.node = unsafe { Node::next(self.list.head(), 0) };
    }

    pub fn seek_to_last(&mut self) {
        self.node = self.or_invalid(self.list.find_last());
    }

    fn or_invalid(&self, node: *mut Node<K>) -> *mut Node<K> {
        if ptr::eq(node, self.list.head()) {
            null_mut()
        } else {
            node
        }
    }
}

/// Ascending keys of a [`SkipList`], see [`SkipList::keys`].
pub struct Keys<'a, K, C, A> {
    iter: SkipListIter<'a, K, C, A>,
}

impl<'a, K, C, A> Keys<'a, K, C, A>
where
    C: Comparator<Item = K>,
    A: MemAllocator,
{
    pub(super) fn new(list: &'a SkipList<K, C, A>) -> Self {
        let mut iter = list.iter();
        iter.seek_to_first();
        Keys { iter }
    }
}

impl<'a, K, C, A> Iterator for Keys<'a, K, C, A>
where
    C: Comparator<Item = K>,
    A: MemAllocator,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.iter.key()?;
        self.iter.next();
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use crate::{comparator::prelude::*, mem_allocator::prelude::*, skip_list::SkipList};

    #[test]
    fn test_prev_from_first_is_invalid() {
        let list = SkipList::new(DefaultComparator::default(), BlockArena::new());
        for key in [20, 10, 30] {
            list.insert(key);
        }

        let mut iter = list.iter();
        iter.seek_to_first();
        assert_eq!(iter.key(), Some(&10));
        iter.prev();
        assert!(!iter.is_valid());
        assert_eq!(iter.key(), None);
    }

    #[test]
    fn test_seek_between_keys() {
        let list = SkipList::new(DefaultComparator::default(), BlockArena::new());
        for key in [20, 10, 30] {
            list.insert(key);
        }

        let mut iter = list.iter();
        iter.seek(&0);
        assert_eq!(iter.key(), Some(&10));
        iter.seek(&10);
        assert_eq!(iter.key(), Some(&10));
        iter.seek(&11);
        assert_eq!(iter.key(), Some(&20));
        iter.seek(&30);
        assert_eq!(iter.key(), Some(&30));
        iter.seek(&31);
        assert!(!iter.is_valid());
    }

    #[test]
    #[should_panic]
    fn test_next_on_invalid_panics() {
        let list: SkipList<u32, DefaultComparator<u32>> = SkipList::default();
        let mut iter = list.iter();
        iter.next();
    }

    #[test]
    fn test_iterator_sees_later_inserts() {
        let list = SkipList::new(DefaultComparator::default(), BlockArena::new());
        list.insert(1);
        list.insert(3);

        let mut iter = list.iter();
        iter.seek_to_first();
        list.insert(2);
        iter.next();
        assert_eq!(iter.key(), Some(&2));
    }
}
