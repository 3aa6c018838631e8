use std::{cmp, fmt, marker::PhantomData};

use super::Comparator;

/// Lexicographic byte order for anything that views as `[u8]`, such as
/// encoded memtable entries.
pub struct BytewiseComparator<T> {
    _marker: PhantomData<fn(&T, &T)>,
}

impl<T> Comparator for BytewiseComparator<T>
where
    T: AsRef<[u8]>,
{
    type Item = T;

    fn compare(&self, a: &Self::Item, b: &Self::Item) -> cmp::Ordering {
        a.as_ref().cmp(b.as_ref())
    }
}

impl<T> Default for BytewiseComparator<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for BytewiseComparator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BytewiseComparator<T> {}

impl<T> fmt::Debug for BytewiseComparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BytewiseComparator")
    }
}
