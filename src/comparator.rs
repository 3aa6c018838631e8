use std::cmp;

mod bytewise_comparator;
mod default_comparator;

pub mod prelude {
    #![allow(unused)]

    pub use super::Comparator;
    pub use super::bytewise_comparator::BytewiseComparator;
    pub use super::default_comparator::DefaultComparator;
}

/// Three-way ordering of the keys stored in a skip list.
pub trait Comparator: Send + Sync + Clone {
    type Item;

    fn compare(&self, a: &Self::Item, b: &Self::Item) -> cmp::Ordering;
}
