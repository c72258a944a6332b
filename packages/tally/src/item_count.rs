//! Counting the items in the value returned by a producing function.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// A value that holds a known number of items, reported by [`Instrument::produce()`].
///
/// [`Instrument::produce()`]: crate::Instrument::produce
pub trait ItemCount {
    /// The number of items held.
    fn item_count(&self) -> u64;
}

fn from_len(len: usize) -> u64 {
    u64::try_from(len).expect("all realistic collection lengths fit in u64")
}

impl<T> ItemCount for Vec<T> {
    fn item_count(&self) -> u64 {
        from_len(self.len())
    }
}

impl<T> ItemCount for VecDeque<T> {
    fn item_count(&self) -> u64 {
        from_len(self.len())
    }
}

impl<T> ItemCount for Box<[T]> {
    fn item_count(&self) -> u64 {
        from_len(self.len())
    }
}

impl<T, const N: usize> ItemCount for [T; N] {
    fn item_count(&self) -> u64 {
        from_len(N)
    }
}

impl<K, V, H> ItemCount for HashMap<K, V, H> {
    fn item_count(&self) -> u64 {
        from_len(self.len())
    }
}

impl<T, H> ItemCount for HashSet<T, H> {
    fn item_count(&self) -> u64 {
        from_len(self.len())
    }
}

impl<K, V> ItemCount for BTreeMap<K, V> {
    fn item_count(&self) -> u64 {
        from_len(self.len())
    }
}

impl<T> ItemCount for BTreeSet<T> {
    fn item_count(&self) -> u64 {
        from_len(self.len())
    }
}

/// A failed production holds no items.
impl<T, E> ItemCount for Result<T, E>
where
    T: ItemCount,
{
    fn item_count(&self) -> u64 {
        self.as_ref().map_or(0, ItemCount::item_count)
    }
}
