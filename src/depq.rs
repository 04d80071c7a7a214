//! [`Depq`]: a double-ended priority queue built directly atop
//! [`crate::multiset::Multiset`]. Every multiset operation remains available
//! through `Deref`; this module only adds the max/min-access surface a
//! double-ended priority queue needs on top.

use std::cmp::Ordering;
use std::ops::{Deref, DerefMut};

use crate::cmp::{Comparator, OrdComparator};
use crate::multiset::Multiset;
use crate::splay::Handle;

/// A double-ended priority queue: repeated access to the current max or min
/// is amortized O(1) once the first access has splayed it to the root,
/// degrading back to O(log n) after any other insertion/removal disturbs the
/// tree.
pub struct Depq<T, C = OrdComparator> {
    inner: Multiset<T, C>,
}

impl<T: Ord> Depq<T, OrdComparator> {
    pub const fn new() -> Self {
        Self { inner: Multiset::new() }
    }
}

impl<T: Ord> Default for Depq<T, OrdComparator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Depq<T, C>
where
    C: Comparator<T>,
{
    pub const fn with_comparator(cmp: C) -> Self {
        Self { inner: Multiset::with_comparator(cmp) }
    }

    /// Inserts `value`, always succeeding (round-robin fairness among equal
    /// keys applies the same as for [`Multiset::insert`]).
    pub fn push(&mut self, value: T) -> Handle<T> {
        self.inner.insert(value)
    }

    /// Splays the maximum to the root and returns it. Repeated calls without
    /// an intervening mutation elsewhere are O(1) amortized.
    pub fn max(&mut self) -> Option<&T> {
        self.inner.tree.peek_extremum(Ordering::Greater)
    }

    /// Splays the minimum to the root and returns it.
    pub fn min(&mut self) -> Option<&T> {
        self.inner.tree.peek_extremum(Ordering::Less)
    }

    /// Read-only peek at the maximum that never splays, safe to call from
    /// concurrent readers alongside other `const_*` queries.
    pub fn const_max(&self) -> Option<&T> {
        self.inner.last()
    }

    /// Read-only peek at the minimum that never splays.
    pub fn const_min(&self) -> Option<&T> {
        self.inner.first()
    }

    /// Removes and returns the current maximum. If it has duplicates, pops
    /// the front of its round-robin ring in O(1) instead of disturbing the
    /// tree shape.
    pub fn pop_max(&mut self) -> Option<T> {
        self.inner.pop_extremum(Ordering::Greater)
    }

    /// Removes and returns the current minimum, same fairness guarantee as
    /// [`Depq::pop_max`].
    pub fn pop_min(&mut self) -> Option<T> {
        self.inner.pop_extremum(Ordering::Less)
    }

    /// Whether `handle`'s key currently equals the maximum key in the queue.
    pub fn is_max(&self, handle: Handle<T>) -> bool {
        match self.const_max() {
            Some(max) => self.inner.tree.cmp.compare(handle.get(), max) == Ordering::Equal,
            None => false,
        }
    }

    /// Whether `handle`'s key currently equals the minimum key in the queue.
    pub fn is_min(&self, handle: Handle<T>) -> bool {
        match self.const_min() {
            Some(min) => self.inner.tree.cmp.compare(handle.get(), min) == Ordering::Equal,
            None => false,
        }
    }

    /// Applies `mutator` to the element `handle` identifies and reinserts it
    /// at its new position. Splay trees have no cheap in-place re-heapify
    /// path the way the pairing heap does (see [`crate::pairing_heap::Heap::update`]),
    /// so this is always erase + mutate + reinsert; the returned handle
    /// identifies the relocated element and replaces `handle`, which must not
    /// be used again.
    pub fn update<F: FnOnce(&mut T)>(&mut self, handle: Handle<T>, mutator: F) -> Handle<T> {
        let mut value = self.inner.erase(handle);
        mutator(&mut value);
        self.inner.insert(value)
    }

    /// Removes the element `handle` identifies. `rerase` is kept as a
    /// separate name for parity with a forward-iteration `erase` /
    /// reverse-iteration `rerase` pair; this realization has no
    /// iterator-position state for either to act on, so both erase by handle
    /// identically.
    pub fn erase(&mut self, handle: Handle<T>) -> T {
        self.inner.erase(handle)
    }

    /// See [`Depq::erase`].
    pub fn rerase(&mut self, handle: Handle<T>) -> T {
        self.inner.erase(handle)
    }

    pub fn has_dups(&self, value: &T) -> bool {
        self.inner.has_dups(value)
    }
}

impl<T, C> Deref for Depq<T, C> {
    type Target = Multiset<T, C>;

    fn deref(&self) -> &Multiset<T, C> {
        &self.inner
    }
}

impl<T, C> DerefMut for Depq<T, C> {
    fn deref_mut(&mut self) -> &mut Multiset<T, C> {
        &mut self.inner
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::{de, Serialize};

    use super::Depq;
    use crate::cmp::{Comparator, OrdComparator};

    impl<T, C> Serialize for Depq<T, C>
    where
        T: Serialize,
        C: Comparator<T>,
    {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            use serde::ser::SerializeSeq;
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for value in self.iter() {
                seq.serialize_element(value)?;
            }
            seq.end()
        }
    }

    impl<'de, T> de::Deserialize<'de> for Depq<T, OrdComparator>
    where
        T: Ord + de::Deserialize<'de>,
    {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_seq(Visitor(PhantomData))
        }
    }

    struct Visitor<T>(PhantomData<T>);

    impl<'de, T> de::Visitor<'de> for Visitor<T>
    where
        T: Ord + de::Deserialize<'de>,
    {
        type Value = Depq<T, OrdComparator>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a sequence of ordered values, duplicates preserved")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut dst = Depq::new();
            while let Some(value) = seq.next_element()? {
                dst.push(value);
            }
            Ok(dst)
        }
    }
}

#[cfg(feature = "deepsize")]
impl<T, C> deepsize::DeepSizeOf for Depq<T, C>
where
    T: deepsize::DeepSizeOf,
    C: Comparator<T>,
{
    fn deep_size_of_children(&self, context: &mut deepsize::Context) -> usize {
        use deepsize::DeepSizeOf;
        self.inner.deep_size_of_children(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Key-only-ordered payload, so a depq of these can hold several
    /// equal-key elements that are still distinguishable by `id` when read
    /// back out, for asserting round-robin FIFO order among equal keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct KeyedId {
        key: i32,
        id: char,
    }

    fn by_key(a: &KeyedId, b: &KeyedId) -> Ordering {
        a.key.cmp(&b.key)
    }

    #[test]
    fn fifo_among_equal_extremes() {
        let mut depq = Depq::with_comparator(by_key);
        for id in ['a', 'b', 'c', 'd'] {
            depq.push(KeyedId { key: 0, id });
        }
        for expected in ['a', 'b', 'c', 'd'] {
            assert_eq!(depq.pop_max().map(|v| v.id), Some(expected));
        }
        assert_eq!(depq.pop_max(), None);
        assert_eq!(depq.len(), 0);
    }

    #[test]
    fn max_and_min_track_inserts() {
        let mut depq: Depq<i32> = Depq::new();
        for v in [3, 1, 4, 1, 5, 9, 2, 6] {
            depq.push(v);
        }
        assert_eq!(depq.const_max(), Some(&9));
        assert_eq!(depq.const_min(), Some(&1));
        assert_eq!(depq.max(), Some(&9));
        assert_eq!(depq.min(), Some(&1));
        assert!(depq.validate());
    }

    #[test]
    fn pop_max_then_pop_min_drains_queue() {
        let mut depq: Depq<i32> = Depq::new();
        for v in [5, 3, 8, 1, 9, 2] {
            depq.push(v);
        }
        assert_eq!(depq.pop_max(), Some(9));
        assert_eq!(depq.pop_min(), Some(1));
        assert_eq!(depq.pop_max(), Some(8));
        assert_eq!(depq.pop_min(), Some(2));
        assert_eq!(depq.pop_max(), Some(5));
        assert_eq!(depq.pop_min(), Some(3));
        assert_eq!(depq.pop_max(), None);
        assert_eq!(depq.len(), 0);
    }

    #[test]
    fn update_relocates_element() {
        let mut depq: Depq<i32> = Depq::new();
        let h = depq.push(1);
        depq.push(2);
        depq.push(3);
        let h = depq.update(h, |v| *v = 100);
        assert!(depq.is_max(h));
        assert_eq!(depq.pop_max(), Some(100));
    }
}
