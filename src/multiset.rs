//! [`Multiset`]: a duplicate-aware ordered collection backed by the same
//! top-down splay tree as [`crate::set::Set`], plus the circular duplicate
//! ring hung off a tree node for equal keys. Equal keys never occupy more than one
//! tree node; later insertions join that node's ring and are extracted in
//! insertion order (round-robin fairness).

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use crate::cmp::{Comparator, OrdComparator};
use crate::error::ValidationError;
use crate::splay::{self, Handle, RawIter, RawRange, SplayTree};

/// An ordered multiset: like [`crate::set::Set`], but repeated insertions of
/// an equal key accumulate instead of being rejected, and are extracted
/// (via [`Multiset::pop_min`]/[`Multiset::pop_max`] on [`crate::depq::Depq`],
/// or via [`Multiset::erase`]) in the order they were inserted.
pub struct Multiset<T, C = OrdComparator> {
    pub(crate) tree: SplayTree<T, C>,
}

impl<T: Ord> Multiset<T, OrdComparator> {
    pub const fn new() -> Self {
        Self { tree: SplayTree::new(OrdComparator) }
    }
}

impl<T: Ord> Default for Multiset<T, OrdComparator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Multiset<T, C>
where
    C: Comparator<T>,
{
    pub const fn with_comparator(cmp: C) -> Self {
        Self { tree: SplayTree::new(cmp) }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Inserts `value`, always succeeding. Returns a [`Handle`] that
    /// identifies exactly this element (not merely its key) for a later
    /// O(1)-amortized [`Multiset::erase`].
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let ptr = self.tree.insert_multi(value);
        debug_assert!(self.tree.validate().is_ok());
        unsafe { Handle::new(ptr) }
    }

    /// Removes the element identified by `handle`.
    ///
    /// # Safety-relevant contract
    /// `handle` must have come from this multiset and must not already have
    /// been erased: erasing a handle twice, or a handle from a different
    /// container, is undefined behavior.
    pub fn erase(&mut self, handle: Handle<T>) -> T {
        let node = self.tree.erase_by_handle(handle.0);
        debug_assert!(self.tree.validate().is_ok());
        node.value
    }

    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains_readonly(value)
    }

    /// Read-only probe for whether `value`'s key currently has any
    /// duplicates attached (beyond the first-inserted occurrence).
    pub fn has_dups(&self, value: &T) -> bool {
        match self.tree.seek_readonly(value) {
            Some(node) => unsafe { splay::is_anchor_with_dups(node) },
            None => false,
        }
    }

    pub fn first(&self) -> Option<&T> {
        unsafe { splay::first(self.tree.root).map(|c| &*splay::value_of(c)) }
    }

    pub fn last(&self) -> Option<&T> {
        unsafe { splay::last(self.tree.root).map(|c| &*splay::value_of(c)) }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            raw: unsafe { RawIter::new(self.tree.root, self.tree.len()) },
            _marker: PhantomData,
        }
    }

    /// The half-open range `[lo, hi)` in ascending order.
    pub fn equal_range<'a>(&'a self, lo: &T, hi: &T) -> Range<'a, T> {
        unsafe {
            let begin = splay::lower_bound(self.tree.root, lo, &self.tree.cmp);
            let end = splay::lower_bound(self.tree.root, hi, &self.tree.cmp);
            Range { raw: RawRange::new(begin, end, false), _marker: PhantomData }
        }
    }

    /// The half-open range `(lo, hi]` in descending order.
    pub fn equal_rrange<'a>(&'a self, hi: &T, lo: &T) -> Range<'a, T> {
        unsafe {
            let begin = splay::floor(self.tree.root, hi, &self.tree.cmp);
            let end = splay::floor(self.tree.root, lo, &self.tree.cmp);
            Range { raw: RawRange::new(begin, end, true), _marker: PhantomData }
        }
    }

    pub fn clear(&mut self) {
        self.tree.clear(|_| {});
    }

    pub fn validate(&self) -> bool {
        self.validate_report().is_ok()
    }

    pub fn validate_report(&self) -> Result<(), ValidationError> {
        self.tree.validate()
    }

    /// Pops the duplicate-ring-fair maximum or minimum, used by
    /// [`crate::depq::Depq`]. `order` selects `Greater` for max, `Less` for
    /// min.
    pub(crate) fn pop_extremum(&mut self, order: Ordering) -> Option<T> {
        let popped = self.tree.erase_extremum(order).map(|node| node.value);
        debug_assert!(self.tree.validate().is_ok());
        popped
    }
}

impl<T, C> fmt::Debug for Multiset<T, C>
where
    T: fmt::Debug,
    C: Comparator<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for Multiset<T, OrdComparator> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Multiset::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for Multiset<T, OrdComparator> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

/// Ascending inorder iterator over a [`Multiset`], visiting every duplicate
/// of a key (in insertion order) before moving to the next distinct key.
pub struct Iter<'a, T> {
    raw: RawIter<T>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        unsafe { self.raw.next().map(|ptr| &*ptr) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len(), Some(self.raw.len()))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        unsafe { self.raw.next_back().map(|ptr| &*ptr) }
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

/// Forward- or reverse-direction walk produced by [`Multiset::equal_range`] /
/// [`Multiset::equal_rrange`].
pub struct Range<'a, T> {
    raw: RawRange<T>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        unsafe { self.raw.next().map(|ptr| &*ptr) }
    }
}

/// Owning ascending iterator produced by [`IntoIterator for Multiset`].
pub struct IntoIter<T, C> {
    tree: SplayTree<T, C>,
}

impl<T, C: Comparator<T>> Iterator for IntoIter<T, C> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.tree.erase_extremum(Ordering::Less).map(|node| node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<T, C: Comparator<T>> ExactSizeIterator for IntoIter<T, C> {}

impl<T, C: Comparator<T>> IntoIterator for Multiset<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T, C>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self.tree }
    }
}

impl<'a, T, C: Comparator<T>> IntoIterator for &'a Multiset<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::{de, Serialize};

    use super::Multiset;
    use crate::cmp::{Comparator, OrdComparator};

    impl<T, C> Serialize for Multiset<T, C>
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

    impl<'de, T> de::Deserialize<'de> for Multiset<T, OrdComparator>
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
        type Value = Multiset<T, OrdComparator>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a sequence of ordered values, duplicates preserved")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut dst = Multiset::new();
            while let Some(value) = seq.next_element()? {
                dst.insert(value);
            }
            Ok(dst)
        }
    }
}

#[cfg(feature = "deepsize")]
impl<T, C> deepsize::DeepSizeOf for Multiset<T, C>
where
    T: deepsize::DeepSizeOf,
    C: Comparator<T>,
{
    fn deep_size_of_children(&self, context: &mut deepsize::Context) -> usize {
        self.iter()
            .map(|v| std::mem::size_of::<crate::splay::Node<T>>() + v.deep_size_of_children(context))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Key-only-ordered payload, so a multiset of these can hold several
    /// equal-key elements that are still distinguishable by `id` when read
    /// back out, for asserting round-robin FIFO order among equal keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct KeyedId {
        key: i32,
        id: char,
    }

    impl PartialOrd for KeyedId {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for KeyedId {
        fn cmp(&self, other: &Self) -> Ordering {
            self.key.cmp(&other.key)
        }
    }

    #[test]
    fn fifo_among_equal_keys() {
        let mut ms = Multiset::new();
        let handles: Vec<_> = ['a', 'b', 'c', 'd']
            .into_iter()
            .map(|id| ms.insert(KeyedId { key: 0, id }))
            .collect();
        assert_eq!(ms.len(), 4);
        for h in &handles {
            assert_eq!(h.get().key, 0);
        }
        for expected in ['a', 'b', 'c', 'd'] {
            assert_eq!(ms.pop_extremum(Ordering::Less).map(|v| v.id), Some(expected));
        }
        assert_eq!(ms.pop_extremum(Ordering::Less), None);
        assert_eq!(ms.len(), 0);
    }

    #[test]
    fn duplicate_shuffle_erase_validates() {
        let mut ms = Multiset::new();
        let mut handles = Vec::with_capacity(99);
        for k in 0..99usize {
            let key = (101 * k) % 22;
            handles.push(ms.insert(key));
        }
        assert!(ms.validate());
        for step in 0..99usize {
            let idx = (101 * step) % 99;
            let handle = handles[idx];
            ms.erase(handle);
            assert!(ms.validate());
        }
        assert_eq!(ms.len(), 0);
    }

    #[test]
    fn iterate_remove_reinsert_preserves_size() {
        let mut ms: Multiset<u32> = Multiset::new();
        for i in 0u32..1000 {
            ms.insert(i % 400);
        }
        let initial_len = ms.len();
        assert!(ms.validate());

        let low_keys: Vec<_> = ms.iter().filter(|&&v| v < 200).copied().collect();
        for (i, key) in low_keys.iter().enumerate() {
            // find one handle for this key via a fresh splay-free probe, then
            // erase and reinsert with a fresh unique key.
            if let Some(handle) = ms.find_one_handle(key) {
                ms.erase(handle);
                ms.insert(2000 + i as u32);
            }
        }
        assert_eq!(ms.len(), initial_len);
        assert!(ms.validate());
    }
}

#[cfg(test)]
impl<T, C: Comparator<T>> Multiset<T, C> {
    /// Test-only helper: finds some handle matching `value`'s key (the tree
    /// anchor if no duplicates, else its ring head), for exercising
    /// erase-by-handle without threading handles through the whole test.
    fn find_one_handle(&mut self, value: &T) -> Option<Handle<T>> {
        let node = self.tree.find(value)?;
        Some(unsafe { Handle::new(node) })
    }
}
