use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use super::node::{isolate, reset_isolated, Link, Node};
use super::ops::{cut_child, delete_node, fair_merge, fold_children};
use super::order::{Max, Order};
use crate::cmp::{Comparator, OrdComparator};
use crate::error::ValidationError;

/// An opaque reference to a node already stored in a [`Heap`], usable to
/// erase or key-update that exact element without a search.
#[derive(Debug)]
pub struct Handle<T>(NonNull<Node<T>>);

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}

impl<T> Handle<T> {
    unsafe fn new(ptr: NonNull<Node<T>>) -> Self {
        Handle(ptr)
    }

    pub fn get(&self) -> &T {
        unsafe { &self.0.as_ref().value }
    }
}

/// A single-ended priority queue backed by a pairing heap with fair merge
///: push and meld are O(1) amortized, pop / erase / key-update
/// are O(log n) amortized.
pub struct Heap<T, C = OrdComparator, O = Max> {
    root: Link<T>,
    size: usize,
    cmp: C,
    _order: PhantomData<O>,
}

// The heap owns every node it points to exclusively, so it is `Send` under
// the same bounds an owning `Box`-based heap would need (see
// `crate::splay::tree::SplayTree`'s identical rationale).
unsafe impl<T: Send, C: Send, O> Send for Heap<T, C, O> {}

impl<T: Ord, O: Order> Heap<T, OrdComparator, O> {
    pub const fn new() -> Self {
        Self { root: None, size: 0, cmp: OrdComparator, _order: PhantomData }
    }
}

impl<T: Ord, O: Order> Default for Heap<T, OrdComparator, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, O> Heap<T, C, O>
where
    C: Comparator<T>,
    O: Order,
{
    pub const fn with_comparator(cmp: C) -> Self {
        Self { root: None, size: 0, cmp, _order: PhantomData }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The comparison result this heap pulls toward the root (`Greater` for
    /// a max-heap, `Less` for a min-heap).
    pub fn order(&self) -> Ordering {
        O::DIRECTION
    }

    /// Read-only peek at the root. The pairing heap keeps the current
    /// extremum at the root at all times, so this never needs to search.
    pub fn front(&self) -> Option<&T> {
        unsafe { self.root.map(|r| &r.as_ref().value) }
    }

    /// Inserts `value`, always succeeding. O(1) amortized.
    pub fn push(&mut self, value: T) -> Handle<T> {
        let node = Node::leak(value);
        self.root = Some(unsafe { fair_merge(self.root, node, &self.cmp, O::DIRECTION) });
        self.size += 1;
        debug_assert!(self.validate().is_ok());
        unsafe { Handle::new(node) }
    }

    /// Removes and returns the current root.
    pub fn pop(&mut self) -> Option<T> {
        let root = self.root?;
        self.root = unsafe { fold_children(root, &self.cmp, O::DIRECTION) };
        self.size -= 1;
        let boxed = unsafe { isolate(root) };
        debug_assert!(self.validate().is_ok());
        Some(boxed.value)
    }

    /// Removes the element `handle` identifies, wherever it is in the heap.
    ///
    /// # Safety-relevant contract
    /// `handle` must have come from this heap and must not already have been
    /// erased.
    pub fn erase(&mut self, handle: Handle<T>) -> T {
        let node = handle.0;
        self.root = unsafe { delete_node(self.root, node, &self.cmp, O::DIRECTION) };
        self.size -= 1;
        let boxed = unsafe { isolate(node) };
        debug_assert!(self.validate().is_ok());
        boxed.value
    }

    /// Applies `mutator` to the element `handle` identifies and restores heap
    /// order. Cheap (cut + fair-merge) when the mutated key now compares as
    /// `order` against the node's parent, i.e. the node would have won the
    /// merge that attached it there, so cutting and re-merging is enough to
    /// fix it. Otherwise a full erase-and-reinsert (see `DESIGN.md` for why
    /// this branch condition, not its mirror image, is the one that keeps
    /// every parent-child pair heap-ordered).
    pub fn update<F: FnOnce(&mut T)>(&mut self, handle: Handle<T>, mutator: F) -> bool {
        let mut node = handle.0;
        unsafe {
            mutator(&mut node.as_mut().value);
            let broke_order_with_parent = match node.as_ref().parent {
                Some(parent) => self.cmp.compare(&node.as_ref().value, &parent.as_ref().value) == O::DIRECTION,
                None => false,
            };
            if broke_order_with_parent {
                cut_child(node);
            } else {
                self.root = delete_node(self.root, node, &self.cmp, O::DIRECTION);
                reset_isolated(node);
            }
            self.root = Some(fair_merge(self.root, node, &self.cmp, O::DIRECTION));
        }
        debug_assert!(self.validate().is_ok());
        true
    }

    /// Use when the caller knows `mutator` only moves the key in the
    /// direction this heap favors (toward the root). Cheap for a max-heap,
    /// a full erase-and-reinsert for a min-heap.
    pub fn increase<F: FnOnce(&mut T)>(&mut self, handle: Handle<T>, mutator: F) -> bool {
        self.relocate(handle, mutator, O::DIRECTION == Ordering::Greater)
    }

    /// Use when the caller knows `mutator` only moves the key away from the
    /// direction this heap favors. Cheap for a min-heap, a full
    /// erase-and-reinsert for a max-heap.
    pub fn decrease<F: FnOnce(&mut T)>(&mut self, handle: Handle<T>, mutator: F) -> bool {
        self.relocate(handle, mutator, O::DIRECTION == Ordering::Less)
    }

    fn relocate<F: FnOnce(&mut T)>(&mut self, handle: Handle<T>, mutator: F, cheap: bool) -> bool {
        let mut node = handle.0;
        unsafe {
            if cheap {
                mutator(&mut node.as_mut().value);
                cut_child(node);
            } else {
                self.root = delete_node(self.root, node, &self.cmp, O::DIRECTION);
                mutator(&mut node.as_mut().value);
                reset_isolated(node);
            }
            self.root = Some(fair_merge(self.root, node, &self.cmp, O::DIRECTION));
        }
        debug_assert!(self.validate().is_ok());
        true
    }

    pub fn clear(&mut self) {
        let mut stack = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push(root);
        }
        self.size = 0;
        while let Some(node) = stack.pop() {
            unsafe {
                push_children(node, &mut stack);
                drop(Box::from_raw(node.as_ptr()));
            }
        }
    }

    pub fn validate(&self) -> bool {
        self.validate_report().is_ok()
    }

    pub fn validate_report(&self) -> Result<(), ValidationError> {
        let Some(root) = self.root else {
            return if self.size == 0 {
                Ok(())
            } else {
                Err(ValidationError::SizeMismatch { recorded: self.size, observed: 0 })
            };
        };
        unsafe {
            if root.as_ref().parent.is_some() {
                return Err(ValidationError::RootHasParent);
            }
            if root.as_ref().next_sibling != Some(root) || root.as_ref().prev_sibling != Some(root) {
                return Err(ValidationError::SiblingRing);
            }
            let mut observed = 0usize;
            validate_subtree(root, &self.cmp, O::DIRECTION, &mut observed)?;
            if observed != self.size {
                return Err(ValidationError::SizeMismatch { recorded: self.size, observed });
            }
        }
        Ok(())
    }
}

/// # Safety
/// `node` must be live.
unsafe fn push_children<T>(node: NonNull<Node<T>>, stack: &mut Vec<NonNull<Node<T>>>) {
    let Some(tail) = node.as_ref().left_child else { return };
    let mut cur = tail;
    loop {
        let next = cur.as_ref().next_sibling.expect("ring is circular");
        stack.push(cur);
        if next == tail {
            break;
        }
        cur = next;
    }
}

/// A parent that compares as `opposite(order)` against one of its children
/// violates heap order: every parent must have won the merge that attached
/// that child, so `cmp(parent, child) == order` (or `Equal`) must hold for
/// every edge. See `DESIGN.md` for why this is phrased in terms of the
/// parent-child comparison rather than its mirror image.
unsafe fn validate_subtree<T, C: Comparator<T>>(
    node: NonNull<Node<T>>,
    cmp: &C,
    order: Ordering,
    count: &mut usize,
) -> Result<(), ValidationError> {
    *count += 1;
    let Some(tail) = node.as_ref().left_child else { return Ok(()) };
    let wrong_order = if order == Ordering::Greater { Ordering::Less } else { Ordering::Greater };
    let mut cur = tail;
    loop {
        let next = cur.as_ref().next_sibling.ok_or(ValidationError::SiblingRing)?;
        let prev = cur.as_ref().prev_sibling.ok_or(ValidationError::SiblingRing)?;
        if next.as_ref().prev_sibling != Some(cur) || prev.as_ref().next_sibling != Some(cur) {
            return Err(ValidationError::SiblingRing);
        }
        if cur.as_ref().parent != Some(node) {
            return Err(ValidationError::ParentMismatch);
        }
        if cmp.compare(&node.as_ref().value, &cur.as_ref().value) == wrong_order {
            return Err(ValidationError::HeapOrder);
        }
        validate_subtree(cur, cmp, order, count)?;
        cur = next;
        if cur == tail {
            break;
        }
    }
    Ok(())
}

impl<T, C, O> fmt::Debug for Heap<T, C, O>
where
    T: fmt::Debug,
    C: Comparator<T>,
    O: Order,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap").field("len", &self.size).field("front", &self.front()).finish()
    }
}

impl<T, C, O> Drop for Heap<T, C, O> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            unsafe {
                push_children(node, &mut stack);
                drop(Box::from_raw(node.as_ptr()));
            }
        }
    }
}

#[cfg(feature = "serde")]
impl<T, C, O> serde::Serialize for Heap<T, C, O>
where
    T: serde::Serialize,
    C: Comparator<T>,
    O: Order,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.size))?;
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            unsafe {
                seq.serialize_element(&node.as_ref().value)?;
                push_children(node, &mut stack);
            }
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T, O> serde::Deserialize<'de> for Heap<T, OrdComparator, O>
where
    T: Ord + serde::Deserialize<'de>,
    O: Order,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor<T, O>(PhantomData<(T, O)>);

        impl<'de, T, O> serde::de::Visitor<'de> for Visitor<T, O>
        where
            T: Ord + serde::Deserialize<'de>,
            O: Order,
        {
            type Value = Heap<T, OrdComparator, O>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a sequence of values")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut dst = Heap::new();
                while let Some(value) = seq.next_element()? {
                    dst.push(value);
                }
                Ok(dst)
            }
        }

        deserializer.deserialize_seq(Visitor(PhantomData))
    }
}

#[cfg(feature = "deepsize")]
impl<T, C, O> deepsize::DeepSizeOf for Heap<T, C, O>
where
    T: deepsize::DeepSizeOf,
    C: Comparator<T>,
    O: Order,
{
    fn deep_size_of_children(&self, context: &mut deepsize::Context) -> usize {
        let mut total = 0usize;
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            unsafe {
                total += std::mem::size_of::<Node<T>>();
                total += node.as_ref().value.deep_size_of_children(context);
                push_children(node, &mut stack);
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing_heap::order::Min;

    #[test]
    fn push_pop_drains_in_priority_order() {
        let mut heap: Heap<i32> = Heap::new();
        for v in [5, 1, 9, 3, 7, 2, 8] {
            heap.push(v);
        }
        let mut popped = Vec::new();
        while let Some(v) = heap.pop() {
            popped.push(v);
        }
        assert_eq!(popped, vec![9, 8, 7, 5, 3, 2, 1]);
    }

    #[test]
    fn min_order_drains_ascending() {
        let mut heap: Heap<i32, OrdComparator, Min> = Heap::new();
        for v in [5, 1, 9, 3, 7] {
            heap.push(v);
        }
        let mut popped = Vec::new();
        while let Some(v) = heap.pop() {
            popped.push(v);
        }
        assert_eq!(popped, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn erase_arbitrary_handle_preserves_order() {
        let mut heap: Heap<i32> = Heap::new();
        let handles: Vec<_> = [10, 40, 20, 60, 30, 50].into_iter().map(|v| heap.push(v)).collect();
        heap.erase(handles[2]);
        assert!(heap.validate());
        let mut popped = Vec::new();
        while let Some(v) = heap.pop() {
            popped.push(v);
        }
        assert_eq!(popped, vec![60, 50, 40, 30, 10]);
    }

    #[test]
    fn increase_on_max_heap_is_cheap_path_and_still_valid() {
        let mut heap: Heap<i32> = Heap::new();
        let low = heap.push(1);
        heap.push(2);
        heap.push(3);
        heap.increase(low, |v| *v = 100);
        assert!(heap.validate());
        assert_eq!(heap.pop(), Some(100));
    }

    #[test]
    fn generic_update_relocates_after_mutation() {
        let mut heap: Heap<i32> = Heap::new();
        let handles: Vec<_> = [10, 20, 30, 40, 50].into_iter().map(|v| heap.push(v)).collect();
        heap.update(handles[0], |v| *v = 1000);
        assert!(heap.validate());
        assert_eq!(heap.pop(), Some(1000));
    }

    #[test]
    fn weak_random_soak_validates_throughout() {
        let mut heap: Heap<i32> = Heap::new();
        let mut handles = Vec::with_capacity(1000);
        for i in 0..1000i32 {
            let key = ((i as i64 * 2654435761) % 997) as i32;
            handles.push(heap.push(key));
        }
        assert!(heap.validate());
        assert_eq!(heap.len(), 1000);

        for step in 0..1000usize {
            let idx = (step * 37 + 11) % handles.len();
            let handle = handles.swap_remove(idx);
            heap.erase(handle);
            if step % 50 == 0 {
                assert!(heap.validate());
            }
        }
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.pop(), None);
    }
}
