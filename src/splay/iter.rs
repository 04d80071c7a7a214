//! Non-splaying inorder walk over a tree's nodes, including the duplicate
//! ring each node may carry. Iteration never rotates anything, so it shares
//! the same concurrent-readers property `const_seek` gets.
//!
//! A position is either a plain tree node or a spot inside a duplicate ring;
//! [`Cursor`] tracks both so `advance`/`advance_back` can step seamlessly
//! from "this key's first occurrence" through all of its duplicates before
//! moving on to the next distinct key.

use std::cmp::Ordering;
use std::ptr::NonNull;

use super::node::{dup_head_of, get_child, get_parent, is_anchor_with_dups, Dir, Link, Node};
use crate::cmp::Comparator;

#[derive(Clone, Copy)]
pub(crate) enum Cursor<T> {
    Tree(NonNull<Node<T>>),
    Ring {
        anchor: NonNull<Node<T>>,
        current: NonNull<Node<T>>,
    },
}

/// # Safety
/// `root` must describe a live, well-formed tree.
pub(crate) unsafe fn first<T>(root: Link<T>) -> Option<Cursor<T>> {
    let mut node = root?;
    while let Some(left) = get_child(node, Dir::Left) {
        node = left;
    }
    Some(Cursor::Tree(node))
}

/// # Safety
/// See [`first`].
pub(crate) unsafe fn last<T>(root: Link<T>) -> Option<Cursor<T>> {
    let mut node = root?;
    while let Some(right) = get_child(node, Dir::Right) {
        node = right;
    }
    into_ring_tail(node)
}

/// If `node` anchors a duplicate ring, positions on the ring's tail (its
/// most-recently-inserted duplicate) instead of the anchor itself, so a
/// reverse walk visits duplicates before the first-inserted occurrence.
unsafe fn into_ring_tail<T>(node: NonNull<Node<T>>) -> Option<Cursor<T>> {
    if is_anchor_with_dups(node) {
        let head = dup_head_of(node);
        let tail = get_child(head, Dir::Left).expect("ring head always has a prev link");
        Some(Cursor::Ring { anchor: node, current: tail })
    } else {
        Some(Cursor::Tree(node))
    }
}

/// # Safety
/// `cursor` must point at a currently-live node/ring position.
pub(crate) unsafe fn value_of<T>(cursor: Cursor<T>) -> *const T {
    match cursor {
        Cursor::Tree(node) => &node.as_ref().value,
        Cursor::Ring { current, .. } => &current.as_ref().value,
    }
}

/// # Safety
/// See [`value_of`].
pub(crate) unsafe fn advance<T>(cursor: Cursor<T>) -> Option<Cursor<T>> {
    match cursor {
        Cursor::Tree(node) => {
            if is_anchor_with_dups(node) {
                let head = dup_head_of(node);
                Some(Cursor::Ring { anchor: node, current: head })
            } else {
                successor(node).map(Cursor::Tree)
            }
        }
        Cursor::Ring { anchor, current } => {
            let head = dup_head_of(anchor);
            let next = get_child(current, Dir::Right).expect("ring link must be populated");
            if next == head {
                successor(anchor).map(Cursor::Tree)
            } else {
                Some(Cursor::Ring { anchor, current: next })
            }
        }
    }
}

/// # Safety
/// See [`value_of`].
pub(crate) unsafe fn advance_back<T>(cursor: Cursor<T>) -> Option<Cursor<T>> {
    match cursor {
        Cursor::Ring { anchor, current } => {
            let head = dup_head_of(anchor);
            if current == head {
                return Some(Cursor::Tree(anchor));
            }
            let prev = get_child(current, Dir::Left).expect("ring link must be populated");
            Some(Cursor::Ring { anchor, current: prev })
        }
        Cursor::Tree(node) => predecessor(node).and_then(into_ring_tail),
    }
}

impl<T> PartialEq for Cursor<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cursor::Tree(a), Cursor::Tree(b)) => a == b,
            (Cursor::Ring { current: a, .. }, Cursor::Ring { current: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Bounded-count forward/backward walk backing [`crate::set::Set::iter`] and
/// [`crate::multiset::Multiset::iter`]. Counting elements down to zero
/// (rather than comparing a shared stop cursor) lets a single front/back pair
/// support `DoubleEndedIterator` meeting in the middle.
pub(crate) struct RawIter<T> {
    front: Option<Cursor<T>>,
    back: Option<Cursor<T>>,
    remaining: usize,
}

impl<T> RawIter<T> {
    /// # Safety
    /// `root` must describe a live tree of exactly `len` elements (tree nodes
    /// plus duplicates), unmodified for the lifetime of this iterator.
    pub(crate) unsafe fn new(root: Link<T>, len: usize) -> Self {
        if len == 0 {
            return Self { front: None, back: None, remaining: 0 };
        }
        Self { front: first(root), back: last(root), remaining: len }
    }

    pub(crate) fn len(&self) -> usize {
        self.remaining
    }

    /// # Safety
    /// The tree this iterator walks must still be live and unmodified.
    pub(crate) unsafe fn next(&mut self) -> Option<*const T> {
        let cur = self.front.take()?;
        let ptr = value_of(cur);
        self.remaining -= 1;
        self.front = if self.remaining == 0 { None } else { advance(cur) };
        Some(ptr)
    }

    /// # Safety
    /// See [`RawIter::next`].
    pub(crate) unsafe fn next_back(&mut self) -> Option<*const T> {
        let cur = self.back.take()?;
        let ptr = value_of(cur);
        self.remaining -= 1;
        self.back = if self.remaining == 0 { None } else { advance_back(cur) };
        Some(ptr)
    }
}

/// Forward- or reverse-direction walk between two read-only bounds, backing
/// `equal_range`/`equal_rrange`. `end` is the exclusive stop cursor; once
/// `cur` reaches it (or the walk runs off the end of the tree) iteration
/// stops. Matches the inclusive-lower/exclusive-upper range convention,
/// realized here without any splay (see module docs).
pub(crate) struct RawRange<T> {
    cur: Option<Cursor<T>>,
    end: Option<Cursor<T>>,
    reverse: bool,
}

impl<T> RawRange<T> {
    pub(crate) fn new(cur: Option<Cursor<T>>, end: Option<Cursor<T>>, reverse: bool) -> Self {
        Self { cur, end, reverse }
    }

    /// # Safety
    /// The tree this range walks must still be live and unmodified.
    pub(crate) unsafe fn next(&mut self) -> Option<*const T> {
        let cur = self.cur?;
        if Some(cur) == self.end {
            self.cur = None;
            return None;
        }
        let ptr = value_of(cur);
        self.cur = if self.reverse { advance_back(cur) } else { advance(cur) };
        Some(ptr)
    }
}

unsafe fn successor<T>(mut node: NonNull<Node<T>>) -> Link<T> {
    if let Some(right) = get_child(node, Dir::Right) {
        let mut cur = right;
        while let Some(left) = get_child(cur, Dir::Left) {
            cur = left;
        }
        return Some(cur);
    }
    loop {
        let parent = get_parent(node)?;
        if get_child(parent, Dir::Left) == Some(node) {
            return Some(parent);
        }
        node = parent;
    }
}

/// Read-only walk (no splay) for the first node whose value is not less than
/// `key`, i.e. the start of `key`'s equal-range. Does not descend into a
/// matching anchor's duplicate ring; callers walk the ring via [`advance`].
///
/// # Safety
/// `root` must describe a live, well-formed tree.
pub(crate) unsafe fn lower_bound<T, C: Comparator<T>>(root: Link<T>, key: &T, cmp: &C) -> Option<Cursor<T>> {
    let mut node = root;
    let mut best: Link<T> = None;
    while let Some(n) = node {
        if cmp.compare(key, &n.as_ref().value) == Ordering::Greater {
            node = get_child(n, Dir::Right);
        } else {
            best = Some(n);
            node = get_child(n, Dir::Left);
        }
    }
    best.map(Cursor::Tree)
}

/// Read-only walk for the first node whose value is strictly greater than
/// `key`, i.e. the (exclusive) end of `key`'s equal-range.
///
/// # Safety
/// See [`lower_bound`].
pub(crate) unsafe fn upper_bound<T, C: Comparator<T>>(root: Link<T>, key: &T, cmp: &C) -> Option<Cursor<T>> {
    let mut node = root;
    let mut best: Link<T> = None;
    while let Some(n) = node {
        if cmp.compare(key, &n.as_ref().value) == Ordering::Less {
            best = Some(n);
            node = get_child(n, Dir::Left);
        } else {
            node = get_child(n, Dir::Right);
        }
    }
    best.map(Cursor::Tree)
}

/// Read-only walk for the node holding the greatest key not greater than
/// `key` ("floor"), or `None` if every stored key exceeds `key`. Positions on
/// the tail of that node's duplicate ring (if any), mirroring [`last`], so a
/// reverse walk from this cursor visits duplicates before the anchor.
///
/// # Safety
/// See [`lower_bound`].
pub(crate) unsafe fn floor<T, C: Comparator<T>>(root: Link<T>, key: &T, cmp: &C) -> Option<Cursor<T>> {
    let mut node = root;
    let mut best: Link<T> = None;
    while let Some(n) = node {
        if cmp.compare(key, &n.as_ref().value) == Ordering::Less {
            node = get_child(n, Dir::Left);
        } else {
            best = Some(n);
            node = get_child(n, Dir::Right);
        }
    }
    best.and_then(into_ring_tail)
}

unsafe fn predecessor<T>(mut node: NonNull<Node<T>>) -> Link<T> {
    if let Some(left) = get_child(node, Dir::Left) {
        let mut cur = left;
        while let Some(right) = get_child(cur, Dir::Right) {
            cur = right;
        }
        return Some(cur);
    }
    loop {
        let parent = get_parent(node)?;
        if get_child(parent, Dir::Right) == Some(node) {
            return Some(parent);
        }
        node = parent;
    }
}
