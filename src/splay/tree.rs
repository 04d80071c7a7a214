//! Top-down splay tree core shared by [`crate::set::Set`], [`crate::multiset::Multiset`],
//! and [`crate::depq::Depq`].
//!
//! The splay walk builds two auxiliary chains ("smaller than the target" and
//! "larger than the target") while descending toward the target key, then
//! stitches them back around whatever node the walk stopped on. A classic
//! top-down splay parks these two chains in an end sentinel's scratch
//! fields; this implementation uses two local variables instead, an
//! equivalent and simpler choice with no sentinel node to maintain.

use std::cmp::Ordering;
use std::ptr::NonNull;

use super::dup;
use super::node::{get_child, get_parent, is_anchor_with_dups, is_dup_head, set_child, set_parent, Dir, Link, Node, Role};
use crate::cmp::{Comparator, Forced};
use crate::error::ValidationError;

pub(crate) struct SplayTree<T, C> {
    pub(crate) root: Link<T>,
    pub(crate) size: usize,
    pub(crate) cmp: C,
}

// The tree owns every node it points to exclusively (no aliasing beyond the
// raw pointers used to implement the structure itself), so it is `Send` under
// the same bounds an owning `Box`-based tree would need. Mirrors the sibling
// crate's `Tree<T>`, which grants the same bound for the same reason.
unsafe impl<T: Send, C: Send> Send for SplayTree<T, C> {}

/// Attaches `child` under `parent`'s `dir` slot and, if `child` is present,
/// points its (possibly ring-indirected) parent link back at `parent`. This is
/// the `link_trees` operation from the source algorithm: the one place that
/// keeps the overloaded parent/duplicate-head field consistent on every
/// relink.
///
/// # Safety
/// `parent` must be live; `child`, if present, must be live and not already
/// attached elsewhere under a stale parent link.
unsafe fn attach<T>(parent: NonNull<Node<T>>, dir: Dir, child: Link<T>) {
    set_child(parent, dir, child);
    if let Some(child) = child {
        set_parent(child, Some(parent));
    }
}

/// Top-down splay of `root` toward whatever `cmp` calls equal, returning the
/// new root. Free function (rather than a method) so callers can hold a
/// borrow of a tree's comparator field across the call without also needing
/// `&mut self` for the whole tree.
fn splay<T>(mut root: NonNull<Node<T>>, elem: &T, cmp: &dyn Comparator<T>) -> NonNull<Node<T>> {
    let mut small_tail: Link<T> = None;
    let mut small_head: Link<T> = None;
    let mut large_tail: Link<T> = None;
    let mut large_head: Link<T> = None;

    unsafe {
        loop {
            let root_cmp = cmp.compare(elem, &root.as_ref().value);
            if root_cmp == Ordering::Equal {
                break;
            }
            let dir = if root_cmp == Ordering::Greater { Dir::Right } else { Dir::Left };
            let child = match get_child(root, dir) {
                Some(child) => child,
                None => break,
            };

            let child_cmp = cmp.compare(elem, &child.as_ref().value);
            let dir_from_child = if child_cmp == Ordering::Greater { Dir::Right } else { Dir::Left };

            if child_cmp != Ordering::Equal && dir == dir_from_child {
                // zig-zig: rotate the grandchild up before continuing the descent.
                let pivot = child;
                attach(root, dir, get_child(pivot, dir.opposite()));
                attach(pivot, dir.opposite(), Some(root));
                root = pivot;
                if get_child(root, dir).is_none() {
                    break;
                }
            }

            match dir {
                Dir::Right => extend_chain(&mut small_tail, &mut small_head, Dir::Right, root),
                Dir::Left => extend_chain(&mut large_tail, &mut large_head, Dir::Left, root),
            }
            root = get_child(root, dir).expect("checked non-empty above");
        }

        match small_tail {
            Some(tail) => attach(tail, Dir::Right, get_child(root, Dir::Left)),
            None => small_head = get_child(root, Dir::Left),
        }
        match large_tail {
            Some(tail) => attach(tail, Dir::Left, get_child(root, Dir::Right)),
            None => large_head = get_child(root, Dir::Right),
        }
        attach(root, Dir::Left, small_head);
        attach(root, Dir::Right, large_head);
        set_parent(root, None);
    }

    root
}

fn extend_chain<T>(tail: &mut Link<T>, head: &mut Link<T>, dir: Dir, node: NonNull<Node<T>>) {
    match *tail {
        Some(t) => unsafe { attach(t, dir, Some(node)) },
        None => *head = Some(node),
    }
    *tail = Some(node);
}

impl<T, C> SplayTree<T, C>
where
    C: Comparator<T>,
{
    pub(crate) const fn new(cmp: C) -> Self {
        Self {
            root: None,
            size: 0,
            cmp,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Splays `elem` to the root under the tree's own comparator, unless the
    /// tree is empty.
    fn splay_self(&mut self, elem: &T) -> Option<NonNull<Node<T>>> {
        let root = self.root?;
        let new_root = splay(root, elem, &self.cmp);
        self.root = Some(new_root);
        Some(new_root)
    }

    /// Splays toward the maximum (`Ordering::Greater` forced) or minimum
    /// (`Ordering::Less` forced) element, without a real key from the caller.
    fn splay_extremum(&mut self, order: Ordering) -> Option<NonNull<Node<T>>> {
        let root = self.root?;
        let forced = Forced(order);
        // SAFETY: the forced comparator never reads `elem`, so any live value works.
        let dummy = unsafe { &root.as_ref().value };
        let new_root = splay(root, dummy, &forced);
        self.root = Some(new_root);
        Some(new_root)
    }

    /// Splays toward the maximum/minimum and returns a reference to it
    /// without removing it, so a repeated peek of the same extremum after
    /// the first access degrades to O(1) like [`SplayTree::erase_extremum`]
    /// does for repeated pops.
    pub(crate) fn peek_extremum(&mut self, order: Ordering) -> Option<&T> {
        let node = self.splay_extremum(order)?;
        Some(unsafe { &node.as_ref().value })
    }

    /// Read-only BST probe that never splays, safe for concurrent readers.
    fn const_seek(&self, elem: &T) -> Link<T> {
        let mut cur = self.root;
        while let Some(node) = cur {
            let node_cmp = unsafe { self.cmp.compare(elem, &node.as_ref().value) };
            match node_cmp {
                Ordering::Equal => return Some(node),
                Ordering::Greater => cur = unsafe { get_child(node, Dir::Right) },
                Ordering::Less => cur = unsafe { get_child(node, Dir::Left) },
            }
        }
        None
    }

    pub(crate) fn contains_readonly(&self, elem: &T) -> bool {
        self.const_seek(elem).is_some()
    }

    /// Read-only probe returning the matching tree node (the duplicate-ring
    /// anchor, if `elem`'s key has any), without splaying.
    pub(crate) fn seek_readonly(&self, elem: &T) -> Link<T> {
        self.const_seek(elem)
    }

    /// Unique-set insert. Returns `false` ("already present") without
    /// mutating the tree if an equal key already exists.
    pub(crate) fn insert_unique(&mut self, value: T) -> bool {
        let new_node = Node::leak(value);
        match self.root {
            None => {
                self.root = Some(new_node);
                self.size += 1;
                true
            }
            Some(_) => {
                let new_value = unsafe { &new_node.as_ref().value };
                let splayed = self.splay_self(new_value).expect("root is Some");
                let root_cmp = unsafe { self.cmp.compare(&new_node.as_ref().value, &splayed.as_ref().value) };
                if root_cmp == Ordering::Equal {
                    unsafe { drop(Box::from_raw(new_node.as_ptr())) };
                    false
                } else {
                    self.connect_new_root(new_node, root_cmp);
                    self.size += 1;
                    true
                }
            }
        }
    }

    /// Multiset insert: always succeeds, appending to the duplicate ring on
    /// an exact key match instead of rejecting. Returns a pointer to the
    /// freshly-leaked node, which callers wrap in a [`super::Handle`] so the
    /// element can later be erased or updated in O(1) (beyond the splay an
    /// erase-by-handle on a ring head still needs).
    pub(crate) fn insert_multi(&mut self, value: T) -> NonNull<Node<T>> {
        let new_node = Node::leak(value);
        self.size += 1;
        match self.root {
            None => {
                self.root = Some(new_node);
            }
            Some(_) => {
                let new_value = unsafe { &new_node.as_ref().value };
                let splayed = self.splay_self(new_value).expect("root is Some");
                let root_cmp = unsafe { self.cmp.compare(&new_node.as_ref().value, &splayed.as_ref().value) };
                if root_cmp == Ordering::Equal {
                    unsafe { dup::attach_duplicate(splayed, new_node) };
                } else {
                    self.connect_new_root(new_node, root_cmp);
                }
            }
        }
        new_node
    }

    fn connect_new_root(&mut self, new_root: NonNull<Node<T>>, cmp_result: Ordering) {
        let dir = if cmp_result == Ordering::Greater { Dir::Right } else { Dir::Left };
        let old_root = self.root.expect("connect_new_root requires a non-empty tree");
        unsafe {
            let far_child = get_child(old_root, dir);
            attach(new_root, dir, far_child);
            attach(new_root, dir.opposite(), Some(old_root));
            set_child(old_root, dir, None);
            set_parent(new_root, None);
        }
        self.root = Some(new_root);
    }

    /// Splays `elem` and reports whether the resulting root matches it.
    pub(crate) fn find(&mut self, elem: &T) -> Link<T> {
        let root = self.splay_self(elem)?;
        let eq = unsafe { self.cmp.compare(elem, &root.as_ref().value) } == Ordering::Equal;
        eq.then_some(root)
    }

    pub(crate) fn contains(&mut self, elem: &T) -> bool {
        self.find(elem).is_some()
    }

    /// Unique-set erase: removes the node matching `elem` if present.
    pub(crate) fn erase_unique(&mut self, elem: &T) -> Option<Box<Node<T>>> {
        let root = self.splay_self(elem)?;
        if unsafe { self.cmp.compare(elem, &root.as_ref().value) } != Ordering::Equal {
            return None;
        }
        self.remove_from_tree(root);
        self.size -= 1;
        Some(unsafe { isolate(root) })
    }

    /// Removes `node` (already known to be the tree root) from the tree
    /// shape, leaving `self.root` pointing at the replacement.
    fn remove_from_tree(&mut self, node: NonNull<Node<T>>) {
        unsafe {
            match get_child(node, Dir::Left) {
                None => {
                    self.root = get_child(node, Dir::Right);
                    if let Some(new_root) = self.root {
                        set_parent(new_root, None);
                    }
                }
                Some(left) => {
                    // splay the max of the left subtree to its root, then hang the
                    // node's right subtree off it.
                    let forced = Forced(Ordering::Greater);
                    let dummy = &left.as_ref().value;
                    let new_root = splay(left, dummy, &forced);
                    attach(new_root, Dir::Right, get_child(node, Dir::Right));
                    set_parent(new_root, None);
                    self.root = Some(new_root);
                }
            }
        }
    }

    /// Extremum pop for a multiset/depq: removes and returns the anchor
    /// itself (the first-inserted element of the key), promoting the next
    /// ring entry into the tree slot if the max/min anchor has duplicates,
    /// otherwise removing the anchor from the tree outright. `order` selects
    /// `Ordering::Greater` for max, `Ordering::Less` for min. Returning the
    /// anchor (not the ring head) is what keeps repeated pops of an equal key
    /// in FIFO insertion order.
    pub(crate) fn erase_extremum(&mut self, order: Ordering) -> Option<Box<Node<T>>> {
        let anchor = self.splay_extremum(order)?;
        self.size -= 1;
        unsafe {
            if is_anchor_with_dups(anchor) {
                let replacement = dup::promote_ring_replacement(anchor);
                self.replace_in_tree(anchor, replacement);
            } else {
                self.remove_from_tree(anchor);
            }
            Some(isolate(anchor))
        }
    }

    /// Erase-by-handle for a multiset: dispatches on the handle's current
    /// role (ring follower, ring head, or tree anchor).
    pub(crate) fn erase_by_handle(&mut self, handle: NonNull<Node<T>>) -> Box<Node<T>> {
        unsafe {
            if super::node::is_dup_follower(handle) {
                dup::detach_follower(handle);
                return isolate(handle);
            }
            if is_dup_head(handle) {
                // The ring's head doesn't carry a direct pointer back to its anchor,
                // but every ring member compares equal to it, so splaying by the
                // head's own value brings the anchor to the root.
                let value = &handle.as_ref().value;
                let anchor = self.splay_self(value).expect("handle belongs to this tree");
                debug_assert!(is_anchor_with_dups(anchor));
                dup::detach_head_promote_next(anchor);
                return isolate(handle);
            }
            // `handle` is a tree anchor (or an ordinary node with no duplicates).
            let value = &handle.as_ref().value;
            let splayed = self.splay_self(value).expect("handle belongs to this tree");
            debug_assert_eq!(splayed, handle);
            if is_anchor_with_dups(handle) {
                let replacement = dup::promote_ring_replacement(handle);
                self.replace_in_tree(handle, replacement);
            } else {
                self.remove_from_tree(handle);
            }
            isolate(handle)
        }
    }

    /// Swaps `old` out of the tree for `replacement`, fixing up `replacement`'s
    /// inherited children's parent links and the slot in `old`'s former parent
    /// (or `self.root`).
    fn replace_in_tree(&mut self, old: NonNull<Node<T>>, replacement: NonNull<Node<T>>) {
        unsafe {
            if let Some(left) = get_child(replacement, Dir::Left) {
                set_parent(left, Some(replacement));
            }
            if let Some(right) = get_child(replacement, Dir::Right) {
                set_parent(right, Some(replacement));
            }
            match get_parent(old) {
                None => {
                    self.root = Some(replacement);
                    set_parent(replacement, None);
                }
                Some(parent) => {
                    let dir = if get_child(parent, Dir::Left) == Some(old) { Dir::Left } else { Dir::Right };
                    attach(parent, dir, Some(replacement));
                }
            }
        }
    }

    pub(crate) fn clear<F: FnMut(Box<Node<T>>)>(&mut self, mut destructor: F) {
        let mut stack = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push(root);
        }
        self.size = 0;
        while let Some(node) = stack.pop() {
            unsafe {
                if let Some(l) = get_child(node, Dir::Left) {
                    stack.push(l);
                }
                if let Some(r) = get_child(node, Dir::Right) {
                    stack.push(r);
                }
                if is_anchor_with_dups(node) {
                    let head = super::node::dup_head_of(node);
                    let mut cur = head;
                    loop {
                        let next = get_child(cur, Dir::Right).expect("ring is circular");
                        let done = next == head;
                        destructor(Box::from_raw(cur.as_ptr()));
                        if done {
                            break;
                        }
                        cur = next;
                    }
                }
            }
            destructor(unsafe { isolate(node) });
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        let Some(root) = self.root else {
            return if self.size == 0 {
                Ok(())
            } else {
                Err(ValidationError::SizeMismatch { recorded: self.size, observed: 0 })
            };
        };
        unsafe {
            if get_parent(root).is_some() {
                return Err(ValidationError::ParentMismatch);
            }
            let mut observed = 0usize;
            validate_subtree(root, None, None, &self.cmp, &mut observed)?;
            if observed != self.size {
                return Err(ValidationError::SizeMismatch { recorded: self.size, observed });
            }
        }
        Ok(())
    }
}

unsafe fn validate_subtree<T, C: Comparator<T>>(
    node: NonNull<Node<T>>,
    low: Option<&T>,
    high: Option<&T>,
    cmp: &C,
    count: &mut usize,
) -> Result<(), ValidationError> {
    if let Some(low) = low {
        if cmp.compare(&node.as_ref().value, low) != Ordering::Greater {
            return Err(ValidationError::BstOrder);
        }
    }
    if let Some(high) = high {
        if cmp.compare(&node.as_ref().value, high) != Ordering::Less {
            return Err(ValidationError::BstOrder);
        }
    }
    *count += 1;

    if is_anchor_with_dups(node) {
        validate_dup_ring(node, count)?;
    }

    if let Some(left) = get_child(node, Dir::Left) {
        if get_parent(left) != Some(node) {
            return Err(ValidationError::ParentMismatch);
        }
        validate_subtree(left, low, Some(&node.as_ref().value), cmp, count)?;
    }
    if let Some(right) = get_child(node, Dir::Right) {
        if get_parent(right) != Some(node) {
            return Err(ValidationError::ParentMismatch);
        }
        validate_subtree(right, Some(&node.as_ref().value), high, cmp, count)?;
    }
    Ok(())
}

unsafe fn validate_dup_ring<T>(anchor: NonNull<Node<T>>, count: &mut usize) -> Result<(), ValidationError> {
    let head = super::node::dup_head_of(anchor);
    if !is_dup_head(head) {
        return Err(ValidationError::DuplicateRing);
    }
    let mut cur = head;
    loop {
        let next = get_child(cur, Dir::Right).ok_or(ValidationError::DuplicateRing)?;
        let prev = get_child(cur, Dir::Left).ok_or(ValidationError::DuplicateRing)?;
        if get_child(next, Dir::Left) != Some(cur) || get_child(prev, Dir::Right) != Some(cur) {
            return Err(ValidationError::DuplicateRing);
        }
        *count += 1;
        cur = next;
        if cur == head {
            break;
        }
    }
    Ok(())
}

/// Moves a node out of whatever container structure it was in and resets it
/// to the isolated state: boxed, with no dangling left/right/role pointing
/// back into the tree.
///
/// # Safety
/// `node` must have already been fully detached from any tree/ring structure
/// (its own left/right/role fields may still hold stale pointers, which this
/// overwrites before returning).
unsafe fn isolate<T>(mut node: NonNull<Node<T>>) -> Box<Node<T>> {
    node.as_mut().left = None;
    node.as_mut().right = None;
    node.as_mut().role = Role::Tree(None);
    Box::from_raw(node.as_ptr())
}

impl<T, C> Drop for SplayTree<T, C> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            unsafe {
                if let Some(l) = get_child(node, Dir::Left) {
                    stack.push(l);
                }
                if let Some(r) = get_child(node, Dir::Right) {
                    stack.push(r);
                }
                if is_anchor_with_dups(node) {
                    let head = super::node::dup_head_of(node);
                    let mut cur = head;
                    loop {
                        let next = get_child(cur, Dir::Right).expect("ring is circular");
                        let done = next == head;
                        drop(Box::from_raw(cur.as_ptr()));
                        if done {
                            break;
                        }
                        cur = next;
                    }
                }
                drop(Box::from_raw(node.as_ptr()));
            }
        }
    }
}
