//! The four pairing-heap primitives: `fair_merge`, `link_child`, the
//! two-pass pairing fold used by pop and erase-by-handle, and `cut_child`.
//! Kept as free functions (rather than methods) so [`super::heap::Heap`] can
//! call them while holding only a borrow of its comparator, mirroring
//! [`crate::splay::tree`]'s free-standing `splay` function.

use std::cmp::Ordering;
use std::ptr::NonNull;

use super::node::{Link, Node};
use crate::cmp::Comparator;

/// Merges `new` into `old`'s heap, winner-takes-root. If `old` is absent,
/// `new` becomes the whole heap. `new` must already be self-looped (fresh
/// from [`Node::leak`], a pairing-fold result, or a [`cut_child`] output);
/// its own sibling links are otherwise never consulted by this function, only
/// overwritten if it loses.
///
/// # Safety
/// `old` and `new`, if distinct, must be live, not already attached to one
/// another.
pub(crate) unsafe fn fair_merge<T, C: Comparator<T>>(
    old: Link<T>,
    new: NonNull<Node<T>>,
    cmp: &C,
    order: Ordering,
) -> NonNull<Node<T>> {
    let Some(old) = old else { return new };
    if old == new {
        return old;
    }
    if cmp.compare(&new.as_ref().value, &old.as_ref().value) == order {
        link_child(new, old);
        new
    } else {
        link_child(old, new);
        old
    }
}

/// Makes `child` the newest (tail) entry of `parent`'s sibling ring. Oldest
/// children stay toward the front, so the next delete-min's first pairing
/// always folds in the longest-waiting child first (the "fair" in fair
/// merge).
///
/// # Safety
/// `parent` and `child` must be live and distinct.
unsafe fn link_child<T>(mut parent: NonNull<Node<T>>, mut child: NonNull<Node<T>>) {
    match parent.as_ref().left_child {
        Some(mut tail) => {
            let mut eldest = tail.as_ref().next_sibling.expect("ring is circular");
            child.as_mut().next_sibling = Some(eldest);
            child.as_mut().prev_sibling = Some(tail);
            eldest.as_mut().prev_sibling = Some(child);
            tail.as_mut().next_sibling = Some(child);
        }
        None => {
            child.as_mut().next_sibling = Some(child);
            child.as_mut().prev_sibling = Some(child);
        }
    }
    parent.as_mut().left_child = Some(child);
    child.as_mut().parent = Some(parent);
}

/// Splices `child` out of its parent's sibling ring, clears its parent link,
/// and leaves it alone in a self-looped ring of its own, but unlike
/// [`super::node::reset_isolated`], leaves `child`'s own children (its
/// `left_child` ring) completely untouched. Callers that want `child` to
/// rejoin the heap with its existing subtree intact (the cheap branches of
/// `update`/`increase`/`decrease`) rely on this; callers that want it fully
/// detached first run it through [`fold_children`] to fold those children
/// back in, then [`super::node::reset_isolated`] to clear `left_child` too.
///
/// The source algorithm leaves a cut node's own sibling-link fields
/// untouched, relying on the fact that nothing reads them again until the
/// node is either re-merged as a loser (whose links `link_child` overwrites
/// anyway) or confirmed as the new overall root. This port instead
/// self-loops the cut node's sibling links immediately, so a cut node that
/// goes on to *win* a subsequent `fair_merge` and become the new overall root
/// satisfies the root's self-loop invariant unconditionally rather than
/// contingently; see `DESIGN.md` for the full reasoning.
///
/// # Safety
/// `child` must currently be linked (have live `next_sibling`/`prev_sibling`).
pub(crate) unsafe fn cut_child<T>(mut child: NonNull<Node<T>>) {
    let next = child.as_ref().next_sibling.expect("linked node has sibling links");
    let mut prev = child.as_ref().prev_sibling.expect("linked node has sibling links");
    let mut next_mut = next;
    next_mut.as_mut().prev_sibling = Some(prev);
    prev.as_mut().next_sibling = Some(next);
    if let Some(mut parent) = child.as_ref().parent {
        if parent.as_ref().left_child == Some(child) {
            parent.as_mut().left_child = if next == child { None } else { Some(next) };
        }
    }
    child.as_mut().parent = None;
    child.as_mut().next_sibling = Some(child);
    child.as_mut().prev_sibling = Some(child);
}

/// Two-pass pairing fold of `node`'s children into a single merged subtree,
/// used by both pop (delete-min-of-order) and erase-by-handle. Returns
/// `None` if `node` has no children.
///
/// Walks the sibling ring in adjacent pairs, merging each pair and folding
/// the result into a running accumulator left-to-right; an odd trailing
/// child merges into the accumulator on its own. The returned node is always
/// self-looped with no parent, ready to be used as the new heap root or
/// fair-merged back into one.
///
/// # Safety
/// `node` must be live.
pub(crate) unsafe fn fold_children<T, C: Comparator<T>>(
    node: NonNull<Node<T>>,
    cmp: &C,
    order: Ordering,
) -> Link<T> {
    let tail = node.as_ref().left_child?;
    let eldest = tail.as_ref().next_sibling.expect("ring is circular");
    let mut accumulator = eldest;
    let mut cur = eldest.as_ref().next_sibling.expect("ring is circular");
    while cur != eldest && cur.as_ref().next_sibling.expect("ring is circular") != eldest {
        let next = cur.as_ref().next_sibling.expect("ring is circular");
        let next_cur = next.as_ref().next_sibling.expect("ring is circular");
        let paired = fair_merge(Some(cur), next, cmp, order);
        accumulator = fair_merge(Some(accumulator), paired, cmp, order);
        cur = next_cur;
    }
    let mut folded = if cur != eldest { fair_merge(Some(accumulator), cur, cmp, order) } else { accumulator };
    folded.as_mut().next_sibling = Some(folded);
    folded.as_mut().prev_sibling = Some(folded);
    folded.as_mut().parent = None;
    Some(folded)
}

/// Fully detaches `target` from `heap_root`'s heap, folding its former
/// children back in, and returns the heap's new root. Shared by `erase` and
/// by the "didn't take the cheap cut-only path" branches of `update` /
/// `increase` / `decrease`.
///
/// # Safety
/// `target` must currently be linked somewhere in the heap rooted at
/// `heap_root` (or be `heap_root` itself).
pub(crate) unsafe fn delete_node<T, C: Comparator<T>>(
    heap_root: Link<T>,
    target: NonNull<Node<T>>,
    cmp: &C,
    order: Ordering,
) -> Link<T> {
    if heap_root == Some(target) {
        return fold_children(target, cmp, order);
    }
    cut_child(target);
    match fold_children(target, cmp, order) {
        Some(subtree) => Some(fair_merge(heap_root, subtree, cmp, order)),
        None => heap_root,
    }
}
