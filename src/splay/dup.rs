//! The circular doubly-linked duplicate ring that hangs off a splay-tree node
//! when two or more inserted elements compare equal. New duplicates join the
//! tail of the ring so that extraction (from the ring's head) preserves FIFO
//! order among equal keys: round-robin fairness.

use std::ptr::NonNull;

use super::node::{get_child, set_child, Dir, Link, Node, Role};

/// Attaches `new_dup` to `anchor`'s duplicate ring (creating the ring if this
/// is the first duplicate), appending at the tail so existing duplicates pop
/// first.
///
/// # Safety
/// `anchor` must be a live tree node (`Role::Tree` or `Role::DupAnchor`) and
/// `new_dup` must not currently be linked anywhere.
pub(crate) unsafe fn attach_duplicate<T>(mut anchor: NonNull<Node<T>>, mut new_dup: NonNull<Node<T>>) {
    match anchor.as_ref().role {
        Role::DupAnchor(head) => {
            // ring already exists: splice `new_dup` in just before `head`, i.e. at the tail.
            new_dup.as_mut().role = Role::DupFollower;
            let tail = get_child(head, Dir::Left);
            set_child(new_dup, Dir::Left, tail);
            set_child(new_dup, Dir::Right, Some(head));
            if let Some(tail) = tail {
                set_child(tail, Dir::Right, Some(new_dup));
            }
            set_child(head, Dir::Left, Some(new_dup));
        }
        Role::Tree(parent) => {
            // first duplicate: `new_dup` becomes a self-looped ring of one, and
            // inherits the parent-chain-continuation role the anchor used to hold.
            new_dup.as_mut().role = Role::DupHead(parent);
            set_child(new_dup, Dir::Left, Some(new_dup));
            set_child(new_dup, Dir::Right, Some(new_dup));
            anchor.as_mut().role = Role::DupAnchor(new_dup);
        }
        Role::DupHead(_) | Role::DupFollower => {
            unreachable!("attach_duplicate called on a duplicate ring member, not a tree node")
        }
    }
}

/// Splices a non-head duplicate out of its ring in O(1). The node returned to
/// the caller afterwards is left with dangling `left`/`right`; the caller is
/// responsible for clearing them once the node is back in isolated state.
///
/// # Safety
/// `follower` must currently hold `Role::DupFollower`.
pub(crate) unsafe fn detach_follower<T>(follower: NonNull<Node<T>>) {
    let prev = get_child(follower, Dir::Left).expect("follower ring link must be populated");
    let next = get_child(follower, Dir::Right).expect("follower ring link must be populated");
    set_child(prev, Dir::Right, Some(next));
    set_child(next, Dir::Left, Some(prev));
}

/// Removes the ring head from `anchor`'s duplicate ring and promotes the next
/// ring entry (in insertion order) to head. If the head had no other ring
/// members, clears `anchor`'s duplicate link entirely (it reverts to a plain
/// tree node). The anchor's own tree position is untouched either way.
///
/// # Safety
/// `anchor` must currently hold `Role::DupAnchor`.
pub(crate) unsafe fn detach_head_promote_next<T>(mut anchor: NonNull<Node<T>>) -> NonNull<Node<T>> {
    let head = match anchor.as_ref().role {
        Role::DupAnchor(head) => head,
        _ => unreachable!("detach_head_promote_next called without a duplicate ring"),
    };
    let parent_chain = match head.as_ref().role {
        Role::DupHead(parent) => parent,
        _ => unreachable!("ring head lost its DupHead role"),
    };
    let next = get_child(head, Dir::Right).expect("ring head always has a next link");
    if next == head {
        anchor.as_mut().role = Role::Tree(parent_chain);
    } else {
        let tail = get_child(head, Dir::Left).expect("ring head always has a prev link");
        let mut next_mut = next;
        next_mut.as_mut().role = Role::DupHead(parent_chain);
        set_child(next, Dir::Left, Some(tail));
        set_child(tail, Dir::Right, Some(next));
        anchor.as_mut().role = Role::DupAnchor(next);
    }
    head
}

/// Replaces `anchor` in its own tree slot with the front of its duplicate
/// ring, giving the replacement the anchor's former children. `anchor` is
/// returned untouched (its own fields are stale after this call and must be
/// reset by the caller). If the ring has no other members, the replacement
/// simply becomes an ordinary tree node carrying the anchor's old
/// parent-chain continuation.
///
/// # Safety
/// `anchor` must currently hold `Role::DupAnchor`, with `anchor.left`/`right`
/// holding its live tree children.
pub(crate) unsafe fn promote_ring_replacement<T>(anchor: NonNull<Node<T>>) -> NonNull<Node<T>> {
    let head = match anchor.as_ref().role {
        Role::DupAnchor(head) => head,
        _ => unreachable!("promote_ring_replacement called without a duplicate ring"),
    };
    let parent_chain = match head.as_ref().role {
        Role::DupHead(parent) => parent,
        _ => unreachable!("ring head lost its DupHead role"),
    };
    let next = get_child(head, Dir::Right).expect("ring head always has a next link");
    let mut replacement = head;
    if next == head {
        replacement.as_mut().role = Role::Tree(parent_chain);
    } else {
        let tail = get_child(head, Dir::Left).expect("ring head always has a prev link");
        let mut next_mut = next;
        next_mut.as_mut().role = Role::DupHead(parent_chain);
        set_child(next, Dir::Left, Some(tail));
        set_child(tail, Dir::Right, Some(next));
        replacement.as_mut().role = Role::DupAnchor(next);
    }
    let left: Link<T> = anchor.as_ref().left;
    let right: Link<T> = anchor.as_ref().right;
    replacement.as_mut().left = left;
    replacement.as_mut().right = right;
    replacement
}
