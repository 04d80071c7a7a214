use std::ptr::NonNull;

/// Which child slot (or, inside a duplicate ring, which ring-link slot) an
/// operation addresses. `left`/`right` double as `prev`/`next` for nodes
/// currently playing `Role::DupHead`/`Role::DupFollower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    pub(crate) fn opposite(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// A tree-or-duplicate-ring link. `None` plays the role the end sentinel plays
/// in the source algorithm: "no child here" for a tree link, "no parent" (this
/// node is the tree root) for a parent link.
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

/// What a node's third link slot currently means. The source algorithm fuses
/// "parent pointer" and "duplicate-ring head pointer" into one overloaded
/// field, distinguished at runtime by a pointer-pattern check. This crate
/// keeps the same four roles a node can play, but names them with an enum
/// instead, the tagged-sum alternative the algorithm's own design notes call
/// out as strictly cleaner, at the cost of one discriminant per node.
pub(crate) enum Role<T> {
    /// An ordinary tree node. `None` parent means this is the tree root.
    Tree(Link<T>),
    /// A tree node that has one or more equal-key duplicates attached;
    /// `left`/`right` are unused for this node while it holds this role, and
    /// this points at the current head of the duplicate ring.
    DupAnchor(NonNull<Node<T>>),
    /// The head of a duplicate ring. Carries the parent link the anchor would
    /// otherwise be storing, so ascent can continue past the ring once it is
    /// exhausted. `left`/`right` on a node in this role are repurposed as the
    /// ring's `prev`/`next`.
    DupHead(Link<T>),
    /// A non-head member of a duplicate ring. `left`/`right` are repurposed as
    /// `prev`/`next`.
    DupFollower,
}

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    pub(crate) role: Role<T>,
}

impl<T> Node<T> {
    pub(crate) fn new_boxed(value: T) -> Box<Node<T>> {
        Box::new(Node {
            value,
            left: None,
            right: None,
            role: Role::Tree(None),
        })
    }

    pub(crate) fn leak(value: T) -> NonNull<Node<T>> {
        NonNull::from(Box::leak(Node::new_boxed(value)))
    }
}

/// # Safety
/// `node` must be a currently-live, uniquely-owned `Node<T>` (no other
/// reference to it may be outstanding for the duration of the borrow).
pub(crate) unsafe fn is_anchor_with_dups<T>(node: NonNull<Node<T>>) -> bool {
    matches!(node.as_ref().role, Role::DupAnchor(_))
}

/// # Safety
/// See [`is_anchor_with_dups`].
pub(crate) unsafe fn is_dup_head<T>(node: NonNull<Node<T>>) -> bool {
    matches!(node.as_ref().role, Role::DupHead(_))
}

/// # Safety
/// See [`is_anchor_with_dups`].
pub(crate) unsafe fn is_dup_follower<T>(node: NonNull<Node<T>>) -> bool {
    matches!(node.as_ref().role, Role::DupFollower)
}

/// Returns the head of `anchor`'s duplicate ring.
///
/// # Safety
/// `anchor` must currently hold [`Role::DupAnchor`].
pub(crate) unsafe fn dup_head_of<T>(anchor: NonNull<Node<T>>) -> NonNull<Node<T>> {
    match anchor.as_ref().role {
        Role::DupAnchor(head) => head,
        _ => unreachable!("dup_head_of called on a node without a duplicate ring"),
    }
}

/// The effective tree parent of `node`, following the one extra hop through a
/// duplicate ring's head when `node` anchors one.
///
/// # Safety
/// `node` must be a live tree node (in `Role::Tree` or `Role::DupAnchor`).
pub(crate) unsafe fn get_parent<T>(node: NonNull<Node<T>>) -> Link<T> {
    match node.as_ref().role {
        Role::Tree(parent) => parent,
        Role::DupAnchor(head) => match head.as_ref().role {
            Role::DupHead(parent) => parent,
            _ => unreachable!("duplicate ring head lost its DupHead role"),
        },
        Role::DupHead(_) | Role::DupFollower => {
            unreachable!("get_parent called on a duplicate ring member, not a tree node")
        }
    }
}

/// Sets the effective tree parent of `node`, following the same one-hop
/// indirection through a duplicate ring's head as [`get_parent`].
///
/// # Safety
/// `node` must be a live tree node (in `Role::Tree` or `Role::DupAnchor`).
pub(crate) unsafe fn set_parent<T>(mut node: NonNull<Node<T>>, parent: Link<T>) {
    match node.as_mut().role {
        Role::Tree(ref mut slot) => *slot = parent,
        Role::DupAnchor(mut head) => match head.as_mut().role {
            Role::DupHead(ref mut slot) => *slot = parent,
            _ => unreachable!("duplicate ring head lost its DupHead role"),
        },
        Role::DupHead(_) | Role::DupFollower => {
            unreachable!("set_parent called on a duplicate ring member, not a tree node")
        }
    }
}

/// # Safety
/// `node` must be a currently-live `Node<T>`.
pub(crate) unsafe fn get_child<T>(node: NonNull<Node<T>>, dir: Dir) -> Link<T> {
    match dir {
        Dir::Left => node.as_ref().left,
        Dir::Right => node.as_ref().right,
    }
}

/// # Safety
/// `node` must be a currently-live, uniquely-owned `Node<T>`.
pub(crate) unsafe fn set_child<T>(mut node: NonNull<Node<T>>, dir: Dir, child: Link<T>) {
    match dir {
        Dir::Left => node.as_mut().left = child,
        Dir::Right => node.as_mut().right = child,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaked_node_starts_as_rootless_tree_node() {
        let node = Node::leak(5);
        unsafe {
            assert!(matches!(node.as_ref().role, Role::Tree(None)));
            assert_eq!(node.as_ref().value, 5);
            drop(Box::from_raw(node.as_ptr()));
        }
    }
}
