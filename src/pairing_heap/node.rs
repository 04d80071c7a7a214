use std::ptr::NonNull;

/// A heap-or-ring link. `None` plays the role the null sentinel plays in the
/// source algorithm: "no children" for `left_child`, "no parent" for a root.
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

pub(crate) struct Node<T> {
    pub(crate) value: T,
    /// The most-recently-linked child (the sibling ring's tail);
    /// `left_child.next_sibling` is the eldest child (the ring's front).
    pub(crate) left_child: Link<T>,
    pub(crate) next_sibling: Link<T>,
    pub(crate) prev_sibling: Link<T>,
    pub(crate) parent: Link<T>,
}

impl<T> Node<T> {
    fn new_boxed(value: T) -> Box<Node<T>> {
        Box::new(Node {
            value,
            left_child: None,
            next_sibling: None,
            prev_sibling: None,
            parent: None,
        })
    }

    /// Leaks a freshly allocated node in isolated, self-looped state: ready to
    /// be handed straight to [`super::ops::fair_merge`] as the incoming side.
    pub(crate) fn leak(value: T) -> NonNull<Node<T>> {
        let mut node = NonNull::from(Box::leak(Node::new_boxed(value)));
        unsafe {
            node.as_mut().next_sibling = Some(node);
            node.as_mut().prev_sibling = Some(node);
        }
        node
    }
}

/// Resets `node` to the isolated state: no children, no
/// parent, alone in a self-looped sibling ring. Used both when permanently
/// isolating an erased node for return to the caller and when a node is about
/// to be re-merged after a key update folded its old children elsewhere.
///
/// # Safety
/// `node` must be a currently-live, uniquely-owned `Node<T>` already detached
/// from any sibling ring / parent it used to belong to.
pub(crate) unsafe fn reset_isolated<T>(mut node: NonNull<Node<T>>) {
    node.as_mut().left_child = None;
    node.as_mut().parent = None;
    node.as_mut().next_sibling = Some(node);
    node.as_mut().prev_sibling = Some(node);
}

/// Like [`reset_isolated`], but hands back ownership as a [`Box`] for final
/// removal from the heap.
///
/// # Safety
/// See [`reset_isolated`].
pub(crate) unsafe fn isolate<T>(node: NonNull<Node<T>>) -> Box<Node<T>> {
    reset_isolated(node);
    Box::from_raw(node.as_ptr())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaked_node_is_self_looped() {
        let node = Node::leak(7);
        unsafe {
            assert_eq!(node.as_ref().next_sibling, Some(node));
            assert_eq!(node.as_ref().prev_sibling, Some(node));
            assert!(node.as_ref().left_child.is_none());
            assert!(node.as_ref().parent.is_none());
            drop(Box::from_raw(node.as_ptr()));
        }
    }
}
