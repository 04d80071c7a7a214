//! Intrusive-style top-down splay tree: the shared engine behind
//! [`crate::set`], [`crate::multiset`], and [`crate::depq`].
//!
//! This module is purely internal plumbing. The public containers each wrap
//! a [`tree::SplayTree`] and expose only the operations that make sense for
//! their own semantics (unique vs. multi-key, double-ended vs. single-ended).

mod dup;
mod iter;
mod node;
mod tree;

pub(crate) use iter::{Cursor, RawIter, RawRange};
pub(crate) use node::{is_anchor_with_dups, Node};
pub(crate) use tree::SplayTree;

pub(crate) use iter::{advance, advance_back, first, floor, last, lower_bound, upper_bound, value_of};

use std::ptr::NonNull;

/// An opaque reference to a node already stored in a [`SplayTree`], usable to
/// erase or update that exact element in O(1) amortized (after the splay
/// erase-by-handle needs to locate its ring position) without a full key
/// search. Plays the role an intrusive pointer back to the caller's own
/// storage would, adapted to this crate's owning-storage model.
#[derive(Debug)]
pub struct Handle<T>(pub(crate) NonNull<Node<T>>);

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}

impl<T> Handle<T> {
    /// # Safety
    /// `ptr` must point at a node currently owned by the tree this handle is
    /// used with.
    pub(crate) unsafe fn new(ptr: NonNull<Node<T>>) -> Self {
        Handle(ptr)
    }

    pub fn get(&self) -> &T {
        unsafe { &self.0.as_ref().value }
    }
}
