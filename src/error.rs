/// Diagnostic detail for a failed [`validate`]/[`validate_report`] call.
///
/// Every container's plain `validate() -> bool` is implemented in terms of
/// `validate_report().is_ok()`; this type exists so tests and debug-assertion
/// call sites can say *which* invariant broke.
///
/// [`validate`]: crate::set::Set::validate
/// [`validate_report`]: crate::set::Set::validate_report
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("bst order violated: a node compares out of order with an ancestor")]
    BstOrder,
    #[error("duplicate ring is malformed (broken prev/next link or stray anchor)")]
    DuplicateRing,
    #[error("a child's parent pointer does not match the tree shape")]
    ParentMismatch,
    #[error("recorded size {recorded} does not match the observed size {observed}")]
    SizeMismatch { recorded: usize, observed: usize },
    #[error("pairing heap order violated between a parent and a child")]
    HeapOrder,
    #[error("pairing heap sibling ring is malformed")]
    SiblingRing,
    #[error("pairing heap root has a parent")]
    RootHasParent,
}
