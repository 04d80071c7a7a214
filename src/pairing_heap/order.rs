use std::cmp::Ordering;

/// Which three-way comparison result a [`super::Heap`] treats as "this
/// element is more important, pull it toward the root".
/// `Max`/`Min` are zero-sized, so choosing an order costs nothing at runtime;
/// it's resolved at compile time everywhere `O::DIRECTION` is read.
pub trait Order {
    const DIRECTION: Ordering;
}

/// Root tracks the maximum element.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Max;

/// Root tracks the minimum element.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Min;

impl Order for Max {
    const DIRECTION: Ordering = Ordering::Greater;
}

impl Order for Min {
    const DIRECTION: Ordering = Ordering::Less;
}
