//! Arena storage for graph nodes and interned types.
//!
//! Every node and every lattice value lives in an [`Arena`] and is addressed
//! by a typed [`Id`]. Edges between nodes are plain ids, so the cyclic
//! def-use graph needs no reference counting and no interior mutability.
//!
//! Items are never removed: a retired node keeps its slot (flagged dead) so
//! that stale ids stay in bounds and can still be inspected.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::NonZeroU32;
use std::ops::{Index, IndexMut};

// =============================================================================
// Typed ID
// =============================================================================

/// A typed handle into an [`Arena`].
///
/// Stored as `index + 1` in a `NonZeroU32`, so an empty input slot
/// (`Option<NodeId>`) costs no more than a filled one.
pub struct Id<T> {
    raw: NonZeroU32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// The handle for slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is `u32::MAX`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        match NonZeroU32::new(index.wrapping_add(1)) {
            Some(raw) => Id {
                raw,
                _marker: PhantomData,
            },
            None => panic!("arena index out of range"),
        }
    }

    /// Slot number, starting at 0.
    #[inline]
    pub const fn index(self) -> u32 {
        self.raw.get() - 1
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.index() as usize
    }
}

// Implemented by hand: deriving would demand the same traits of `T`.

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Append-only storage; the id of an item is its allocation order.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Store `item`, returning its id.
    ///
    /// # Panics
    ///
    /// Panics once `u32::MAX` items have been allocated.
    pub fn alloc(&mut self, item: T) -> Id<T> {
        let Some(index) = u32::try_from(self.items.len()).ok().filter(|&i| i < u32::MAX) else {
            panic!("arena exhausted at {} items", self.items.len());
        };
        self.items.push(item);
        Id::new(index)
    }

    /// The item behind `id`, or `None` for an id from a larger arena.
    #[inline]
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(id.as_usize())
    }

    /// Number of items ever allocated.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        (0u32..).zip(self.items.iter()).map(|(i, item)| (Id::new(i), item))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Id<T>> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: Id<T>) -> &T {
        &self.items[id.as_usize()]
    }
}

impl<T> IndexMut<Id<T>> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.items[id.as_usize()]
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Slot(i32);

    #[test]
    fn test_ids_follow_allocation_order() {
        let mut arena = Arena::new();
        let a = arena.alloc(Slot(10));
        let b = arena.alloc(Slot(20));

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert!(a < b);
        assert_eq!(arena[a], Slot(10));

        arena[b].0 = 200;
        assert_eq!(arena.get(b), Some(&Slot(200)));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_iter_pairs_ids_with_items() {
        let mut arena = Arena::with_capacity(4);
        let ids: Vec<_> = (1..=3).map(|v| arena.alloc(Slot(v))).collect();

        let seen: Vec<_> = arena.iter().map(|(id, slot)| (id, slot.0)).collect();
        assert_eq!(seen, vec![(ids[0], 1), (ids[1], 2), (ids[2], 3)]);
    }

    #[test]
    fn test_foreign_id_is_not_found() {
        let arena: Arena<Slot> = Arena::default();
        assert!(arena.is_empty());
        assert_eq!(arena.get(Id::new(0)), None);
    }

    #[test]
    fn test_optional_id_has_no_overhead() {
        assert_eq!(std::mem::size_of::<Option<Id<Slot>>>(), 4);
        assert_eq!(format!("{}", Id::<Slot>::new(3)), "#3");
        assert_eq!(format!("{:?}", Id::<Slot>::new(7)), "#7");
    }
}
