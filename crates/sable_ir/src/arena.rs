//! Slot arena with stable IDs.
//!
//! Entities are appended and addressed by an [`ArenaId`]. Removing an entity
//! vacates its slot; the ID is never handed out again, so IDs held elsewhere
//! can be checked for liveness instead of silently aliasing a newer entity.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque ID types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw index.
    fn as_raw(self) -> u32;
}

/// Dense ID-indexed storage whose slots may be vacated.
#[derive(Debug, Clone)]
pub struct Arena<I: ArenaId, T> {
    slots: Vec<Option<T>>,
    live: usize,
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Stores `item` and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.slots.len() as u32);
        self.slots.push(Some(item));
        self.live += 1;
        id
    }

    /// The ID the next [`alloc`](Arena::alloc) will return.
    pub fn next_id(&self) -> I {
        I::from_raw(self.slots.len() as u32)
    }

    /// Returns the item if the slot is still occupied.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.slots.get(id.as_raw() as usize).and_then(Option::as_ref)
    }

    /// Returns the item.
    ///
    /// # Panics
    ///
    /// Panics if the ID was never allocated or its slot was vacated.
    pub fn get(&self, id: I) -> &T {
        self.try_get(id)
            .unwrap_or_else(|| panic!("arena slot {} is vacant", id.as_raw()))
    }

    /// Returns the item mutably.
    ///
    /// # Panics
    ///
    /// Panics if the ID was never allocated or its slot was vacated.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        self.slots
            .get_mut(id.as_raw() as usize)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("arena slot {} is vacant", id.as_raw()))
    }

    /// Vacates the slot, returning the item that occupied it.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let taken = self.slots.get_mut(id.as_raw() as usize)?.take();
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    /// Returns `true` if the ID refers to an occupied slot.
    pub fn contains(&self, id: I) -> bool {
        self.try_get(id).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over occupied `(ID, &T)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (I::from_raw(i as u32), item)))
    }

    /// Iterates over occupied items in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeId;

    #[test]
    fn alloc_and_index() {
        let mut arena: Arena<NodeId, &str> = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn remove_vacates_without_reuse() {
        let mut arena: Arena<NodeId, u32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        assert_eq!(arena.remove(a), Some(1));
        assert_eq!(arena.remove(a), None);
        assert!(!arena.contains(a));
        let c = arena.alloc(3);
        assert_ne!(a, c);
        assert_eq!(arena.len(), 2);
        let live: Vec<_> = arena.iter().map(|(id, v)| (id, *v)).collect();
        assert_eq!(live, vec![(b, 2), (c, 3)]);
    }

    #[test]
    #[should_panic(expected = "vacant")]
    fn get_vacant_panics() {
        let mut arena: Arena<NodeId, u32> = Arena::new();
        let a = arena.alloc(1);
        arena.remove(a);
        let _ = arena.get(a);
    }

    #[test]
    fn default_is_empty() {
        let arena: Arena<NodeId, u32> = Arena::default();
        assert!(arena.is_empty());
        assert_eq!(arena.values().count(), 0);
    }
}
