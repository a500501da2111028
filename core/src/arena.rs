//! Dense record storage keyed by monotonic ids.
//!
//! Records are never removed, so an arena is a `Vec` where id `n` lives at
//! index `n - 1`. Ids start at 1; id 0 is never allocated and never resolves.

use serde::{Deserialize, Serialize};

/// Append-only store of records addressed by `u64` ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Arena<T> {
    /// Creates an empty arena
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The id the next inserted record will receive
    #[must_use]
    pub fn next_id(&self) -> u64 {
        u64::try_from(self.items.len()).map_or(u64::MAX, |len| len.saturating_add(1))
    }

    /// Allocates the next id and stores the record built for it
    pub fn insert_with<F>(&mut self, build: F) -> u64
    where
        F: FnOnce(u64) -> T,
    {
        let id = self.next_id();
        self.items.push(build(id));
        id
    }

    /// Looks up a record by id
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&T> {
        Self::index(id).and_then(|index| self.items.get(index))
    }

    /// Looks up a record by id for mutation
    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        Self::index(id).and_then(|index| self.items.get_mut(index))
    }

    /// Returns true if the id has been allocated
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing has been inserted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates `(id, record)` pairs in allocation order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u64, &T)> + Clone {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (Self::id_at(index), item))
    }

    fn id_at(index: usize) -> u64 {
        u64::try_from(index).map_or(u64::MAX, |index| index.saturating_add(1))
    }

    fn index(id: u64) -> Option<usize> {
        id.checked_sub(1).and_then(|index| usize::try_from(index).ok())
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut arena = Arena::new();
        assert_eq!(arena.next_id(), 1);
        let first = arena.insert_with(|id| format!("record-{id}"));
        let second = arena.insert_with(|id| format!("record-{id}"));
        assert_eq!((first, second), (1, 2));
        assert_eq!(arena.get(2).map(String::as_str), Some("record-2"));
    }

    #[test]
    fn id_zero_never_resolves() {
        let mut arena = Arena::new();
        arena.insert_with(|_| 10);
        assert!(arena.get(0).is_none());
        assert!(!arena.contains(0));
        assert!(arena.get(2).is_none());
    }

    #[test]
    fn iteration_follows_allocation_order() {
        let mut arena = Arena::new();
        for value in ["a", "b", "c"] {
            arena.insert_with(|_| value);
        }
        let ids: Vec<u64> = arena.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let newest: Vec<&str> = arena.iter().rev().map(|(_, v)| *v).collect();
        assert_eq!(newest, vec!["c", "b", "a"]);
    }
}
