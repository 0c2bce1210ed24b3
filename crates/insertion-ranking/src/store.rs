//! Rank-ordered element array and the key index that mirrors it.
//!
//! Elements live in one array ordered best-first; the index maps each key to
//! its array position. Every mutation below updates both sides before it
//! returns, so `index[e.key] == e.rank - 1` holds between calls.
//!
//! Repositioning is an insertion-sort step: after one element's key changes
//! it walks toward the head (`shift_up`) or the tail (`shift_down`) by
//! adjacent swaps, so the cost is the distance moved rather than the size of
//! the collection.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::trace;

use crate::element::Element;
use crate::factors::{compare, SortKey};

/// Outcome of a factor update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reposition {
    /// Rank after the update.
    pub rank: usize,
    /// Rank before the update, `None` if the key was inserted.
    pub previous: Option<usize>,
}

impl Reposition {
    pub fn is_new(&self) -> bool {
        self.previous.is_none()
    }

    /// `true` when the element did not move.
    pub fn is_unchanged(&self) -> bool {
        self.previous == Some(self.rank)
    }
}

pub(crate) struct RankedList {
    elements: Vec<Element>,
    index: HashMap<i64, usize>,
    arity: usize,
}

impl RankedList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            arity: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Raises the number of significant factor slots. Never lowers it.
    #[inline]
    pub fn raise_arity(&mut self, arity: usize) {
        self.arity = self.arity.max(arity);
    }

    pub fn get(&self, key: i64) -> Option<&Element> {
        self.index.get(&key).map(|&pos| &self.elements[pos])
    }

    pub fn get_mut(&mut self, key: i64) -> Option<&mut Element> {
        let pos = *self.index.get(&key)?;
        Some(&mut self.elements[pos])
    }

    /// Element at a 1-based rank.
    pub fn at(&self, rank: usize) -> Option<&Element> {
        rank.checked_sub(1).and_then(|pos| self.elements.get(pos))
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Doubles the backing array when it is full.
    fn grow(&mut self) {
        let capacity = self.elements.capacity();
        if self.elements.len() == capacity {
            self.elements.reserve_exact(capacity.max(1));
        }
    }

    #[inline]
    fn cmp_at(&self, a: usize, b: usize) -> Ordering {
        compare(
            self.elements[a].sort_key(),
            self.elements[b].sort_key(),
            self.arity,
        )
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.elements.swap(a, b);
        for pos in [a, b] {
            let element = &mut self.elements[pos];
            element.set_rank(pos + 1);
            if let Some(slot) = self.index.get_mut(&element.key()) {
                *slot = pos;
            }
        }
    }

    /// Moves the element at `pos` toward the head while its predecessor
    /// compares less. Returns the final position.
    fn shift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 && self.cmp_at(pos - 1, pos) == Ordering::Less {
            self.swap(pos - 1, pos);
            pos -= 1;
        }
        pos
    }

    /// Moves the element at `pos` toward the tail while its successor
    /// compares greater. Returns the final position.
    fn shift_down(&mut self, mut pos: usize) -> usize {
        while pos + 1 < self.elements.len() && self.cmp_at(pos + 1, pos) == Ordering::Greater {
            self.swap(pos, pos + 1);
            pos += 1;
        }
        pos
    }

    /// Inserts a new key at the tail and shifts it into place. Returns its
    /// rank.
    fn append(&mut self, key: i64, sort_key: SortKey) -> usize {
        debug_assert!(!self.index.contains_key(&key));
        self.grow();
        let pos = self.elements.len();
        self.elements.push(Element::new(key, pos + 1, sort_key));
        self.index.insert(key, pos);
        self.shift_up(pos) + 1
    }

    /// Replaces the sort key of `key`, inserting it if unseen, and restores
    /// the order. `arity` must already account for the new key.
    pub fn update(&mut self, key: i64, sort_key: SortKey) -> Reposition {
        let Some(&pos) = self.index.get(&key) else {
            let rank = self.append(key, sort_key);
            trace!(key, rank, "inserted");
            return Reposition {
                rank,
                previous: None,
            };
        };

        let old = *self.elements[pos].sort_key();
        self.elements[pos].set_sort_key(sort_key);
        let new_pos = match compare(&sort_key, &old, self.arity) {
            Ordering::Equal => pos,
            Ordering::Greater => self.shift_up(pos),
            Ordering::Less => self.shift_down(pos),
        };
        trace!(key, from = pos + 1, to = new_pos + 1, "repositioned");
        Reposition {
            rank: new_pos + 1,
            previous: Some(pos + 1),
        }
    }

    /// Removes `key` and closes the gap. Returns its former rank.
    pub fn remove(&mut self, key: i64) -> Option<usize> {
        let pos = self.index.remove(&key)?;
        self.elements.remove(pos);
        for (offset, element) in self.elements[pos..].iter_mut().enumerate() {
            let p = pos + offset;
            element.set_rank(p + 1);
            if let Some(slot) = self.index.get_mut(&element.key()) {
                *slot = p;
            }
        }
        Some(pos + 1)
    }

    /// Asserts the rank, index and order invariants.
    #[cfg(test)]
    pub fn check_invariants(&self) {
        assert_eq!(self.elements.len(), self.index.len());
        for (pos, element) in self.elements.iter().enumerate() {
            assert_eq!(element.rank(), pos + 1);
            assert_eq!(self.index.get(&element.key()), Some(&pos));
            if pos > 0 {
                assert_ne!(self.cmp_at(pos - 1, pos), Ordering::Less);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &RankedList) -> Vec<i64> {
        list.elements().iter().map(Element::key).collect()
    }

    fn update(list: &mut RankedList, key: i64, factors: &[f64]) -> Reposition {
        list.raise_arity(factors.len());
        list.update(key, SortKey::new(factors))
    }

    #[test]
    fn append_orders_descending() {
        let mut list = RankedList::with_capacity(4);
        assert_eq!(update(&mut list, 1, &[10.0]).rank, 1);
        assert_eq!(update(&mut list, 2, &[30.0]).rank, 1);
        assert_eq!(update(&mut list, 3, &[20.0]).rank, 2);
        assert_eq!(keys(&list), vec![2, 3, 1]);
        list.check_invariants();
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut list = RankedList::with_capacity(4);
        for key in 1..=4 {
            update(&mut list, key, &[5.0]);
        }
        assert_eq!(keys(&list), vec![1, 2, 3, 4]);
        let r = update(&mut list, 2, &[5.0]);
        assert!(r.is_unchanged());
        assert_eq!(keys(&list), vec![1, 2, 3, 4]);
    }

    #[test]
    fn shift_up_and_down() {
        let mut list = RankedList::with_capacity(4);
        for key in 1..=5 {
            update(&mut list, key, &[key as f64]);
        }
        assert_eq!(keys(&list), vec![5, 4, 3, 2, 1]);

        let r = update(&mut list, 2, &[4.5]);
        assert_eq!(r, Reposition { rank: 2, previous: Some(4) });
        assert_eq!(keys(&list), vec![5, 2, 4, 3, 1]);

        let r = update(&mut list, 5, &[0.0]);
        assert_eq!(r, Reposition { rank: 5, previous: Some(1) });
        assert_eq!(keys(&list), vec![2, 4, 3, 1, 5]);
        list.check_invariants();
    }

    #[test]
    fn equal_to_neighbour_does_not_pass_it() {
        let mut list = RankedList::with_capacity(4);
        update(&mut list, 1, &[3.0]);
        update(&mut list, 2, &[2.0]);
        update(&mut list, 3, &[1.0]);
        // Moving up to a tie stops behind the equal element.
        assert_eq!(update(&mut list, 3, &[3.0]).rank, 2);
        // Moving down to a tie stops in front of the equal element.
        assert_eq!(update(&mut list, 1, &[2.0]).rank, 2);
        assert_eq!(keys(&list), vec![3, 1, 2]);
    }

    #[test]
    fn remove_compacts() {
        let mut list = RankedList::with_capacity(2);
        for key in 1..=5 {
            update(&mut list, key, &[key as f64]);
        }
        assert_eq!(list.remove(4), Some(2));
        assert_eq!(list.remove(4), None);
        assert_eq!(keys(&list), vec![5, 3, 2, 1]);
        assert_eq!(list.get(1).map(Element::rank), Some(4));
        list.check_invariants();
    }

    #[test]
    fn capacity_doubles_and_never_shrinks() {
        let mut list = RankedList::with_capacity(2);
        let mut last = list.capacity();
        for key in 0..100 {
            update(&mut list, key, &[(key % 7) as f64]);
            assert!(list.capacity() >= last);
            last = list.capacity();
        }
        for key in 0..100 {
            list.remove(key);
        }
        assert!(list.is_empty());
        assert_eq!(list.capacity(), last);
    }

    #[test]
    fn at_is_one_based() {
        let mut list = RankedList::with_capacity(2);
        update(&mut list, 9, &[1.0]);
        assert!(list.at(0).is_none());
        assert_eq!(list.at(1).map(Element::key), Some(9));
        assert!(list.at(2).is_none());
    }
}
