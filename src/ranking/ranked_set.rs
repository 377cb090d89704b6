//! Capacity-bounded collection of the top-K entries by a metric.
//!
//! Entries are kept sorted descending by their sort key. Equal keys keep
//! insertion order, so the first-inserted entry ranks higher. Once the set is
//! full, a newcomer replaces the lowest entry only if its key is strictly
//! greater; otherwise it is discarded. A key that does not compare with
//! itself (NaN) is never retained.
//!
//! Example: capacity 2, inserting (A, 5), (B, 3), (C, 8), (D, 1) leaves
//! [(C, 8), (A, 5)].

use crate::utils::error::RankingError;
use std::fmt;

/// A retained payload together with the key it was ranked by
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<T, S> {
    pub payload: T,
    pub sort_key: S,
}

/// Bounded top-K set ordered by an extracted sort key
pub struct RankedSet<T, S> {
    capacity: usize,
    sort_key: Box<dyn Fn(&T) -> S>,
    items: Vec<RankedEntry<T, S>>,
}

impl<T, S: PartialOrd> RankedSet<T, S> {
    /// Create an empty set keeping at most `capacity` entries
    ///
    /// # Errors
    /// * `RankingError::InvalidArgument` - capacity is zero
    pub fn new(
        capacity: usize,
        sort_key: impl Fn(&T) -> S + 'static,
    ) -> Result<Self, RankingError> {
        if capacity == 0 {
            return Err(RankingError::InvalidArgument(
                "ranked set capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            sort_key: Box::new(sort_key),
            items: Vec::with_capacity(capacity),
        })
    }

    /// Insert a payload, returning whether it was retained
    ///
    /// A payload that does not make the top `capacity` is dropped silently.
    pub fn insert(&mut self, payload: T) -> bool {
        let sort_key = (self.sort_key)(&payload);
        if sort_key.partial_cmp(&sort_key).is_none() {
            return false;
        }

        if self.is_full() {
            let outranks_lowest = self
                .items
                .last()
                .map(|lowest| sort_key > lowest.sort_key)
                .unwrap_or(true);
            if !outranks_lowest {
                return false;
            }
            self.items.pop();
        }

        // First strictly lower entry; equal keys stay ahead of the newcomer
        let position = self
            .items
            .iter()
            .position(|entry| sort_key > entry.sort_key)
            .unwrap_or(self.items.len());

        self.items.insert(position, RankedEntry { payload, sort_key });
        true
    }

    /// Lowest-ranked retained entry
    pub fn lowest(&self) -> Option<&RankedEntry<T, S>> {
        self.items.last()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

impl<T, S> RankedSet<T, S> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in descending rank order
    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry<T, S>> {
        self.items.iter()
    }

    /// Copy of the entries in descending rank order
    pub fn to_sequence(&self) -> Vec<RankedEntry<T, S>>
    where
        T: Clone,
        S: Clone,
    {
        self.items.clone()
    }

    /// Consume the set, yielding payloads in descending rank order
    pub fn into_payloads(self) -> Vec<T> {
        self.items.into_iter().map(|entry| entry.payload).collect()
    }
}

impl<T: fmt::Debug, S: fmt::Debug> fmt::Debug for RankedSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankedSet")
            .field("capacity", &self.capacity)
            .field("items", &self.items)
            .finish()
    }
}
