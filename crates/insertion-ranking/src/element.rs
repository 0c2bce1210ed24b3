use crate::constants::MAX_VALUE;
use crate::factors::SortKey;
use crate::value::{Value, ABSENT};

/// One ranked entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    key: i64,
    rank: usize,
    sort_key: SortKey,
    payload: Vec<Value>,
}

impl Element {
    pub(crate) fn new(key: i64, rank: usize, sort_key: SortKey) -> Self {
        Self {
            key,
            rank,
            sort_key,
            payload: Vec::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> i64 {
        self.key
    }

    /// 1-based position in the collection.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    #[inline]
    pub fn sort_key(&self) -> &SortKey {
        &self.sort_key
    }

    #[inline]
    pub(crate) fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    /// All payload slots, trailing never-written ones as [`Value::Absent`].
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.payload
    }

    /// The value at a 0-based slot, `Absent` past the end of the payload.
    pub fn value(&self, slot: usize) -> &Value {
        self.payload.get(slot).unwrap_or(&ABSENT)
    }

    /// Overwrites a slot, growing the payload by doubling from
    /// `initial_slots` until it covers `slot`. The payload never shrinks.
    ///
    /// The caller guarantees `slot < MAX_VALUE`.
    pub(crate) fn set_value(&mut self, slot: usize, value: Value, initial_slots: usize) {
        debug_assert!(slot < MAX_VALUE);
        if slot >= self.payload.len() {
            let mut len = self.payload.len().max(initial_slots).max(1);
            while len <= slot {
                len *= 2;
            }
            let len = len.min(MAX_VALUE);
            self.payload.reserve_exact(len - self.payload.len());
            self.payload.resize(len, Value::Absent);
        }
        self.payload[slot] = value;
    }

    /// Replaces the whole payload with one read back from a saved file.
    pub(crate) fn restore_payload(&mut self, payload: Vec<Value>) {
        debug_assert!(payload.len() <= MAX_VALUE);
        self.payload = payload;
    }
}
