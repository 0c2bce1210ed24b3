use std::path::{Path, PathBuf};

use crate::constants::{MAX_FACTOR, MAX_PATH, MAX_VALUE};
use crate::element::Element;
use crate::error::{RankingError, Result};
use crate::factors::SortKey;
use crate::options::RankingOptions;
use crate::store::{RankedList, Reposition};
use crate::value::Value;

/// A keyed, always-sorted ranking bound to one save file.
///
/// Rank 1 holds the greatest sort key. Keys are compared over the first
/// [`factor_arity`](Self::factor_arity) factors, a collection-wide high-water
/// mark of how many factors callers have supplied.
///
/// ```
/// use insertion_ranking::RankedCollection;
///
/// let mut board = RankedCollection::new("board.lir").unwrap();
/// board.update_factor(1, &[10.0]).unwrap();
/// board.update_factor(2, &[30.0]).unwrap();
/// board.update_factor(3, &[20.0]).unwrap();
/// assert_eq!(board.position(2), Some(1));
///
/// let moved = board.update_factor(1, &[40.0]).unwrap();
/// assert_eq!((moved.rank, moved.previous), (1, Some(3)));
/// assert_eq!(board.key_at(2), Some(2));
/// ```
pub struct RankedCollection {
    path: PathBuf,
    pub(crate) options: RankingOptions,
    pub(crate) list: RankedList,
    pub(crate) dirty: bool,
}

impl RankedCollection {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, RankingOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: RankingOptions) -> Result<Self> {
        let path = path.as_ref();
        let len = path.as_os_str().len();
        if len >= MAX_PATH {
            return Err(RankingError::PathTooLong {
                len,
                max: MAX_PATH - 1,
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            list: RankedList::with_capacity(options.initial_capacity),
            options,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &RankingOptions {
        &self.options
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.list.len()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Element slots allocated. Grows by doubling and never shrinks.
    pub fn capacity(&self) -> usize {
        self.list.capacity()
    }

    /// Number of leading factors every comparison uses. Only ever grows.
    pub fn factor_arity(&self) -> usize {
        self.list.arity()
    }

    /// Whether anything changed since the last save or load.
    pub fn is_modified(&self) -> bool {
        self.dirty
    }

    /// Sets the leading factors of `key`, inserting it if unseen. Slots past
    /// `factors.len()` become `0`.
    ///
    /// Fails with [`RankingError::SlotOutOfRange`] unless
    /// `1 <= factors.len() <= MAX_FACTOR`, and with
    /// [`RankingError::NanFactor`] if any factor is NaN.
    pub fn update_factor(&mut self, key: i64, factors: &[f64]) -> Result<Reposition> {
        if factors.is_empty() || factors.len() > MAX_FACTOR {
            return Err(RankingError::SlotOutOfRange(factors.len() as i64));
        }
        if let Some(i) = factors.iter().position(|f| f.is_nan()) {
            return Err(RankingError::NanFactor(i as i64 + 1));
        }
        self.list.raise_arity(factors.len());
        self.dirty = true;
        Ok(self.list.update(key, SortKey::new(factors)))
    }

    /// Sets one factor at a 1-based `slot`, inserting `key` if unseen with
    /// every other factor `0`.
    pub fn update_one_factor(&mut self, key: i64, factor: f64, slot: i64) -> Result<Reposition> {
        if slot < 1 || slot > MAX_FACTOR as i64 {
            return Err(RankingError::SlotOutOfRange(slot));
        }
        if factor.is_nan() {
            return Err(RankingError::NanFactor(slot));
        }
        let slot = slot as usize;
        let current = self
            .list
            .get(key)
            .map_or_else(SortKey::default, |e| *e.sort_key());
        self.list.raise_arity(slot);
        self.dirty = true;
        Ok(self.list.update(key, current.with(slot - 1, factor)))
    }

    /// Writes a payload value at a 0-based `slot`.
    ///
    /// Strings longer than `options.max_string_len` bytes are refused with
    /// [`RankingError::StringTooLong`], the same bound loading enforces.
    pub fn set_value(&mut self, key: i64, slot: i64, value: impl Into<Value>) -> Result<()> {
        if slot < 0 || slot >= MAX_VALUE as i64 {
            return Err(RankingError::SlotOutOfRange(slot));
        }
        let value = value.into();
        if let Value::String(s) = &value {
            let max = self.options.max_string_len;
            if s.len() > max {
                return Err(RankingError::StringTooLong { len: s.len(), max });
            }
        }
        let initial_slots = self.options.initial_payload_slots;
        let element = self.list.get_mut(key).ok_or(RankingError::NoSuchKey(key))?;
        element.set_value(slot as usize, value, initial_slots);
        self.dirty = true;
        Ok(())
    }

    /// Payload value at a 0-based `slot`; `Absent` for slots never written.
    /// `None` if the key is unknown.
    pub fn value(&self, key: i64, slot: i64) -> Option<&Value> {
        let element = self.list.get(key)?;
        match usize::try_from(slot) {
            Ok(slot) => Some(element.value(slot)),
            Err(_) => Some(&crate::value::ABSENT),
        }
    }

    /// The full payload of `key` in slot order.
    pub fn values(&self, key: i64) -> Option<&[Value]> {
        self.list.get(key).map(Element::values)
    }

    /// The significant factors of `key`. The length is the arity at the
    /// time of the call.
    pub fn factors(&self, key: i64) -> Option<&[f64]> {
        let arity = self.list.arity();
        self.list.get(key).map(|e| e.sort_key().leading(arity))
    }

    /// One factor of `key` at a 1-based `slot`.
    pub fn factor(&self, key: i64, slot: i64) -> Option<f64> {
        if slot < 1 || slot > MAX_FACTOR as i64 {
            return None;
        }
        self.list.get(key).map(|e| e.sort_key().get(slot as usize - 1))
    }

    /// 1-based rank of `key`.
    pub fn position(&self, key: i64) -> Option<usize> {
        self.list.get(key).map(Element::rank)
    }

    /// Key at a 1-based rank.
    pub fn key_at(&self, rank: i64) -> Option<i64> {
        let rank = usize::try_from(rank).ok()?;
        self.list.at(rank).map(Element::key)
    }

    pub fn get(&self, key: i64) -> Option<&Element> {
        self.list.get(key)
    }

    /// Removes `key`. Returns the rank it held.
    pub fn delete(&mut self, key: i64) -> Option<usize> {
        let rank = self.list.remove(key)?;
        self.dirty = true;
        Some(rank)
    }

    /// Elements from rank 1 down.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.list.elements().iter()
    }

    /// Re-inserts an element read from a saved file through the normal
    /// ranking path. The arity was raised when the file header was read.
    /// The payload is restored slot for slot, at the stored length.
    pub(crate) fn replay(&mut self, key: i64, factors: &[f64], values: Vec<Value>) {
        self.list.update(key, SortKey::new(factors));
        self.dirty = true;
        if let Some(element) = self.list.get_mut(key) {
            element.restore_payload(values);
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.list.check_invariants();
    }
}

impl<'a> IntoIterator for &'a RankedCollection {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
