//! Binary persistence.
//!
//! Layout, all fields little-endian:
//!
//! ```text
//! magic "LIR\x01", version u32        (only when `write_header` is set)
//! factor_arity  i32
//! element_count i32
//! element_count times:
//!     key          i64
//!     factors      f64 x factor_arity
//!     payload_len  i32
//!     payload_len times:
//!         tag      i32
//!         Boolean/Integer: i64, Float: f64, String: i64 length + bytes
//! ```
//!
//! Elements are written best-first, but loading does not trust that order:
//! it replays every element through the normal ranking path.

mod decoder;
mod encoder;

pub use decoder::{Decoder, Progress};

use std::fs::{self, File};
use std::io::{self, Read, Write};

use insertion_ranking_buffers::Writer;
use tracing::{debug, warn};

use crate::collection::RankedCollection;
use crate::error::{RankingError, Result};

/// Size of the chunks `load` reads from its source.
const READ_CHUNK: usize = 8 * 1024;

/// Outcome of [`RankedCollection::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed since the last save, the file was left alone.
    NotWritten,
    Written,
}

impl RankedCollection {
    /// Serializes the whole collection into a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        encoder::encode(self, &mut writer);
        writer.flush()
    }

    /// Writes the collection to its bound path unless it is unmodified and
    /// `force` is not set.
    pub fn save(&mut self, force: bool) -> Result<SaveOutcome> {
        if !force && !self.dirty {
            debug!(path = %self.path().display(), "save skipped, collection unmodified");
            return Ok(SaveOutcome::NotWritten);
        }
        let bytes = self.to_bytes();
        fs::write(self.path(), &bytes)?;
        self.dirty = false;
        debug!(
            path = %self.path().display(),
            elements = self.len(),
            bytes = bytes.len(),
            "saved"
        );
        Ok(SaveOutcome::Written)
    }

    /// Writes the collection to `writer`. The modified flag is untouched
    /// since the bound file is not.
    pub fn save_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()
    }

    /// Fills an empty collection from its bound path.
    pub fn load(&mut self) -> Result<()> {
        if !self.is_empty() {
            return Err(RankingError::CollectionNotEmpty);
        }
        let file = File::open(self.path())?;
        self.load_from(file)
    }

    /// Fills an empty collection from `source`.
    ///
    /// Elements parsed before an error stay in the collection.
    pub fn load_from<R: Read>(&mut self, mut source: R) -> Result<()> {
        if !self.is_empty() {
            return Err(RankingError::CollectionNotEmpty);
        }
        let mut decoder = Decoder::new(&self.options);
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            decoder.push(buf[..n].to_vec());
            match decoder.advance(self) {
                Ok(Progress::Done) => break,
                Ok(Progress::NeedMore) => {}
                Err(e) => {
                    warn!(
                        path = %self.path().display(),
                        committed = decoder.committed(),
                        offset = decoder.consumed(),
                        error = %e,
                        "malformed file"
                    );
                    return Err(e.into());
                }
            }
        }
        if let Err(e) = decoder.finish() {
            warn!(
                path = %self.path().display(),
                committed = decoder.committed(),
                "file ended early"
            );
            return Err(e.into());
        }
        self.dirty = false;
        debug!(path = %self.path().display(), elements = self.len(), "loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_FACTOR, MAX_VALUE};
    use crate::error::MalformedFile;
    use crate::options::RankingOptions;
    use crate::value::Value;

    fn headerless() -> RankingOptions {
        RankingOptions {
            write_header: false,
            ..RankingOptions::default()
        }
    }

    fn sample() -> RankedCollection {
        let mut c = RankedCollection::new("sample.lir").unwrap();
        c.update_factor(10, &[3.0, 1.0]).unwrap();
        c.update_factor(20, &[5.0]).unwrap();
        c.update_factor(30, &[3.0, 2.0]).unwrap();
        c.set_value(10, 0, "ten").unwrap();
        c.set_value(10, 3, 1.25).unwrap();
        c.set_value(20, 9, Value::Null).unwrap();
        c.set_value(30, 1, true).unwrap();
        c.set_value(30, 2, -7i64).unwrap();
        c
    }

    fn snapshot(c: &RankedCollection) -> Vec<(i64, Vec<f64>, Vec<Value>)> {
        c.iter()
            .map(|e| {
                (
                    e.key(),
                    e.sort_key().leading(c.factor_arity()).to_vec(),
                    e.values().to_vec(),
                )
            })
            .collect()
    }

    fn decode_into(options: RankingOptions, bytes: &[u8]) -> (RankedCollection, Result<()>) {
        let mut c = RankedCollection::with_options("decoded.lir", options).unwrap();
        let result = c.load_from(bytes);
        (c, result)
    }

    #[test]
    fn bytes_round_trip() {
        let original = sample();
        let (decoded, result) = decode_into(RankingOptions::default(), &original.to_bytes());
        result.unwrap();
        assert_eq!(snapshot(&decoded), snapshot(&original));
        assert_eq!(decoded.factor_arity(), 2);
        assert!(!decoded.is_modified());
        decoded.check_invariants();
    }

    #[test]
    fn byte_at_a_time_streaming() {
        let original = sample();
        let bytes = original.to_bytes();
        let mut c = RankedCollection::new("streamed.lir").unwrap();
        let mut decoder = Decoder::new(c.options());
        let mut done = false;
        for (i, b) in bytes.iter().enumerate() {
            decoder.push(vec![*b]);
            let progress = decoder.advance(&mut c).unwrap();
            if i + 1 < bytes.len() {
                assert_eq!(progress, Progress::NeedMore);
            } else {
                done = progress == Progress::Done;
            }
        }
        assert!(done);
        decoder.finish().unwrap();
        assert_eq!(decoder.consumed(), bytes.len());
        assert_eq!(snapshot(&c), snapshot(&original));
    }

    #[test]
    fn arity_survives_an_empty_round_trip() {
        let mut c = RankedCollection::new("e.lir").unwrap();
        c.update_factor(1, &[1.0, 2.0, 3.0]).unwrap();
        c.delete(1);
        let (decoded, result) = decode_into(RankingOptions::default(), &c.to_bytes());
        result.unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.factor_arity(), 3);
    }

    #[test]
    fn load_requires_empty_collection() {
        let mut c = sample();
        let bytes = c.to_bytes();
        assert!(matches!(
            c.load_from(&bytes[..]),
            Err(RankingError::CollectionNotEmpty)
        ));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn bad_header() {
        let (_, result) = decode_into(RankingOptions::default(), b"NOPE\x01\x00\x00\x00");
        assert!(matches!(
            result,
            Err(RankingError::Malformed(MalformedFile::BadHeader))
        ));
    }

    #[test]
    fn bad_version() {
        let mut bytes = sample().to_bytes();
        bytes[4] = 2;
        let (c, result) = decode_into(RankingOptions::default(), &bytes);
        assert!(matches!(
            result,
            Err(RankingError::Malformed(MalformedFile::BadVersion(2)))
        ));
        assert!(c.is_empty());
    }

    fn raw(arity: i32, count: i32, rest: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&arity.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(rest);
        bytes
    }

    fn element(key: i64, factor: f64, payload: &[u8], payload_len: i32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&key.to_le_bytes());
        bytes.extend_from_slice(&factor.to_le_bytes());
        bytes.extend_from_slice(&payload_len.to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn malformed(bytes: &[u8]) -> (RankedCollection, MalformedFile) {
        let (c, result) = decode_into(headerless(), bytes);
        match result {
            Err(RankingError::Malformed(m)) => (c, m),
            other => panic!("expected a malformed file, got {other:?}"),
        }
    }

    #[test]
    fn bad_factor_count() {
        assert_eq!(malformed(&raw(-1, 0, &[])).1, MalformedFile::BadFactorCount(-1));
        let too_many = MAX_FACTOR as i32 + 1;
        assert_eq!(
            malformed(&raw(too_many, 0, &[])).1,
            MalformedFile::BadFactorCount(too_many)
        );
        assert_eq!(malformed(&raw(0, 1, &[])).1, MalformedFile::BadFactorCount(0));
    }

    #[test]
    fn zero_arity_without_elements_is_fine() {
        let (c, result) = decode_into(headerless(), &raw(0, 0, &[]));
        result.unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn bad_element_count() {
        assert_eq!(malformed(&raw(1, -4, &[])).1, MalformedFile::BadElementCount(-4));
    }

    #[test]
    fn bad_value_count() {
        let elements = [element(1, 1.0, &[], 0), element(2, 2.0, &[], -1)].concat();
        let (c, m) = malformed(&raw(1, 2, &elements));
        assert_eq!(m, MalformedFile::BadValueCount(-1));
        assert_eq!(c.len(), 1);

        let over = MAX_VALUE as i32 + 1;
        let (_, m) = malformed(&raw(1, 1, &element(1, 1.0, &[], over)));
        assert_eq!(m, MalformedFile::BadValueCount(over));
    }

    #[test]
    fn bad_value_type() {
        let (c, m) = malformed(&raw(1, 1, &element(1, 1.0, &9i32.to_le_bytes(), 1)));
        assert_eq!(m, MalformedFile::BadValueType(9));
        assert!(c.is_empty());
    }

    #[test]
    fn bad_string_value() {
        let mut payload = 5i32.to_le_bytes().to_vec();
        payload.extend_from_slice(&(-2i64).to_le_bytes());
        let (_, m) = malformed(&raw(1, 1, &element(1, 1.0, &payload, 1)));
        assert_eq!(m, MalformedFile::BadStringValue(-2));

        let mut payload = 5i32.to_le_bytes().to_vec();
        payload.extend_from_slice(&2i64.to_le_bytes());
        payload.extend_from_slice(&[0xff, 0xfe]);
        let (_, m) = malformed(&raw(1, 1, &element(1, 1.0, &payload, 1)));
        assert_eq!(m, MalformedFile::BadStringValue(2));
    }

    #[test]
    fn string_length_bounded_by_options() {
        let mut payload = 5i32.to_le_bytes().to_vec();
        payload.extend_from_slice(&4i64.to_le_bytes());
        payload.extend_from_slice(b"abcd");
        let bytes = raw(1, 1, &element(1, 1.0, &payload, 1));

        let options = RankingOptions {
            max_string_len: 3,
            ..headerless()
        };
        let (_, result) = decode_into(options, &bytes);
        assert!(matches!(
            result,
            Err(RankingError::Malformed(MalformedFile::BadStringValue(4)))
        ));

        let (c, result) = decode_into(headerless(), &bytes);
        result.unwrap();
        assert_eq!(c.value(1, 0).and_then(Value::as_str), Some("abcd"));
    }

    #[test]
    fn truncation_keeps_complete_elements() {
        let original = sample();
        let bytes = original.to_bytes();
        let full = snapshot(&original);
        let mut seen_partial = false;
        for cut in 0..bytes.len() {
            let (c, result) = decode_into(RankingOptions::default(), &bytes[..cut]);
            assert!(matches!(
                result,
                Err(RankingError::Malformed(MalformedFile::UnexpectedEndOfFile))
            ));
            c.check_invariants();
            let keys: Vec<i64> = c.iter().map(|e| e.key()).collect();
            // every surviving element is complete
            for (key, factors, values) in snapshot(&c) {
                let expected = full.iter().find(|(k, _, _)| *k == key).unwrap();
                assert_eq!((&factors, &values), (&expected.1, &expected.2));
            }
            seen_partial |= !keys.is_empty();
        }
        assert!(seen_partial);
    }

    #[test]
    fn save_is_gated_by_the_dirty_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.lir");
        let mut c = RankedCollection::new(&path).unwrap();

        assert_eq!(c.save(false).unwrap(), SaveOutcome::NotWritten);
        assert!(!path.exists());

        c.update_factor(1, &[1.0]).unwrap();
        assert_eq!(c.save(false).unwrap(), SaveOutcome::Written);
        assert!(!c.is_modified());
        assert_eq!(c.save(false).unwrap(), SaveOutcome::NotWritten);
        assert_eq!(c.save(true).unwrap(), SaveOutcome::Written);

        let mut reloaded = RankedCollection::new(&path).unwrap();
        reloaded.load().unwrap();
        assert_eq!(reloaded.key_at(1), Some(1));
    }

    #[test]
    fn nan_factor_in_file() {
        let elements = [element(1, 1.0, &[], 0), element(2, f64::NAN, &[], 0)].concat();
        let (c, m) = malformed(&raw(1, 2, &elements));
        assert_eq!(m, MalformedFile::BadFactorValue(1));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn payload_length_is_restored_as_stored() {
        let mut payload = Vec::new();
        for _ in 0..3 {
            payload.extend_from_slice(&0i32.to_le_bytes());
        }
        payload.extend_from_slice(&2i32.to_le_bytes());
        payload.extend_from_slice(&1i64.to_le_bytes());
        let (c, result) = decode_into(headerless(), &raw(1, 1, &element(1, 1.0, &payload, 4)));
        result.unwrap();
        let values = c.values(1).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[3], Value::Boolean(true));
        assert!(values[..3].iter().all(Value::is_absent));
    }

    #[test]
    fn string_at_the_limit_round_trips() {
        let options = RankingOptions {
            max_string_len: 16,
            ..RankingOptions::default()
        };
        let mut c = RankedCollection::with_options("limit.lir", options.clone()).unwrap();
        c.update_factor(1, &[2.0]).unwrap();
        c.update_factor(2, &[1.0]).unwrap();
        c.set_value(1, 0, "x".repeat(16)).unwrap();
        assert!(matches!(
            c.set_value(2, 0, "x".repeat(17)),
            Err(RankingError::StringTooLong { len: 17, max: 16 })
        ));

        let (decoded, result) = decode_into(options, &c.to_bytes());
        result.unwrap();
        assert_eq!(snapshot(&decoded), snapshot(&c));
        assert_eq!(decoded.value(1, 0).and_then(Value::as_str).map(str::len), Some(16));
        assert_eq!(decoded.values(2), Some(&[][..]));
    }

    #[test]
    fn failed_save_keeps_the_modified_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("board.lir");
        let mut c = RankedCollection::new(&path).unwrap();
        c.update_factor(1, &[1.0]).unwrap();
        assert!(matches!(c.save(true), Err(RankingError::Io(_))));
        assert!(c.is_modified());
        assert!(matches!(c.save(false), Err(RankingError::Io(_))));
        assert!(c.is_modified());
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = RankedCollection::new(dir.path().join("missing.lir")).unwrap();
        assert!(matches!(c.load(), Err(RankingError::Io(_))));
    }
}
