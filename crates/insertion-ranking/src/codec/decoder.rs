//! Incremental parser for saved collections.
//!
//! Bytes arrive in chunks of any size. [`Decoder::advance`] runs the state
//! machine as far as the buffered bytes allow and stops cleanly when a read
//! would run short, so the caller can push more and call it again. Each
//! element is committed into the collection as soon as its last payload
//! value is parsed; a file that ends early leaves every fully parsed element
//! in place, ranked.

use insertion_ranking_buffers::{BufferError, StreamingReader};

use crate::collection::RankedCollection;
use crate::constants::{FORMAT_VERSION, MAGIC, MAX_FACTOR, MAX_VALUE};
use crate::error::MalformedFile;
use crate::options::RankingOptions;
use crate::value::{Value, ValueTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadHeader,
    ReadFactorArity,
    ReadElementCount,
    ReadElementKey,
    ReadElementFactors,
    ReadElementPayloadSize,
    ReadElementPayloadValues,
    CheckMoreElements,
    Done,
}

/// Result of one [`Decoder::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The buffered bytes ran out mid-file.
    NeedMore,
    /// Every announced element was read.
    Done,
}

/// A value whose tag, and for strings the length, were read before the
/// buffer ran out.
#[derive(Debug, Clone, Copy)]
enum PartialValue {
    Tagged(ValueTag),
    StringOfLen(usize),
}

#[derive(Debug, Default)]
struct PendingElement {
    key: i64,
    factors: Vec<f64>,
    payload_len: usize,
    values: Vec<Value>,
}

pub struct Decoder {
    reader: StreamingReader,
    state: State,
    max_string_len: usize,
    arity: usize,
    remaining: usize,
    committed: usize,
    pending: PendingElement,
    partial: Option<PartialValue>,
}

/// Unwraps a read, yielding [`Progress::NeedMore`] when the buffer is short.
macro_rules! need {
    ($read:expr) => {
        match $read {
            Ok(v) => v,
            Err(BufferError::EndOfBuffer) => return Ok(Progress::NeedMore),
        }
    };
}

impl Decoder {
    pub fn new(options: &RankingOptions) -> Self {
        Self {
            reader: StreamingReader::new(),
            state: if options.write_header {
                State::ReadHeader
            } else {
                State::ReadFactorArity
            },
            max_string_len: options.max_string_len,
            arity: 0,
            remaining: 0,
            committed: 0,
            pending: PendingElement::default(),
            partial: None,
        }
    }

    pub fn push(&mut self, chunk: Vec<u8>) {
        self.reader.push(chunk);
    }

    /// Elements committed so far.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.reader.consumed()
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Reports whether the input ended where the file says it should.
    pub fn finish(&self) -> Result<(), MalformedFile> {
        if self.is_done() {
            Ok(())
        } else {
            Err(MalformedFile::UnexpectedEndOfFile)
        }
    }

    /// Parses buffered bytes, committing complete elements to `collection`.
    ///
    /// After an error the decoder must not be advanced again.
    pub fn advance(&mut self, collection: &mut RankedCollection) -> Result<Progress, MalformedFile> {
        loop {
            match self.state {
                State::ReadHeader => {
                    if self.reader.size() < MAGIC.len() + 4 {
                        return Ok(Progress::NeedMore);
                    }
                    let magic = need!(self.reader.try_buf(MAGIC.len()));
                    if magic != MAGIC {
                        return Err(MalformedFile::BadHeader);
                    }
                    let version = need!(self.reader.try_u32());
                    if version != FORMAT_VERSION {
                        return Err(MalformedFile::BadVersion(version));
                    }
                    self.state = State::ReadFactorArity;
                }
                State::ReadFactorArity => {
                    let arity = need!(self.reader.try_i32());
                    if arity < 0 || arity as usize > MAX_FACTOR {
                        return Err(MalformedFile::BadFactorCount(arity));
                    }
                    self.arity = arity as usize;
                    collection.list.raise_arity(self.arity);
                    self.state = State::ReadElementCount;
                }
                State::ReadElementCount => {
                    let count = need!(self.reader.try_i32());
                    if count < 0 {
                        return Err(MalformedFile::BadElementCount(count));
                    }
                    if count > 0 && self.arity == 0 {
                        return Err(MalformedFile::BadFactorCount(0));
                    }
                    self.remaining = count as usize;
                    self.state = if count == 0 {
                        State::Done
                    } else {
                        State::ReadElementKey
                    };
                }
                State::ReadElementKey => {
                    self.pending.key = need!(self.reader.try_i64());
                    self.pending.factors.clear();
                    self.pending.values.clear();
                    self.state = State::ReadElementFactors;
                }
                State::ReadElementFactors => {
                    while self.pending.factors.len() < self.arity {
                        let factor = need!(self.reader.try_f64());
                        if factor.is_nan() {
                            let slot = self.pending.factors.len() + 1;
                            return Err(MalformedFile::BadFactorValue(slot));
                        }
                        self.pending.factors.push(factor);
                    }
                    self.state = State::ReadElementPayloadSize;
                }
                State::ReadElementPayloadSize => {
                    let len = need!(self.reader.try_i32());
                    if len < 0 || len as usize > MAX_VALUE {
                        return Err(MalformedFile::BadValueCount(len));
                    }
                    self.pending.payload_len = len as usize;
                    if len == 0 {
                        self.commit(collection);
                        self.state = State::CheckMoreElements;
                    } else {
                        self.state = State::ReadElementPayloadValues;
                    }
                }
                State::ReadElementPayloadValues => {
                    while self.pending.values.len() < self.pending.payload_len {
                        let value = match self.read_value()? {
                            Some(value) => value,
                            None => return Ok(Progress::NeedMore),
                        };
                        self.pending.values.push(value);
                    }
                    self.commit(collection);
                    self.state = State::CheckMoreElements;
                }
                State::CheckMoreElements => {
                    self.state = if self.remaining == 0 {
                        State::Done
                    } else {
                        State::ReadElementKey
                    };
                }
                State::Done => return Ok(Progress::Done),
            }
        }
    }

    fn commit(&mut self, collection: &mut RankedCollection) {
        let values = std::mem::take(&mut self.pending.values);
        collection.replay(self.pending.key, &self.pending.factors, values);
        self.remaining -= 1;
        self.committed += 1;
    }

    /// Reads one tagged value. `Ok(None)` means the buffer ran short; what
    /// was read so far is kept in `self.partial`.
    fn read_value(&mut self) -> Result<Option<Value>, MalformedFile> {
        let tag = match self.partial {
            Some(PartialValue::Tagged(tag)) => tag,
            Some(PartialValue::StringOfLen(len)) => return self.read_string(len),
            None => {
                let Ok(raw) = self.reader.try_i32() else {
                    return Ok(None);
                };
                ValueTag::from_i32(raw).ok_or(MalformedFile::BadValueType(raw))?
            }
        };
        self.partial = Some(PartialValue::Tagged(tag));

        let value = match tag {
            ValueTag::Absent => Value::Absent,
            ValueTag::Null => Value::Null,
            ValueTag::Boolean => match self.reader.try_i64() {
                Ok(b) => Value::Boolean(b != 0),
                Err(_) => return Ok(None),
            },
            ValueTag::Integer => match self.reader.try_i64() {
                Ok(i) => Value::Integer(i),
                Err(_) => return Ok(None),
            },
            ValueTag::Float => match self.reader.try_f64() {
                Ok(f) => Value::Float(f),
                Err(_) => return Ok(None),
            },
            ValueTag::String => {
                let Ok(len) = self.reader.try_i64() else {
                    return Ok(None);
                };
                if len < 0 || len as u64 > self.max_string_len as u64 {
                    return Err(MalformedFile::BadStringValue(len));
                }
                self.partial = Some(PartialValue::StringOfLen(len as usize));
                return self.read_string(len as usize);
            }
        };
        self.partial = None;
        Ok(Some(value))
    }

    fn read_string(&mut self, len: usize) -> Result<Option<Value>, MalformedFile> {
        let Ok(bytes) = self.reader.try_buf(len) else {
            return Ok(None);
        };
        self.partial = None;
        String::from_utf8(bytes)
            .map(|s| Some(Value::String(s)))
            .map_err(|_| MalformedFile::BadStringValue(len as i64))
    }
}
