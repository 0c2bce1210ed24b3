use std::io;

use thiserror::Error;

/// Why a saved file could not be parsed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MalformedFile {
    #[error("bad file header")]
    BadHeader,
    #[error("unsupported format version {0}")]
    BadVersion(u32),
    #[error("bad factor count {0}")]
    BadFactorCount(i32),
    #[error("factor {0} is NaN")]
    BadFactorValue(usize),
    #[error("bad element count {0}")]
    BadElementCount(i32),
    #[error("bad value count {0}")]
    BadValueCount(i32),
    #[error("bad value type {0}")]
    BadValueType(i32),
    #[error("bad string value of length {0}")]
    BadStringValue(i64),
    #[error("unexpected end of file")]
    UnexpectedEndOfFile,
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("no such key: {0}")]
    NoSuchKey(i64),
    #[error("slot out of range: {0}")]
    SlotOutOfRange(i64),
    #[error("collection is not empty")]
    CollectionNotEmpty,
    #[error("path longer than {max} bytes: {len}")]
    PathTooLong { len: usize, max: usize },
    #[error("string longer than {max} bytes: {len}")]
    StringTooLong { len: usize, max: usize },
    #[error("factor {0} is NaN")]
    NanFactor(i64),
    #[error("malformed file: {0}")]
    Malformed(#[from] MalformedFile),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl RankingError {
    /// Stable numeric code for host bindings. `0` is never returned; hosts
    /// use it to signal success.
    pub fn code(&self) -> i32 {
        match self {
            RankingError::NoSuchKey(_) => 1,
            RankingError::SlotOutOfRange(_) => 2,
            RankingError::CollectionNotEmpty => 3,
            RankingError::PathTooLong { .. } => 4,
            RankingError::Io(_) => 5,
            RankingError::StringTooLong { .. } => 6,
            RankingError::NanFactor(_) => 7,
            RankingError::Malformed(m) => match m {
                MalformedFile::BadHeader => 10,
                MalformedFile::BadVersion(_) => 11,
                MalformedFile::BadFactorCount(_) => 12,
                MalformedFile::BadElementCount(_) => 13,
                MalformedFile::BadValueCount(_) => 14,
                MalformedFile::BadValueType(_) => 15,
                MalformedFile::BadStringValue(_) => 16,
                MalformedFile::UnexpectedEndOfFile => 17,
                MalformedFile::BadFactorValue(_) => 18,
            },
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, RankingError::Malformed(_))
    }
}

pub type Result<T, E = RankingError> = std::result::Result<T, E>;
