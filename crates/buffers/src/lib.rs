//! insertion-ranking-buffers - binary buffers for the ranking file format.
//!
//! Every multi-byte value is encoded as fixed-width little-endian, so the
//! persisted layout does not depend on the width or byte order of the
//! machine that wrote it.
//!
//! - [`Writer`] appends values into an auto-growing byte buffer.
//! - [`StreamingReader`] reads values out of byte chunks pushed by the
//!   caller, reading across chunk boundaries. A read that would run past
//!   the buffered bytes fails without consuming anything, so a parser can
//!   stop, wait for more input and retry.

mod streaming_reader;
mod writer;

pub use streaming_reader::StreamingReader;
pub use writer::Writer;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("END_OF_BUFFER")]
    EndOfBuffer,
}
