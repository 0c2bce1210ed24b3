//! Streaming reader for reading across chunk boundaries.

use std::collections::VecDeque;

use crate::BufferError;

/// A streaming reader that manages multiple chunks of byte slices.
///
/// For performance, it does not merge chunks into a single buffer.
/// Instead, it tracks chunks and reads across boundaries as needed.
///
/// Reads are all-or-nothing: when fewer bytes are buffered than a read
/// needs, it returns [`BufferError::EndOfBuffer`] and the cursor stays put.
///
/// # Example
///
/// ```
/// use insertion_ranking_buffers::{BufferError, StreamingReader};
///
/// let mut reader = StreamingReader::new();
/// reader.push(vec![7, 0]);
/// assert_eq!(reader.try_i32(), Err(BufferError::EndOfBuffer));
/// reader.push(vec![0, 0]);
/// assert_eq!(reader.try_i32(), Ok(7));
/// ```
pub struct StreamingReader {
    chunks: VecDeque<Vec<u8>>,
    /// Current position within the front chunk.
    x: usize,
    /// Total size of all chunks.
    chunk_size: usize,
    /// Bytes consumed since creation.
    consumed: usize,
}

impl Default for StreamingReader {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingReader {
    /// Creates a new streaming reader.
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            x: 0,
            chunk_size: 0,
            consumed: 0,
        }
    }

    /// Returns the number of bytes remaining to be read.
    pub fn size(&self) -> usize {
        self.chunk_size - self.x
    }

    /// Returns the number of bytes read so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Adds a chunk of data to be read.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.chunk_size += chunk.len();
        self.chunks.push_back(chunk);
    }

    #[inline]
    fn check(&self, size: usize) -> Result<(), BufferError> {
        if size > self.size() {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    /// Copies bytes to a destination buffer. The caller checks the size.
    fn copy_to(&mut self, dst: &mut [u8]) {
        let mut filled = 0;
        while filled < dst.len() {
            let chunk = &self.chunks[0];
            let available = chunk.len() - self.x;
            let to_copy = available.min(dst.len() - filled);
            dst[filled..filled + to_copy].copy_from_slice(&chunk[self.x..self.x + to_copy]);
            filled += to_copy;
            self.x += to_copy;
            if self.x >= chunk.len() {
                self.chunk_size -= chunk.len();
                self.chunks.pop_front();
                self.x = 0;
            }
        }
        self.consumed += dst.len();
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut bytes = [0u8; N];
        self.copy_to(&mut bytes);
        Ok(bytes)
    }

    /// Reads an unsigned 32-bit integer (little-endian).
    pub fn try_u32(&mut self) -> Result<u32, BufferError> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    /// Reads a signed 32-bit integer (little-endian).
    pub fn try_i32(&mut self) -> Result<i32, BufferError> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    /// Reads a signed 64-bit integer (little-endian).
    pub fn try_i64(&mut self) -> Result<i64, BufferError> {
        self.take::<8>().map(i64::from_le_bytes)
    }

    /// Reads a 64-bit floating point number (little-endian).
    pub fn try_f64(&mut self) -> Result<f64, BufferError> {
        self.take::<8>().map(f64::from_le_bytes)
    }

    /// Reads bytes into a new vector.
    pub fn try_buf(&mut self, size: usize) -> Result<Vec<u8>, BufferError> {
        self.check(size)?;
        let mut result = vec![0u8; size];
        self.copy_to(&mut result);
        Ok(result)
    }
}
