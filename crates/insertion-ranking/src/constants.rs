//! Limits and defaults shared by the collection and the file format.

/// Number of sort factors an element carries.
pub const MAX_FACTOR: usize = 5;

/// Size of the path buffer a collection is bound through. One byte is kept
/// for a terminator, so paths hold at most `MAX_PATH - 1` bytes.
pub const MAX_PATH: usize = 64;

/// Initial element capacity of a collection.
pub const DEFAULT_SIZE: usize = 32;

/// Payload slots are addressed in `0..MAX_VALUE`.
pub const MAX_VALUE: usize = 256;

/// Initial payload length once an element receives its first value.
pub const DEFAULT_VALUE: usize = 8;

/// Longest string value accepted by `set_value` and the decoder.
pub const MAX_STRING_LEN: usize = 65_535;

/// First four bytes of a saved file.
pub const MAGIC: [u8; 4] = *b"LIR\x01";

/// Format version written after [`MAGIC`].
pub const FORMAT_VERSION: u32 = 1;
