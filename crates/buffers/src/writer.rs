//! Binary buffer writer with auto-growing capacity.

/// A little-endian binary writer that grows automatically as needed.
///
/// # Example
///
/// ```
/// use insertion_ranking_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.i32(1);
/// writer.i64(-2);
/// let data = writer.flush();
/// assert_eq!(data.len(), 12);
/// assert_eq!(&data[..4], &[1, 0, 0, 0]);
/// ```
pub struct Writer {
    uint8: Vec<u8>,
    /// Position where last flush happened.
    x0: usize,
    /// Current cursor position.
    x: usize,
    /// Allocation size when buffer needs to grow.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with default allocation size (16KB).
    pub fn new() -> Self {
        Self::with_alloc_size(16 * 1024)
    }

    /// Creates a new writer with custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        let uint8 = vec![0u8; alloc_size];
        Self {
            uint8,
            x0: 0,
            x: 0,
            alloc_size,
        }
    }

    /// Ensures the buffer has at least `capacity` bytes available.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let total = self.uint8.len() - self.x0;
            let required = capacity - remaining;
            let total_required = total + required;
            let new_size = if total_required <= self.alloc_size {
                self.alloc_size
            } else {
                total_required * 2
            };
            self.grow(new_size);
        }
    }

    fn grow(&mut self, new_size: usize) {
        let x0 = self.x0;
        let x = self.x;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..x - x0].copy_from_slice(&self.uint8[x0..x]);
        self.uint8 = new_buf;
        self.x = x - x0;
        self.x0 = 0;
    }

    /// Number of bytes written since the last flush.
    pub fn len(&self) -> usize {
        self.x - self.x0
    }

    pub fn is_empty(&self) -> bool {
        self.x == self.x0
    }

    /// Returns the written data and advances the flush position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    #[inline]
    fn put<const N: usize>(&mut self, bytes: [u8; N]) {
        self.ensure_capacity(N);
        self.uint8[self.x..self.x + N].copy_from_slice(&bytes);
        self.x += N;
    }

    /// Writes an unsigned 32-bit integer (little-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.put(val.to_le_bytes());
    }

    /// Writes a signed 32-bit integer (little-endian).
    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.put(val.to_le_bytes());
    }

    /// Writes a signed 64-bit integer (little-endian).
    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.put(val.to_le_bytes());
    }

    /// Writes a 64-bit floating point number (little-endian).
    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.put(val.to_le_bytes());
    }

    /// Writes raw bytes.
    pub fn buf(&mut self, buf: &[u8]) {
        let length = buf.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
    }
}
