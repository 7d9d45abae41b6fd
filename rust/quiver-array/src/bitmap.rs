//! Bit-packed bitmaps, used for validity and for boolean values.
//!
//! Bit `i` lives in byte `i / 8` at position `i % 8` (least significant bit first).

use quiver_bytes::{AlignedByteVec, Buffer};
use quiver_common::{Result, verify_arg};

/// An immutable bitmap backed by a shared [`Buffer`].
///
/// The bitmap covers the physical slots of the buffers it accompanies; arrays
/// apply their own offset before consulting it, so slicing never touches the
/// bitmap.
#[derive(Debug, Clone)]
pub struct Bitmap {
    buffer: Buffer,
    len: usize,
}

impl Bitmap {
    /// Wraps a buffer holding at least `len` bits.
    pub fn try_new(buffer: Buffer, len: usize) -> Result<Bitmap> {
        verify_arg!(buffer, len.div_ceil(8) <= buffer.len());
        Ok(Bitmap { buffer, len })
    }

    /// Returns the number of bits in the bitmap.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns `true` if bit `index` is set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        assert!(index < self.len);
        get_bit(&self.buffer, index)
    }

    /// Counts the set bits in `offset..offset + len`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the bitmap.
    pub fn count_set_bits(&self, offset: usize, len: usize) -> usize {
        assert!(offset + len <= self.len);
        let end = offset + len;
        let mut count = 0;
        let mut i = offset;
        while i < end && i % 8 != 0 {
            count += get_bit(&self.buffer, i) as usize;
            i += 1;
        }
        while i + 8 <= end {
            count += self.buffer[i / 8].count_ones() as usize;
            i += 8;
        }
        while i < end {
            count += get_bit(&self.buffer, i) as usize;
            i += 1;
        }
        count
    }
}

#[inline]
fn get_bit(bytes: &[u8], index: usize) -> bool {
    bytes[index / 8] & (1 << (index % 8)) != 0
}

/// Builds a [`Bitmap`] one bit at a time.
#[derive(Debug, Default)]
pub struct BitmapBuilder {
    bytes: AlignedByteVec,
    len: usize,
}

impl BitmapBuilder {
    pub fn new() -> BitmapBuilder {
        BitmapBuilder::default()
    }

    pub fn with_capacity(bits: usize) -> BitmapBuilder {
        BitmapBuilder {
            bytes: AlignedByteVec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn append(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push_typed(0u8);
        }
        if bit {
            let last = self.len / 8;
            self.bytes[last] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    pub fn append_n(&mut self, count: usize, bit: bool) {
        for _ in 0..count {
            self.append(bit);
        }
    }

    pub fn finish(self) -> Bitmap {
        Bitmap {
            buffer: Buffer::from_byte_vec(self.bytes),
            len: self.len,
        }
    }
}

/// Tracks the validity of appended values, allocating a bitmap only once the
/// first null shows up.
#[derive(Debug, Default)]
pub struct ValidityBuilder {
    bitmap: Option<BitmapBuilder>,
    len: usize,
}

impl ValidityBuilder {
    pub fn new() -> ValidityBuilder {
        ValidityBuilder::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn append_valid(&mut self) {
        if let Some(bitmap) = self.bitmap.as_mut() {
            bitmap.append(true);
        }
        self.len += 1;
    }

    pub fn append_null(&mut self) {
        let len = self.len;
        self.bitmap
            .get_or_insert_with(|| {
                let mut bitmap = BitmapBuilder::with_capacity(len + 1);
                bitmap.append_n(len, true);
                bitmap
            })
            .append(false);
        self.len += 1;
    }

    /// Returns the validity bitmap, or `None` if every value is present.
    pub fn finish(self) -> Option<Bitmap> {
        self.bitmap.map(BitmapBuilder::finish)
    }
}
