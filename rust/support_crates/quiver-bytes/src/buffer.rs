use std::sync::Arc;

/// A unit of aligned storage. The backing store of [`AlignedByteVec`] is a vector
/// of blocks, which makes every allocation 64-byte aligned without any pointer
/// arithmetic.
#[derive(Clone, Copy)]
#[repr(C, align(64))]
struct Block([u8; AlignedByteVec::BLOCK_SIZE]);

// Safety: `Block` is a plain byte array with `repr(C)` and no padding
// (size == alignment == 64).
unsafe impl bytemuck::Zeroable for Block {}
unsafe impl bytemuck::Pod for Block {}

/// A byte vector that maintains memory alignment guarantees for its underlying storage.
///
/// The data always starts at a 64-byte boundary and the storage grows in 64-byte blocks,
/// so the contents can be reinterpreted in place as a slice of any primitive type.
#[derive(Clone, Default)]
pub struct AlignedByteVec {
    blocks: Vec<Block>,
    len: usize,
}

impl AlignedByteVec {
    pub const ALIGNMENT: usize = 64;
    pub const BLOCK_SIZE: usize = 64;

    /// Creates a new empty vector with no capacity allocation.
    pub fn new() -> AlignedByteVec {
        AlignedByteVec {
            blocks: Vec::new(),
            len: 0,
        }
    }

    /// Creates a new vector able to hold at least `capacity` bytes without reallocating.
    pub fn with_capacity(capacity: usize) -> AlignedByteVec {
        AlignedByteVec {
            blocks: Vec::with_capacity(block_count(capacity)),
            len: 0,
        }
    }

    /// Creates a new vector of specified length, filled with zeros.
    pub fn zeroed(len: usize) -> AlignedByteVec {
        let mut v = AlignedByteVec::with_capacity(len);
        v.resize(len, 0);
        v
    }

    /// Creates a new vector containing a copy of the provided slice.
    pub fn copy_from_slice(data: &[u8]) -> AlignedByteVec {
        let mut vec = AlignedByteVec::with_capacity(data.len());
        vec.extend_from_slice(data);
        vec
    }

    /// Returns the number of bytes in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the vector contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bytes the vector can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks.capacity() * Self::BLOCK_SIZE
    }

    /// Returns a slice containing the entire vector.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &bytemuck::cast_slice::<Block, u8>(&self.blocks)[..self.len]
    }

    /// Returns a mutable slice containing the entire vector.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..len]
    }

    /// Reserves capacity for at least `additional` more bytes.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        let required = block_count(self.len + additional);
        if required > self.blocks.len() {
            self.blocks.reserve(required - self.blocks.len());
        }
    }

    /// Appends a slice to the vector.
    pub fn extend_from_slice(&mut self, s: &[u8]) {
        let start = self.len;
        self.grow_to(start + s.len());
        bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[start..start + s.len()]
            .copy_from_slice(s);
    }

    /// Resizes the vector to the specified length, filling any new space with the given value.
    pub fn resize(&mut self, new_len: usize, value: u8) {
        let len = self.len;
        if new_len > len {
            self.grow_to(new_len);
            bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[len..new_len].fill(value);
        } else {
            self.truncate(new_len);
        }
    }

    /// Truncates the vector to the specified length.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len < self.len {
            self.len = new_len;
            self.blocks.truncate(block_count(new_len));
        }
    }

    /// Clears the vector, removing all values.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    fn grow_to(&mut self, new_len: usize) {
        let required = block_count(new_len);
        if required > self.blocks.len() {
            self.blocks.resize(required, Block([0; Self::BLOCK_SIZE]));
        }
        self.len = new_len;
    }
}

impl AlignedByteVec {
    /// Appends a value of type `T` to the vector by copying its bytes.
    #[inline]
    pub fn push_typed<T>(&mut self, value: T)
    where
        T: bytemuck::NoUninit,
    {
        self.extend_from_slice(bytemuck::bytes_of(&value));
    }

    /// Appends a slice of values of type `T` to the vector by copying their bytes.
    #[inline]
    pub fn extend_from_typed_slice<T>(&mut self, values: &[T])
    where
        T: bytemuck::NoUninit,
    {
        self.extend_from_slice(bytemuck::cast_slice(values));
    }

    /// Returns a slice of `T` values from the vector's data.
    ///
    /// # Panics
    ///
    /// Panics if the byte length is not a multiple of `size_of::<T>()`.
    #[inline]
    pub fn typed_data<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Returns a mutable slice of `T` values from the vector's data.
    #[inline]
    pub fn typed_data_mut<T>(&mut self) -> &mut [T]
    where
        T: bytemuck::AnyBitPattern + bytemuck::NoUninit,
    {
        bytemuck::cast_slice_mut(self.as_mut_slice())
    }
}

impl std::ops::Deref for AlignedByteVec {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::ops::DerefMut for AlignedByteVec {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl std::fmt::Debug for AlignedByteVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedByteVec")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl PartialEq for AlignedByteVec {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for AlignedByteVec {}

/// An immutable, reference-counted block of bytes.
///
/// Cloning a `Buffer` never copies the data; all clones point to the same
/// allocation, which is released when the last clone is dropped. The contents
/// are 64-byte aligned.
#[derive(Clone, Default)]
pub struct Buffer(Arc<AlignedByteVec>);

impl Buffer {
    /// Creates a new empty buffer.
    pub fn new() -> Buffer {
        Self::from_byte_vec(AlignedByteVec::new())
    }

    /// Creates a new buffer that takes ownership of the provided `AlignedByteVec`.
    pub fn from_byte_vec(vec: AlignedByteVec) -> Buffer {
        Buffer(Arc::new(vec))
    }

    /// Creates a new buffer of the specified length, initialized with zero bytes.
    pub fn zeroed(len: usize) -> Buffer {
        Self::from_byte_vec(AlignedByteVec::zeroed(len))
    }

    /// Creates a new buffer containing a copy of the provided slice.
    pub fn copy_from_slice(data: &[u8]) -> Buffer {
        Self::from_byte_vec(AlignedByteVec::copy_from_slice(data))
    }

    /// Creates a new buffer containing a copy of the provided typed values.
    pub fn from_typed_slice<T>(values: &[T]) -> Buffer
    where
        T: bytemuck::NoUninit,
    {
        Self::copy_from_slice(bytemuck::cast_slice(values))
    }

    /// Returns the length of the buffer in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a reference to the buffer contents as a byte slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Returns a pointer to the first byte of the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    /// Returns the buffer contents as a slice of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the byte length is not a multiple of `size_of::<T>()`.
    #[inline]
    pub fn typed_data<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        self.0.typed_data()
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(a: &Buffer, b: &Buffer) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Returns the number of handles sharing this allocation.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl std::ops::Deref for Buffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("len", &self.len()).finish()
    }
}

impl From<AlignedByteVec> for Buffer {
    fn from(vec: AlignedByteVec) -> Self {
        Buffer::from_byte_vec(vec)
    }
}

#[inline]
fn block_count(len: usize) -> usize {
    len.div_ceil(AlignedByteVec::BLOCK_SIZE)
}
