//! Byte buffers for use by the Quiver infrastructure: a mutable aligned vector for
//! building data, and an immutable shared [`Buffer`] that is the unit of zero-copy
//! sharing between arrays.

pub mod buffer;

pub use buffer::{AlignedByteVec, Buffer};
