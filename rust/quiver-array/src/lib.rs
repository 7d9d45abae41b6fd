//! A minimal zero-copy columnar batch engine.
//!
//! Data enters through [`build_struct_array`] (or the typed `ColumnArray::from_*`
//! constructors), which encode native values into immutable, reference-counted
//! [`Buffer`](quiver_bytes::Buffer)s. From then on, every operation is a view:
//!
//! - [`ColumnArray::slice`], [`StructArray::slice`] and [`RecordBatch::slice`]
//!   adjust an offset and a length, sharing all buffers with the parent.
//! - [`StructArray::flatten`] turns a struct's children into the columns of a
//!   [`RecordBatch`] without touching their buffers.
//! - [`ColumnArray::get`] decodes a single value in place.
//!
//! The only other copying step is materialization (`to_scalars`, `to_records`,
//! `to_columns`, `to_json`), which converts columns back into native
//! [`Scalar`]s and [`Record`]s. Its cost is proportional to the data size, so it
//! is meant for small results and interchange with non-columnar code.
//!
//! # Supported types
//!
//! - **Fixed width**: `Int8`..`Int64`, `UInt8`..`UInt64`, `Float32`, `Float64`
//! - **Bit-packed**: `Boolean`
//! - **Variable length**: `Utf8`
//! - **Nested**: `Struct`, one level deep
//!
//! Every non-nested column may carry a validity bitmap marking null values.

pub mod array;
pub mod bitmap;
pub mod builder;
pub mod datatype;
pub mod native;
pub mod record_batch;
pub mod scalar;
pub mod struct_array;

pub use array::ColumnArray;
pub use builder::{ColumnBuilder, build_struct_array};
pub use datatype::{DataType, Field, Fields, Schema};
pub use native::NativeType;
pub use record_batch::{MaterializeForm, RecordBatch};
pub use scalar::{Record, Scalar};
pub use struct_array::StructArray;
