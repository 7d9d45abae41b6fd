//! Rust primitive types that can be stored in fixed-width columns.

use crate::{datatype::DataType, scalar::Scalar};

/// A fixed-width primitive stored directly in a column's values buffer.
pub trait NativeType:
    bytemuck::Pod + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    /// The column type holding values of this Rust type.
    const DATA_TYPE: DataType;

    fn into_scalar(self) -> Scalar;

    /// Coerces a scalar into this type, or returns `None` if the value is of an
    /// incompatible kind or out of range.
    fn from_scalar(value: &Scalar) -> Option<Self>;
}

macro_rules! impl_native_int {
    ($($t:ty => $data_type:ident, $variant:ident, $wide:ty;)*) => {
        $(
            impl NativeType for $t {
                const DATA_TYPE: DataType = DataType::$data_type;

                #[inline]
                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self as $wide)
                }

                fn from_scalar(value: &Scalar) -> Option<Self> {
                    match value {
                        Scalar::Int(v) => <$t>::try_from(*v).ok(),
                        Scalar::UInt(v) => <$t>::try_from(*v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_native_float {
    ($($t:ty => $data_type:ident;)*) => {
        $(
            impl NativeType for $t {
                const DATA_TYPE: DataType = DataType::$data_type;

                #[inline]
                fn into_scalar(self) -> Scalar {
                    Scalar::Float(self as f64)
                }

                fn from_scalar(value: &Scalar) -> Option<Self> {
                    match value {
                        Scalar::Float(v) => Some(*v as $t),
                        Scalar::Int(v) => Some(*v as $t),
                        Scalar::UInt(v) => Some(*v as $t),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_native_int! {
    i8 => Int8, Int, i64;
    i16 => Int16, Int, i64;
    i32 => Int32, Int, i64;
    i64 => Int64, Int, i64;
    u8 => UInt8, UInt, u64;
    u16 => UInt16, UInt, u64;
    u32 => UInt32, UInt, u64;
    u64 => UInt64, UInt, u64;
}

impl_native_float! {
    f32 => Float32;
    f64 => Float64;
}
