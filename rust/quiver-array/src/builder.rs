//! Construction of column arrays from native values.
//!
//! This is the one place (besides materialization) where data is copied: values
//! are encoded into freshly allocated buffers, which become immutable once the
//! builder is finished.

use quiver_bytes::{AlignedByteVec, Buffer};
use quiver_common::{Result, error::Error};

use crate::{
    array::ColumnArray,
    bitmap::{BitmapBuilder, ValidityBuilder},
    datatype::{DataType, Field, Fields},
    native::NativeType,
    scalar::{Record, Scalar},
    struct_array::StructArray,
};

/// Accumulates scalars for one non-nested field and encodes them into buffers.
#[derive(Debug)]
pub struct ColumnBuilder {
    field: Field,
    values: AlignedByteVec,
    offsets: Vec<u64>,
    bits: BitmapBuilder,
    validity: ValidityBuilder,
}

impl ColumnBuilder {
    /// Creates a builder for `field`. Fails with `TypeMismatch` for struct fields.
    pub fn try_new(field: &Field) -> Result<ColumnBuilder> {
        Self::with_capacity(field, 0)
    }

    pub fn with_capacity(field: &Field, capacity: usize) -> Result<ColumnBuilder> {
        if field.data_type().is_nested() {
            return Err(Error::type_mismatch(
                field.name(),
                "nested struct fields are not supported",
            ));
        }
        let width = field.data_type().primitive_width().unwrap_or(0);
        let mut offsets = Vec::new();
        if *field.data_type() == DataType::Utf8 {
            offsets.reserve(capacity + 1);
            offsets.push(0);
        }
        Ok(ColumnBuilder {
            field: field.clone(),
            values: AlignedByteVec::with_capacity(capacity * width),
            offsets,
            bits: BitmapBuilder::new(),
            validity: ValidityBuilder::new(),
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the number of values appended so far.
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Appends a value, coercing it to the field type.
    ///
    /// Fails with `TypeMismatch` if the value cannot be represented by the field
    /// type, or if it is null and the field is not nullable. The builder is left
    /// unchanged on failure.
    pub fn append(&mut self, value: &Scalar) -> Result<()> {
        if value.is_null() {
            return self.append_null();
        }
        match self.field.data_type() {
            DataType::Boolean => {
                let bit = value.as_bool().ok_or_else(|| self.mismatch(value))?;
                self.bits.append(bit);
            }
            DataType::Int8 => self.append_native::<i8>(value)?,
            DataType::Int16 => self.append_native::<i16>(value)?,
            DataType::Int32 => self.append_native::<i32>(value)?,
            DataType::Int64 => self.append_native::<i64>(value)?,
            DataType::UInt8 => self.append_native::<u8>(value)?,
            DataType::UInt16 => self.append_native::<u16>(value)?,
            DataType::UInt32 => self.append_native::<u32>(value)?,
            DataType::UInt64 => self.append_native::<u64>(value)?,
            DataType::Float32 => self.append_native::<f32>(value)?,
            DataType::Float64 => self.append_native::<f64>(value)?,
            DataType::Utf8 => {
                let s = value.as_str().ok_or_else(|| self.mismatch(value))?;
                self.values.extend_from_slice(s.as_bytes());
                self.offsets.push(self.values.len() as u64);
            }
            DataType::Struct(_) => return Err(self.mismatch(value)),
        }
        self.validity.append_valid();
        Ok(())
    }

    /// Appends a null. Fails with `TypeMismatch` if the field is not nullable.
    pub fn append_null(&mut self) -> Result<()> {
        if !self.field.is_nullable() {
            return Err(Error::type_mismatch(
                self.field.name(),
                "null value for a non-nullable field",
            ));
        }
        match self.field.data_type() {
            DataType::Boolean => self.bits.append(false),
            DataType::Utf8 => self.offsets.push(self.values.len() as u64),
            data_type => {
                let width = data_type.primitive_width().unwrap_or(0);
                self.values.resize(self.values.len() + width, 0);
            }
        }
        self.validity.append_null();
        Ok(())
    }

    /// Publishes the accumulated values as an immutable column array.
    pub fn finish(self) -> ColumnArray {
        let len = self.validity.len();
        let validity = self.validity.finish();
        let buffers = match self.field.data_type() {
            DataType::Boolean => vec![self.bits.finish().buffer().clone()],
            DataType::Utf8 => vec![
                Buffer::from_typed_slice(&self.offsets),
                Buffer::from_byte_vec(self.values),
            ],
            _ => vec![Buffer::from_byte_vec(self.values)],
        };
        ColumnArray::from_parts(self.field.data_type().clone(), len, validity, buffers)
    }

    fn append_native<T: NativeType>(&mut self, value: &Scalar) -> Result<()> {
        let v = T::from_scalar(value).ok_or_else(|| self.mismatch(value))?;
        self.values.push_typed(v);
        Ok(())
    }

    #[cold]
    fn mismatch(&self, value: &Scalar) -> Error {
        let shown = match value {
            Scalar::Int(v) => format!("int value {v}"),
            Scalar::UInt(v) => format!("uint value {v}"),
            Scalar::Float(v) => format!("float value {v}"),
            other => format!("{} value", other.kind_name()),
        };
        Error::type_mismatch(
            self.field.name(),
            format!("cannot encode {shown} as {}", self.field.data_type()),
        )
    }
}

/// Builds a struct array from an ordered list of records.
///
/// One child column is built per field, in field order, by extracting that field
/// from every record. Record entries that are not named by `fields` are ignored.
///
/// Fails with `TypeMismatch` if a record lacks a field, if a value cannot be
/// coerced to its field type (or is null for a non-nullable field), or if a
/// field is itself a struct. Nothing is published on failure.
pub fn build_struct_array(records: &[Record], fields: &Fields) -> Result<StructArray> {
    let mut builders = fields
        .iter()
        .map(|field| ColumnBuilder::with_capacity(field, records.len()))
        .collect::<Result<Vec<_>>>()?;
    for (row, record) in records.iter().enumerate() {
        for builder in builders.iter_mut() {
            let value = record.get(builder.field().name()).ok_or_else(|| {
                Error::type_mismatch(builder.field().name(), format!("missing in record {row}"))
            })?;
            builder.append(value)?;
        }
    }
    let children = builders
        .into_iter()
        .map(ColumnBuilder::finish)
        .collect::<Vec<_>>();
    log::debug!(
        "built struct array of {} records with {} fields",
        records.len(),
        fields.len()
    );
    StructArray::try_new(fields.clone(), children, records.len())
}
