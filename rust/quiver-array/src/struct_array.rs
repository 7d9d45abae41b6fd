//! An array of records represented as named child columns.

use std::sync::Arc;

use quiver_common::{Result, error::Error, verify_arg};

use crate::{
    array::{ColumnArray, check_slice},
    datatype::{DataType, Fields, Schema},
    record_batch::RecordBatch,
    scalar::{Record, Scalar},
};

/// A [`ColumnArray`] of `Struct` type: one child column per field, all of the
/// same length as the struct.
///
/// Struct rows are always present; nulls are tracked by the children.
#[derive(Debug, Clone)]
pub struct StructArray {
    fields: Fields,
    array: ColumnArray,
}

impl StructArray {
    /// Creates a struct array from child columns.
    ///
    /// Validates that:
    /// - field names are unique
    /// - there is one child per field, of the field's type
    /// - every child has length `len`
    pub fn try_new(fields: Fields, children: Vec<ColumnArray>, len: usize) -> Result<StructArray> {
        if let Some(name) = fields.find_duplicate() {
            return Err(Error::invalid_arg(
                "fields",
                format!("duplicate field name '{name}'"),
            ));
        }
        let array = ColumnArray::try_new(
            DataType::Struct(fields.clone()),
            len,
            0,
            None,
            Vec::new(),
            children,
        )?;
        Ok(StructArray { fields, array })
    }

    /// Views a generic column array as a struct array.
    pub fn try_from_array(array: ColumnArray) -> Result<StructArray> {
        let fields = array.data_type().struct_fields().cloned().ok_or_else(|| {
            Error::invalid_operation(format!("{} array is not a struct", array.data_type()))
        })?;
        Ok(StructArray { fields, array })
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn data_type(&self) -> &DataType {
        self.array.data_type()
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn children(&self) -> &[ColumnArray] {
        self.array.children()
    }

    pub fn child(&self, index: usize) -> Option<&ColumnArray> {
        self.array.children().get(index)
    }

    pub fn child_by_name(&self, name: &str) -> Option<&ColumnArray> {
        self.fields.index_of(name).and_then(|i| self.child(i))
    }

    /// Returns the child columns in field order. The returned arrays share their
    /// buffers with this struct.
    pub fn fields_as_arrays(&self) -> Vec<ColumnArray> {
        self.array.children().to_vec()
    }

    pub fn as_array(&self) -> &ColumnArray {
        &self.array
    }

    pub fn into_array(self) -> ColumnArray {
        self.array
    }

    /// Returns rows `start..start + len`, slicing every child identically.
    ///
    /// Fails with `OutOfRange` if the window does not fit; never clamps.
    pub fn slice(&self, start: usize, len: usize) -> Result<StructArray> {
        check_slice(start, len, self.len())?;
        Ok(StructArray {
            fields: self.fields.clone(),
            array: self.array.slice(start, len)?,
        })
    }

    /// Decodes the record at logical row `index`.
    pub fn get(&self, index: usize) -> Result<Record> {
        match self.array.get(index)? {
            Scalar::Struct(record) => Ok(record),
            other => Err(Error::invalid_operation(format!(
                "struct row decoded as {}",
                other.kind_name()
            ))),
        }
    }

    /// Converts the struct into a record batch whose columns are the children,
    /// in field order, named after their fields.
    ///
    /// No data is copied: each batch column shares its buffers, offset and length
    /// with the corresponding child. Fails with `EmptyStruct` if the struct has
    /// no fields.
    pub fn flatten(&self) -> Result<RecordBatch> {
        if self.fields.is_empty() {
            return Err(Error::empty_struct());
        }
        let len = self.len();
        verify_arg!(children, self.children().iter().all(|c| c.len() == len));
        log::debug!(
            "flattening struct array of {len} rows into {} columns",
            self.fields.len()
        );
        let schema = Arc::new(Schema::try_new(self.fields.clone())?);
        RecordBatch::try_new(schema, self.fields_as_arrays())
    }

    /// Copies every row into a native record.
    ///
    /// This is a materialization boundary: it allocates and copies all values,
    /// and should be used sparingly on large arrays.
    pub fn to_records(&self) -> Result<Vec<Record>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}
