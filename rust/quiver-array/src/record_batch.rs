//! Record batches: named, equal-length columns described by a [`Schema`].
//!
//! A `RecordBatch` is the unit of tabular data interchange. Like the arrays it
//! holds, it is an immutable view: slicing produces a new batch over the same
//! buffers, and only the `to_*` materialization methods copy values out.

use std::sync::Arc;

use quiver_common::{Result, error::Error, verify_arg};

use crate::{
    array::{ColumnArray, check_field_column, check_slice},
    datatype::{Field, Fields, Schema},
    scalar::{Record, Scalar},
    struct_array::StructArray,
};

/// The shape of a materialized record batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterializeForm {
    /// One entry per column: `{name: [values...]}`.
    #[default]
    Columns,
    /// One record per row: `[{name: value, ...}, ...]`.
    Rows,
}

/// A table slice: an ordered collection of named columns of equal length.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    schema: Arc<Schema>,
    columns: Vec<ColumnArray>,
    num_rows: usize,
}

impl RecordBatch {
    /// Creates a batch, validating the columns against the schema.
    ///
    /// Validates that:
    /// - there is one column per schema field, of the field's type
    /// - all columns have the same length
    /// - no column is a struct
    /// - columns holding nulls belong to nullable fields
    pub fn try_new(schema: Arc<Schema>, columns: Vec<ColumnArray>) -> Result<RecordBatch> {
        let num_rows = columns.first().map_or(0, ColumnArray::len);
        verify_arg!(columns, columns.len() == schema.len());
        verify_arg!(columns, columns.iter().all(|c| c.len() == num_rows));
        for (field, column) in schema.fields().iter().zip(columns.iter()) {
            check_field_column(field, column)?;
        }
        Ok(RecordBatch {
            schema,
            columns,
            num_rows,
        })
    }

    /// Creates a batch from arrays and their names, inferring a schema of
    /// nullable fields. Fails if the names are not unique or do not match the
    /// number of arrays.
    pub fn from_arrays<S: AsRef<str>>(
        columns: Vec<ColumnArray>,
        names: &[S],
    ) -> Result<RecordBatch> {
        verify_arg!(names, names.len() == columns.len());
        let fields = columns
            .iter()
            .zip(names.iter())
            .map(|(column, name)| Field::new(name.as_ref(), column.data_type().clone(), true))
            .collect::<Fields>();
        let schema = Arc::new(Schema::try_new(fields)?);
        RecordBatch::try_new(schema, columns)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnArray] {
        &self.columns
    }

    /// Returns the column at `index`, failing with `IndexOutOfRange` if there is
    /// no such column.
    pub fn column(&self, index: usize) -> Result<&ColumnArray> {
        self.columns
            .get(index)
            .ok_or_else(|| Error::index_out_of_range(index, self.columns.len()))
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ColumnArray> {
        self.schema.index_of(name).map(|i| &self.columns[i])
    }

    /// Returns rows `start..start + len`, slicing every column identically so
    /// that rows stay aligned. The new batch shares all buffers with `self`.
    ///
    /// Fails with `OutOfRange` if the window does not fit; never clamps.
    pub fn slice(&self, start: usize, len: usize) -> Result<RecordBatch> {
        check_slice(start, len, self.num_rows)?;
        log::debug!(
            "slicing record batch of {} rows at {start}..{}",
            self.num_rows,
            start + len
        );
        let columns = self
            .columns
            .iter()
            .map(|column| column.slice(start, len))
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordBatch {
            schema: self.schema.clone(),
            columns,
            num_rows: len,
        })
    }

    /// Re-wraps the columns as a struct array, without copying.
    pub fn to_struct_array(&self) -> Result<StructArray> {
        StructArray::try_new(
            self.schema.fields().clone(),
            self.columns.clone(),
            self.num_rows,
        )
    }

    /// Copies the batch into columnar native form: `(name, values)` per column.
    ///
    /// This is a materialization boundary: every value is copied into newly
    /// allocated containers. Use sparingly on large batches.
    pub fn to_columns(&self) -> Result<Vec<(String, Vec<Scalar>)>> {
        self.schema
            .fields()
            .iter()
            .zip(self.columns.iter())
            .map(|(field, column)| Ok((field.name().to_string(), column.to_scalars()?)))
            .collect()
    }

    /// Copies the batch into row form: one record per row.
    ///
    /// This is a materialization boundary: every value is copied into newly
    /// allocated containers. Use sparingly on large batches.
    pub fn to_records(&self) -> Result<Vec<Record>> {
        let fields = self.schema.fields();
        (0..self.num_rows)
            .map(|row| {
                let mut record = Record::with_capacity(fields.len());
                for (field, column) in fields.iter().zip(self.columns.iter()) {
                    record.push(field.name(), column.get(row)?);
                }
                Ok(record)
            })
            .collect()
    }

    /// Materializes the batch as JSON in the requested form.
    pub fn to_json(&self, form: MaterializeForm) -> Result<serde_json::Value> {
        let value = match form {
            MaterializeForm::Columns => {
                let mut map = serde_json::Map::with_capacity(self.num_columns());
                for (name, values) in self.to_columns()? {
                    map.insert(name, to_json_value(&values)?);
                }
                serde_json::Value::Object(map)
            }
            MaterializeForm::Rows => to_json_value(&self.to_records()?)?,
        };
        Ok(value)
    }
}

fn to_json_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| Error::invalid_operation(format!("to_json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::DataType;
    use serde_json::json;

    fn sample() -> RecordBatch {
        RecordBatch::from_arrays(
            vec![
                ColumnArray::from_values(&[1i32, 2, 3, 4]),
                ColumnArray::from_strs(&["a", "b", "c", "d"]),
            ],
            &["id", "tag"],
        )
        .unwrap()
    }

    #[test]
    fn test_from_arrays() {
        let batch = sample();
        assert_eq!(batch.num_rows(), 4);
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.schema().to_string(), "id: int32\ntag: string");
        assert_eq!(batch.column_by_name("tag").unwrap().data_type(), &DataType::Utf8);
        assert!(batch.column(2).unwrap_err().is_index_out_of_range());
    }

    #[test]
    fn test_from_arrays_validation() {
        let a = ColumnArray::from_values(&[1i32, 2]);
        let b = ColumnArray::from_values(&[1i32, 2, 3]);
        assert!(RecordBatch::from_arrays(vec![a.clone(), b], &["a", "b"]).is_err());
        assert!(RecordBatch::from_arrays(vec![a.clone(), a.clone()], &["a", "a"]).is_err());
        assert!(RecordBatch::from_arrays(vec![a], &["a", "b"]).is_err());
    }

    #[test]
    fn test_try_new_checks_types_and_nullability() {
        let schema =
            Arc::new(Schema::try_new(vec![Field::new("x", DataType::Int64, false)]).unwrap());
        let wrong_type = ColumnArray::from_values(&[1i32]);
        assert!(
            RecordBatch::try_new(schema.clone(), vec![wrong_type])
                .unwrap_err()
                .is_type_mismatch()
        );
        let with_nulls = ColumnArray::from_options(&[Some(1i64), None]);
        assert!(RecordBatch::try_new(schema.clone(), vec![with_nulls]).is_err());
        let ok = ColumnArray::from_values(&[1i64, 2]);
        assert_eq!(RecordBatch::try_new(schema, vec![ok]).unwrap().num_rows(), 2);
    }

    #[test]
    fn test_try_new_rejects_struct_columns() {
        let inner = StructArray::try_new(
            Fields::from(vec![Field::new("x", DataType::Int32, true)]),
            vec![ColumnArray::from_values(&[1i32, 2])],
            2,
        )
        .unwrap();
        let err = RecordBatch::from_arrays(vec![inner.into_array()], &["point"]).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_slice_alignment() {
        let batch = sample();
        let slice = batch.slice(1, 2).unwrap();
        assert_eq!(slice.num_rows(), 2);
        for (sliced, original) in slice.columns().iter().zip(batch.columns()) {
            assert!(sliced.shares_buffers_with(original));
            for k in 0..slice.num_rows() {
                assert_eq!(sliced.get(k).unwrap(), original.get(1 + k).unwrap());
            }
        }
        assert!(batch.slice(3, 2).unwrap_err().is_out_of_range());
        let empty = batch.slice(4, 0).unwrap();
        assert_eq!(empty.num_rows(), 0);
        assert_eq!(empty.num_columns(), 2);
        assert!(empty.to_records().unwrap().is_empty());
    }

    #[test]
    fn test_to_columns_and_records() {
        let batch = sample().slice(2, 2).unwrap();
        assert_eq!(
            batch.to_columns().unwrap(),
            vec![
                ("id".to_string(), vec![Scalar::Int(3), Scalar::Int(4)]),
                (
                    "tag".to_string(),
                    vec![Scalar::Utf8("c".into()), Scalar::Utf8("d".into())]
                ),
            ]
        );
        assert_eq!(
            batch.to_records().unwrap(),
            vec![
                Record::new().with("id", 3i32).with("tag", "c"),
                Record::new().with("id", 4i32).with("tag", "d"),
            ]
        );
    }

    #[test]
    fn test_to_json() {
        let batch = sample().slice(0, 2).unwrap();
        assert_eq!(
            batch.to_json(MaterializeForm::Columns).unwrap(),
            json!({"id": [1, 2], "tag": ["a", "b"]})
        );
        assert_eq!(
            batch.to_json(MaterializeForm::Rows).unwrap(),
            json!([{"id": 1, "tag": "a"}, {"id": 2, "tag": "b"}])
        );
    }

    #[test]
    fn test_to_struct_array_is_zero_copy() {
        let batch = sample();
        let array = batch.to_struct_array().unwrap();
        assert_eq!(array.len(), 4);
        for (child, column) in array.children().iter().zip(batch.columns()) {
            assert!(child.shares_buffers_with(column));
        }
        let back = array.flatten().unwrap();
        assert_eq!(back.schema(), batch.schema());
    }

    #[test]
    fn test_zero_column_batch() {
        let schema = Arc::new(Schema::try_new(Fields::empty()).unwrap());
        let batch = RecordBatch::try_new(schema, vec![]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert!(batch.slice(0, 0).is_ok());
        assert!(batch.slice(0, 1).unwrap_err().is_out_of_range());
    }
}
