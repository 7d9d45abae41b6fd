//! The typed column view: [`ColumnArray`].

use quiver_bytes::Buffer;
use quiver_common::{Result, error::Error, verify_arg};

use crate::{
    bitmap::{Bitmap, BitmapBuilder},
    datatype::{DataType, Field},
    native::NativeType,
    scalar::{Record, Scalar},
};

/// A typed, sliceable view over one or more shared [`Buffer`]s representing one
/// column of data.
///
/// The view covers the physical slots `offset..offset + len` of its buffers.
/// Buffer layout by type:
///
/// - `Boolean`: one bit-packed values buffer.
/// - fixed-width numeric: one buffer of native values.
/// - `Utf8`: an offsets buffer of `u64` (`n + 1` entries, value `i` occupies
///   bytes `offsets[i]..offsets[i + 1]`) followed by the UTF-8 data buffer.
/// - `Struct`: no buffers; one child array per field, each already positioned
///   on the same logical rows as the struct.
///
/// An optional validity bitmap marks absent values. Cloning and slicing a
/// `ColumnArray` share every buffer with the original.
#[derive(Debug, Clone)]
pub struct ColumnArray {
    data_type: DataType,
    len: usize,
    offset: usize,
    validity: Option<Bitmap>,
    buffers: Vec<Buffer>,
    children: Vec<ColumnArray>,
}

impl ColumnArray {
    /// Creates a column array over existing buffers, validating the layout.
    ///
    /// Validates that:
    /// - the buffer and child counts match the data type
    /// - every buffer (and the validity bitmap) covers `offset + len` slots
    /// - `Utf8` offsets are non-decreasing, within the data buffer, and delimit
    ///   valid UTF-8
    /// - struct children match the field types and all have length `len`
    /// - struct fields are not themselves structs, and children holding nulls
    ///   belong to nullable fields
    pub fn try_new(
        data_type: DataType,
        len: usize,
        offset: usize,
        validity: Option<Bitmap>,
        buffers: Vec<Buffer>,
        children: Vec<ColumnArray>,
    ) -> Result<ColumnArray> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| Error::invalid_arg("len", "offset + len overflows"))?;
        if let Some(validity) = validity.as_ref() {
            verify_arg!(validity, validity.len() >= end);
        }
        match &data_type {
            DataType::Struct(fields) => {
                verify_arg!(buffers, buffers.is_empty());
                verify_arg!(validity, validity.is_none());
                verify_arg!(children, children.len() == fields.len());
                verify_arg!(children, children.iter().all(|child| child.len() == len));
                for (field, child) in fields.iter().zip(children.iter()) {
                    check_field_column(field, child)?;
                }
            }
            DataType::Boolean => {
                verify_arg!(children, children.is_empty());
                verify_arg!(buffers, buffers.len() == 1);
                verify_arg!(buffers, end.div_ceil(8) <= buffers[0].len());
            }
            DataType::Utf8 => {
                verify_arg!(children, children.is_empty());
                verify_arg!(buffers, buffers.len() == 2);
                verify_arg!(buffers, buffers[0].len() % 8 == 0);
                let offsets = buffers[0].typed_data::<u64>();
                verify_arg!(offsets, offsets.len() > end);
                let data = &buffers[1];
                for i in offset..end {
                    let (start, stop) = (offsets[i], offsets[i + 1]);
                    verify_arg!(offsets, start <= stop && stop as usize <= data.len());
                    verify_arg!(
                        data,
                        std::str::from_utf8(&data[start as usize..stop as usize]).is_ok()
                    );
                }
            }
            primitive => {
                let width = primitive.primitive_width().unwrap_or(1);
                verify_arg!(children, children.is_empty());
                verify_arg!(buffers, buffers.len() == 1);
                verify_arg!(buffers, buffers[0].len() % width == 0);
                verify_arg!(buffers, buffers[0].len() / width >= end);
            }
        }
        Ok(ColumnArray {
            data_type,
            len,
            offset,
            validity,
            buffers,
            children,
        })
    }

    /// Assembles a non-nested array from buffers the caller has just encoded.
    pub(crate) fn from_parts(
        data_type: DataType,
        len: usize,
        validity: Option<Bitmap>,
        buffers: Vec<Buffer>,
    ) -> ColumnArray {
        debug_assert!(!data_type.is_nested());
        ColumnArray {
            data_type,
            len,
            offset: 0,
            validity,
            buffers,
            children: Vec::new(),
        }
    }

    /// Creates a fixed-width column by copying `values` into a new buffer.
    pub fn from_values<T: NativeType>(values: &[T]) -> ColumnArray {
        ColumnArray {
            data_type: T::DATA_TYPE,
            len: values.len(),
            offset: 0,
            validity: None,
            buffers: vec![Buffer::from_typed_slice(values)],
            children: Vec::new(),
        }
    }

    /// Creates a fixed-width column with nulls for the `None` entries.
    pub fn from_options<T: NativeType>(values: &[Option<T>]) -> ColumnArray {
        let mut validity = BitmapBuilder::with_capacity(values.len());
        let data = values
            .iter()
            .map(|value| {
                validity.append(value.is_some());
                value.unwrap_or_else(T::zeroed)
            })
            .collect::<Vec<_>>();
        let validity = values.iter().any(Option::is_none).then(|| validity.finish());
        ColumnArray {
            validity,
            ..Self::from_values(&data)
        }
    }

    /// Creates a `Utf8` column by copying `values`.
    pub fn from_strs<S: AsRef<str>>(values: &[S]) -> ColumnArray {
        let mut offsets = Vec::with_capacity(values.len() + 1);
        let mut data = Vec::new();
        offsets.push(0u64);
        for value in values {
            data.extend_from_slice(value.as_ref().as_bytes());
            offsets.push(data.len() as u64);
        }
        ColumnArray {
            data_type: DataType::Utf8,
            len: values.len(),
            offset: 0,
            validity: None,
            buffers: vec![
                Buffer::from_typed_slice(&offsets),
                Buffer::copy_from_slice(&data),
            ],
            children: Vec::new(),
        }
    }

    /// Creates a `Boolean` column by copying `values`.
    pub fn from_bools(values: &[bool]) -> ColumnArray {
        let mut bits = BitmapBuilder::with_capacity(values.len());
        values.iter().for_each(|&bit| bits.append(bit));
        ColumnArray {
            data_type: DataType::Boolean,
            len: values.len(),
            offset: 0,
            validity: None,
            buffers: vec![bits.finish().buffer().clone()],
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Returns the number of logical rows, null or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the position of the first logical row within the buffers.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    #[inline]
    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    #[inline]
    pub fn children(&self) -> &[ColumnArray] {
        &self.children
    }

    /// Returns a view of rows `start..start + len` sharing all buffers with `self`.
    ///
    /// Struct children are sliced with the same bounds. Fails with `OutOfRange`
    /// if the window does not fit within this array; the bounds are never clamped.
    pub fn slice(&self, start: usize, len: usize) -> Result<ColumnArray> {
        check_slice(start, len, self.len)?;
        log::trace!(
            "slicing {} array of length {} at {start}..{}",
            self.data_type,
            self.len,
            start + len
        );
        let children = self
            .children
            .iter()
            .map(|child| child.slice(start, len))
            .collect::<Result<Vec<_>>>()?;
        Ok(ColumnArray {
            data_type: self.data_type.clone(),
            len,
            offset: self.offset + start,
            validity: self.validity.clone(),
            buffers: self.buffers.clone(),
            children,
        })
    }

    /// Returns `true` if the value at logical row `index` is null.
    pub fn is_null(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok(self.is_null_at(self.offset + index))
    }

    /// Returns the number of nulls within this array's window.
    pub fn null_count(&self) -> usize {
        self.validity.as_ref().map_or(0, |validity| {
            self.len - validity.count_set_bits(self.offset, self.len)
        })
    }

    /// Decodes the value at logical row `index`.
    ///
    /// Returns `Scalar::Null` for absent values and `Scalar::Struct` for struct
    /// rows. Fails with `IndexOutOfRange` if `index >= len`.
    pub fn get(&self, index: usize) -> Result<Scalar> {
        self.check_index(index)?;
        let pos = self.offset + index;
        if self.is_null_at(pos) {
            return Ok(Scalar::Null);
        }
        Ok(match &self.data_type {
            DataType::Boolean => {
                Scalar::Boolean(self.buffers[0][pos / 8] & (1 << (pos % 8)) != 0)
            }
            DataType::Int8 => self.native_at::<i8>(pos).into_scalar(),
            DataType::Int16 => self.native_at::<i16>(pos).into_scalar(),
            DataType::Int32 => self.native_at::<i32>(pos).into_scalar(),
            DataType::Int64 => self.native_at::<i64>(pos).into_scalar(),
            DataType::UInt8 => self.native_at::<u8>(pos).into_scalar(),
            DataType::UInt16 => self.native_at::<u16>(pos).into_scalar(),
            DataType::UInt32 => self.native_at::<u32>(pos).into_scalar(),
            DataType::UInt64 => self.native_at::<u64>(pos).into_scalar(),
            DataType::Float32 => self.native_at::<f32>(pos).into_scalar(),
            DataType::Float64 => self.native_at::<f64>(pos).into_scalar(),
            DataType::Utf8 => Scalar::Utf8(self.str_at(pos)?.to_string()),
            DataType::Struct(fields) => {
                let mut record = Record::with_capacity(fields.len());
                for (field, child) in fields.iter().zip(self.children.iter()) {
                    record.push(field.name(), child.get(index)?);
                }
                Scalar::Struct(record)
            }
        })
    }

    /// Returns the values in this array's window as a typed slice, without copying.
    ///
    /// Slots of null values hold unspecified (zeroed) data.
    pub fn values<T: NativeType>(&self) -> Result<&[T]> {
        if self.data_type != T::DATA_TYPE {
            return Err(Error::invalid_operation(format!(
                "values::<{}> on a {} array",
                T::DATA_TYPE,
                self.data_type
            )));
        }
        Ok(&self.buffers[0].typed_data::<T>()[self.offset..self.offset + self.len])
    }

    /// Returns the string at logical row `index` without copying, or `None` if
    /// it is null.
    pub fn str_value(&self, index: usize) -> Result<Option<&str>> {
        if self.data_type != DataType::Utf8 {
            return Err(Error::invalid_operation(format!(
                "str_value on a {} array",
                self.data_type
            )));
        }
        self.check_index(index)?;
        let pos = self.offset + index;
        if self.is_null_at(pos) {
            return Ok(None);
        }
        self.str_at(pos).map(Some)
    }

    /// Copies every value of this array into a newly allocated vector.
    ///
    /// This is a materialization boundary: its cost is proportional to the
    /// number of rows (and string bytes), unlike slicing and flattening.
    pub fn to_scalars(&self) -> Result<Vec<Scalar>> {
        (0..self.len).map(|i| self.get(i)).collect()
    }

    /// Returns `true` if `self` and `other` are views over the very same buffers
    /// (and, for structs, the same child buffers), regardless of offset and length.
    pub fn shares_buffers_with(&self, other: &ColumnArray) -> bool {
        let same_validity = match (&self.validity, &other.validity) {
            (Some(a), Some(b)) => Buffer::ptr_eq(a.buffer(), b.buffer()),
            (None, None) => true,
            _ => false,
        };
        same_validity
            && self.buffers.len() == other.buffers.len()
            && self
                .buffers
                .iter()
                .zip(other.buffers.iter())
                .all(|(a, b)| Buffer::ptr_eq(a, b))
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.shares_buffers_with(b))
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::index_out_of_range(index, self.len))
        }
    }

    #[inline]
    fn is_null_at(&self, pos: usize) -> bool {
        self.validity
            .as_ref()
            .is_some_and(|validity| !validity.is_set(pos))
    }

    #[inline]
    fn native_at<T: NativeType>(&self, pos: usize) -> T {
        self.buffers[0].typed_data::<T>()[pos]
    }

    fn str_at(&self, pos: usize) -> Result<&str> {
        let offsets = self.buffers[0].typed_data::<u64>();
        let range = offsets[pos] as usize..offsets[pos + 1] as usize;
        std::str::from_utf8(&self.buffers[1][range])
            .map_err(|e| Error::invalid_arg("data", e.to_string()))
    }
}

/// Verifies that `column` can be stored under `field`: same type, not nested,
/// and free of nulls unless the field is nullable.
pub(crate) fn check_field_column(field: &Field, column: &ColumnArray) -> Result<()> {
    if field.data_type().is_nested() {
        return Err(Error::type_mismatch(
            field.name(),
            "nested struct fields are not supported",
        ));
    }
    if field.data_type() != column.data_type() {
        return Err(Error::type_mismatch(
            field.name(),
            format!(
                "column of type {} declared as {}",
                column.data_type(),
                field.data_type()
            ),
        ));
    }
    if !field.is_nullable() && column.null_count() > 0 {
        return Err(Error::type_mismatch(
            field.name(),
            "nulls in a non-nullable column",
        ));
    }
    Ok(())
}

/// Verifies that the window `start..start + len` fits within `bound` rows.
pub(crate) fn check_slice(start: usize, len: usize, bound: usize) -> Result<()> {
    match start.checked_add(len) {
        Some(end) if end <= bound => Ok(()),
        _ => Err(Error::out_of_range(start, len, bound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Fields;

    #[test]
    fn test_from_values_get() {
        let array = ColumnArray::from_values(&[1954i16, 1941, 2012, 1996, -600]);
        assert_eq!(array.len(), 5);
        assert_eq!(array.data_type(), &DataType::Int16);
        assert_eq!(array.get(0).unwrap(), Scalar::Int(1954));
        assert_eq!(array.get(4).unwrap(), Scalar::Int(-600));
        assert_eq!(array.null_count(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let array = ColumnArray::from_strs(&["a", "b", "c", "d", "e"]);
        let err = array.get(5).unwrap_err();
        assert!(err.is_index_out_of_range());
        assert!(array.is_null(5).unwrap_err().is_index_out_of_range());
        assert!(array.str_value(7).unwrap_err().is_index_out_of_range());
    }

    #[test]
    fn test_slice_shares_buffers() {
        let array = ColumnArray::from_values(&[1i64, 2, 3, 4, 5, 6]);
        let slice = array.slice(2, 3).unwrap();
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.offset(), 2);
        assert!(slice.shares_buffers_with(&array));
        assert_eq!(slice.values::<i64>().unwrap(), &[3, 4, 5]);
        assert_eq!(slice.get(0).unwrap(), Scalar::Int(3));

        let nested = slice.slice(1, 2).unwrap();
        assert_eq!(nested.offset(), 3);
        assert_eq!(nested.values::<i64>().unwrap(), &[4, 5]);
        assert!(nested.shares_buffers_with(&array));
    }

    #[test]
    fn test_slice_out_of_range_is_not_clamped() {
        let array = ColumnArray::from_values(&[1u8, 2, 3]);
        assert!(array.slice(1, 3).unwrap_err().is_out_of_range());
        assert!(array.slice(4, 0).unwrap_err().is_out_of_range());
        assert!(array.slice(usize::MAX, 2).unwrap_err().is_out_of_range());
        let empty = array.slice(3, 0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.values::<u8>().unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_strings() {
        let array = ColumnArray::from_strs(&["Legolas", "", "Star City"]);
        assert_eq!(array.str_value(0).unwrap(), Some("Legolas"));
        assert_eq!(array.str_value(1).unwrap(), Some(""));
        let slice = array.slice(2, 1).unwrap();
        assert_eq!(slice.get(0).unwrap(), Scalar::Utf8("Star City".into()));
        assert_eq!(array.buffers().len(), 2);
        assert!(array.str_value(0).is_ok());
        assert!(ColumnArray::from_values(&[1i32]).str_value(0).is_err());
    }

    #[test]
    fn test_bools() {
        let array =
            ColumnArray::from_bools(&[true, false, false, true, true, false, true, true, false]);
        assert_eq!(array.get(0).unwrap(), Scalar::Boolean(true));
        assert_eq!(array.get(8).unwrap(), Scalar::Boolean(false));
        let slice = array.slice(3, 5).unwrap();
        assert_eq!(
            slice.to_scalars().unwrap(),
            vec![true, true, false, true, true]
                .into_iter()
                .map(Scalar::Boolean)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_nulls_respect_slice_window() {
        let array =
            ColumnArray::from_options(&[Some(1.5f64), None, Some(2.5), None, Some(4.0)]);
        assert_eq!(array.null_count(), 2);
        assert_eq!(array.get(1).unwrap(), Scalar::Null);
        assert!(array.is_null(3).unwrap());
        let slice = array.slice(2, 3).unwrap();
        assert_eq!(slice.null_count(), 1);
        assert_eq!(
            slice.to_scalars().unwrap(),
            vec![Scalar::Float(2.5), Scalar::Null, Scalar::Float(4.0)]
        );
        let tail = array.slice(4, 1).unwrap();
        assert_eq!(tail.null_count(), 0);
    }

    #[test]
    fn test_from_options_without_nulls_has_no_bitmap() {
        let array = ColumnArray::from_options(&[Some(1u32), Some(2)]);
        assert!(array.validity().is_none());
    }

    #[test]
    fn test_values_type_check() {
        let array = ColumnArray::from_values(&[1i32, 2]);
        assert!(array.values::<i64>().is_err());
        assert_eq!(array.values::<i32>().unwrap(), &[1, 2]);
    }

    #[test]
    fn test_try_new_validates_layout() {
        let values = Buffer::from_typed_slice(&[1i32, 2, 3, 4]);
        let int32 = |len, offset| {
            ColumnArray::try_new(DataType::Int32, len, offset, None, vec![values.clone()], vec![])
        };
        let int64 = |len| {
            ColumnArray::try_new(DataType::Int64, len, 0, None, vec![values.clone()], vec![])
        };
        assert_eq!(int32(2, 1).unwrap().values::<i32>().unwrap(), &[2, 3]);
        assert!(int32(4, 1).is_err());
        assert!(int64(2).is_ok());
        assert!(int64(3).is_err());
        assert!(ColumnArray::try_new(DataType::Utf8, 0, 0, None, vec![], vec![]).is_err());
    }

    #[test]
    fn test_try_new_rejects_bad_utf8() {
        let offsets = Buffer::from_typed_slice(&[0u64, 2]);
        let data = Buffer::copy_from_slice(&[0xff, 0xfe]);
        let err = ColumnArray::try_new(DataType::Utf8, 1, 0, None, vec![offsets, data], vec![]);
        assert!(err.is_err());
    }

    #[test]
    fn test_struct_array_get_and_slice() {
        let fields = Fields::from(vec![
            Field::new("name", DataType::Utf8, true),
            Field::new("year", DataType::Int16, true),
        ]);
        let names = ColumnArray::from_strs(&["Merida", "Lara", "Artemis"]);
        let years = ColumnArray::from_values(&[2012i16, 1996, -600]);
        let array = ColumnArray::try_new(
            DataType::Struct(fields),
            3,
            0,
            None,
            vec![],
            vec![names, years],
        )
        .unwrap();

        let slice = array.slice(1, 2).unwrap();
        assert_eq!(slice.children()[0].offset(), 1);
        assert_eq!(slice.children()[1].len(), 2);
        assert!(slice.shares_buffers_with(&array));
        let row = slice.get(1).unwrap();
        let record = row.as_record().unwrap();
        assert_eq!(record.get("name"), Some(&Scalar::Utf8("Artemis".into())));
        assert_eq!(record.get("year"), Some(&Scalar::Int(-600)));
    }
}
