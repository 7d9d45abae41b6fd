//! Logical types, fields and schemas.

use std::{fmt, ops::Deref, sync::Arc};

use quiver_common::{Result, error::Error};

/// Logical type of a column.
///
/// `Struct` may appear only at the top level: its fields are restricted to the
/// non-nested types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Utf8,
    Struct(Fields),
}

impl DataType {
    /// Returns the byte width of a single value for fixed-width numeric types.
    ///
    /// `Boolean` values are bit-packed and `Utf8`/`Struct` are not fixed width,
    /// so all three return `None`.
    pub fn primitive_width(&self) -> Option<usize> {
        match self {
            DataType::Int8 | DataType::UInt8 => Some(1),
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => Some(4),
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => Some(8),
            DataType::Boolean | DataType::Utf8 | DataType::Struct(_) => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, DataType::Struct(_))
    }

    /// Returns the struct fields, or `None` for non-struct types.
    pub fn struct_fields(&self) -> Option<&Fields> {
        match self {
            DataType::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "bool",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Utf8 => "string",
            DataType::Struct(fields) => {
                f.write_str("struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                return f.write_str(">");
            }
        };
        f.write_str(name)
    }
}

/// A named, typed column slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    data_type: DataType,
    nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Field {
        Field {
            name: name.into(),
            data_type,
            nullable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)?;
        if !self.nullable {
            f.write_str(" not null")?;
        }
        Ok(())
    }
}

/// An ordered, cheaply cloneable list of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields(Arc<[Field]>);

impl Fields {
    pub fn empty() -> Fields {
        Fields(Arc::from(Vec::new()))
    }

    /// Returns the position of the first field named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|field| field.name() == name)
    }

    /// Returns the name of the first field that appears more than once, if any.
    pub fn find_duplicate(&self) -> Option<&str> {
        self.0.iter().enumerate().find_map(|(i, field)| {
            self.0[..i]
                .iter()
                .any(|prev| prev.name() == field.name())
                .then(|| field.name())
        })
    }
}

impl Deref for Fields {
    type Target = [Field];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Field>> for Fields {
    fn from(fields: Vec<Field>) -> Self {
        Fields(fields.into())
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Fields(iter.into_iter().collect())
    }
}

/// The ordered, uniquely named fields of a [`RecordBatch`](crate::record_batch::RecordBatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Fields,
}

impl Schema {
    /// Creates a schema, verifying that field names are unique.
    pub fn try_new(fields: impl Into<Fields>) -> Result<Schema> {
        let fields = fields.into();
        if let Some(name) = fields.find_duplicate() {
            return Err(Error::invalid_arg(
                "fields",
                format!("duplicate field name '{name}'"),
            ));
        }
        Ok(Schema { fields })
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.index_of(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}
