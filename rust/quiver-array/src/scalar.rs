//! Native values: [`Scalar`] and [`Record`].
//!
//! These are the owned, row-oriented structures that data enters through
//! (construction from records) and leaves through (materialization).

use quiver_common::{Result, error::Error};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single decoded value.
///
/// Integers are carried at 64-bit width and narrowed, with a range check, when
/// they are encoded into a column of a smaller type.
///
/// Numbers compare by value across variants: `Int(5)`, `UInt(5)` and
/// `Float(5.0)` are all equal, so a value read back from an unsigned or
/// floating point column equals the value it was built from.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Utf8(String),
    Struct(Record),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Utf8(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            Scalar::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            Scalar::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Scalar::Struct(record) => Some(record),
            _ => None,
        }
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Boolean(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::UInt(_) => "uint",
            Scalar::Float(_) => "float",
            Scalar::Utf8(_) => "string",
            Scalar::Struct(_) => "struct",
        }
    }

    /// Converts a JSON value into a scalar.
    ///
    /// Numbers become `Int` when they fit an `i64`, `UInt` when they only fit a
    /// `u64`, and `Float` otherwise. Objects become `Struct`. Arrays have no
    /// scalar counterpart and are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Scalar> {
        use serde_json::Value;
        Ok(match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Boolean(*b),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Scalar::Int(v)
                } else if let Some(v) = n.as_u64() {
                    Scalar::UInt(v)
                } else {
                    Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Scalar::Utf8(s.clone()),
            Value::Object(_) => Scalar::Struct(Record::from_json(value)?),
            Value::Array(_) => {
                return Err(Error::invalid_arg(
                    "value",
                    "list values are not supported",
                ));
            }
        })
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl From<i8> for Scalar {
    fn from(value: i8) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<i16> for Scalar {
    fn from(value: i16) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::UInt(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Utf8(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Utf8(value)
    }
}

impl From<Record> for Scalar {
    fn from(value: Record) -> Self {
        Scalar::Struct(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Boolean(a), Scalar::Boolean(b)) => a == b,
            (Scalar::Utf8(a), Scalar::Utf8(b)) => a == b,
            (Scalar::Struct(a), Scalar::Struct(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::UInt(a), Scalar::UInt(b)) => a == b,
            (Scalar::Int(a), Scalar::UInt(b)) | (Scalar::UInt(b), Scalar::Int(a)) => {
                i128::from(*a) == i128::from(*b)
            }
            (Scalar::Int(a), Scalar::Float(f)) | (Scalar::Float(f), Scalar::Int(a)) => {
                int_eq_float(i128::from(*a), *f)
            }
            (Scalar::UInt(a), Scalar::Float(f)) | (Scalar::Float(f), Scalar::UInt(a)) => {
                int_eq_float(i128::from(*a), *f)
            }
            _ => false,
        }
    }
}

/// Exact comparison: `f` must be integral and hold precisely `value`.
#[inline]
fn int_eq_float(value: i128, f: f64) -> bool {
    f.fract() == 0.0 && f as i128 == value
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Boolean(b) => serializer.serialize_bool(*b),
            Scalar::Int(v) => serializer.serialize_i64(*v),
            Scalar::UInt(v) => serializer.serialize_u64(*v),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Utf8(s) => serializer.serialize_str(s),
            Scalar::Struct(record) => record.serialize(serializer),
        }
    }
}

/// An ordered mapping from field name to value: one row in native form.
///
/// Field order is preserved; lookup by name returns the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Record {
        Record {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a field, consuming and returning the record (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Record {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Scalar>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find_map(|(n, value)| (n == name).then_some(value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Converts a JSON object into a record, keeping the key order of the object.
    pub fn from_json(value: &serde_json::Value) -> Result<Record> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::invalid_arg("value", "a record must be a JSON object"))?;
        object
            .iter()
            .map(|(name, value)| Ok::<_, Error>((name.clone(), Scalar::from_json(value)?)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
