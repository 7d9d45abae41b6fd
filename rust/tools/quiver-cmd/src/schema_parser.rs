//! Parser for record schemas given on the command line.

use anyhow::{Context, Result, anyhow, bail};
use quiver_array::{DataType, Field, Fields};

const SCHEMA_FORMAT: &str = "(field1: type1, field2: type2, ...)";

const SUPPORTED_TYPES: &str = "bool, int8..int64, uint8..uint64, float, double, string";

/// Parses a schema string into struct fields.
///
/// Format: `"(name: string, year: int16?, ratio: double)"`
///
/// Supported types:
/// - bool, boolean -> Boolean
/// - int8/i8, int16/i16/short, int/int32/i32, long/int64/i64 -> signed integers
/// - uint8/u8, uint16/u16, uint32/u32, uint64/u64 -> unsigned integers
/// - float/float32/f32, double/float64/f64 -> floating point
/// - string, utf8 -> Utf8
///
/// Fields are non-nullable unless the type carries a trailing `?`.
pub fn parse_schema_string(schema_str: &str) -> Result<Fields> {
    let schema_str = schema_str.trim();
    let inner = schema_str
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| anyhow!("Schema string must be enclosed in parentheses: {SCHEMA_FORMAT}"))?
        .trim();
    if inner.is_empty() {
        bail!("Schema must contain at least one field");
    }

    let fields = inner
        .split(',')
        .map(str::trim)
        .filter(|def| !def.is_empty())
        .map(|def| {
            parse_field_definition(def)
                .with_context(|| format!("Failed to parse field definition: '{def}'"))
        })
        .collect::<Result<Fields>>()?;

    if let Some(name) = fields.find_duplicate() {
        bail!("Duplicate field name '{name}'");
    }
    Ok(fields)
}

fn parse_field_definition(field_def: &str) -> Result<Field> {
    let (name, type_name) = field_def
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Field definition must contain ':' separator"))?;
    let name = name.trim();
    let type_name = type_name.trim();

    if !is_valid_field_name(name) {
        bail!(
            "Invalid field name '{name}'. \
             Field names must be valid identifiers (letters, numbers, underscores)"
        );
    }
    let (type_name, nullable) = match type_name.strip_suffix('?') {
        Some(base) => (base.trim_end(), true),
        None => (type_name, false),
    };
    let data_type = parse_type_name(type_name).ok_or_else(|| {
        anyhow!("Unsupported type '{type_name}'. Supported types: {SUPPORTED_TYPES}")
    })?;
    Ok(Field::new(name, data_type, nullable))
}

fn parse_type_name(type_name: &str) -> Option<DataType> {
    let data_type = match type_name.to_ascii_lowercase().as_str() {
        "bool" | "boolean" => DataType::Boolean,
        "int8" | "i8" => DataType::Int8,
        "int16" | "i16" | "short" => DataType::Int16,
        "int" | "int32" | "i32" => DataType::Int32,
        "long" | "int64" | "i64" => DataType::Int64,
        "uint8" | "u8" => DataType::UInt8,
        "uint16" | "u16" => DataType::UInt16,
        "uint32" | "u32" => DataType::UInt32,
        "uint64" | "u64" => DataType::UInt64,
        "float" | "float32" | "f32" => DataType::Float32,
        "double" | "float64" | "f64" => DataType::Float64,
        "string" | "utf8" => DataType::Utf8,
        _ => return None,
    };
    Some(data_type)
}

fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}
