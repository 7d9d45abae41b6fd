//! Ingest command implementation

use anyhow::{Context, Result, bail};
use quiver_array::{MaterializeForm, Record, RecordBatch, build_struct_array};

use crate::{
    commands::print_json,
    schema_parser::parse_schema_string,
    utils::{parse_slice_arg, validate_file_exists},
};

pub fn run(schema: String, file: String, slice: Option<String>, rows: bool) -> Result<()> {
    let fields = parse_schema_string(&schema)?;
    validate_file_exists(&file)?;
    let text = std::fs::read_to_string(&file).with_context(|| format!("Failed to read {file}"))?;
    let records = parse_records(&text).with_context(|| format!("Failed to parse {file}"))?;
    log::info!("ingesting {} records from {file}", records.len());

    let batch = build_struct_array(&records, &fields)?.flatten()?;
    let batch = apply_slice(batch, slice.as_deref())?;

    let form = if rows {
        MaterializeForm::Rows
    } else {
        MaterializeForm::Columns
    };
    print_json(&batch, form)
}

/// Parses a JSON array of objects into records, keeping key order.
fn parse_records(text: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let Some(items) = value.as_array() else {
        bail!("Expected a JSON array of objects");
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| Record::from_json(item).with_context(|| format!("Record {i}")))
        .collect()
}

fn apply_slice(batch: RecordBatch, slice: Option<&str>) -> Result<RecordBatch> {
    match slice {
        Some(arg) => {
            let (start, len) = parse_slice_arg(arg)?;
            Ok(batch.slice(start, len)?)
        }
        None => Ok(batch),
    }
}
