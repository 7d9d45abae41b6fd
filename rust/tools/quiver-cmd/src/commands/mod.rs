//! Command implementations for quiver-cmd

use anyhow::Result;
use quiver_array::{MaterializeForm, RecordBatch};

pub mod archers;
pub mod ingest;
pub mod random;

/// Prints a materialized batch as pretty JSON on stdout.
pub fn print_json(batch: &RecordBatch, form: MaterializeForm) -> Result<()> {
    let value = batch.to_json(form)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
