//! Archers walk-through: build a struct array, flatten it, slice the batch,
//! materialize the slice in both forms, then slice the struct array itself
//! and materialize its records.

use anyhow::Result;
use quiver_array::{MaterializeForm, build_struct_array};
use quiver_testkit::data_gen::{archer_fields, archer_records};

use crate::commands::print_json;

pub fn run(start: usize, len: usize, struct_start: usize, struct_len: usize) -> Result<()> {
    let archers = build_struct_array(&archer_records(), &archer_fields())?;
    println!("type: {}", archers.data_type());

    let batch = archers.flatten()?;
    println!("{}", batch.schema());
    print_json(&batch, MaterializeForm::Columns)?;
    println!("num_rows: {}", batch.num_rows());
    println!("num_columns: {}", batch.num_columns());

    let slice = batch.slice(start, len)?;
    println!("slice {start}:{len} num_rows: {}", slice.num_rows());
    println!("first archer: {:?}", batch.column(0)?.str_value(0)?);
    if slice.num_rows() > 0 {
        println!("first archer in slice: {:?}", slice.column(0)?.str_value(0)?);
    }

    print_json(&slice, MaterializeForm::Columns)?;
    print_json(&slice, MaterializeForm::Rows)?;

    let struct_slice = archers.slice(struct_start, struct_len)?;
    println!(
        "struct slice {struct_start}:{struct_len} len: {}",
        struct_slice.len()
    );
    let records = struct_slice.to_records()?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
