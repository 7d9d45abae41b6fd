//! Random command implementation

use anyhow::Result;
use quiver_testkit::data_gen::random_batch;

pub fn run(rows: usize, cols: usize, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(|| fastrand::u64(..));
    log::info!("generating {rows}x{cols} batch with seed {seed}");
    let batch = random_batch(rows, cols, seed)?;

    println!("{}", batch.schema());
    println!("num_rows: {}", batch.num_rows());
    println!("num_columns: {}", batch.num_columns());
    Ok(())
}
