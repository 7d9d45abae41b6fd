use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod schema_parser;
mod utils;

#[derive(Parser)]
#[command(name = "quiver-cmd")]
#[command(about = "Command-line utility for building, slicing and materializing record batches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch of standard-normal Float64 columns and print its shape
    Random {
        /// Number of rows
        #[arg(long, default_value_t = 8192)]
        rows: usize,

        /// Number of columns
        #[arg(long, default_value_t = 16)]
        cols: usize,

        /// Random seed (a fresh seed is drawn when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Walk through building, flattening and slicing the archers table
    Archers {
        /// First row of the slice
        #[arg(long, default_value_t = 1)]
        start: usize,

        /// Number of rows in the slice
        #[arg(long, default_value_t = 3)]
        len: usize,

        /// First row of the struct array slice
        #[arg(long, default_value_t = 1)]
        struct_start: usize,

        /// Number of rows in the struct array slice
        #[arg(long, default_value_t = 2)]
        struct_len: usize,
    },

    /// Build a batch from a JSON array of records and print it back as JSON
    Ingest {
        /// Record schema, e.g. "(name: string, year: int16?)"
        #[arg(long)]
        schema: String,

        /// JSON file holding an array of objects
        #[arg(short, long)]
        file: String,

        /// Keep only rows START:LEN of the batch
        #[arg(long)]
        slice: Option<String>,

        /// Print one object per row instead of one array per column
        #[arg(long)]
        rows: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Random { rows, cols, seed } => commands::random::run(rows, cols, seed),
        Commands::Archers {
            start,
            len,
            struct_start,
            struct_len,
        } => commands::archers::run(start, len, struct_start, struct_len),
        Commands::Ingest {
            schema,
            file,
            slice,
            rows,
        } => commands::ingest::run(schema, file, slice, rows),
    }
}
