//! Common utilities for quiver-cmd

use anyhow::{Context, Result, anyhow};
use std::path::Path;

/// Checks if a file exists and is readable
pub fn validate_file_exists(path: &str) -> Result<()> {
    let file_path = Path::new(path);
    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }
    if !file_path.is_file() {
        anyhow::bail!("Path is not a file: {}", path);
    }
    Ok(())
}

/// Parses a `START:LEN` row window.
pub fn parse_slice_arg(arg: &str) -> Result<(usize, usize)> {
    let (start, len) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("Slice must be given as START:LEN, got '{arg}'"))?;
    let start = start
        .trim()
        .parse()
        .with_context(|| format!("Invalid slice start '{start}'"))?;
    let len = len
        .trim()
        .parse()
        .with_context(|| format!("Invalid slice length '{len}'"))?;
    Ok((start, len))
}
