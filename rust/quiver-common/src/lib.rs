//! Core definitions relied upon by all quiver-* crates.

pub mod error;
pub mod result;

pub use result::Result;
