//! Consumer module for the dataset indexer.
//!
//! Reads raw records from the bundled dataset resources.

mod json_array;
mod line_reader;

pub use json_array::{parse_json_array, read_json_array};
pub use line_reader::LineReader;
