//! File-backed inputs and outputs

mod json_files;

pub use json_files::{JsonFileError, load_catalog, load_extracted_data, write_json};
