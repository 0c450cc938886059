//! Document parser port
//!
//! Turns a source file into the ordered block model the chunker consumes.

use policy_domain::NormalizedDocument;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentParseError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}

pub trait DocumentParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<NormalizedDocument, DocumentParseError>;
}
