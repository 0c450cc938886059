//! Document parser adapters

mod text_parser;

pub use text_parser::TextDocumentParser;
