//! Policy documents and chunking.

pub mod chunker;
pub mod entities;
