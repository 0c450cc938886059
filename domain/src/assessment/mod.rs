//! Assessment-side input: data extracted from the document under review.

pub mod extracted_data;
