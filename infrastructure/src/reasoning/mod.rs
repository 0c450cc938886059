//! Reasoning service adapters

mod openai;

pub use openai::OpenAiReasoningService;
