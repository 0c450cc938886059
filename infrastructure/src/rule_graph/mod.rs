//! Rule graph adapters

mod file;

pub use file::FileRuleGraph;
