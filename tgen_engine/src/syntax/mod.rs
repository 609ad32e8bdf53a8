//! Syntax analysis: recursive-descent parser over the tokenizer

pub mod error;
pub mod parser;

pub use error::ParseError;
pub use parser::Parser;
