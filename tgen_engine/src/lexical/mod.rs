//! Lexical analysis: mode-switching tokenizer for template source

pub mod tokenizer;

pub use tokenizer::{LexError, Tokenizer};
