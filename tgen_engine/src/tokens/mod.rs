//! Token definitions for the template script language

pub mod token;

pub use token::{classify_word, Token};
