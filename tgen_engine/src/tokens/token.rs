//! Token set for code regions
//!
//! Keywords get dedicated kinds; every other word is a generic identifier.
//! `--`, `<=`, `>=`, `&&`, `||` and `!` are recognized here but rejected by
//! the grammar - they are reserved for future use, matching the engine's
//! surface syntax exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single token from a code region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    // Identifiers and keywords
    Ident(String),
    If,
    Else,
    For,
    While,
    Print,
    Printf,
    Func,

    // Literals
    Int(i64),
    Float(f64),
    Str(String),

    // Arithmetic operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Percent,  // %

    // Comparison operators
    Assign, // =
    Eq,     // ==
    Ne,     // !=
    Lt,     // <
    Gt,     // >
    Le,     // <= (reserved)
    Ge,     // >= (reserved)

    // Bitwise and logical operators
    Amp,    // &
    Pipe,   // |
    Caret,  // ^
    Tilde,  // ~
    Shl,    // <<
    Shr,    // >>
    AndAnd, // && (reserved)
    OrOr,   // || (reserved)
    Not,    // ! (reserved)

    // Increment/decrement
    Inc, // ++
    Dec, // -- (reserved)

    // Punctuation
    Dot,
    Comma,
    Semi,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Region control
    At,       // @ static-directive marker
    CloseTag, // %>

    /// End of template
    Eof,
}

impl Token {
    /// True for the keyword kinds
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::If | Self::Else | Self::For | Self::While | Self::Print | Self::Printf | Self::Func
        )
    }

    /// True for literal tokens
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_) | Self::Str(_))
    }

    /// Render the token as it appears in template source
    pub fn as_source_string(&self) -> String {
        match self {
            Self::Ident(name) => name.clone(),
            Self::If => "if".to_string(),
            Self::Else => "else".to_string(),
            Self::For => "for".to_string(),
            Self::While => "while".to_string(),
            Self::Print => "print".to_string(),
            Self::Printf => "printf".to_string(),
            Self::Func => "func".to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Str(text) => format!("\"{}\"", text),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Percent => "%".to_string(),
            Self::Assign => "=".to_string(),
            Self::Eq => "==".to_string(),
            Self::Ne => "!=".to_string(),
            Self::Lt => "<".to_string(),
            Self::Gt => ">".to_string(),
            Self::Le => "<=".to_string(),
            Self::Ge => ">=".to_string(),
            Self::Amp => "&".to_string(),
            Self::Pipe => "|".to_string(),
            Self::Caret => "^".to_string(),
            Self::Tilde => "~".to_string(),
            Self::Shl => "<<".to_string(),
            Self::Shr => ">>".to_string(),
            Self::AndAnd => "&&".to_string(),
            Self::OrOr => "||".to_string(),
            Self::Not => "!".to_string(),
            Self::Inc => "++".to_string(),
            Self::Dec => "--".to_string(),
            Self::Dot => ".".to_string(),
            Self::Comma => ",".to_string(),
            Self::Semi => ";".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::LBrace => "{".to_string(),
            Self::RBrace => "}".to_string(),
            Self::LBracket => "[".to_string(),
            Self::RBracket => "]".to_string(),
            Self::At => "@".to_string(),
            Self::CloseTag => "%>".to_string(),
            Self::Eof => "<EOF>".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_source_string())
    }
}

/// Classify a word as a keyword kind or generic identifier
pub fn classify_word(word: &str) -> Token {
    match word {
        "if" => Token::If,
        "else" => Token::Else,
        "for" => Token::For,
        "while" => Token::While,
        "print" => Token::Print,
        "printf" => Token::Printf,
        "func" => Token::Func,
        _ => Token::Ident(word.to_string()),
    }
}
