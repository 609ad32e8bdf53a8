//! Parse errors
//!
//! Parsing is fatal on the first error; there is no recovery and no
//! partial program. Lexical errors surface through here unchanged.

use crate::config::constants::syntax::MAX_PARSE_DEPTH;
use crate::lexical::LexError;
use crate::logging::codes;
use crate::runtime::EvalError;
use crate::utils::Span;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Unexpected '{found}' at {span}: expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of template: expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("'{keyword}' is reserved and cannot be used at {span}")]
    Reserved { keyword: String, span: Span },

    #[error("Expression nesting exceeds the limit of {MAX_PARSE_DEPTH} at {span}")]
    DepthExceeded { span: Span },

    #[error("Static directive failed at {span}: {source}")]
    StaticDirective {
        #[source]
        source: EvalError,
        span: Span,
    },
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Lex(_) => None,
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::Reserved { span, .. }
            | ParseError::DepthExceeded { span }
            | ParseError::StaticDirective { span, .. } => Some(*span),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ParseError::Lex(inner) => inner.error_code(),
            ParseError::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            ParseError::UnexpectedEof { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            ParseError::Reserved { .. } => codes::syntax::RESERVED_KEYWORD,
            ParseError::DepthExceeded { .. } => codes::syntax::MAX_PARSE_DEPTH,
            ParseError::StaticDirective { .. } => codes::syntax::STATIC_DIRECTIVE_FAILED,
        }
    }
}
