//! Runtime evaluation errors
//!
//! The first error raised during execution aborts the run; anything the
//! script already printed stays in the output sink. Every variant carries
//! the span of the construct that raised it.

use crate::logging::codes;
use crate::utils::Span;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("Type mismatch at {span}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    #[error("Variable '{name}' is not defined at {span}")]
    VariableNotFound { name: String, span: Span },

    #[error("'{name}' is neither a builtin nor a bound function at {span}")]
    FunctionNotFound { name: String, span: Span },

    #[error("'{name}' expects {expected} argument(s), got {found} at {span}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Value of kind {found} does not support {operation} access at {span}")]
    CapabilityMismatch {
        operation: &'static str,
        found: &'static str,
        span: Span,
    },

    #[error("Index {index} out of range for list of length {length} at {span}")]
    IndexOutOfRange {
        index: i64,
        length: usize,
        span: Span,
    },

    #[error("Map has no entry '{key}' at {span}")]
    EntryNotFound { key: String, span: Span },

    #[error("Division by zero at {span}")]
    DivisionByZero { span: Span },

    #[error("No output sink in the context chain at {span}")]
    NoOutputSink { span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::TypeMismatch { span, .. }
            | EvalError::VariableNotFound { span, .. }
            | EvalError::FunctionNotFound { span, .. }
            | EvalError::ArityMismatch { span, .. }
            | EvalError::CapabilityMismatch { span, .. }
            | EvalError::IndexOutOfRange { span, .. }
            | EvalError::EntryNotFound { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::NoOutputSink { span } => *span,
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            EvalError::TypeMismatch { .. } => codes::runtime::TYPE_MISMATCH,
            EvalError::VariableNotFound { .. } => codes::runtime::VARIABLE_NOT_FOUND,
            EvalError::FunctionNotFound { .. } => codes::runtime::FUNCTION_NOT_FOUND,
            EvalError::ArityMismatch { .. } => codes::runtime::ARITY_MISMATCH,
            EvalError::CapabilityMismatch { .. } => codes::runtime::CAPABILITY_MISMATCH,
            EvalError::IndexOutOfRange { .. } => codes::runtime::INDEX_OUT_OF_RANGE,
            EvalError::EntryNotFound { .. } => codes::runtime::ENTRY_NOT_FOUND,
            EvalError::DivisionByZero { .. } => codes::runtime::DIVISION_BY_ZERO,
            EvalError::NoOutputSink { .. } => codes::runtime::NO_OUTPUT_SINK,
        }
    }
}
