//! Diagnostic code registry for the template engine
//!
//! Every error and success event logged by the engine carries a stable
//! code so host tooling can filter and aggregate diagnostics without
//! parsing message text.

use std::fmt;

/// A stable diagnostic code such as `E101` or `I003`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lexical analysis errors (E1xx)
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E101");
    pub const UNTERMINATED_STRING: Code = Code::new("E102");
    pub const INVALID_NUMBER: Code = Code::new("E103");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E104");
    pub const STRING_TOO_LARGE: Code = Code::new("E105");
}

/// Parse errors (E2xx)
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E201");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E202");
    pub const RESERVED_KEYWORD: Code = Code::new("E203");
    pub const MAX_PARSE_DEPTH: Code = Code::new("E204");
    pub const STATIC_DIRECTIVE_FAILED: Code = Code::new("E205");
}

/// Runtime evaluation errors (E3xx)
pub mod runtime {
    use super::Code;

    pub const TYPE_MISMATCH: Code = Code::new("E301");
    pub const VARIABLE_NOT_FOUND: Code = Code::new("E302");
    pub const FUNCTION_NOT_FOUND: Code = Code::new("E303");
    pub const ARITY_MISMATCH: Code = Code::new("E304");
    pub const CAPABILITY_MISMATCH: Code = Code::new("E305");
    pub const INDEX_OUT_OF_RANGE: Code = Code::new("E306");
    pub const ENTRY_NOT_FOUND: Code = Code::new("E307");
    pub const DIVISION_BY_ZERO: Code = Code::new("E308");
    pub const NO_OUTPUT_SINK: Code = Code::new("E309");
}

/// Template facade and host-side errors (E4xx)
pub mod template {
    use super::Code;

    pub const TEMPLATE_TOO_LARGE: Code = Code::new("E401");
    pub const TEMPLATE_READ_FAILED: Code = Code::new("E402");
    pub const VARS_FILE_INVALID: Code = Code::new("E403");
}

/// Internal failures (E9xx)
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("E901");
}

/// Success/progress codes (Ixxx)
pub mod success {
    use super::Code;

    pub const PARSE_COMPLETE: Code = Code::new("I002");
    pub const RENDER_COMPLETE: Code = Code::new("I003");
    pub const LOGGING_INITIALIZED: Code = Code::new("I004");
}

/// Severity attached to a diagnostic code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Error,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Info => "Info",
        }
    }
}

/// Get severity for a code
pub fn get_severity(code: &str) -> Severity {
    match code {
        "E901" => Severity::Critical,
        c if c.starts_with('E') => Severity::Error,
        _ => Severity::Info,
    }
}

/// Get the subsystem category for a code
pub fn get_category(code: &str) -> &'static str {
    match code.as_bytes().get(1) {
        Some(b'1') => "Lexical",
        Some(b'2') => "Syntax",
        Some(b'3') => "Runtime",
        Some(b'4') => "Template",
        Some(b'9') => "System",
        _ if code.starts_with('I') => "Success",
        _ => "Unknown",
    }
}

/// Get a short description for a code
pub fn get_description(code: &str) -> &'static str {
    match code {
        "E101" => "Character not valid inside a code region",
        "E102" => "String literal missing its closing quote",
        "E103" => "Malformed numeric literal",
        "E104" => "Identifier exceeds the maximum length",
        "E105" => "String literal exceeds the maximum size",
        "E201" => "Token sequence does not match the grammar",
        "E202" => "Template ended in the middle of a construct",
        "E203" => "Keyword is reserved but not part of the grammar",
        "E204" => "Expression nesting exceeds the parser depth limit",
        "E205" => "Static directive raised an error while executing at parse time",
        "E301" => "Operand does not have the required kind",
        "E302" => "Variable is not bound anywhere in the context chain",
        "E303" => "Name matches neither a builtin nor a bound function",
        "E304" => "Call supplied the wrong number of arguments",
        "E305" => "Value does not support array or map access",
        "E306" => "Array index is outside the current bounds",
        "E307" => "Map has no entry under the requested key",
        "E308" => "Integer division or remainder by zero",
        "E309" => "No context in the chain owns an output sink",
        "E401" => "Template file exceeds the size limit",
        "E402" => "Template file could not be read",
        "E403" => "Variables file is not a valid TOML table",
        "E901" => "Internal engine invariant violated",
        _ => "Unknown code",
    }
}
