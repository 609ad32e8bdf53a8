//! Compile-time limits for the template engine
//!
//! These bound pathological inputs (huge identifiers, runaway nesting)
//! without restricting the template language itself. Script execution is
//! deliberately unbounded; a host wanting a step budget or timeout must
//! wrap evaluation itself.

pub mod lexical {
    /// Maximum string literal size (1MB)
    pub const MAX_STRING_SIZE: usize = 1_048_576;

    /// Maximum identifier length
    pub const MAX_IDENTIFIER_LENGTH: usize = 255;
}

pub mod syntax {
    /// Maximum parser recursion depth
    ///
    /// Guards against stack overflow while parsing deeply nested
    /// expressions such as a long run of opening parentheses.
    pub const MAX_PARSE_DEPTH: usize = 200;
}

pub mod template {
    /// Maximum template file size accepted by the CLI (10MB)
    pub const MAX_TEMPLATE_SIZE: u64 = 10 * 1024 * 1024;
}
