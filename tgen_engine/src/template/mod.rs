//! Template façade
//!
//! `Template::parse` drives the tokenizer and parser once, executing any
//! static directives along the way, and yields a reusable value: the
//! parsed program and the static context persist, while every render
//! gets a fresh context. A template is therefore parse-once,
//! render-many; concurrent renders need separate `Template` values
//! because contexts are single-threaded shared handles.

use std::rc::Rc;

use crate::grammar::Stmt;
use crate::logging::codes;
use crate::runtime::builtins::Builtins;
use crate::runtime::context::{Context, SharedContext};
use crate::runtime::error::EvalError;
use crate::runtime::eval;
use crate::syntax::{ParseError, Parser};
use crate::{log_error, log_success};

/// Parse or runtime failure from the façade
#[derive(Debug, Clone, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl TemplateError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            TemplateError::Parse(inner) => inner.error_code(),
            TemplateError::Eval(inner) => inner.error_code(),
        }
    }
}

#[derive(Debug)]
pub struct Template {
    program: Vec<Stmt>,
    static_ctx: SharedContext,
    builtins: Rc<Builtins>,
}

impl Template {
    /// Parse with the standard builtin registry
    pub fn parse(source: &str) -> Result<Template, TemplateError> {
        Self::parse_with(source, Builtins::standard())
    }

    /// Parse with a host-supplied builtin registry
    pub fn parse_with(source: &str, builtins: Builtins) -> Result<Template, TemplateError> {
        let builtins = Rc::new(builtins);
        let parser = Parser::new(source, builtins.clone());
        let (program, static_ctx) = parser.parse().inspect_err(|error| {
            log_error!(
                error.error_code(),
                &error.to_string(),
                "source_bytes" => source.len()
            );
        })?;

        log_success!(
            codes::success::PARSE_COMPLETE,
            "Template parsed",
            "statements" => program.len(),
            "source_bytes" => source.len()
        );

        Ok(Template {
            program,
            static_ctx,
            builtins,
        })
    }

    /// Fresh render context: a child of the static context (so statics
    /// stay visible) that owns its own output sink
    pub fn new_context(&self) -> SharedContext {
        Context::child_with_output(&self.static_ctx)
    }

    /// Run the program against `ctx`. On error the context keeps
    /// whatever output was already emitted.
    pub fn execute(&self, ctx: &SharedContext) -> Result<(), TemplateError> {
        for statement in &self.program {
            eval::execute(statement, ctx, &self.builtins).inspect_err(|error| {
                log_error!(
                    error.error_code(),
                    &error.to_string(),
                    span = error.span()
                );
            })?;
        }
        Ok(())
    }

    /// Fresh context, execute, hand back the output buffer
    pub fn render(&self) -> Result<String, TemplateError> {
        let ctx = self.new_context();
        self.execute(&ctx)?;
        let output = ctx.borrow_mut().take_output().unwrap_or_default();
        log_success!(
            codes::success::RENDER_COMPLETE,
            "Template rendered",
            "output_bytes" => output.len()
        );
        Ok(output)
    }

    /// The context static directives executed against; bindings made
    /// here are visible to every render
    pub fn static_context(&self) -> &SharedContext {
        &self.static_ctx
    }

    pub fn builtins(&self) -> &Rc<Builtins> {
        &self.builtins
    }
}
