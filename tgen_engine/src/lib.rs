//! TGen: an embedded templating and scripting engine.
//!
//! Templates are literal text with embedded code regions. `<% ... %>`
//! holds statements, `<%= expr %>` prints an expression, and
//! `<%@ ... %>` runs once at parse time against a static context shared
//! by every render. The scripting language is small and dynamic:
//! ints, floats, bools, strings, growable lists, string-keyed maps, and
//! first-class (non-lexical) functions, with a builtin registry hosts
//! can extend.
//!
//! Parse once, render many:
//!
//! ```
//! use tgen_engine::Template;
//!
//! let template = Template::parse("wire [<%= 8 - 1 %>:0] bus;").unwrap();
//! assert_eq!(template.render().unwrap(), "wire [7:0] bus;");
//! ```
//!
//! Hosts that need to seed variables build a context themselves:
//!
//! ```
//! use tgen_engine::{Template, Value};
//!
//! let template = Template::parse("<%= name %>").unwrap();
//! let ctx = template.new_context();
//! ctx.borrow_mut().set("name", Value::Str("top".to_string()));
//! template.execute(&ctx).unwrap();
//! assert_eq!(ctx.borrow().output(), Some("top"));
//! ```

pub mod config;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod runtime;
pub mod syntax;
pub mod template;
pub mod tokens;
pub mod utils;

pub use runtime::{Builtins, Context, EvalError, SharedContext, Value};
pub use syntax::ParseError;
pub use template::{Template, TemplateError};
