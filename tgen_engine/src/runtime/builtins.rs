//! Builtin function registry
//!
//! Builtins are resolved before context variables at every call site, so
//! a script binding cannot shadow one. Handlers receive the unevaluated
//! argument expressions: most evaluate them immediately, but `isset`
//! needs the syntactic reference to probe without raising.

use std::collections::HashMap;
use std::fmt;

use crate::grammar::Expr;
use crate::runtime::context::SharedContext;
use crate::runtime::error::{EvalError, EvalResult};
use crate::runtime::eval;
use crate::runtime::value::Value;

pub type BuiltinHandler = fn(&[Expr], &SharedContext, &Builtins) -> EvalResult<Value>;

pub struct Builtin {
    /// Exact argument count, or `None` for variadic
    pub arity: Option<usize>,
    pub handler: BuiltinHandler,
}

// The handler pointer carries no useful debug form
impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Builtins {
    table: HashMap<String, Builtin>,
}

impl Builtins {
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Registry with the standard builtins: `format`, `isset`,
    /// `newList`, `newMap`
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("format", None, builtin_format);
        registry.register("isset", Some(1), builtin_isset);
        registry.register("newList", Some(0), builtin_new_list);
        registry.register("newMap", Some(0), builtin_new_map);
        registry
    }

    /// Add or replace a builtin; hosts use this to extend the engine
    pub fn register(&mut self, name: &str, arity: Option<usize>, handler: BuiltinHandler) {
        self.table.insert(name.to_string(), Builtin { arity, handler });
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

/// `format(pattern, args...)`: each `%s` in the pattern consumes the
/// string form of the next argument, left to right. Leftover `%s`
/// markers stay verbatim; surplus arguments are dropped.
fn builtin_format(args: &[Expr], ctx: &SharedContext, env: &Builtins) -> EvalResult<Value> {
    let Some((pattern_expr, rest)) = args.split_first() else {
        return Err(EvalError::ArityMismatch {
            name: "format".to_string(),
            expected: 1,
            found: 0,
            span: crate::utils::Span::dummy(),
        });
    };

    let pattern_value = eval::eval(pattern_expr, ctx, env)?;
    let pattern = pattern_value.as_str(pattern_expr.span())?;

    let mut remaining = rest.iter();
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '%' && chars.peek() == Some(&'s') {
            if let Some(arg) = remaining.next() {
                chars.next();
                out.push_str(&eval::eval(arg, ctx, env)?.to_display_string());
                continue;
            }
        }
        out.push(ch);
    }
    Ok(Value::Str(out))
}

/// `isset(ref)`: true iff the argument resolves and reads without a
/// not-found error. Non-reference arguments are simply evaluated.
fn builtin_isset(args: &[Expr], ctx: &SharedContext, env: &Builtins) -> EvalResult<Value> {
    match &args[0] {
        Expr::Ref(path) => match eval::read_path(path, ctx, env) {
            Ok(_) => Ok(Value::Bool(true)),
            Err(
                EvalError::VariableNotFound { .. }
                | EvalError::EntryNotFound { .. }
                | EvalError::IndexOutOfRange { .. },
            ) => Ok(Value::Bool(false)),
            Err(other) => Err(other),
        },
        other => {
            eval::eval(other, ctx, env)?;
            Ok(Value::Bool(true))
        }
    }
}

fn builtin_new_list(_args: &[Expr], _ctx: &SharedContext, _env: &Builtins) -> EvalResult<Value> {
    Ok(Value::new_list())
}

fn builtin_new_map(_args: &[Expr], _ctx: &SharedContext, _env: &Builtins) -> EvalResult<Value> {
    Ok(Value::new_map())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::RefPath;
    use crate::runtime::context::Context;
    use crate::utils::Span;
    use assert_matches::assert_matches;

    fn str_expr(text: &str) -> Expr {
        Expr::Str(text.to_string(), Span::dummy())
    }

    #[test]
    fn format_substitutes_in_order() {
        let env = Builtins::standard();
        let ctx = Context::new_root().into_shared();
        let args = vec![
            str_expr("bus[%s:%s]"),
            Expr::Int(7, Span::dummy()),
            Expr::Int(0, Span::dummy()),
        ];
        let result = builtin_format(&args, &ctx, &env).unwrap();
        assert_matches!(result, Value::Str(ref s) if s == "bus[7:0]");
    }

    #[test]
    fn format_leaves_unmatched_markers() {
        let env = Builtins::standard();
        let ctx = Context::new_root().into_shared();
        let args = vec![str_expr("%s and %s"), Expr::Int(1, Span::dummy())];
        let result = builtin_format(&args, &ctx, &env).unwrap();
        assert_matches!(result, Value::Str(ref s) if s == "1 and %s");
    }

    #[test]
    fn format_requires_a_string_pattern() {
        let env = Builtins::standard();
        let ctx = Context::new_root().into_shared();
        let args = vec![Expr::Int(1, Span::dummy())];
        assert_matches!(
            builtin_format(&args, &ctx, &env),
            Err(EvalError::TypeMismatch {
                expected: "string",
                ..
            })
        );
    }

    #[test]
    fn isset_probes_without_raising() {
        let env = Builtins::standard();
        let ctx = Context::new_root().into_shared();
        let missing = Expr::Ref(RefPath::variable("ghost", Span::dummy()));
        assert_matches!(
            builtin_isset(std::slice::from_ref(&missing), &ctx, &env),
            Ok(Value::Bool(false))
        );

        ctx.borrow_mut().set("ghost", Value::Int(1));
        assert_matches!(
            builtin_isset(std::slice::from_ref(&missing), &ctx, &env),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn registry_lookup_and_extension() {
        let mut registry = Builtins::standard();
        assert!(registry.contains("newMap"));
        assert!(!registry.contains("custom"));

        registry.register("custom", Some(0), |_, _, _| Ok(Value::Int(42)));
        assert_matches!(registry.get("custom"), Some(Builtin { arity: Some(0), .. }));
    }

    #[test]
    fn registry_and_entries_are_debuggable() {
        let registry = Builtins::standard();
        let rendered = format!("{:?}", registry);
        assert!(rendered.contains("isset"));
        assert!(format!("{:?}", registry.get("isset")).contains("arity"));
    }
}
