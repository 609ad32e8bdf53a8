//! Tree-walking evaluator
//!
//! A direct recursive walk over the parsed program: no bytecode, no step
//! budget, single-threaded. The first runtime error aborts execution and
//! propagates to the caller; output already appended to the sink stays.

use crate::grammar::{Access, BinOp, Expr, RefPath, Stmt, UnaryOp};
use crate::runtime::builtins::Builtins;
use crate::runtime::context::{Context, SharedContext};
use crate::runtime::error::{EvalError, EvalResult};
use crate::runtime::function::FunctionValue;
use crate::runtime::reference::Reference;
use crate::runtime::value::Value;
use crate::utils::Span;

/// Result of a call before the position-dependent `return` handling
enum CallOutcome {
    /// Builtins produce their value directly
    Builtin(Value),
    /// User functions yield their call context; expression position
    /// reads the `return` binding from it
    Function(SharedContext),
}

/// Execute a statement against `ctx`
pub fn execute(stmt: &Stmt, ctx: &SharedContext, env: &Builtins) -> EvalResult<()> {
    match stmt {
        Stmt::Text(text) => emit(text, ctx, Span::dummy()),
        Stmt::Assign { target, value } => {
            let value = eval(value, ctx, env)?;
            let reference = resolve(target, ctx, env)?;
            reference.set(ctx, value)
        }
        Stmt::Increment { target } => {
            // `x++` is `x = x + 1`, addition semantics included: floats
            // widen and strings concatenate
            let reference = resolve(target, ctx, env)?;
            let next = reference.get(ctx)?.add(&Value::Int(1), target.span)?;
            reference.set(ctx, next)
        }
        Stmt::CallStmt { name, args, span } => {
            // Statement position never reads the return binding
            call(name, args, *span, ctx, env)?;
            Ok(())
        }
        Stmt::PrintExpr(expr) => {
            let value = eval(expr, ctx, env)?;
            emit(&value.to_display_string(), ctx, expr.span())
        }
        Stmt::Print { args, span } => {
            let mut text = String::new();
            for arg in args {
                text.push_str(&eval(arg, ctx, env)?.to_display_string());
            }
            emit(&text, ctx, *span)
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let taken = eval(condition, ctx, env)?.as_bool(condition.span())?;
            if taken {
                execute(then_branch, ctx, env)
            } else if let Some(otherwise) = else_branch {
                execute(otherwise, ctx, env)
            } else {
                Ok(())
            }
        }
        Stmt::For {
            init,
            condition,
            step,
            body,
        } => {
            execute(init, ctx, env)?;
            while eval(condition, ctx, env)?.as_bool(condition.span())? {
                execute(body, ctx, env)?;
                execute(step, ctx, env)?;
            }
            Ok(())
        }
        Stmt::Block(statements) => {
            for statement in statements {
                execute(statement, ctx, env)?;
            }
            Ok(())
        }
    }
}

/// Evaluate an expression against `ctx`
pub fn eval(expr: &Expr, ctx: &SharedContext, env: &Builtins) -> EvalResult<Value> {
    match expr {
        Expr::Int(value, _) => Ok(Value::Int(*value)),
        Expr::Float(value, _) => Ok(Value::Float(*value)),
        Expr::Str(text, _) => Ok(Value::Str(text.clone())),
        Expr::Ref(path) => read_path(path, ctx, env),
        Expr::Unary { op, operand, span } => {
            let value = eval(operand, ctx, env)?;
            match op {
                UnaryOp::Neg => value.neg(*span),
                UnaryOp::BitNot => value.not(*span),
            }
        }
        Expr::Binary {
            op,
            left,
            right,
            span,
        } => {
            let lhs = eval(left, ctx, env)?;
            let rhs = eval(right, ctx, env)?;
            apply_binary(*op, &lhs, &rhs, *span)
        }
        Expr::Call { name, args, span } => match call(name, args, *span, ctx, env)? {
            CallOutcome::Builtin(value) => Ok(value),
            CallOutcome::Function(call_ctx) => {
                let result = call_ctx.borrow().get("return");
                result.ok_or_else(|| EvalError::VariableNotFound {
                    name: "return".to_string(),
                    span: *span,
                })
            }
        },
        Expr::Func { params, body, span } => Ok(Value::Func(std::rc::Rc::new(FunctionValue {
            params: params.clone(),
            body: body.clone(),
            span: *span,
        }))),
    }
}

/// Read through a reference path
pub fn read_path(path: &RefPath, ctx: &SharedContext, env: &Builtins) -> EvalResult<Value> {
    resolve(path, ctx, env)?.get(ctx)
}

/// Resolve a syntactic path to a storage location, evaluating index
/// expressions and navigating every access but the last
pub fn resolve(path: &RefPath, ctx: &SharedContext, env: &Builtins) -> EvalResult<Reference> {
    let Some((last, prefix)) = path.accesses.split_last() else {
        return Ok(Reference::Var {
            name: path.base.clone(),
            span: path.span,
        });
    };

    let mut current =
        ctx.borrow()
            .get(&path.base)
            .ok_or_else(|| EvalError::VariableNotFound {
                name: path.base.clone(),
                span: path.span,
            })?;

    for access in prefix {
        current = navigate(&current, access, ctx, env, path.span)?;
    }

    match last {
        Access::Index(index_expr) => {
            let list = match &current {
                Value::List(handle) => handle.clone(),
                other => {
                    return Err(EvalError::CapabilityMismatch {
                        operation: "array",
                        found: other.kind_name(),
                        span: path.span,
                    });
                }
            };
            let index = checked_index(index_expr, &list, ctx, env)?;
            Ok(Reference::Element {
                list,
                index,
                span: path.span,
            })
        }
        Access::Field(key) => {
            let map = match &current {
                Value::Map(handle) => handle.clone(),
                other => {
                    return Err(EvalError::CapabilityMismatch {
                        operation: "map",
                        found: other.kind_name(),
                        span: path.span,
                    });
                }
            };
            Ok(Reference::Entry {
                map,
                key: key.clone(),
                span: path.span,
            })
        }
    }
}

/// Step through one intermediate access, reading the value behind it
fn navigate(
    current: &Value,
    access: &Access,
    ctx: &SharedContext,
    env: &Builtins,
    span: Span,
) -> EvalResult<Value> {
    match access {
        Access::Index(index_expr) => {
            let list = match current {
                Value::List(handle) => handle.clone(),
                other => {
                    return Err(EvalError::CapabilityMismatch {
                        operation: "array",
                        found: other.kind_name(),
                        span,
                    });
                }
            };
            let index = checked_index(index_expr, &list, ctx, env)?;
            let list = list.borrow();
            if index < list.len() {
                Ok(list.get(index))
            } else {
                Err(EvalError::IndexOutOfRange {
                    index: index as i64,
                    length: list.len(),
                    span,
                })
            }
        }
        Access::Field(key) => {
            let map = match current {
                Value::Map(handle) => handle.clone(),
                other => {
                    return Err(EvalError::CapabilityMismatch {
                        operation: "map",
                        found: other.kind_name(),
                        span,
                    });
                }
            };
            let value = map.borrow().get(key);
            value.ok_or_else(|| EvalError::EntryNotFound {
                key: key.clone(),
                span,
            })
        }
    }
}

/// Evaluate an index expression to a non-negative machine index
fn checked_index(
    index_expr: &Expr,
    list: &crate::runtime::capability::SharedList,
    ctx: &SharedContext,
    env: &Builtins,
) -> EvalResult<usize> {
    let span = index_expr.span();
    let index = eval(index_expr, ctx, env)?.as_int(span)?;
    usize::try_from(index).map_err(|_| EvalError::IndexOutOfRange {
        index,
        length: list.borrow().len(),
        span,
    })
}

fn apply_binary(op: BinOp, lhs: &Value, rhs: &Value, span: Span) -> EvalResult<Value> {
    match op {
        BinOp::Lt => Ok(Value::Bool(lhs.less(rhs, span)?)),
        BinOp::Gt => Ok(Value::Bool(rhs.less(lhs, span)?)),
        BinOp::Eq => Ok(Value::Bool(lhs.equals(rhs))),
        BinOp::Ne => Ok(Value::Bool(!lhs.equals(rhs))),
        BinOp::BitOr => lhs.or(rhs, span),
        BinOp::BitXor => lhs.xor(rhs, span),
        BinOp::BitAnd => lhs.and(rhs, span),
        BinOp::Shr => lhs.shr(rhs, span),
        BinOp::Shl => lhs.shl(rhs, span),
        BinOp::Add => lhs.add(rhs, span),
        BinOp::Sub => lhs.sub(rhs, span),
        BinOp::Mul => lhs.mul(rhs, span),
        BinOp::Div => lhs.div(rhs, span),
        BinOp::Rem => lhs.rem(rhs, span),
    }
}

/// Resolve and perform a call: the builtin registry wins over context
/// variables; a variable must hold a function value
fn call(
    name: &str,
    args: &[Expr],
    span: Span,
    ctx: &SharedContext,
    env: &Builtins,
) -> EvalResult<CallOutcome> {
    if let Some(builtin) = env.get(name) {
        if let Some(expected) = builtin.arity {
            if args.len() != expected {
                return Err(EvalError::ArityMismatch {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                    span,
                });
            }
        }
        return Ok(CallOutcome::Builtin((builtin.handler)(args, ctx, env)?));
    }

    let bound = ctx.borrow().get(name);
    let func = match bound {
        Some(Value::Func(func)) => func,
        _ => {
            return Err(EvalError::FunctionNotFound {
                name: name.to_string(),
                span,
            });
        }
    };

    if args.len() != func.arity() {
        return Err(EvalError::ArityMismatch {
            name: name.to_string(),
            expected: func.arity(),
            found: args.len(),
            span,
        });
    }

    // Arguments evaluate in the caller's context; the body runs in a
    // brand-new root, so call-site bindings are invisible inside it.
    let mut arg_values = Vec::with_capacity(args.len());
    for arg in args {
        arg_values.push(eval(arg, ctx, env)?);
    }

    let call_ctx = Context::new_root().into_shared();
    {
        let mut scope = call_ctx.borrow_mut();
        for (param, value) in func.params.iter().zip(arg_values) {
            scope.set(&param.name, value);
        }
    }

    execute(&func.body, &call_ctx, env)?;
    Ok(CallOutcome::Function(call_ctx))
}

fn emit(text: &str, ctx: &SharedContext, span: Span) -> EvalResult<()> {
    if ctx.borrow_mut().print(text) {
        Ok(())
    } else {
        Err(EvalError::NoOutputSink { span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Param;
    use assert_matches::assert_matches;
    use std::rc::Rc;

    fn span() -> Span {
        Span::dummy()
    }

    fn int(value: i64) -> Expr {
        Expr::Int(value, span())
    }

    fn var(name: &str) -> Expr {
        Expr::Ref(RefPath::variable(name, span()))
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: span(),
        }
    }

    fn output_ctx() -> SharedContext {
        Context::with_output().into_shared()
    }

    #[test]
    fn assignment_then_read() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        let assign = Stmt::Assign {
            target: RefPath::variable("x", span()),
            value: binary(BinOp::Add, int(2), int(3)),
        };
        execute(&assign, &ctx, &env).unwrap();
        assert_matches!(eval(&var("x"), &ctx, &env), Ok(Value::Int(5)));
    }

    #[test]
    fn increment_follows_addition_semantics() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        let bump = |name: &str| Stmt::Increment {
            target: RefPath::variable(name, span()),
        };

        ctx.borrow_mut().set("n", Value::Int(41));
        execute(&bump("n"), &ctx, &env).unwrap();
        assert_matches!(ctx.borrow().get("n"), Some(Value::Int(42)));

        ctx.borrow_mut().set("f", Value::Float(2.5));
        execute(&bump("f"), &ctx, &env).unwrap();
        assert_matches!(ctx.borrow().get("f"), Some(Value::Float(v)) if v == 3.5);

        ctx.borrow_mut().set("s", Value::Str("x".to_string()));
        execute(&bump("s"), &ctx, &env).unwrap();
        assert_matches!(ctx.borrow().get("s"), Some(Value::Str(ref v)) if v == "x1");

        ctx.borrow_mut().set("b", Value::Bool(true));
        assert_matches!(
            execute(&bump("b"), &ctx, &env),
            Err(EvalError::TypeMismatch { .. })
        );
    }

    #[test]
    fn if_condition_must_be_bool() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        let stmt = Stmt::If {
            condition: int(1),
            then_branch: Box::new(Stmt::Block(Vec::new())),
            else_branch: None,
        };
        assert_matches!(
            execute(&stmt, &ctx, &env),
            Err(EvalError::TypeMismatch {
                expected: "bool",
                found: "int",
                ..
            })
        );
    }

    #[test]
    fn for_loop_runs_init_cond_body_step() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        // for (i = 0; i < 3; i++) { total = total + i; }
        ctx.borrow_mut().set("total", Value::Int(0));
        let stmt = Stmt::For {
            init: Box::new(Stmt::Assign {
                target: RefPath::variable("i", span()),
                value: int(0),
            }),
            condition: binary(BinOp::Lt, var("i"), int(3)),
            step: Box::new(Stmt::Increment {
                target: RefPath::variable("i", span()),
            }),
            body: Box::new(Stmt::Assign {
                target: RefPath::variable("total", span()),
                value: binary(BinOp::Add, var("total"), var("i")),
            }),
        };
        execute(&stmt, &ctx, &env).unwrap();
        assert_matches!(ctx.borrow().get("total"), Some(Value::Int(3)));
        assert_matches!(ctx.borrow().get("i"), Some(Value::Int(3)));
    }

    #[test]
    fn text_without_sink_is_an_error() {
        let env = Builtins::standard();
        let ctx = Context::new_root().into_shared();
        assert_matches!(
            execute(&Stmt::Text("hello".to_string()), &ctx, &env),
            Err(EvalError::NoOutputSink { .. })
        );
    }

    #[test]
    fn function_bodies_do_not_see_call_site_bindings() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        ctx.borrow_mut().set("free", Value::Int(1));

        // f = func() { return = free; }; f()
        let body = Rc::new(Stmt::Block(vec![Stmt::Assign {
            target: RefPath::variable("return", span()),
            value: var("free"),
        }]));
        ctx.borrow_mut().set(
            "f",
            Value::Func(Rc::new(FunctionValue {
                params: Vec::new(),
                body,
                span: span(),
            })),
        );

        let call_expr = Expr::Call {
            name: "f".to_string(),
            args: Vec::new(),
            span: span(),
        };
        assert_matches!(
            eval(&call_expr, &ctx, &env),
            Err(EvalError::VariableNotFound { ref name, .. }) if name == "free"
        );
    }

    #[test]
    fn expression_call_reads_return_statement_call_ignores_it() {
        let env = Builtins::standard();
        let ctx = output_ctx();

        // f = func(a) { x = a; }  (never binds return)
        let body = Rc::new(Stmt::Block(vec![Stmt::Assign {
            target: RefPath::variable("x", span()),
            value: var("a"),
        }]));
        ctx.borrow_mut().set(
            "f",
            Value::Func(Rc::new(FunctionValue {
                params: vec![Param {
                    name: "a".to_string(),
                    span: span(),
                }],
                body,
                span: span(),
            })),
        );

        let stmt = Stmt::CallStmt {
            name: "f".to_string(),
            args: vec![int(1)],
            span: span(),
        };
        assert_matches!(execute(&stmt, &ctx, &env), Ok(()));

        let expr = Expr::Call {
            name: "f".to_string(),
            args: vec![int(1)],
            span: span(),
        };
        assert_matches!(
            eval(&expr, &ctx, &env),
            Err(EvalError::VariableNotFound { ref name, .. }) if name == "return"
        );
    }

    #[test]
    fn user_function_arity_is_exact() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        ctx.borrow_mut().set(
            "f",
            Value::Func(Rc::new(FunctionValue {
                params: vec![Param {
                    name: "a".to_string(),
                    span: span(),
                }],
                body: Rc::new(Stmt::Block(Vec::new())),
                span: span(),
            })),
        );
        let expr = Expr::Call {
            name: "f".to_string(),
            args: Vec::new(),
            span: span(),
        };
        assert_matches!(
            eval(&expr, &ctx, &env),
            Err(EvalError::ArityMismatch {
                expected: 1,
                found: 0,
                ..
            })
        );
    }

    #[test]
    fn builtins_win_over_bindings_and_misses_are_function_not_found() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        // A binding named newList does not shadow the builtin.
        ctx.borrow_mut().set("newList", Value::Int(1));
        assert_matches!(
            eval(
                &Expr::Call {
                    name: "newList".to_string(),
                    args: Vec::new(),
                    span: span(),
                },
                &ctx,
                &env,
            ),
            Ok(Value::List(_))
        );

        assert_matches!(
            eval(
                &Expr::Call {
                    name: "missing".to_string(),
                    args: Vec::new(),
                    span: span(),
                },
                &ctx,
                &env,
            ),
            Err(EvalError::FunctionNotFound { .. })
        );
    }

    #[test]
    fn nested_path_read_and_growing_write() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        let map = Value::new_map();
        if let Value::Map(handle) = &map {
            handle
                .borrow_mut()
                .put("ports".to_string(), Value::list_from(vec![Value::Int(10)]));
        }
        ctx.borrow_mut().set("cfg", map);

        // cfg.ports[2] = 30 grows the list
        let mut path = RefPath::variable("cfg", span());
        path.accesses.push(Access::Field("ports".to_string()));
        path.accesses.push(Access::Index(int(2)));

        execute(
            &Stmt::Assign {
                target: path.clone(),
                value: int(30),
            },
            &ctx,
            &env,
        )
        .unwrap();

        assert_matches!(read_path(&path, &ctx, &env), Ok(Value::Int(30)));

        let mut gap = RefPath::variable("cfg", span());
        gap.accesses.push(Access::Field("ports".to_string()));
        gap.accesses.push(Access::Index(int(1)));
        assert_matches!(read_path(&gap, &ctx, &env), Ok(Value::Int(0)));
    }

    #[test]
    fn indexing_a_non_list_is_a_capability_error() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        ctx.borrow_mut().set("n", Value::Int(5));
        let mut path = RefPath::variable("n", span());
        path.accesses.push(Access::Index(int(0)));
        assert_matches!(
            read_path(&path, &ctx, &env),
            Err(EvalError::CapabilityMismatch {
                operation: "array",
                found: "int",
                ..
            })
        );
    }

    #[test]
    fn negative_index_is_out_of_range() {
        let env = Builtins::standard();
        let ctx = output_ctx();
        ctx.borrow_mut().set("xs", Value::list_from(vec![Value::Int(1)]));
        let mut path = RefPath::variable("xs", span());
        path.accesses.push(Access::Index(int(-1)));
        assert_matches!(
            read_path(&path, &ctx, &env),
            Err(EvalError::IndexOutOfRange { index: -1, .. })
        );
    }
}
