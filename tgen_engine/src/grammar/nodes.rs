//! AST node definitions
//!
//! Statements and expressions carry the span of the source region they
//! were parsed from so runtime errors can point back into the template.
//! Function bodies are shared behind `Rc`: a function literal evaluates
//! to a value holding the same parsed body every time, and invocations
//! never clone the tree.

use std::fmt;
use std::rc::Rc;

use crate::utils::Span;

/// Binary operators, one per precedence level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Lt,
    Gt,
    Eq,
    Ne,
    BitOr,
    BitXor,
    BitAnd,
    Shr,
    Shl,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::Shr => ">>",
            BinOp::Shl => "<<",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation, `-x`
    Neg,
    /// Bitwise complement, `~x`
    BitNot,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "~",
        }
    }
}

/// One step of a reference path after the base variable
#[derive(Debug, Clone)]
pub enum Access {
    /// `[expr]` array element access
    Index(Expr),
    /// `.name` map entry access
    Field(String),
}

/// A reference path: base variable plus zero or more accesses.
///
/// `config.ports[i]` parses to base `config` with accesses
/// `[Field("ports"), Index(i)]`.
#[derive(Debug, Clone)]
pub struct RefPath {
    pub base: String,
    pub accesses: Vec<Access>,
    pub span: Span,
}

impl RefPath {
    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self {
            base: name.into(),
            accesses: Vec::new(),
            span,
        }
    }

    /// True when the path is a bare variable with no accesses
    pub fn is_plain(&self) -> bool {
        self.accesses.is_empty()
    }
}

/// A function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub span: Span,
}

/// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64, Span),
    Float(f64, Span),
    Str(String, Span),
    /// Read through a reference path
    Ref(RefPath),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// Call in expression position; the result is the callee's `return`
    /// binding (builtins produce their value directly)
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// Function literal; evaluates to a function value closing over
    /// nothing (bodies run in fresh root contexts)
    Func {
        params: Vec<Param>,
        body: Rc<Stmt>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(_, span)
            | Expr::Float(_, span)
            | Expr::Str(_, span)
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Func { span, .. } => *span,
            Expr::Ref(path) => path.span,
        }
    }
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Literal template text emitted verbatim
    Text(String),
    /// `ref = expr;`
    Assign { target: RefPath, value: Expr },
    /// `ref++;`
    Increment { target: RefPath },
    /// Call in statement position; any `return` binding is ignored
    CallStmt {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `= expr` print shorthand
    PrintExpr(Expr),
    /// `print(...)` / `printf(...)`; arguments are concatenated
    Print { args: Vec<Expr>, span: Span },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    For {
        init: Box<Stmt>,
        condition: Expr,
        step: Box<Stmt>,
        body: Box<Stmt>,
    },
    Block(Vec<Stmt>),
}
