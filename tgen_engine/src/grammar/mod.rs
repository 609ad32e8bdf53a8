//! Abstract syntax tree for parsed templates

pub mod nodes;

pub use nodes::{Access, BinOp, Expr, Param, RefPath, Stmt, UnaryOp};
