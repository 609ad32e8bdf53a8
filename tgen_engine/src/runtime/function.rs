//! First-class function values
//!
//! A function value is just its parameter list and shared body; it
//! captures nothing from the context it was created in. Invocation
//! machinery lives in the evaluator.

use std::fmt;
use std::rc::Rc;

use crate::grammar::{Param, Stmt};
use crate::utils::Span;

pub struct FunctionValue {
    pub params: Vec<Param>,
    pub body: Rc<Stmt>,
    /// Span of the `func` literal that produced this value
    pub span: Span,
}

impl FunctionValue {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
        write!(f, "func({})", names.join(", "))
    }
}
