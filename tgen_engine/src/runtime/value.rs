//! Dynamic value model and operator semantics
//!
//! There is no null value: absence of a binding or entry surfaces as an
//! error or a lookup miss, never as a value. Lists, maps, and functions
//! are shared handles; assignment and parameter passing alias them.
//!
//! The numeric rules deliberately follow the reference behavior of the
//! engine rather than host-language convention. Most visibly, `==`
//! treats a float operand as only ever equal to another float holding
//! the same quantity, so `5 == 5.0` is false while `5.0 == 5.0` is true.

use std::fmt;
use std::rc::Rc;

use crate::runtime::capability::{NativeList, NativeMap, SharedList, SharedMap};
use crate::runtime::error::{EvalError, EvalResult};
use crate::runtime::function::FunctionValue;
use crate::utils::Span;

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(SharedList),
    Map(SharedMap),
    Func(Rc<FunctionValue>),
}

impl Value {
    /// Fresh empty native list value
    pub fn new_list() -> Self {
        Value::List(NativeList::new().into_shared())
    }

    /// Native list value seeded with `items`
    pub fn list_from(items: Vec<Value>) -> Self {
        Value::List(NativeList::from_values(items).into_shared())
    }

    /// Fresh empty native map value
    pub fn new_map() -> Self {
        Value::Map(NativeMap::new().into_shared())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Func(_) => "function",
        }
    }

    // ------------------------------------------------------------------
    // Coercions (strict: no implicit narrowing, no truthiness)
    // ------------------------------------------------------------------

    pub fn as_int(&self, span: Span) -> EvalResult<i64> {
        match self {
            Value::Int(value) => Ok(*value),
            other => Err(type_mismatch("int", other, span)),
        }
    }

    /// Truncating numeric coercion used by the bitwise and shift
    /// operators: ints pass through, floats drop their fraction
    pub fn as_long(&self, span: Span) -> EvalResult<i64> {
        match self {
            Value::Int(value) => Ok(*value),
            Value::Float(value) => Ok(*value as i64),
            other => Err(type_mismatch("numeric", other, span)),
        }
    }

    /// Int widens; float passes through
    pub fn as_float(&self, span: Span) -> EvalResult<f64> {
        match self {
            Value::Int(value) => Ok(*value as f64),
            Value::Float(value) => Ok(*value),
            other => Err(type_mismatch("float", other, span)),
        }
    }

    pub fn as_bool(&self, span: Span) -> EvalResult<bool> {
        match self {
            Value::Bool(value) => Ok(*value),
            other => Err(type_mismatch("bool", other, span)),
        }
    }

    pub fn as_str(&self, span: Span) -> EvalResult<&str> {
        match self {
            Value::Str(text) => Ok(text),
            other => Err(type_mismatch("string", other, span)),
        }
    }

    pub fn as_list(&self, span: Span) -> EvalResult<SharedList> {
        match self {
            Value::List(handle) => Ok(handle.clone()),
            other => Err(type_mismatch("list", other, span)),
        }
    }

    pub fn as_map(&self, span: Span) -> EvalResult<SharedMap> {
        match self {
            Value::Map(handle) => Ok(handle.clone()),
            other => Err(type_mismatch("map", other, span)),
        }
    }

    pub fn as_func(&self, span: Span) -> EvalResult<Rc<FunctionValue>> {
        match self {
            Value::Func(func) => Ok(func.clone()),
            other => Err(type_mismatch("function", other, span)),
        }
    }

    /// Total conversion to output text. Floats always carry a decimal
    /// point (`5.0`, not `5`), matching the engine's float rendering.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format_float(*value),
            Value::Bool(value) => value.to_string(),
            Value::Str(text) => text.clone(),
            Value::List(handle) => {
                let list = handle.borrow();
                let mut parts = Vec::with_capacity(list.len());
                for i in 0..list.len() {
                    parts.push(list.get(i).to_display_string());
                }
                format!("[{}]", parts.join(", "))
            }
            Value::Map(handle) => {
                let map = handle.borrow();
                let mut keys = map.keys();
                keys.sort();
                let parts: Vec<String> = keys
                    .iter()
                    .filter_map(|k| map.get(k).map(|v| format!("{}: {}", k, v.to_display_string())))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Func(func) => format!("<function/{}>", func.params.len()),
        }
    }

    // ------------------------------------------------------------------
    // Binary operators
    // ------------------------------------------------------------------

    /// `+`: numeric addition with float widening, or string concatenation
    /// when either side is a string
    pub fn add(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            (a, b) if both_numeric(a, b) => Ok(Value::Float(a.as_float(span)? + b.as_float(span)?)),
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!(
                "{}{}",
                self.to_display_string(),
                other.to_display_string()
            ))),
            _ => Err(operand_mismatch("int, float, or string operands", self, other, span)),
        }
    }

    pub fn sub(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
            (a, b) if both_numeric(a, b) => Ok(Value::Float(a.as_float(span)? - b.as_float(span)?)),
            _ => Err(operand_mismatch("numeric operands", self, other, span)),
        }
    }

    pub fn mul(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
            (a, b) if both_numeric(a, b) => Ok(Value::Float(a.as_float(span)? * b.as_float(span)?)),
            _ => Err(operand_mismatch("numeric operands", self, other, span)),
        }
    }

    /// `/`: integer division truncates toward zero; by zero is a runtime
    /// error, not a host fault
    pub fn div(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    Err(EvalError::DivisionByZero { span })
                } else {
                    Ok(Value::Int(a.wrapping_div(*b)))
                }
            }
            (a, b) if both_numeric(a, b) => Ok(Value::Float(a.as_float(span)? / b.as_float(span)?)),
            _ => Err(operand_mismatch("numeric operands", self, other, span)),
        }
    }

    pub fn rem(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    Err(EvalError::DivisionByZero { span })
                } else {
                    Ok(Value::Int(a.wrapping_rem(*b)))
                }
            }
            (a, b) if both_numeric(a, b) => Ok(Value::Float(a.as_float(span)? % b.as_float(span)?)),
            _ => Err(operand_mismatch("numeric operands", self, other, span)),
        }
    }

    /// `|`: bitwise on two numeric operands (floats truncate), logical
    /// on two bools; mixed numeric/bool is an error
    pub fn or(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
            (a, b) if both_numeric(a, b) => Ok(Value::Int(a.as_long(span)? | b.as_long(span)?)),
            _ => Err(operand_mismatch("two numeric or two bool operands", self, other, span)),
        }
    }

    /// `^`: bitwise on two numeric operands, logical on two bools
    pub fn xor(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a != b)),
            (a, b) if both_numeric(a, b) => Ok(Value::Int(a.as_long(span)? ^ b.as_long(span)?)),
            _ => Err(operand_mismatch("two numeric or two bool operands", self, other, span)),
        }
    }

    /// `&`: bitwise on two numeric operands, logical on two bools
    pub fn and(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
            (a, b) if both_numeric(a, b) => Ok(Value::Int(a.as_long(span)? & b.as_long(span)?)),
            _ => Err(operand_mismatch("two numeric or two bool operands", self, other, span)),
        }
    }

    /// `<<`: numeric operands truncate to ints; the shift amount is
    /// masked to the low six bits
    pub fn shl(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (a, b) if both_numeric(a, b) => {
                Ok(Value::Int(a.as_long(span)?.wrapping_shl(b.as_long(span)? as u32 & 63)))
            }
            _ => Err(operand_mismatch("numeric operands", self, other, span)),
        }
    }

    /// `>>`: arithmetic shift; the shift amount is masked to the low six bits
    pub fn shr(&self, other: &Value, span: Span) -> EvalResult<Value> {
        match (self, other) {
            (a, b) if both_numeric(a, b) => {
                Ok(Value::Int(a.as_long(span)?.wrapping_shr(b.as_long(span)? as u32 & 63)))
            }
            _ => Err(operand_mismatch("numeric operands", self, other, span)),
        }
    }

    /// `~` truncates a numeric operand to an int and complements it;
    /// logical negation on a bool
    pub fn not(&self, span: Span) -> EvalResult<Value> {
        match self {
            Value::Int(_) | Value::Float(_) => Ok(Value::Int(!self.as_long(span)?)),
            Value::Bool(value) => Ok(Value::Bool(!value)),
            other => Err(type_mismatch("numeric or bool", other, span)),
        }
    }

    /// Unary `-`
    pub fn neg(&self, span: Span) -> EvalResult<Value> {
        match self {
            Value::Int(value) => Ok(Value::Int(value.wrapping_neg())),
            Value::Float(value) => Ok(Value::Float(-value)),
            other => Err(type_mismatch("int or float", other, span)),
        }
    }

    /// `==` (total, never raises).
    ///
    /// A float operand is only ever equal to another float holding the
    /// same quantity. Otherwise: both-int comparison, then string-form
    /// comparison when either side is a string, then structural equality
    /// for bools and handle identity for lists, maps, and functions.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Float(_), _) | (_, Value::Float(_)) => false,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                self.to_display_string() == other.to_display_string()
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            (Value::Map(a), Value::Map(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `<`: numeric with float widening, or lexicographic on two strings
    pub fn less(&self, other: &Value, span: Span) -> EvalResult<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a < b),
            (a, b) if both_numeric(a, b) => Ok(a.as_float(span)? < b.as_float(span)?),
            (Value::Str(a), Value::Str(b)) => Ok(a < b),
            _ => Err(operand_mismatch("comparable operands", self, other, span)),
        }
    }

    pub fn less_equal(&self, other: &Value, span: Span) -> EvalResult<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a <= b),
            (a, b) if both_numeric(a, b) => Ok(a.as_float(span)? <= b.as_float(span)?),
            (Value::Str(a), Value::Str(b)) => Ok(a <= b),
            _ => Err(operand_mismatch("comparable operands", self, other, span)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind_name(), self.to_display_string())
    }
}

fn both_numeric(a: &Value, b: &Value) -> bool {
    matches!(a, Value::Int(_) | Value::Float(_)) && matches!(b, Value::Int(_) | Value::Float(_))
}

fn type_mismatch(expected: &'static str, found: &Value, span: Span) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        found: found.kind_name(),
        span,
    }
}

// Report the offending side: the right operand unless the left one
// already fails the operator's kind requirement on its own.
fn operand_mismatch(expected: &'static str, left: &Value, right: &Value, span: Span) -> EvalError {
    let found = match left {
        Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Str(_) => right.kind_name(),
        _ => left.kind_name(),
    };
    EvalError::TypeMismatch {
        expected,
        found,
        span,
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn span() -> Span {
        Span::dummy()
    }

    #[test]
    fn int_float_equality_quirk() {
        assert!(!Value::Int(5).equals(&Value::Float(5.0)));
        assert!(Value::Float(5.0).equals(&Value::Float(5.0)));
        assert!(Value::Int(5).equals(&Value::Int(5)));
    }

    #[test]
    fn string_form_equality() {
        assert!(Value::Str("5".to_string()).equals(&Value::Int(5)));
        assert!(Value::Str("true".to_string()).equals(&Value::Bool(true)));
        assert!(!Value::Str("5".to_string()).equals(&Value::Int(6)));
    }

    #[test]
    fn handle_identity_equality() {
        let a = Value::new_list();
        let b = a.clone();
        let c = Value::new_list();
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn add_widens_and_concatenates() {
        assert_matches!(
            Value::Int(2).add(&Value::Int(3), span()),
            Ok(Value::Int(5))
        );
        assert_matches!(
            Value::Int(2).add(&Value::Float(0.5), span()),
            Ok(Value::Float(f)) if f == 2.5
        );
        assert_matches!(
            Value::Str("w".to_string()).add(&Value::Int(8), span()),
            Ok(Value::Str(ref s)) if s == "w8"
        );
        assert_matches!(
            Value::Float(1.0).add(&Value::Str("x".to_string()), span()),
            Ok(Value::Str(ref s)) if s == "1.0x"
        );
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_matches!(Value::Int(7).div(&Value::Int(2), span()), Ok(Value::Int(3)));
        assert_matches!(
            Value::Int(-7).div(&Value::Int(2), span()),
            Ok(Value::Int(-3))
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_matches!(
            Value::Int(1).div(&Value::Int(0), span()),
            Err(EvalError::DivisionByZero { .. })
        );
        assert_matches!(
            Value::Int(1).rem(&Value::Int(0), span()),
            Err(EvalError::DivisionByZero { .. })
        );
    }

    #[test]
    fn bitwise_on_numbers_logical_on_bools() {
        assert_matches!(Value::Int(6).and(&Value::Int(3), span()), Ok(Value::Int(2)));
        assert_matches!(
            Value::Bool(true).xor(&Value::Bool(true), span()),
            Ok(Value::Bool(false))
        );
        assert_matches!(
            Value::Int(1).or(&Value::Bool(true), span()),
            Err(EvalError::TypeMismatch { .. })
        );
    }

    #[test]
    fn bitwise_truncates_float_operands() {
        assert_matches!(
            Value::Float(6.0).or(&Value::Int(1), span()),
            Ok(Value::Int(7))
        );
        assert_matches!(
            Value::Int(6).and(&Value::Float(3.9), span()),
            Ok(Value::Int(2))
        );
        assert_matches!(
            Value::Int(1).shl(&Value::Float(2.0), span()),
            Ok(Value::Int(4))
        );
        assert_matches!(Value::Float(2.5).not(span()), Ok(Value::Int(-3)));
        assert_matches!(
            Value::Str("6".to_string()).or(&Value::Int(1), span()),
            Err(EvalError::TypeMismatch { .. })
        );
    }

    #[test]
    fn shifts_mask_the_amount() {
        assert_matches!(Value::Int(1).shl(&Value::Int(3), span()), Ok(Value::Int(8)));
        // 64 masks to 0
        assert_matches!(
            Value::Int(1).shl(&Value::Int(64), span()),
            Ok(Value::Int(1))
        );
        assert_matches!(
            Value::Int(-8).shr(&Value::Int(1), span()),
            Ok(Value::Int(-4))
        );
    }

    #[test]
    fn floats_always_render_with_decimal_point() {
        assert_eq!(Value::Float(5.0).to_display_string(), "5.0");
        assert_eq!(Value::Float(2.25).to_display_string(), "2.25");
        assert_eq!(Value::Int(5).to_display_string(), "5");
    }

    #[test]
    fn strict_bool_coercion() {
        assert_matches!(
            Value::Int(1).as_bool(span()),
            Err(EvalError::TypeMismatch {
                expected: "bool",
                found: "int",
                ..
            })
        );
        assert_matches!(Value::Bool(true).as_bool(span()), Ok(true));
    }

    #[test]
    fn less_compares_numbers_and_strings() {
        assert_matches!(Value::Int(5).less(&Value::Float(5.5), span()), Ok(true));
        assert_matches!(
            Value::Str("abc".to_string()).less(&Value::Str("abd".to_string()), span()),
            Ok(true)
        );
        assert_matches!(
            Value::Int(1).less(&Value::Bool(true), span()),
            Err(EvalError::TypeMismatch { .. })
        );
    }
}
