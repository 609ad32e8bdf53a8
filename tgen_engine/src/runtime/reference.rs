//! Resolved references (lvalues)
//!
//! A `Reference` is a settled storage location: a variable slot, a list
//! element, or a map entry. Resolving a syntactic path into a reference
//! (including evaluating index expressions) happens in the evaluator;
//! this module only knows how to read and write the location.

use crate::runtime::capability::{SharedList, SharedMap};
use crate::runtime::context::SharedContext;
use crate::runtime::error::{EvalError, EvalResult};
use crate::runtime::value::Value;
use crate::utils::Span;

pub enum Reference {
    /// Variable: reads walk the context chain, writes bind locally
    Var { name: String, span: Span },
    /// List element: reads are bounds-checked, writes may grow the list
    Element {
        list: SharedList,
        index: usize,
        span: Span,
    },
    /// Map entry: reads of a missing key are an error, writes insert
    Entry {
        map: SharedMap,
        key: String,
        span: Span,
    },
}

impl Reference {
    pub fn get(&self, ctx: &SharedContext) -> EvalResult<Value> {
        match self {
            Reference::Var { name, span } => {
                ctx.borrow()
                    .get(name)
                    .ok_or_else(|| EvalError::VariableNotFound {
                        name: name.clone(),
                        span: *span,
                    })
            }
            Reference::Element { list, index, span } => {
                let list = list.borrow();
                if *index < list.len() {
                    Ok(list.get(*index))
                } else {
                    Err(EvalError::IndexOutOfRange {
                        index: *index as i64,
                        length: list.len(),
                        span: *span,
                    })
                }
            }
            Reference::Entry { map, key, span } => {
                map.borrow()
                    .get(key)
                    .ok_or_else(|| EvalError::EntryNotFound {
                        key: key.clone(),
                        span: *span,
                    })
            }
        }
    }

    pub fn set(&self, ctx: &SharedContext, value: Value) -> EvalResult<()> {
        match self {
            Reference::Var { name, .. } => {
                ctx.borrow_mut().set(name, value);
                Ok(())
            }
            Reference::Element { list, index, .. } => {
                list.borrow_mut().set(*index, value);
                Ok(())
            }
            Reference::Entry { map, key, .. } => {
                map.borrow_mut().put(key.clone(), value);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::capability::NativeList;
    use crate::runtime::context::Context;
    use assert_matches::assert_matches;

    #[test]
    fn variable_reference_reads_chain_writes_local() {
        let root = Context::new_root().into_shared();
        root.borrow_mut().set("n", Value::Int(1));
        let child = Context::child_of(&root);

        let reference = Reference::Var {
            name: "n".to_string(),
            span: Span::dummy(),
        };
        assert_matches!(reference.get(&child), Ok(Value::Int(1)));

        reference.set(&child, Value::Int(2)).unwrap();
        assert_matches!(root.borrow().get("n"), Some(Value::Int(1)));
        assert_matches!(child.borrow().get("n"), Some(Value::Int(2)));
    }

    #[test]
    fn element_read_is_bounds_checked_write_grows() {
        let ctx = Context::new_root().into_shared();
        let list = NativeList::new().into_shared();

        let reference = Reference::Element {
            list: list.clone(),
            index: 2,
            span: Span::dummy(),
        };
        assert_matches!(
            reference.get(&ctx),
            Err(EvalError::IndexOutOfRange {
                index: 2,
                length: 0,
                ..
            })
        );

        reference.set(&ctx, Value::Int(7)).unwrap();
        assert_eq!(list.borrow().len(), 3);
        assert_matches!(reference.get(&ctx), Ok(Value::Int(7)));
    }

    #[test]
    fn missing_entry_read_is_an_error() {
        let ctx = Context::new_root().into_shared();
        let map = crate::runtime::capability::NativeMap::new().into_shared();

        let reference = Reference::Entry {
            map,
            key: "depth".to_string(),
            span: Span::dummy(),
        };
        assert_matches!(reference.get(&ctx), Err(EvalError::EntryNotFound { .. }));

        reference.set(&ctx, Value::Int(4)).unwrap();
        assert_matches!(reference.get(&ctx), Ok(Value::Int(4)));
    }
}
