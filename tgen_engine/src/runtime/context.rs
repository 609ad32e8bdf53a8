//! Execution contexts
//!
//! A context is a variable map with an optional parent and an optional
//! output sink. Reads walk the parent chain to the root; writes always
//! land in the local map, shadowing any parent binding. Printing walks
//! the chain to the nearest context that owns a sink.
//!
//! Contexts are deliberately non-lexical with respect to functions: a
//! function invocation starts from a brand-new root context, so the call
//! site's bindings are never visible inside the body.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::value::Value;

pub type SharedContext = Rc<RefCell<Context>>;

#[derive(Debug, Default)]
pub struct Context {
    vars: HashMap<String, Value>,
    parent: Option<SharedContext>,
    output: Option<String>,
}

impl Context {
    /// Root context with no parent and no output sink
    pub fn new_root() -> Self {
        Self::default()
    }

    /// Root context that owns an output sink
    pub fn with_output() -> Self {
        Self {
            output: Some(String::new()),
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> SharedContext {
        Rc::new(RefCell::new(self))
    }

    /// Child of `parent`, owning its own output sink
    pub fn child_with_output(parent: &SharedContext) -> SharedContext {
        Context {
            vars: HashMap::new(),
            parent: Some(parent.clone()),
            output: Some(String::new()),
        }
        .into_shared()
    }

    /// Child of `parent` without a sink of its own; prints delegate up
    pub fn child_of(parent: &SharedContext) -> SharedContext {
        Context {
            vars: HashMap::new(),
            parent: Some(parent.clone()),
            output: None,
        }
        .into_shared()
    }

    /// Read a variable, walking the parent chain
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.borrow().get(name),
            None => None,
        }
    }

    /// Bind a variable in this context's local map
    pub fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append to the nearest sink up the chain; false when no context in
    /// the chain owns one
    pub fn print(&mut self, text: &str) -> bool {
        if let Some(sink) = &mut self.output {
            sink.push_str(text);
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().print(text),
            None => false,
        }
    }

    /// The sink owned by this context, if any
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Take the accumulated output, leaving an empty sink in place
    pub fn take_output(&mut self) -> Option<String> {
        self.output.as_mut().map(std::mem::take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_walk_the_chain_writes_stay_local() {
        let root = Context::new_root().into_shared();
        root.borrow_mut().set("x", Value::Int(1));

        let child = Context::child_of(&root);
        assert!(matches!(child.borrow().get("x"), Some(Value::Int(1))));

        child.borrow_mut().set("x", Value::Int(2));
        assert!(matches!(child.borrow().get("x"), Some(Value::Int(2))));
        assert!(matches!(root.borrow().get("x"), Some(Value::Int(1))));
    }

    #[test]
    fn missing_variable_is_none() {
        let ctx = Context::new_root().into_shared();
        assert!(ctx.borrow().get("nope").is_none());
    }

    #[test]
    fn print_reaches_the_nearest_sink() {
        let root = Context::with_output().into_shared();
        let child = Context::child_of(&root);
        assert!(child.borrow_mut().print("hello"));
        assert_eq!(root.borrow().output(), Some("hello"));
    }

    #[test]
    fn print_without_any_sink_fails() {
        let ctx = Context::new_root().into_shared();
        assert!(!ctx.borrow_mut().print("lost"));
    }

    #[test]
    fn context_chains_are_debuggable() {
        let root = Context::with_output().into_shared();
        root.borrow_mut().set("x", Value::Int(1));
        let child = Context::child_of(&root);
        let rendered = format!("{:?}", child.borrow());
        assert!(rendered.contains("parent"));
        assert!(rendered.contains("x"));
    }

    #[test]
    fn child_sink_shadows_parent_sink() {
        let root = Context::with_output().into_shared();
        let child = Context::child_with_output(&root);
        child.borrow_mut().print("inner");
        assert_eq!(child.borrow().output(), Some("inner"));
        assert_eq!(root.borrow().output(), Some(""));
    }
}
