//! Host interop traits for array and map values
//!
//! Script lists and maps are trait objects, so an embedding host can hand
//! the engine views over its own data structures instead of copying them
//! into native containers. `NativeList` and `NativeMap` are the backings
//! used by the `newList`/`newMap` builtins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::value::Value;

pub type SharedList = Rc<RefCell<dyn ListValue>>;
pub type SharedMap = Rc<RefCell<dyn MapValue>>;

/// Array capability.
pub trait ListValue {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the element at `index`. Callers check `index < len()` first.
    fn get(&self, index: usize) -> Value;

    /// Write the element at `index`. An index at or past the current
    /// length grows the backing storage; the gap is filled with `Int(0)`.
    fn set(&mut self, index: usize, value: Value);
}

/// Map capability. Keys are strings.
pub trait MapValue {
    /// Read an entry; `None` means the key is not present.
    fn get(&self, key: &str) -> Option<Value>;

    fn put(&mut self, key: String, value: Value);

    /// Current keys, in no particular order.
    fn keys(&self) -> Vec<String>;
}

/// Vec-backed list.
#[derive(Default)]
pub struct NativeList {
    items: Vec<Value>,
}

impl NativeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn into_shared(self) -> SharedList {
        Rc::new(RefCell::new(self))
    }
}

impl ListValue for NativeList {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Value {
        self.items[index].clone()
    }

    fn set(&mut self, index: usize, value: Value) {
        if index >= self.items.len() {
            self.items.resize(index + 1, Value::Int(0));
        }
        self.items[index] = value;
    }
}

/// HashMap-backed map.
#[derive(Default)]
pub struct NativeMap {
    entries: HashMap<String, Value>,
}

impl NativeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedMap {
        Rc::new(RefCell::new(self))
    }
}

impl MapValue for NativeMap {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_past_end_grows_with_zero_fill() {
        let mut list = NativeList::new();
        list.set(3, Value::Str("x".to_string()));
        assert_eq!(list.len(), 4);
        assert!(matches!(list.get(0), Value::Int(0)));
        assert!(matches!(list.get(2), Value::Int(0)));
        assert!(matches!(list.get(3), Value::Str(ref s) if s == "x"));
    }

    #[test]
    fn set_in_bounds_overwrites() {
        let mut list = NativeList::from_values(vec![Value::Int(1), Value::Int(2)]);
        list.set(1, Value::Int(9));
        assert_eq!(list.len(), 2);
        assert!(matches!(list.get(1), Value::Int(9)));
    }

    #[test]
    fn map_miss_is_none() {
        let mut map = NativeMap::new();
        assert!(map.get("width").is_none());
        map.put("width".to_string(), Value::Int(8));
        assert!(matches!(map.get("width"), Some(Value::Int(8))));
    }
}
