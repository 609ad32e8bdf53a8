//! Runtime: dynamic values, contexts, references, and the evaluator

pub mod builtins;
pub mod capability;
pub mod context;
pub mod error;
pub mod eval;
pub mod function;
pub mod reference;
pub mod value;

pub use builtins::{Builtin, BuiltinHandler, Builtins};
pub use capability::{ListValue, MapValue, NativeList, NativeMap, SharedList, SharedMap};
pub use context::{Context, SharedContext};
pub use error::{EvalError, EvalResult};
pub use function::FunctionValue;
pub use reference::Reference;
pub use value::Value;
