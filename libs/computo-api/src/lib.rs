pub mod engine;
pub mod error;
pub mod value;

pub use engine::Engine;
pub use error::{CallError, ErrorKind, EvalError};
pub use value::{DynamicValue, Function, Key, Table, TableRef};
