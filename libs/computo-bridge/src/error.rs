use computo_api::{CallError, EvalError};

/// Internal bridge error. Converted to [`CallError`] exactly once, at the
/// `execute` boundary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("execute() expects 1 or 2 arguments, got {0}")]
    ArgumentCount(usize),

    #[error("execute() {ordinal} argument ({name}) must be {expected}")]
    ArgumentType {
        ordinal: &'static str,
        name: &'static str,
        expected: &'static str,
    },

    #[error("invalid table key type '{key_type}' at {path}")]
    KeyType { key_type: &'static str, path: String },

    #[error("unsupported value type '{type_name}' at {path}")]
    UnsupportedValueType { type_name: &'static str, path: String },

    #[error("cyclic table reference at {path}")]
    CyclicValue { path: String },

    #[error("nesting deeper than {limit} levels at {path}")]
    DepthLimit { limit: usize, path: String },

    #[error("table at {path} is being modified")]
    TableBorrowed { path: String },

    #[error("unsigned integer {value} exceeds the signed 64-bit range at {path}")]
    IntegerOverflow { value: u64, path: String },

    #[error("engine error: {0}")]
    Engine(#[from] EvalError),

    #[error("engine panicked: {0}")]
    EnginePanic(String),

    #[error("config error: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn script_argument() -> Self {
        BridgeError::ArgumentType {
            ordinal: "first",
            name: "script",
            expected: "a table",
        }
    }

    pub fn inputs_argument() -> Self {
        BridgeError::ArgumentType {
            ordinal: "second",
            name: "inputs",
            expected: "a table or nil",
        }
    }
}

/// Argument errors keep their own wording; everything raised past
/// argument validation is reported as an execution error.
impl From<BridgeError> for CallError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::ArgumentCount(_) | BridgeError::ArgumentType { .. } => {
                CallError::new(e.to_string())
            }
            other => CallError::new(format!("Computo execution error: {other}")),
        }
    }
}
