use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// What to do with a JSON unsigned integer above `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsignedOverflow {
    /// Fail the call with an integer overflow error.
    #[default]
    Error,
    /// Reinterpret the bits as a signed integer.
    Wrap,
}

/// Conversion options shared by both directions.
///
/// Deserialized from the module config object. Absent keys take their
/// defaults, unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeOptions {
    /// Maximum table/array nesting. Guards against runaway recursion.
    pub max_depth: usize,
    pub unsigned_overflow: UnsignedOverflow,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unsigned_overflow: UnsignedOverflow::default(),
        }
    }
}

impl BridgeOptions {
    /// Build options from an optional JSON object. `None` and `null`
    /// yield the defaults.
    pub fn from_config(config: Option<&serde_json::Value>) -> Result<Self, BridgeError> {
        let options = match config {
            None | Some(serde_json::Value::Null) => return Ok(Self::default()),
            Some(value @ serde_json::Value::Object(_)) => {
                Self::deserialize(value).map_err(|e| BridgeError::Config(e.to_string()))?
            }
            Some(_) => return Err(BridgeError::Config("config must be an object".into())),
        };
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<(), BridgeError> {
        if self.max_depth == 0 {
            return Err(BridgeError::Config(
                "parameter 'max_depth': must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
