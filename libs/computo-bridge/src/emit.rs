//! JSON → host value conversion.

use computo_api::{DynamicValue, Table};

use crate::error::BridgeError;
use crate::options::{BridgeOptions, UnsignedOverflow};
use crate::path::ValuePath;

/// Convert a JSON value to a host value. Errors report locations under `value`.
pub fn to_dynamic(
    value: &serde_json::Value,
    options: &BridgeOptions,
) -> Result<DynamicValue, BridgeError> {
    JsonEmitter::new(options, "value").emit(value)
}

/// Single-use emitter for one document.
///
/// - arrays become tables keyed `1..=n`; `null` elements leave holes
/// - objects become tables keyed by string, assigned in document order
/// - integers stay integers, floats stay floats
pub struct JsonEmitter<'a> {
    options: &'a BridgeOptions,
    path: ValuePath,
    depth: usize,
}

impl<'a> JsonEmitter<'a> {
    pub fn new(options: &'a BridgeOptions, root: &'static str) -> Self {
        Self {
            options,
            path: ValuePath::new(root),
            depth: 0,
        }
    }

    pub fn emit(mut self, value: &serde_json::Value) -> Result<DynamicValue, BridgeError> {
        self.value_to_dynamic(value)
    }

    fn value_to_dynamic(&mut self, value: &serde_json::Value) -> Result<DynamicValue, BridgeError> {
        match value {
            serde_json::Value::Null => Ok(DynamicValue::Nil),
            serde_json::Value::Bool(b) => Ok(DynamicValue::Boolean(*b)),
            serde_json::Value::Number(n) => self.number(n),
            serde_json::Value::String(s) => Ok(DynamicValue::String(s.clone())),
            serde_json::Value::Array(items) => {
                self.enter()?;
                let mut table = Table::with_capacity(items.len());
                for (i, item) in (1i64..).zip(items) {
                    self.path.push_index(i);
                    table.set(i, self.value_to_dynamic(item)?);
                    self.path.pop();
                }
                self.depth -= 1;
                Ok(DynamicValue::table(table))
            }
            serde_json::Value::Object(map) => {
                self.enter()?;
                let mut table = Table::with_capacity(map.len());
                for (key, item) in map {
                    self.path.push_key(key);
                    table.set(key.as_str(), self.value_to_dynamic(item)?);
                    self.path.pop();
                }
                self.depth -= 1;
                Ok(DynamicValue::table(table))
            }
        }
    }

    fn enter(&mut self) -> Result<(), BridgeError> {
        if self.depth >= self.options.max_depth {
            return Err(BridgeError::DepthLimit {
                limit: self.options.max_depth,
                path: self.path.to_string(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn number(&self, n: &serde_json::Number) -> Result<DynamicValue, BridgeError> {
        if let Some(i) = n.as_i64() {
            return Ok(DynamicValue::Integer(i));
        }
        if let Some(u) = n.as_u64() {
            return match self.options.unsigned_overflow {
                UnsignedOverflow::Wrap => {
                    tracing::warn!(value = u, path = %self.path, "wrapping unsigned integer into signed range");
                    Ok(DynamicValue::Integer(u as i64))
                }
                UnsignedOverflow::Error => Err(BridgeError::IntegerOverflow {
                    value: u,
                    path: self.path.to_string(),
                }),
            };
        }
        n.as_f64()
            .map(DynamicValue::Float)
            .ok_or_else(|| BridgeError::UnsupportedValueType {
                type_name: "number",
                path: self.path.to_string(),
            })
    }
}
